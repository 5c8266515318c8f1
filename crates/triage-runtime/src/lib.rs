//! # triage-runtime
//!
//! LLM-backed classification of warehouse exception batches.
//!
//! This crate wires the deterministic pieces of `triage-core` to a remote
//! chat-completion endpoint:
//! - Resolves the API key once per batch ([`KeyResolver`])
//! - Sends one request per record, sequentially, with a fixed timeout
//! - Converts every per-record failure into an `Undefined` result
//!
//! Only a missing API key stops a batch. Everything else is reported per
//! record in `llm_reasoning`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use triage_runtime::{validate_data, KeyResolver, ValidatorConfig};
//!
//! let outcome = validate_data(
//!     &records,
//!     false,
//!     "react",
//!     &KeyResolver::new(),
//!     &ValidatorConfig::default(),
//! ).await?;
//!
//! println!("{}: {}", outcome.key_source, outcome.summary());
//! ```

use thiserror::Error;

pub mod config;
pub mod orchestrator;
pub mod providers;
pub mod rules;

pub use config::{ConfigError, ValidatorConfig};
pub use orchestrator::{BatchOutcome, BatchValidator, RecordFailure, NO_EXPLANATION};
pub use providers::{
    ApiCredential, ChatMessage, CompletionConfig, CompletionResponse, KeyResolver, KeySource,
    LlmProvider, ProviderError, TokenUsage,
};
pub use rules::load_reference_rules;

#[cfg(feature = "openai")]
pub use providers::OpenAiProvider;

#[cfg(feature = "openai")]
use triage_core::Record;

/// Errors that stop a batch before any record is classified.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("{0}")]
    CredentialMissing(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Classify a batch of records.
///
/// # Arguments
///
/// * `records` - The records, classified in order
/// * `use_rules` - Inject the reference rules document into every prompt
/// * `hint` - Caller context used to pick the API key (`"react"` or anything else)
/// * `resolver` - Where API keys are looked up
/// * `config` - Endpoint, model and timeout settings
///
/// # Returns
///
/// One result per record plus the key-source label, or
/// [`RuntimeError::CredentialMissing`] when no key is available.
#[cfg(feature = "openai")]
pub async fn validate_data(
    records: &[Record],
    use_rules: bool,
    hint: &str,
    resolver: &KeyResolver,
    config: &ValidatorConfig,
) -> Result<BatchOutcome, RuntimeError> {
    config.validate()?;

    let credential = resolver.resolve(hint)?;
    let key_source = credential.source();

    let provider = OpenAiProvider::new(credential)?.with_base_url(config.base_url.as_str());
    let validator = BatchValidator::new(std::sync::Arc::new(provider), config.clone());

    tracing::info!(
        records = records.len(),
        use_rules,
        key_source = %key_source,
        model = %config.model,
        "Starting validation batch"
    );
    let results = validator.validate(records, use_rules).await;

    Ok(BatchOutcome {
        results,
        key_source,
    })
}
