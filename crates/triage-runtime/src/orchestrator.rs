//! Batch orchestrator for record classification.
//!
//! Records are classified one after another, one remote call each:
//!
//! ```text
//! pending -> prompt built -> call attempted -> Done
//!                                   |-> network failure   -> Done(Undefined)
//!                                   |-> HTTP error        -> Done(Undefined)
//!                                   |-> bad envelope      -> Done(Undefined)
//!                                   |-> unparsable reply  -> Done(Undefined)
//! ```
//!
//! Every failure is turned into an `Undefined` result through [`RecordFailure`],
//! so a batch always yields exactly one result per record.

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;

use triage_core::{
    build_prompt, extract_json_object, label_record, ClassificationResult, JsonMap, Outcome,
    OutcomeSummary, Record,
};

use crate::config::ValidatorConfig;
use crate::providers::{ChatMessage, CompletionConfig, KeySource, LlmProvider, ProviderError};
use crate::rules::load_reference_rules;

/// Reasoning used when the model gives a classification but no explanation.
pub const NO_EXPLANATION: &str = "No explanation provided.";

/// Why a single record could not be classified.
///
/// The `Display` text becomes the record's `llm_reasoning`.
#[derive(Error, Debug)]
pub enum RecordFailure {
    #[error("HTTP request error: {0}")]
    Request(String),

    #[error("Error: HTTP {status} – {body}")]
    Status { status: u16, body: String },

    #[error("Invalid LLM response structure: {0}")]
    Envelope(String),

    #[error("Parsing error: {reason}. Raw: {raw}")]
    Payload { reason: String, raw: String },
}

impl RecordFailure {
    /// Short class name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RecordFailure::Request(_) => "network",
            RecordFailure::Status { .. } => "http_status",
            RecordFailure::Envelope(_) => "envelope",
            RecordFailure::Payload { .. } => "payload",
        }
    }

    /// Encode the failure as an `Undefined` result for `record_id`.
    pub fn into_result(self, record_id: usize) -> ClassificationResult {
        ClassificationResult::undefined(record_id, self.to_string())
    }
}

impl From<ProviderError> for RecordFailure {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::ApiError { status, body } => RecordFailure::Status { status, body },
            ProviderError::InvalidResponse(msg) => RecordFailure::Envelope(msg),
            other @ (ProviderError::HttpError(_)
            | ProviderError::Timeout(_)
            | ProviderError::NotConfigured(_)) => RecordFailure::Request(other.to_string()),
        }
    }
}

/// Results of a batch plus the credential diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    /// One result per input record, in input order
    pub results: Vec<ClassificationResult>,

    /// Where the API key came from
    pub key_source: KeySource,
}

impl BatchOutcome {
    /// Outcome counts for the batch.
    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary::from_results(&self.results)
    }
}

/// Classifies batches of records through an LLM provider.
pub struct BatchValidator {
    provider: Arc<dyn LlmProvider>,
    config: ValidatorConfig,
    completion: CompletionConfig,
}

impl BatchValidator {
    /// Create a validator for the given provider and configuration.
    pub fn new(provider: Arc<dyn LlmProvider>, config: ValidatorConfig) -> Self {
        let completion = config.completion_config();
        Self {
            provider,
            config,
            completion,
        }
    }

    /// Classify every record, loading the reference rules first if requested.
    pub async fn validate(&self, records: &[Record], use_rules: bool) -> Vec<ClassificationResult> {
        let rules = use_rules.then(|| load_reference_rules(&self.config.rules_path));
        self.validate_with_rules(records, rules.as_deref()).await
    }

    /// Classify every record with the given rules text.
    ///
    /// Always returns `records.len()` results; `record_id` is the index.
    pub async fn validate_with_rules(
        &self,
        records: &[Record],
        rules: Option<&str>,
    ) -> Vec<ClassificationResult> {
        let mut results = Vec::with_capacity(records.len());

        for (record_id, record) in records.iter().enumerate() {
            let result = match self.classify_record(record_id, record, rules).await {
                Ok(result) => result,
                Err(failure) => {
                    tracing::warn!(
                        record_id,
                        kind = failure.kind(),
                        error = %failure,
                        "Record classification failed"
                    );
                    failure.into_result(record_id)
                }
            };
            results.push(result);
        }

        let summary = OutcomeSummary::from_results(&results);
        tracing::info!(
            provider = self.provider.name(),
            records = records.len(),
            summary = %summary,
            "Batch classified"
        );

        results
    }

    async fn classify_record(
        &self,
        record_id: usize,
        record: &Record,
        rules: Option<&str>,
    ) -> Result<ClassificationResult, RecordFailure> {
        let labeled = label_record(record);
        let prompt = build_prompt(record_id, &labeled, rules);
        tracing::debug!(record_id, prompt_len = prompt.len(), "Classifying record");

        let messages = vec![
            ChatMessage::system(self.config.system_prompt.as_str()),
            ChatMessage::user(prompt),
        ];
        let response = self.provider.complete(messages, &self.completion).await?;

        let reply = response.content.trim();
        let parsed = extract_json_object(reply).ok_or_else(|| RecordFailure::Payload {
            reason: "no JSON object found in model reply".to_string(),
            raw: reply.to_string(),
        })?;

        interpret_reply(record_id, &parsed).map_err(|reason| RecordFailure::Payload {
            reason,
            raw: reply.to_string(),
        })
    }
}

/// Turn a parsed reply into a result. The reply's own `record_id` is ignored.
fn interpret_reply(record_id: usize, parsed: &JsonMap) -> Result<ClassificationResult, String> {
    let result = optional_str(parsed, "result")?;
    let reasoning = optional_str(parsed, "llm_reasoning")?
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(NO_EXPLANATION);

    Ok(ClassificationResult::new(
        record_id,
        Outcome::coerce(result),
        reasoning,
    ))
}

/// A string field that may be absent or null, but not of another type.
///
/// `null` counts as absent, so a null `llm_reasoning` gets [`NO_EXPLANATION`]
/// instead of failing the record.
fn optional_str<'a>(parsed: &'a JsonMap, field: &str) -> Result<Option<&'a str>, String> {
    match parsed.get(field) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s)),
        Some(other) => Err(format!("field '{field}' must be a string, got {other}")),
    }
}
