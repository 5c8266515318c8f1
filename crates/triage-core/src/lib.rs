//! # triage-core
//!
//! Deterministic building blocks for warehouse exception triage.
//!
//! This crate turns a warehouse exception record into an LLM prompt and turns
//! the model's reply back into a canonical [`Outcome`]:
//! - [`label_record`] replaces internal field keys with display labels
//! - [`build_prompt`] assembles the instruction template for one record
//! - [`extract_json_object`] recovers the JSON object from a chatty reply
//! - [`Outcome::coerce`] normalizes any text into one of five outcomes
//!
//! ## Key Guarantees
//!
//! 1. **No network**: Nothing in this crate talks to an LLM
//! 2. **Total**: Coercion and extraction never fail or panic
//! 3. **Deterministic**: Same record always yields the same prompt
//!
//! ## Example
//!
//! ```rust,ignore
//! use triage_core::{build_prompt, label_record, extract_json_object, Outcome};
//!
//! let labeled = label_record(&record);
//! let prompt = build_prompt(0, &labeled, None);
//!
//! // ... send the prompt, receive `reply` ...
//! let parsed = extract_json_object(&reply).unwrap_or_default();
//! let outcome = Outcome::coerce(parsed.get("result").and_then(|v| v.as_str()));
//! ```

pub mod extract;
pub mod labels;
pub mod outcome;
pub mod prompt;
pub mod types;

pub use extract::{extract_json_block, extract_json_object, JsonMap};
pub use labels::{field_label, label_record, FIELD_LABELS};
pub use outcome::{Outcome, OutcomeSummary};
pub use prompt::{build_prompt, SYSTEM_PROMPT};
pub use types::{records_from_json, ClassificationResult, LabeledRecord, Record, RecordError};
