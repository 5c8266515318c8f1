//! Record and result types shared by the whole pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::outcome::Outcome;

/// One warehouse exception entry: field key to value.
///
/// No schema is enforced. Values are usually strings, numbers or null.
/// Keys keep the order they had in the input.
pub type Record = serde_json::Map<String, JsonValue>;

/// A [`Record`] whose keys have been replaced by display labels.
pub type LabeledRecord = serde_json::Map<String, JsonValue>;

/// Errors when reading a batch of records.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Failed to parse records JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Expected a JSON array of records, got {0}")]
    NotAnArray(&'static str),

    #[error("Record at index {index} is not a JSON object")]
    NotAnObject { index: usize },
}

/// Parse a batch of records from a JSON array of objects.
pub fn records_from_json(json: &str) -> Result<Vec<Record>, RecordError> {
    let value: JsonValue = serde_json::from_str(json)?;

    let items = match value {
        JsonValue::Array(items) => items,
        other => return Err(RecordError::NotAnArray(json_kind(&other))),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            JsonValue::Object(record) => Ok(record),
            _ => Err(RecordError::NotAnObject { index }),
        })
        .collect()
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// The classification of one record.
///
/// Exactly one of these exists per input record, and `record_id` is the
/// record's position in the input batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// 0-based index into the input batch
    pub record_id: usize,

    /// Canonical outcome
    pub result: Outcome,

    /// Model explanation, or a description of what went wrong
    pub llm_reasoning: String,
}

impl ClassificationResult {
    /// A result produced from a model reply.
    pub fn new(record_id: usize, result: Outcome, llm_reasoning: impl Into<String>) -> Self {
        Self {
            record_id,
            result,
            llm_reasoning: llm_reasoning.into(),
        }
    }

    /// An `Undefined` result explaining why no classification was possible.
    pub fn undefined(record_id: usize, reason: impl Into<String>) -> Self {
        Self::new(record_id, Outcome::Undefined, reason)
    }
}
