//! Recovery of the JSON object from a model reply.
//!
//! Models asked for "only JSON" still wrap it in prose or markdown fences.
//! Extraction is two-stage:
//! 1. Parse the whole reply
//! 2. Parse the span from the first `{` to the last `}`
//!
//! Only one object per reply is assumed. Unrelated braces before or after the
//! object widen the span and make stage 2 fail; that is accepted.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value as JsonValue;

/// A parsed JSON object.
pub type JsonMap = serde_json::Map<String, JsonValue>;

lazy_static! {
    /// Greedy outermost-braces span, across newlines.
    static ref OUTER_BRACES: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
}

/// Extract a JSON object from `text`, or `None` if no object can be recovered.
pub fn extract_json_object(text: &str) -> Option<JsonMap> {
    if let Some(object) = parse_object(text) {
        return Some(object);
    }

    let span = OUTER_BRACES.find(text)?;
    let object = parse_object(span.as_str());
    if object.is_none() {
        tracing::debug!(span_len = span.as_str().len(), "Brace span is not a JSON object");
    }
    object
}

/// Like [`extract_json_object`], but yields an empty map when nothing is found.
pub fn extract_json_block(text: &str) -> JsonMap {
    extract_json_object(text).unwrap_or_default()
}

fn parse_object(text: &str) -> Option<JsonMap> {
    match serde_json::from_str::<JsonValue>(text) {
        Ok(JsonValue::Object(object)) => Some(object),
        _ => None,
    }
}
