//! Reference rules document.
//!
//! The document is opaque text injected into every prompt. A read failure
//! never aborts a batch: the error is written inline in place of the rules so
//! the model (and whoever reads its reasoning) can see what happened.

use std::fs;
use std::path::Path;

/// Read the reference rules, or an inline error marker if the file cannot be read.
pub fn load_reference_rules(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(rules) => {
            tracing::debug!(path = %path.display(), bytes = rules.len(), "Loaded reference rules");
            rules
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Reference rules unavailable");
            format!("[ERROR: Failed to load rules - {e}]")
        }
    }
}
