//! Rendering of a finished validation batch.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use triage_core::{ClassificationResult, OutcomeSummary};
use triage_runtime::{BatchOutcome, KeySource};

/// What `triage validate` prints.
#[derive(Debug, Serialize)]
pub struct Report {
    pub key_source: KeySource,
    pub validated_at: DateTime<Utc>,
    pub summary: OutcomeSummary,
    pub results: Vec<ClassificationResult>,
}

impl Report {
    pub fn new(outcome: BatchOutcome) -> Self {
        Self::at(outcome, Utc::now())
    }

    fn at(outcome: BatchOutcome, validated_at: DateTime<Utc>) -> Self {
        Self {
            key_source: outcome.key_source,
            validated_at,
            summary: outcome.summary(),
            results: outcome.results,
        }
    }
}

/// One line per record, then the key source and totals.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    for result in &report.results {
        let _ = writeln!(
            out,
            "#{:<4} {:<10} {}",
            result.record_id, result.result, result.llm_reasoning
        );
    }
    let _ = writeln!(out, "Key source: {}", report.key_source);
    let _ = writeln!(out, "Summary: {}", report.summary);
    out
}
