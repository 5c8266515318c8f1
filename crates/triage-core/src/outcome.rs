//! Canonical classification outcomes and normalization of model output.
//!
//! [`Outcome::coerce`] is the single boundary between free-form model text
//! and the rest of the system. Whatever the model says, downstream code only
//! ever sees one of the five variants.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::ClassificationResult;

/// What should happen to a warehouse exception record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Outcome {
    /// Temporary or retryable condition (lock, timeout, connectivity)
    Reprocess,

    /// Duplicate, obsolete or unwanted
    Delete,

    /// Data quality or mapping issue that must be corrected
    Fix,

    /// Blocking issue that needs operator attention
    Escalate,

    /// Not enough information to decide
    Undefined,
}

/// Lowercase alias to outcome. Includes the legacy OK/NOK vocabulary:
/// OK meant "nothing to do", NOK meant "needs fixing".
const ALIASES: &[(&str, Outcome)] = &[
    ("reprocess", Outcome::Reprocess),
    ("re-process", Outcome::Reprocess),
    ("retry", Outcome::Reprocess),
    ("delete", Outcome::Delete),
    ("fix", Outcome::Fix),
    ("escalate", Outcome::Escalate),
    ("undefined", Outcome::Undefined),
    ("unknown", Outcome::Undefined),
    ("error", Outcome::Undefined),
    ("ok", Outcome::Undefined),
    ("nok", Outcome::Fix),
];

impl Outcome {
    /// All outcomes, in display order.
    pub const ALL: [Outcome; 5] = [
        Outcome::Reprocess,
        Outcome::Delete,
        Outcome::Fix,
        Outcome::Escalate,
        Outcome::Undefined,
    ];

    /// Canonical name, as sent to and expected from the model.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Reprocess => "Reprocess",
            Outcome::Delete => "Delete",
            Outcome::Fix => "Fix",
            Outcome::Escalate => "Escalate",
            Outcome::Undefined => "Undefined",
        }
    }

    /// Normalize arbitrary text into an outcome.
    ///
    /// Order of resolution:
    /// 1. Missing or blank input is `Undefined`
    /// 2. Case-insensitive match of a canonical name
    /// 3. Case-insensitive match in the alias table
    /// 4. Anything else is `Undefined`
    pub fn coerce(value: Option<&str>) -> Outcome {
        let normalized = match value.map(str::trim) {
            Some(v) if !v.is_empty() => v.to_lowercase(),
            _ => return Outcome::Undefined,
        };

        if let Some(outcome) = Self::ALL
            .iter()
            .find(|o| o.as_str().eq_ignore_ascii_case(&normalized))
        {
            return *outcome;
        }

        ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, outcome)| *outcome)
            .unwrap_or(Outcome::Undefined)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Number of results per outcome in a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub reprocess: usize,
    pub delete: usize,
    pub fix: usize,
    pub escalate: usize,
    pub undefined: usize,
}

impl OutcomeSummary {
    /// Count outcomes across a result list.
    pub fn from_results(results: &[ClassificationResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.record(result.result);
        }
        summary
    }

    /// Add one outcome to the tally.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Reprocess => self.reprocess += 1,
            Outcome::Delete => self.delete += 1,
            Outcome::Fix => self.fix += 1,
            Outcome::Escalate => self.escalate += 1,
            Outcome::Undefined => self.undefined += 1,
        }
    }

    /// Count for one outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Reprocess => self.reprocess,
            Outcome::Delete => self.delete,
            Outcome::Fix => self.fix,
            Outcome::Escalate => self.escalate,
            Outcome::Undefined => self.undefined,
        }
    }

    /// Total number of results counted.
    pub fn total(&self) -> usize {
        self.reprocess + self.delete + self.fix + self.escalate + self.undefined
    }
}

impl fmt::Display for OutcomeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Outcome::ALL
            .iter()
            .map(|o| format!("{} {}", self.count(*o), o))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_missing_or_blank_is_undefined() {
        assert_eq!(Outcome::coerce(None), Outcome::Undefined);
        assert_eq!(Outcome::coerce(Some("")), Outcome::Undefined);
        assert_eq!(Outcome::coerce(Some("   ")), Outcome::Undefined);
    }

    #[test]
    fn test_canonical_names_any_case() {
        assert_eq!(Outcome::coerce(Some("Reprocess")), Outcome::Reprocess);
        assert_eq!(Outcome::coerce(Some("reprocess")), Outcome::Reprocess);
        assert_eq!(Outcome::coerce(Some("DELETE")), Outcome::Delete);
        assert_eq!(Outcome::coerce(Some("fIx")), Outcome::Fix);
        assert_eq!(Outcome::coerce(Some("ESCALATE")), Outcome::Escalate);
        assert_eq!(Outcome::coerce(Some(" undefined ")), Outcome::Undefined);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(Outcome::coerce(Some("retry")), Outcome::Reprocess);
        assert_eq!(Outcome::coerce(Some("Re-Process")), Outcome::Reprocess);
        assert_eq!(Outcome::coerce(Some("unknown")), Outcome::Undefined);
        assert_eq!(Outcome::coerce(Some("ERROR")), Outcome::Undefined);
    }

    #[test]
    fn test_legacy_ok_nok() {
        assert_eq!(Outcome::coerce(Some("ok")), Outcome::Undefined);
        assert_eq!(Outcome::coerce(Some("OK")), Outcome::Undefined);
        assert_eq!(Outcome::coerce(Some("NOK")), Outcome::Fix);
        assert_eq!(Outcome::coerce(Some("nok")), Outcome::Fix);
    }

    #[test]
    fn test_unrecognized_falls_back_to_undefined() {
        assert_eq!(Outcome::coerce(Some("maybe later")), Outcome::Undefined);
        assert_eq!(Outcome::coerce(Some("Reprocess|Delete")), Outcome::Undefined);
        assert_eq!(Outcome::coerce(Some("fixed")), Outcome::Undefined);
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        assert_eq!(serde_json::to_string(&Outcome::Escalate).unwrap(), "\"Escalate\"");
        let parsed: Outcome = serde_json::from_str("\"Delete\"").unwrap();
        assert_eq!(parsed, Outcome::Delete);
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![
            ClassificationResult::new(0, Outcome::Fix, "a"),
            ClassificationResult::new(1, Outcome::Fix, "b"),
            ClassificationResult::new(2, Outcome::Escalate, "c"),
            ClassificationResult::undefined(3, "d"),
        ];

        let summary = OutcomeSummary::from_results(&results);
        assert_eq!(summary.fix, 2);
        assert_eq!(summary.escalate, 1);
        assert_eq!(summary.undefined, 1);
        assert_eq!(summary.reprocess, 0);
        assert_eq!(summary.total(), 4);
        assert_eq!(
            summary.to_string(),
            "0 Reprocess, 0 Delete, 2 Fix, 1 Escalate, 1 Undefined"
        );
    }

    proptest! {
        #[test]
        fn prop_coerce_is_total(input in ".*") {
            let outcome = Outcome::coerce(Some(&input));
            prop_assert!(Outcome::ALL.contains(&outcome));
        }

        #[test]
        fn prop_coerce_is_idempotent(index in 0usize..5, upper in any::<bool>()) {
            let canonical = Outcome::ALL[index];
            let text = if upper {
                canonical.as_str().to_uppercase()
            } else {
                canonical.as_str().to_lowercase()
            };
            let once = Outcome::coerce(Some(&text));
            prop_assert_eq!(once, canonical);
            prop_assert_eq!(Outcome::coerce(Some(once.as_str())), once);
        }
    }
}
