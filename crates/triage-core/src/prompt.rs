//! Prompt construction for record classification.
//!
//! A prompt is made of:
//! 1. The fixed instruction block (outcomes and their meaning)
//! 2. Optional reference rules, verbatim
//! 3. The labeled record as indented JSON
//! 4. The exact reply shape the model must return
//!
//! Prompts are fully determined by their inputs.

use crate::types::LabeledRecord;

/// System message sent with every classification request.
pub const SYSTEM_PROMPT: &str = "You are a helpful SAP validator assistant.";

/// Fixed instruction block. `IDX` is illustrative; the real id is given at the end.
const INSTRUCTIONS: &str = r#"You are an SAP Middleware Assistant validating BDOC-like warehouse records.

Choose EXACTLY ONE result for the record from:
- "Reprocess"  (temporary/retryable condition, e.g., lock, timeout, transient connectivity)
- "Delete"     (duplicate/obsolete/unwanted)
- "Fix"        (data quality or mapping issue that must be corrected)
- "Escalate"   (blocking issue requiring senior/operator attention)
- "Undefined"  (insufficient information)

Respond ONLY in valid minified JSON with exactly:
{"record_id": IDX, "llm_reasoning": "...", "result": "Reprocess|Delete|Fix|Escalate|Undefined"}"#;

/// Build the classification prompt for one record.
///
/// `rules` is inserted verbatim when present and non-empty. A rules loader
/// that failed passes its error text here so the prompt still builds.
pub fn build_prompt(record_id: usize, record: &LabeledRecord, rules: Option<&str>) -> String {
    let mut prompt = String::from(INSTRUCTIONS);
    prompt.push('\n');

    if let Some(rules) = rules.filter(|r| !r.is_empty()) {
        prompt.push_str("\nAdditional reference rules to consider:\n");
        prompt.push_str(rules);
        prompt.push('\n');
    }

    let record_json = serde_json::to_string_pretty(record)
        .unwrap_or_else(|e| format!("<record could not be serialized: {e}>"));

    prompt.push_str("\nRecord (human-labeled fields):\n");
    prompt.push_str(&record_json);
    prompt.push_str("\n\nReturn strictly this JSON (one line, no extra text):\n");
    prompt.push_str(&format!(
        r#"{{"record_id": {record_id}, "llm_reasoning": "...", "result": "<one of the five>"}}"#
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::label_record;
    use serde_json::json;

    fn labeled(value: serde_json::Value) -> LabeledRecord {
        label_record(value.as_object().unwrap())
    }

    #[test]
    fn test_prompt_lists_all_outcomes() {
        let prompt = build_prompt(0, &labeled(json!({"matnr": "1"})), None);

        for outcome in ["Reprocess", "Delete", "Fix", "Escalate", "Undefined"] {
            assert!(prompt.contains(&format!("\"{outcome}\"")), "missing {outcome}");
        }
        assert!(prompt.contains("temporary/retryable"));
        assert!(prompt.contains("duplicate/obsolete"));
        assert!(prompt.contains("data quality"));
        assert!(prompt.contains("insufficient information"));
    }

    #[test]
    fn test_prompt_contains_labeled_record() {
        let prompt = build_prompt(3, &labeled(json!({"matnr": "4711", "werks": "1000"})), None);

        assert!(prompt.contains("Record (human-labeled fields):"));
        assert!(prompt.contains("\"Material Number\": \"4711\""));
        assert!(prompt.contains("\"Plant\": \"1000\""));
        assert!(!prompt.contains("matnr"));
    }

    #[test]
    fn test_prompt_ends_with_reply_shape() {
        let prompt = build_prompt(7, &labeled(json!({})), None);

        assert!(prompt.ends_with(
            r#"{"record_id": 7, "llm_reasoning": "...", "result": "<one of the five>"}"#
        ));
        assert!(prompt.contains("no extra text"));
    }

    #[test]
    fn test_rules_inserted_verbatim() {
        let rules = "- Lock errors on werks 1000 are always Reprocess\n- Serial duplicates: Delete";
        let prompt = build_prompt(0, &labeled(json!({"sernr": "S1"})), Some(rules));

        assert!(prompt.contains("Additional reference rules to consider:"));
        assert!(prompt.contains(rules));

        let rules_at = prompt.find(rules).unwrap();
        let record_at = prompt.find("Record (human-labeled fields):").unwrap();
        assert!(rules_at < record_at);
    }

    #[test]
    fn test_empty_rules_omitted() {
        let without = build_prompt(0, &labeled(json!({"lgort": "0001"})), None);
        let empty = build_prompt(0, &labeled(json!({"lgort": "0001"})), Some(""));

        assert_eq!(without, empty);
        assert!(!without.contains("Additional reference rules"));
    }

    #[test]
    fn test_rules_error_text_passes_through() {
        let rules = "[ERROR: Failed to load rules - No such file or directory (os error 2)]";
        let prompt = build_prompt(0, &labeled(json!({})), Some(rules));
        assert!(prompt.contains(rules));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let record = labeled(json!({"diffmg": 2, "pick_qty": 10, "rstyp": "R"}));
        assert_eq!(
            build_prompt(1, &record, Some("rules")),
            build_prompt(1, &record, Some("rules"))
        );
    }

    #[test]
    fn test_record_fields_follow_input_order() {
        let records =
            crate::types::records_from_json(r#"[{"werks":"1000","matnr":"4711","bdoc_id":"B1"}]"#)
                .unwrap();
        let prompt = build_prompt(0, &label_record(&records[0]), None);

        let plant = prompt.find("\"Plant\"").unwrap();
        let material = prompt.find("\"Material Number\"").unwrap();
        let bdoc = prompt.find("\"bdoc_id\"").unwrap();
        assert!(plant < material);
        assert!(material < bdoc);
    }

    #[test]
    fn test_non_ascii_not_escaped() {
        let prompt = build_prompt(0, &labeled(json!({"lgort": "Lager Süd"})), None);
        assert!(prompt.contains("Lager Süd"));
    }
}
