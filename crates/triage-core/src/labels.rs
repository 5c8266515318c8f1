//! Display labels for internal record field keys.
//!
//! Warehouse exports use terse technical keys (`matnr`, `lgort`, ...). The
//! model classifies more reliably when it sees the business names instead.

use crate::types::{LabeledRecord, Record};

/// Internal field key to display label.
pub const FIELD_LABELS: &[(&str, &str)] = &[
    ("matnr", "Material Number"),
    ("rstyp", "Reservation Type"),
    ("diffmg", "Difference Quantity"),
    ("pick_qty", "Picked Quantity"),
    ("sernr", "Serial Number"),
    ("source", "Source Type"),
    ("lgort", "Storage Location"),
    ("plnum", "Production Order Number"),
    ("werks", "Plant"),
];

/// Look up the display label for a field key.
///
/// Returns `None` for keys that have no label.
pub fn field_label(key: &str) -> Option<&'static str> {
    FIELD_LABELS
        .iter()
        .find(|(field, _)| *field == key)
        .map(|(_, label)| *label)
}

/// Replace every labeled key in `record` with its display label.
///
/// Keys without a label pass through unchanged and every field keeps its
/// position. Values are copied as-is.
pub fn label_record(record: &Record) -> LabeledRecord {
    record
        .iter()
        .map(|(key, value)| {
            let label = field_label(key).map(str::to_string).unwrap_or_else(|| key.clone());
            (label, value.clone())
        })
        .collect()
}
