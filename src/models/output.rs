use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Output column order, written exactly in this sequence
pub const OUTPUT_COLUMNS: [&str; 10] = [
    "Form",
    "Lemma",
    "Pos",
    "Phrase",
    "Hand",
    "Phase",
    "Practice",
    "Semantic",
    "HandShapeShape",
    "PalmDirection",
];

/// Column appended by the deictic tagging pass
pub const DEICTIC_COLUMN: &str = "IsDeictic";

/// Serialized form of an absent field
pub const MISSING_VALUE: &str = "nan";

/// One flattened aligned row, keyed by column name
///
/// Fields outside the output schema may be present (compound feature keys
/// from nested layers); they are dropped at serialization. Rows are
/// immutable once written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    fields: BTreeMap<String, String>,
}

impl OutputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, overwriting any previous value
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Set a field from an optional annotation; empty cells become the
    /// missing-value sentinel
    pub fn set_annotation(&mut self, key: &str, annotation: Option<&str>) {
        let value = annotation.unwrap_or(MISSING_VALUE);
        self.fields.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Copy every field of `other` into this record, overwriting collisions
    pub fn absorb(&mut self, other: &OutputRecord) {
        for (key, value) in &other.fields {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// Render the record as one CSV line in schema order
    ///
    /// Values are joined without quoting, so the format matches the naive
    /// writer of the source dataset.
    pub fn csv_line(&self, columns: &[&str]) -> String {
        columns
            .iter()
            .map(|c| self.get(c).unwrap_or(MISSING_VALUE))
            .collect::<Vec<_>>()
            .join(",")
    }
}
