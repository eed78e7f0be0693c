//! Per-file schema model and field-set similarity.
//!
//! A [`FileSchema`] is captured once from a bounded read of a CSV file: the raw
//! header row, a handful of sample rows, the inferred type of each field and
//! the delimiter that split them. Comparisons never look at the raw headers
//! directly; they use the normalized field set (trimmed, lowercased, order and
//! duplicates ignored).

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::field_type::{FieldType, infer_field_types};

pub const DEFAULT_DELIMITER: char = ',';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSchema {
    pub path: String,
    pub headers: Vec<String>,
    #[serde(default, alias = "sampleRows")]
    pub sample_rows: Vec<Vec<String>>,
    #[serde(default, alias = "fieldTypes")]
    pub field_types: IndexMap<String, FieldType>,
    #[serde(default = "FileSchema::default_delimiter")]
    pub delimiter: char,
}

impl FileSchema {
    /// Builds a schema with no samples; every header is typed as empty.
    pub fn new(path: impl Into<String>, headers: Vec<String>) -> Self {
        Self::from_samples(path, headers, Vec::new(), DEFAULT_DELIMITER)
    }

    /// Builds a schema from a header row and sample rows, inferring field types.
    pub fn from_samples(
        path: impl Into<String>,
        headers: Vec<String>,
        sample_rows: Vec<Vec<String>>,
        delimiter: char,
    ) -> Self {
        let field_types = infer_field_types(&headers, &sample_rows);
        Self {
            path: path.into(),
            headers,
            sample_rows,
            field_types,
            delimiter,
        }
    }

    pub const fn default_delimiter() -> char {
        DEFAULT_DELIMITER
    }

    pub fn field_set(&self) -> BTreeSet<String> {
        self.headers.iter().map(|h| normalize_header(h)).collect()
    }

    pub fn field_type(&self, header: &str) -> Option<FieldType> {
        self.field_types.get(header).copied()
    }

    pub fn similarity(&self, other: &FileSchema) -> f64 {
        jaccard(&self.field_set(), &other.field_set())
    }
}

/// Trims and fully case-folds a header, so `Straße` and `STRASSE` agree.
pub fn normalize_header(header: &str) -> String {
    caseless::default_case_fold_str(header.trim())
}

/// Jaccard index of two schemas' normalized field sets.
pub fn similarity(a: &FileSchema, b: &FileSchema) -> f64 {
    a.similarity(b)
}

/// `|A ∩ B| / |A ∪ B|`, with two empty sets treated as identical and exactly
/// one empty set as disjoint.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}
