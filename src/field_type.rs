//! Value and column type inference from sampled CSV cells.
//!
//! Each cell is classified by a fixed priority chain (first match wins):
//! datetime, date, boolean, integer, float, then string. Blank cells are
//! [`FieldType::Empty`] and never influence a column's type.
//!
//! The chain checks booleans before integers, so the literals `0` and `1`
//! are always [`FieldType::Boolean`].

use std::{collections::BTreeSet, fmt, str::FromStr, sync::LazyLock};

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DATETIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}").expect("datetime regex")
});
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date regex"));
static BOOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(true|false|yes|no|1|0)$").expect("boolean regex"));
static INT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+$").expect("integer regex"));
static FLOAT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+\.\d+$").expect("float regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Empty,
    Mixed,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Empty => "empty",
            FieldType::Mixed => "mixed",
        }
    }

    pub fn variants() -> &'static [FieldType] {
        &[
            FieldType::String,
            FieldType::Integer,
            FieldType::Float,
            FieldType::Boolean,
            FieldType::Date,
            FieldType::DateTime,
            FieldType::Empty,
            FieldType::Mixed,
        ]
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        FieldType::variants()
            .iter()
            .copied()
            .find(|variant| variant.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Unknown field type '{value}'. Supported types: {}",
                    FieldType::variants()
                        .iter()
                        .map(FieldType::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// Classifies a single raw cell. The value is not trimmed: only an empty or
/// all-whitespace cell counts as blank.
pub fn infer_value(value: &str) -> FieldType {
    if value.trim().is_empty() {
        return FieldType::Empty;
    }
    if DATETIME_PATTERN.is_match(value) {
        FieldType::DateTime
    } else if DATE_PATTERN.is_match(value) {
        FieldType::Date
    } else if BOOL_PATTERN.is_match(value) {
        FieldType::Boolean
    } else if INT_PATTERN.is_match(value) {
        FieldType::Integer
    } else if FLOAT_PATTERN.is_match(value) {
        FieldType::Float
    } else {
        FieldType::String
    }
}

/// Reduces the sampled values of one column into a single type.
///
/// Integers mixed with floats widen to [`FieldType::Float`]; any other mix of
/// distinct types is [`FieldType::Mixed`].
pub fn infer_column<'a, I>(values: I) -> FieldType
where
    I: IntoIterator<Item = &'a str>,
{
    let seen: BTreeSet<FieldType> = values
        .into_iter()
        .map(infer_value)
        .filter(|ty| *ty != FieldType::Empty)
        .collect();

    let mut iter = seen.iter();
    match (iter.next(), iter.next()) {
        (None, _) => FieldType::Empty,
        (Some(only), None) => *only,
        _ if seen.iter().all(FieldType::is_numeric) => FieldType::Float,
        _ => FieldType::Mixed,
    }
}

/// Infers one type per header from positionally aligned sample rows. Rows that
/// are shorter than the header simply contribute nothing to the missing
/// columns.
pub fn infer_field_types(headers: &[String], rows: &[Vec<String>]) -> IndexMap<String, FieldType> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let column = rows
                .iter()
                .filter_map(|row| row.get(idx))
                .map(String::as_str);
            (header.clone(), infer_column(column))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn zero_and_one_are_booleans_not_integers() {
        assert_eq!(infer_value("0"), FieldType::Boolean);
        assert_eq!(infer_value("1"), FieldType::Boolean);
        assert_eq!(infer_value("10"), FieldType::Integer);
    }

    #[test]
    fn classifies_scalar_values() {
        assert_eq!(infer_value("123"), FieldType::Integer);
        assert_eq!(infer_value("-456"), FieldType::Integer);
        assert_eq!(infer_value("123.45"), FieldType::Float);
        assert_eq!(infer_value("-0.5"), FieldType::Float);
        assert_eq!(infer_value("TRUE"), FieldType::Boolean);
        assert_eq!(infer_value("No"), FieldType::Boolean);
        assert_eq!(infer_value("2024-01-15"), FieldType::Date);
        assert_eq!(infer_value("2024-01-15T10:30:00"), FieldType::DateTime);
        assert_eq!(infer_value("2024-01-15 10:30:00"), FieldType::DateTime);
        assert_eq!(infer_value("123abc"), FieldType::String);
        assert_eq!(infer_value("foo bar"), FieldType::String);
    }

    #[test]
    fn blank_values_are_empty() {
        assert_eq!(infer_value(""), FieldType::Empty);
        assert_eq!(infer_value("   "), FieldType::Empty);
        assert_eq!(infer_value("\t"), FieldType::Empty);
    }

    #[test]
    fn date_requires_exact_match_but_datetime_allows_suffix() {
        assert_eq!(infer_value("2024-01-15x"), FieldType::String);
        assert_eq!(infer_value("2024-01-15T10:30:00Z"), FieldType::DateTime);
        assert_eq!(infer_value("2024-01-15T10:30"), FieldType::String);
    }

    #[test]
    fn decimal_point_needs_digits_on_both_sides() {
        assert_eq!(infer_value(".5"), FieldType::String);
        assert_eq!(infer_value("5."), FieldType::String);
        assert_eq!(infer_value("+5"), FieldType::String);
    }

    #[test]
    fn column_inference_widens_and_mixes() {
        assert_eq!(infer_column(["10", "20", "30"]), FieldType::Integer);
        assert_eq!(infer_column(["10", "2.5", "30"]), FieldType::Float);
        assert_eq!(infer_column(["123", "hello", "456"]), FieldType::Mixed);
        assert_eq!(infer_column(["", "  ", ""]), FieldType::Empty);
        assert_eq!(infer_column(Vec::<&str>::new()), FieldType::Empty);
        assert_eq!(infer_column(["", "7", ""]), FieldType::Integer);
    }

    #[test]
    fn boolean_and_integer_do_not_widen() {
        assert_eq!(infer_column(["1", "25"]), FieldType::Mixed);
    }

    #[test]
    fn field_types_follow_header_order_and_tolerate_short_rows() {
        let headers = strings(&["id", "name", "score"]);
        let rows = vec![strings(&["10", "alpha", "1.5"]), strings(&["11", "beta"])];
        let types = infer_field_types(&headers, &rows);
        let keys: Vec<&str> = types.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "score"]);
        assert_eq!(types["id"], FieldType::Integer);
        assert_eq!(types["name"], FieldType::String);
        assert_eq!(types["score"], FieldType::Float);
    }

    #[test]
    fn header_without_samples_is_empty() {
        let headers = strings(&["a", "b"]);
        let types = infer_field_types(&headers, &[]);
        assert_eq!(types["a"], FieldType::Empty);
        assert_eq!(types["b"], FieldType::Empty);
    }

    #[test]
    fn serialized_tags_are_lowercase() {
        for variant in FieldType::variants() {
            let json = serde_json::to_string(variant).expect("serialize type");
            assert_eq!(json, format!("\"{}\"", variant.as_str()));
            assert_eq!(variant.as_str().parse::<FieldType>().unwrap(), *variant);
        }
        assert!("decimal".parse::<FieldType>().is_err());
    }
}
