//! Dataset column schema
//!
//! A schema is captured once when a dataset is selected and stays immutable
//! for the lifetime of a filtering session. Legacy column-mapping data can
//! augment it with additional logical names after the fact.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Remapping from logical field names (as referenced by filter rules) to the
/// actual column names present on the records.
///
/// A mapping is a pointer, never a data transform: the underlying records are
/// never rewritten to match it.
pub type ColumnMappings = IndexMap<String, String>;

/// Declared type of a dataset column; drives operator semantics
/// (numeric vs. lexical comparison).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Free-text column
    String,
    /// Numeric column
    Number,
    /// Categorical column (finite value set, compared lexically)
    Categorical,
}

/// Mapping from column name to [`ColumnType`], preserving upload order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSchema {
    columns: IndexMap<String, ColumnType>,
}

impl ColumnSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a column. Later declarations of the same name win.
    pub fn insert(&mut self, name: impl Into<String>, column_type: ColumnType) {
        self.columns.insert(name.into(), column_type);
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<ColumnType> {
        self.columns.get(name).copied()
    }

    /// Case-insensitive lookup, used wherever filter rules reference columns
    /// by a logical name whose casing may not match the upload.
    pub fn get_ci(&self, name: &str) -> Option<ColumnType> {
        self.get(name).or_else(|| {
            self.columns
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, t)| *t)
        })
    }

    /// Whether a column with this name is declared (case-insensitive).
    pub fn contains_ci(&self, name: &str) -> bool {
        self.get_ci(name).is_some()
    }

    /// Column names in upload order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.columns.keys()
    }

    /// Iterate `(name, type)` pairs in upload order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, ColumnType)> {
        self.columns.iter().map(|(k, t)| (k, *t))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Augment the schema with logical names implied by legacy column
    /// mappings: for every `logical -> actual` pair whose `actual` column is
    /// declared, declare `logical` with the same type. Existing declarations
    /// are never overwritten.
    pub fn augment_with_mappings(&mut self, mappings: &ColumnMappings) {
        for (logical, actual) in mappings {
            if self.get(logical).is_none() {
                if let Some(column_type) = self.get_ci(actual) {
                    self.columns.insert(logical.clone(), column_type);
                }
            }
        }
    }
}

impl FromIterator<(String, ColumnType)> for ColumnSchema {
    fn from_iter<I: IntoIterator<Item = (String, ColumnType)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, ColumnType)> for ColumnSchema {
    fn from_iter<I: IntoIterator<Item = (&'a str, ColumnType)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(k, t)| (k.to_string(), t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ColumnSchema {
        [
            ("age", ColumnType::Number),
            ("sex", ColumnType::Categorical),
            ("Visit_Date", ColumnType::String),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn case_insensitive_lookup() {
        let s = schema();
        assert_eq!(s.get("visit_date"), None);
        assert_eq!(s.get_ci("visit_date"), Some(ColumnType::String));
        assert!(s.contains_ci("AGE"));
        assert!(!s.contains_ci("weight"));
    }

    #[test]
    fn augment_adds_logical_names_without_overwriting() {
        let mut s = schema();
        let mappings: ColumnMappings = [
            ("visit".to_string(), "Visit_Date".to_string()),
            ("age".to_string(), "sex".to_string()), // already declared, kept
            ("ghost".to_string(), "missing".to_string()), // target unknown, skipped
        ]
        .into_iter()
        .collect();

        s.augment_with_mappings(&mappings);
        assert_eq!(s.get("visit"), Some(ColumnType::String));
        assert_eq!(s.get("age"), Some(ColumnType::Number));
        assert_eq!(s.get("ghost"), None);
        assert_eq!(s.len(), 4);
    }
}
