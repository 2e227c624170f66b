//! Cell values - runtime representation of a single tabular cell
//!
//! Uploaded patient data is dynamically typed: a cell holds free text, a
//! number, or nothing at all. Numeric and temporal interpretation happens at
//! comparison time in the engine, never at ingestion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell in a patient record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Explicit null (missing value)
    Null,
    /// Numeric value
    Number(f64),
    /// Free-text value
    Text(String),
}

impl CellValue {
    /// Check whether this cell counts as empty.
    ///
    /// Empty means null, the empty string, or whitespace-only text. A number
    /// is never empty, NaN included.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Number(_) => false,
            Self::Text(s) => s.trim().is_empty(),
        }
    }

    /// Coerce to a number for comparison.
    ///
    /// Text cells are parsed leniently (leading/trailing whitespace ignored).
    /// Returns `None` when the cell cannot be read as a number; comparison
    /// operators treat that the same way they treat NaN: the predicate fails.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Borrow the text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the cell the way it would appear in a table.
    ///
    /// Null renders as the empty string; numbers drop a trailing `.0`
    /// (`45.0` renders as `45`), matching how uploaded CSV cells look.
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            Value::Bool(b) => Self::Text(b.to_string()),
            // Arrays/objects do not occur in flat tabular uploads; keep the
            // raw JSON so nothing is silently dropped.
            other => Self::Text(other.to_string()),
        }
    }
}
