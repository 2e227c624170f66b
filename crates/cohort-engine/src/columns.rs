//! Column resolution
//!
//! Filter rules reference columns by logical name; the actual record key may
//! differ through a column-mapping table or through casing drift between
//! uploads. Resolution is a pointer lookup, never a data transform: records
//! are never rewritten to match a mapping.

use cohort_model::{CellValue, ColumnMappings, PatientRecord};

/// Resolves logical field references to actual record keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnResolver<'a> {
    mappings: Option<&'a ColumnMappings>,
}

impl<'a> ColumnResolver<'a> {
    pub fn new(mappings: Option<&'a ColumnMappings>) -> Self {
        Self { mappings }
    }

    /// Resolve a logical field to the key to read from `record`.
    ///
    /// Order: mapping substitution, exact key match, case-insensitive scan
    /// over the record's keys. When nothing matches, the candidate key is
    /// returned as-is and the caller's lookup comes back as a miss, which
    /// flows into the missing-data path.
    pub fn resolve<'r>(&self, logical_field: &'r str, record: &'r PatientRecord) -> &'r str
    where
        'a: 'r,
    {
        let candidate = self
            .mappings
            .and_then(|m| m.get(logical_field))
            .map_or(logical_field, String::as_str);

        if record.get(candidate).is_some() {
            return candidate;
        }
        record
            .keys()
            .find(|key| key.eq_ignore_ascii_case(candidate))
            .map_or(candidate, String::as_str)
    }

    /// Resolve and read the cell in one step.
    pub fn lookup<'r>(&self, logical_field: &str, record: &'r PatientRecord) -> Option<&'r CellValue>
    where
        'a: 'r,
    {
        // resolve() needs logical_field to outlive the record borrow; route
        // through the record's own key when the input borrow is shorter.
        let candidate = self
            .mappings
            .and_then(|m| m.get(logical_field))
            .map_or(logical_field, String::as_str);

        if let Some(cell) = record.get(candidate) {
            return Some(cell);
        }
        record
            .keys()
            .find(|key| key.eq_ignore_ascii_case(candidate))
            .and_then(|key| record.get(key))
    }
}
