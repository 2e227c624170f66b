//! Patient records
//!
//! A record is one uploaded row: a fixed-key mapping of schema-declared cells
//! plus a side-channel bag for columns the schema does not know about
//! (forward compatibility with re-uploaded files). Records are created once
//! at ingestion and never mutated by the engine.

use crate::schema::ColumnSchema;
use crate::value::CellValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One patient-level row of tabular data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Stable position of this row in the uploaded dataset; used as the
    /// synthetic identity fallback when no patient-ID column exists.
    row_index: usize,
    /// Cells for schema-declared columns, in upload order.
    cells: IndexMap<String, CellValue>,
    /// Cells for columns absent from the schema.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    extras: IndexMap<String, CellValue>,
}

impl PatientRecord {
    /// Build a record from raw cells, splitting them into schema-declared
    /// cells and unknown extras. Cell keys keep their original casing.
    pub fn from_cells(
        row_index: usize,
        raw: impl IntoIterator<Item = (String, CellValue)>,
        schema: &ColumnSchema,
    ) -> Self {
        let mut cells = IndexMap::new();
        let mut extras = IndexMap::new();
        for (key, value) in raw {
            if schema.contains_ci(&key) {
                cells.insert(key, value);
            } else {
                extras.insert(key, value);
            }
        }
        Self {
            row_index,
            cells,
            extras,
        }
    }

    /// Build a record from one JSON object of an uploaded/fetched row set.
    pub fn from_json_object(
        row_index: usize,
        object: &serde_json::Map<String, serde_json::Value>,
        schema: &ColumnSchema,
    ) -> Self {
        Self::from_cells(
            row_index,
            object.iter().map(|(k, v)| (k.clone(), CellValue::from(v))),
            schema,
        )
    }

    pub fn row_index(&self) -> usize {
        self.row_index
    }

    /// Exact-key cell lookup, checking declared cells first, then extras.
    /// Absent keys mean a missing value, not an error.
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.get(key).or_else(|| self.extras.get(key))
    }

    /// All cell keys present on this record (declared first, then extras).
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.cells.keys().chain(self.extras.keys())
    }
}

/// Convert a fetched JSON row set into records, assigning row indices by
/// position. Non-object rows are skipped.
pub fn records_from_json(rows: &[serde_json::Value], schema: &ColumnSchema) -> Vec<PatientRecord> {
    rows.iter()
        .enumerate()
        .filter_map(|(i, row)| {
            row.as_object()
                .map(|obj| PatientRecord::from_json_object(i, obj, schema))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;
    use serde_json::json;

    fn schema() -> ColumnSchema {
        [("age", ColumnType::Number), ("sex", ColumnType::Categorical)]
            .into_iter()
            .collect()
    }

    #[test]
    fn splits_unknown_columns_into_extras() {
        let rows = vec![json!({"age": 45, "sex": "F", "site": "A03"})];
        let records = records_from_json(&rows, &schema());
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.get("age"), Some(&CellValue::Number(45.0)));
        assert_eq!(r.get("site"), Some(&CellValue::from("A03")));
        assert_eq!(r.keys().count(), 3);
    }

    #[test]
    fn absent_key_is_a_miss() {
        let rows = vec![json!({"age": 45})];
        let records = records_from_json(&rows, &schema());
        assert_eq!(records[0].get("sex"), None);
    }

    #[test]
    fn row_indices_follow_position() {
        let rows = vec![json!({"age": 1}), json!("not a row"), json!({"age": 2})];
        let records = records_from_json(&rows, &schema());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row_index(), 0);
        assert_eq!(records[1].row_index(), 2);
    }
}
