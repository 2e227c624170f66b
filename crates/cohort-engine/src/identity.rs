//! Patient identity detection and record grouping
//!
//! Uploaded datasets rarely declare which column identifies the patient, so
//! the engine detects it heuristically: first a schema scan against the usual
//! identifier spellings, then a scan of known aliases actually present on the
//! records. Rows with no usable identity fall back to a synthetic one derived
//! from the row index.

use cohort_model::{ColumnSchema, PatientRecord};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

static ID_COLUMN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(patient_?id|subject_?id|participant_?id|id)$").expect("valid regex")
});

/// Identifier spellings seen across real uploads, checked against record
/// keys when the schema scan comes up empty.
const ID_COLUMN_ALIASES: &[&str] = &[
    "patient_id",
    "PatientId",
    "PATIENT_ID",
    "id",
    "Id",
    "ID",
    "subject_id",
    "SubjectId",
    "SUBJECT_ID",
    "participant_id",
    "ParticipantId",
];

/// Detect the patient-identifier column: first schema column matching the
/// identifier pattern, else the first known alias present on the records.
/// `None` means all grouping falls back to synthetic identities.
pub fn detect_patient_id_column(
    records: &[PatientRecord],
    columns: &ColumnSchema,
) -> Option<String> {
    if let Some(name) = columns.names().find(|n| ID_COLUMN_PATTERN.is_match(n)) {
        return Some(name.clone());
    }
    let probe = records.first()?;
    ID_COLUMN_ALIASES
        .iter()
        .find(|alias| probe.get(alias).is_some())
        .map(ToString::to_string)
}

/// The identity used to correlate a record across matched/unmatched groups:
/// the identifier cell's display value, or `patient-<row_index>` when the
/// column is unknown or the cell is empty.
pub fn patient_identity(record: &PatientRecord, id_column: Option<&str>) -> String {
    if let Some(column) = id_column {
        if let Some(cell) = record.get(column) {
            if !cell.is_empty() {
                return cell.to_display_string();
            }
        }
    }
    format!("patient-{}", record.row_index())
}

/// Matched/unmatched rows for one patient identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatientBuckets {
    pub matched: Vec<PatientRecord>,
    pub unmatched: Vec<PatientRecord>,
}

/// Partition of the full record set by patient identity, for review UIs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupedPatientResult {
    /// Buckets keyed by identity, in order of first appearance in the full
    /// record set.
    pub groups: IndexMap<String, PatientBuckets>,
    /// Number of identities with at least one unmatched row; gates whether
    /// the UI presents a grouped rather than flat view.
    pub identities_with_unmatched: usize,
}

/// Group every row of `all_records` by patient identity and mark it matched
/// when its identity appears among `filtered_records`' identities.
///
/// Pure, read-only transform; row order within each bucket preserves
/// `all_records` iteration order.
pub fn group_patient_records(
    all_records: &[PatientRecord],
    filtered_records: &[PatientRecord],
    id_column: Option<&str>,
) -> GroupedPatientResult {
    let matched_identities: HashSet<String> = filtered_records
        .iter()
        .map(|r| patient_identity(r, id_column))
        .collect();

    let mut groups: IndexMap<String, PatientBuckets> = IndexMap::new();
    for record in all_records {
        let identity = patient_identity(record, id_column);
        let buckets = groups.entry(identity.clone()).or_default();
        if matched_identities.contains(&identity) {
            buckets.matched.push(record.clone());
        } else {
            buckets.unmatched.push(record.clone());
        }
    }

    let identities_with_unmatched = groups
        .values()
        .filter(|b| !b.unmatched.is_empty())
        .count();

    GroupedPatientResult {
        groups,
        identities_with_unmatched,
    }
}

/// Caller-level convenience: grouping is skipped entirely when no actual
/// filtering occurred.
pub fn grouped_view(
    all_records: &[PatientRecord],
    filtered_records: &[PatientRecord],
    id_column: Option<&str>,
) -> Option<GroupedPatientResult> {
    if filtered_records.len() == all_records.len() {
        return None;
    }
    Some(group_patient_records(
        all_records,
        filtered_records,
        id_column,
    ))
}
