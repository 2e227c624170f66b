//! Saved cohorts and per-column missing-data overrides

use crate::filter::FilterGroup;
use crate::schema::ColumnSchema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A named, saved subset of patients selected via a filter tree.
///
/// Within the engine a cohort is a read-only reference consumed only by the
/// `in_cohort`/`not_in_cohort` membership predicates; persistence is handled
/// by an external collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cohort {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Patient identities that matched this cohort's filter when it was saved.
    #[serde(default)]
    pub patient_ids: Vec<String>,
    #[serde(default)]
    pub columns: ColumnSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterGroup>,
}

/// Per-column missing-data overrides, the middle tier of the policy:
/// `true` force-includes rows whose cell in that column is empty, `false`
/// force-excludes them, an absent entry defers to the global flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NullPolicyOverrides {
    overrides: IndexMap<String, bool>,
}

impl NullPolicyOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, include_missing: bool) {
        self.overrides.insert(column.into(), include_missing);
    }

    /// Look up the override for a column, case-insensitively, matching how
    /// the engine resolves column references everywhere else.
    pub fn get(&self, column: &str) -> Option<bool> {
        self.overrides.get(column).copied().or_else(|| {
            self.overrides
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(column))
                .map(|(_, v)| *v)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

impl FromIterator<(String, bool)> for NullPolicyOverrides {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self {
            overrides: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, bool)> for NullPolicyOverrides {
    fn from_iter<I: IntoIterator<Item = (&'a str, bool)>>(iter: I) -> Self {
        iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}
