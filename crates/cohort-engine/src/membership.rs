//! Cohort membership index
//!
//! `in_cohort`/`not_in_cohort` predicates test a row's patient identity
//! against another cohort's saved patient-ID list. The index is built once
//! per evaluation pass and shared read-only across all rows; concurrent
//! evaluations must each build their own to keep cohort contexts separate.

use cohort_model::Cohort;
use std::collections::{HashMap, HashSet};

/// Set-membership lookups over the cohorts reachable in the current context.
#[derive(Debug, Clone, Default)]
pub struct CohortMembershipIndex {
    sets: HashMap<String, HashSet<String>>,
}

impl CohortMembershipIndex {
    /// Build the index from the cohorts visible to this evaluation pass.
    pub fn build(cohorts: &[Cohort]) -> Self {
        let sets = cohorts
            .iter()
            .map(|c| (c.id.clone(), c.patient_ids.iter().cloned().collect()))
            .collect();
        Self { sets }
    }

    /// Whether `identity` belongs to cohort `cohort_id`.
    ///
    /// Returns `None` when the cohort is unknown; the evaluator maps that to
    /// a fail-open `true` for both membership operators so that absent cohort
    /// data never silently empties a result set.
    pub fn membership(&self, cohort_id: &str, identity: &str) -> Option<bool> {
        self.sets.get(cohort_id).map(|ids| ids.contains(identity))
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }
}
