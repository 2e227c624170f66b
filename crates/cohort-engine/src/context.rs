//! Evaluation context for one filter pass
//!
//! The context bundles everything a pass needs besides the rows and the tree:
//! the dataset schema, column mappings, missing-data overrides, the cohort
//! membership index, and the detected patient-ID column. It is treated as
//! immutable for the duration of the pass; concurrent evaluations must each
//! build their own so cohort contexts never cross-contaminate.

use crate::columns::ColumnResolver;
use crate::identity::detect_patient_id_column;
use crate::membership::CohortMembershipIndex;
use crate::missing::MissingDataPolicy;
use cohort_model::{Cohort, ColumnMappings, ColumnSchema, NullPolicyOverrides, PatientRecord};

/// Immutable inputs of one evaluation pass.
#[derive(Debug)]
pub struct FilterContext<'a> {
    pub(crate) schema: &'a ColumnSchema,
    pub(crate) resolver: ColumnResolver<'a>,
    pub(crate) policy: MissingDataPolicy<'a>,
    pub(crate) membership: CohortMembershipIndex,
    pub(crate) patient_id_column: Option<String>,
}

impl<'a> FilterContext<'a> {
    /// Start building a context for the given dataset schema.
    pub fn builder(schema: &'a ColumnSchema) -> FilterContextBuilder<'a> {
        FilterContextBuilder {
            schema,
            mappings: None,
            overrides: None,
            cohorts: &[],
            exclude_dirty_data: false,
            patient_id_column: None,
        }
    }

    /// Context with nothing but the schema; good enough for filters that use
    /// neither mappings, overrides, nor membership operators.
    pub fn new(schema: &'a ColumnSchema) -> Self {
        Self::builder(schema).build()
    }

    pub fn schema(&self) -> &ColumnSchema {
        self.schema
    }

    pub fn patient_id_column(&self) -> Option<&str> {
        self.patient_id_column.as_deref()
    }
}

/// Builder for [`FilterContext`].
#[derive(Debug)]
pub struct FilterContextBuilder<'a> {
    schema: &'a ColumnSchema,
    mappings: Option<&'a ColumnMappings>,
    overrides: Option<&'a NullPolicyOverrides>,
    cohorts: &'a [Cohort],
    exclude_dirty_data: bool,
    patient_id_column: Option<String>,
}

impl<'a> FilterContextBuilder<'a> {
    /// Supply the logical-to-actual column mapping table.
    pub fn column_mappings(mut self, mappings: &'a ColumnMappings) -> Self {
        self.mappings = Some(mappings);
        self
    }

    /// Supply per-column missing-data overrides.
    pub fn null_overrides(mut self, overrides: &'a NullPolicyOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Supply the cohorts reachable by membership operators.
    pub fn cohorts(mut self, cohorts: &'a [Cohort]) -> Self {
        self.cohorts = cohorts;
        self
    }

    /// Set the global missing-data switch. The `exclude_dirty_data` flag on
    /// the root group is OR-ed in at evaluation time, so either channel
    /// activates the sweep.
    pub fn exclude_dirty_data(mut self, exclude: bool) -> Self {
        self.exclude_dirty_data = exclude;
        self
    }

    /// Name the patient-identifier column explicitly.
    pub fn patient_id_column(mut self, column: impl Into<String>) -> Self {
        self.patient_id_column = Some(column.into());
        self
    }

    /// Detect the patient-identifier column from the records about to be
    /// filtered, unless one was named explicitly.
    pub fn detect_patient_id(mut self, records: &[PatientRecord]) -> Self {
        if self.patient_id_column.is_none() {
            self.patient_id_column = detect_patient_id_column(records, self.schema);
        }
        self
    }

    pub fn build(self) -> FilterContext<'a> {
        FilterContext {
            schema: self.schema,
            resolver: ColumnResolver::new(self.mappings),
            policy: MissingDataPolicy::new(self.overrides, self.exclude_dirty_data),
            membership: CohortMembershipIndex::build(self.cohorts),
            patient_id_column: self.patient_id_column,
        }
    }
}
