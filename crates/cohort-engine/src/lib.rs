//! Cohort Filter Evaluation & Missing-Data Resolution Engine
//!
//! This crate evaluates nested boolean filter trees against patient-level
//! tabular records. It is the computational core of a cohort builder:
//!
//! - **Filter evaluation**: recursive AND/OR trees with negation and ~20
//!   leaf operators (comparison, dates, emptiness, cohort membership)
//! - **Missing-data policy**: a three-tier rule (global switch, per-column
//!   override, per-rule override) governing whether empty cells exclude rows,
//!   plus a wholesale dirty-data sweep across all declared columns
//! - **Column resolution**: logical field name to actual record key, through
//!   a mapping table and case-insensitive fallback
//! - **Cohort membership**: `in_cohort`/`not_in_cohort` against other
//!   cohorts' saved patient-ID lists, fail-open on unknown cohorts
//! - **Schema validation**: static field-existence checks that run on
//!   zero-row datasets, before a cohort definition is saved
//! - **Record grouping**: patient-identity detection and matched/unmatched
//!   partitioning for review UIs
//!
//! # Example
//!
//! ```
//! use cohort_engine::{FilterContext, FilterEngine};
//! use cohort_model::{ColumnSchema, ColumnType, FilterOp, FilterTreeBuilder, GroupLogic,
//!     records_from_json};
//! use serde_json::json;
//!
//! let schema: ColumnSchema = [("age", ColumnType::Number)].into_iter().collect();
//! let records = records_from_json(&[json!({"age": 45}), json!({"age": 17})], &schema);
//!
//! let mut builder = FilterTreeBuilder::new();
//! let adult = builder.rule("age", FilterOp::Gte, 18);
//! let tree = builder.group(GroupLogic::And, [adult.into()]);
//!
//! let ctx = FilterContext::new(&schema);
//! let kept = FilterEngine::new().filter(&records, &tree, &ctx);
//! assert_eq!(kept.len(), 1);
//! ```
//!
//! # Degradation over failure
//!
//! Evaluation never raises: unparseable dates and numbers fail the single
//! predicate, unresolvable columns flow into the missing-data path, unknown
//! cohorts and operators pass open (logged). The static pre-checks in
//! [`validate`] exist so callers can still block a save action loudly.

pub mod columns;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod identity;
pub mod membership;
pub mod missing;
pub mod operators;
pub mod validate;

// Re-export main types
pub use columns::ColumnResolver;
pub use context::{FilterContext, FilterContextBuilder};
pub use error::{EvalError, EvalResult};
pub use evaluator::FilterEngine;
pub use identity::{
    GroupedPatientResult, PatientBuckets, detect_patient_id_column, group_patient_records,
    grouped_view, patient_identity,
};
pub use membership::CohortMembershipIndex;
pub use missing::MissingDataPolicy;
pub use validate::{
    SchemaValidationResult, check_filter_tree, collect_unsupported_ops, validate_filter_schema,
};
