//! Cohort builder data model
//!
//! This crate defines the types the cohort filter engine operates on:
//!
//! - Cell values and patient records ([`CellValue`], [`PatientRecord`])
//! - Dataset column schemas ([`ColumnSchema`], [`ColumnType`])
//! - Filter trees as a tagged sum type ([`FilterNode`], [`FilterGroup`],
//!   [`FilterRule`]) with a single authoritative [`FilterTreeBuilder`]
//! - Saved cohorts and missing-data overrides ([`Cohort`],
//!   [`NullPolicyOverrides`])
//!
//! All types (de)serialize with serde in the wire format used by the UI and
//! the criteria-to-formula service: camelCase keys, snake_case operators.

mod cohort;
mod filter;
mod record;
mod schema;
mod value;

pub use cohort::*;
pub use filter::*;
pub use record::*;
pub use schema::*;
pub use value::*;
