//! Leaf-predicate operator implementations
//!
//! Split by operand family the way the evaluator dispatches: numeric and
//! lexical comparison, and date comparison. Membership operators live in the
//! evaluator itself since they read the cohort index rather than the cell.

pub mod comparison;
pub mod datetime;
