//! Engine errors
//!
//! Evaluation itself is infallible by design: malformed rules degrade the
//! single predicate instead of aborting the batch, since a partial filter
//! result beats a broken cohort-builder page mid-edit. These errors are
//! produced only by the static pre-checks ([`crate::check_filter_tree`]) that
//! callers run before saving a cohort definition.

use cohort_model::NodeId;
use thiserror::Error;

/// Result type for engine pre-check operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Structural problems in a filter tree, surfaced before evaluation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Operator string not recognized by this engine version
    #[error("Unsupported operator: {operator}")]
    UnsupportedOperator { operator: String },

    /// Leaf rule that cannot express a meaningful predicate
    #[error("Malformed filter rule {id}: {message}")]
    MalformedRule { id: NodeId, message: String },
}

impl EvalError {
    /// Create an unsupported-operator error
    pub fn unsupported_operator(operator: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            operator: operator.into(),
        }
    }

    /// Create a malformed-rule error
    pub fn malformed_rule(id: NodeId, message: impl Into<String>) -> Self {
        Self::MalformedRule {
            id,
            message: message.into(),
        }
    }
}
