//! Static filter-tree checks
//!
//! Two pre-checks run independently of record evaluation, because a dataset
//! may have zero rows loaded and still need its filter checked before a
//! cohort definition is saved: schema validation (every referenced field
//! exists) and structural linting (rules that can never express a
//! meaningful predicate).

use crate::error::{EvalError, EvalResult};
use cohort_model::{ColumnMappings, ColumnSchema, FilterGroup};
use indexmap::IndexSet;
use serde::Serialize;

/// Verdict of [`validate_filter_schema`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaValidationResult {
    pub is_valid: bool,
    /// Referenced fields with no matching dataset column, in the order the
    /// tree references them.
    pub missing_columns: Vec<String>,
}

/// Check that every field referenced by a leaf rule exists in the dataset's
/// column schema.
///
/// Resolution matches evaluation: the mapping table is applied first and the
/// schema lookup is case-insensitive, so a tree validates exactly when every
/// rule would resolve to a real column at evaluation time. Membership rules
/// reference cohorts, not columns, and are skipped; so are rules with a
/// blank field (caught by [`check_filter_tree`] instead).
pub fn validate_filter_schema(
    tree: &FilterGroup,
    columns: &ColumnSchema,
    mappings: Option<&ColumnMappings>,
) -> SchemaValidationResult {
    let mut referenced: IndexSet<&str> = IndexSet::new();
    tree.walk_rules(&mut |rule| {
        if !rule.op.is_membership() && !rule.field.trim().is_empty() {
            referenced.insert(rule.field.as_str());
        }
    });

    let missing_columns: Vec<String> = referenced
        .into_iter()
        .filter(|field: &&str| {
            let candidate = mappings
                .and_then(|m| m.get(*field))
                .map_or(*field, String::as_str);
            !columns.contains_ci(candidate)
        })
        .map(ToString::to_string)
        .collect();

    SchemaValidationResult {
        is_valid: missing_columns.is_empty(),
        missing_columns,
    }
}

/// Lint a tree for rules the evaluator would only ever degrade on: unknown
/// operators, blank fields, range operators without an upper bound. Returns
/// the first problem found in tree order.
///
/// Evaluation never runs this; it exists so callers can block a save action
/// loudly instead of shipping a filter that silently passes rows.
pub fn check_filter_tree(tree: &FilterGroup) -> EvalResult<()> {
    let mut problem: Option<EvalError> = None;
    tree.walk_rules(&mut |rule| {
        if problem.is_some() {
            return;
        }
        if let cohort_model::FilterOp::Unknown(op) = &rule.op {
            problem = Some(EvalError::unsupported_operator(op));
        } else if !rule.op.is_membership() && rule.field.trim().is_empty() {
            problem = Some(EvalError::malformed_rule(rule.id, "missing field"));
        } else if rule.op.requires_second_value() && rule.value2.is_none() {
            problem = Some(EvalError::malformed_rule(
                rule.id,
                format!("{} requires a second value", rule.op),
            ));
        }
    });
    match problem {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

/// Collect the distinct unknown operator strings in a tree, in first-use
/// order. Unlike [`check_filter_tree`] this never fails; it feeds UIs that
/// want to warn about permissive rules without blocking anything.
pub fn collect_unsupported_ops(tree: &FilterGroup) -> Vec<String> {
    let mut ops: IndexSet<String> = IndexSet::new();
    tree.walk_rules(&mut |rule| {
        if let cohort_model::FilterOp::Unknown(name) = &rule.op {
            ops.insert(name.clone());
        }
    });
    ops.into_iter().collect()
}
