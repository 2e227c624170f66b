//! Recursive filter evaluation
//!
//! One pass walks every record through the filter tree. Evaluation is
//! deliberately infallible: malformed rules, unparseable values, and unknown
//! operators degrade the single predicate instead of aborting the batch,
//! since clinical users edit filters live against loaded data.

use crate::context::FilterContext;
use crate::identity::patient_identity;
use crate::missing::MissingDataPolicy;
use crate::operators::{comparison, datetime};
use cohort_model::{
    CellValue, ColumnType, FilterGroup, FilterNode, FilterOp, FilterRule, GroupLogic,
    PatientRecord,
};
use log::{debug, warn};

/// The filter evaluation engine.
///
/// Stateless; all per-pass state lives in the [`FilterContext`], so one
/// engine can serve any number of independent passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine;

impl FilterEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run one full pass: the dirty-data sweep, then tree evaluation per row.
    /// Returns the rows that survive both, in input order.
    pub fn filter(
        &self,
        records: &[PatientRecord],
        tree: &FilterGroup,
        ctx: &FilterContext<'_>,
    ) -> Vec<PatientRecord> {
        let policy = ctx.policy.or_global(tree.exclude_dirty_data);
        let kept: Vec<PatientRecord> = records
            .iter()
            .filter(|record| {
                (!policy.sweep_active() || self.passes_dirty_sweep(record, ctx, &policy))
                    && self.eval_group(record, tree, ctx, &policy)
            })
            .cloned()
            .collect();
        debug!("filter pass kept {} of {} records", kept.len(), records.len());
        kept
    }

    /// Evaluate the filter tree against a single record.
    ///
    /// This is tree evaluation only; the dirty-data sweep is part of
    /// [`FilterEngine::filter`].
    pub fn evaluate(
        &self,
        record: &PatientRecord,
        tree: &FilterGroup,
        ctx: &FilterContext<'_>,
    ) -> bool {
        let policy = ctx.policy.or_global(tree.exclude_dirty_data);
        self.eval_group(record, tree, ctx, &policy)
    }

    /// The global + per-column missing-data sweep.
    ///
    /// Runs across all declared columns, not just the ones rules reference:
    /// the product requirement is that dirty rows can be excluded wholesale
    /// even when no rule touches the dirty column. Rule-level missing checks
    /// in [`Self::eval_rule`] are layered on top, not replaced.
    fn passes_dirty_sweep(
        &self,
        record: &PatientRecord,
        ctx: &FilterContext<'_>,
        policy: &MissingDataPolicy<'_>,
    ) -> bool {
        for (column, _) in ctx.schema.iter() {
            let empty = ctx
                .resolver
                .lookup(column, record)
                .map_or(true, CellValue::is_empty);
            if empty && policy.exclude_when_empty(column) {
                debug!(
                    "row {} swept out: empty cell in '{column}'",
                    record.row_index()
                );
                return false;
            }
        }
        true
    }

    fn eval_group(
        &self,
        record: &PatientRecord,
        group: &FilterGroup,
        ctx: &FilterContext<'_>,
        policy: &MissingDataPolicy<'_>,
    ) -> bool {
        let combined = if group.children.is_empty() {
            // A no-op group never excludes.
            true
        } else {
            match group.logic {
                GroupLogic::And => group
                    .children
                    .iter()
                    .all(|child| self.eval_node(record, child, ctx, policy)),
                GroupLogic::Or => group
                    .children
                    .iter()
                    .any(|child| self.eval_node(record, child, ctx, policy)),
            }
        };
        if group.negate { !combined } else { combined }
    }

    fn eval_node(
        &self,
        record: &PatientRecord,
        node: &FilterNode,
        ctx: &FilterContext<'_>,
        policy: &MissingDataPolicy<'_>,
    ) -> bool {
        match node {
            FilterNode::Group(group) => self.eval_group(record, group, ctx, policy),
            FilterNode::Rule(rule) => self.eval_rule(record, rule, ctx, policy),
        }
    }

    fn eval_rule(
        &self,
        record: &PatientRecord,
        rule: &FilterRule,
        ctx: &FilterContext<'_>,
        policy: &MissingDataPolicy<'_>,
    ) -> bool {
        let key = ctx.resolver.resolve(&rule.field, record);
        let cell = record.get(key).filter(|c| !c.is_empty());

        match &rule.op {
            // Emptiness is the predicate outcome itself; the missing-data
            // policy is bypassed.
            FilterOp::IsEmpty => return cell.is_none(),
            FilterOp::IsNotEmpty => return cell.is_some(),
            // Membership reads the cohort index, not the cell.
            FilterOp::InCohort | FilterOp::NotInCohort => {
                return self.eval_membership(record, rule, ctx);
            }
            _ => {}
        }

        let Some(cell) = cell else {
            // Comparison operators can never be satisfied by an absent
            // value; the three-tier policy decides instead.
            return policy.include_missing(key, rule.include_missing_data);
        };

        self.eval_predicate(cell, rule, ctx.schema.get_ci(key))
    }

    fn eval_predicate(
        &self,
        cell: &CellValue,
        rule: &FilterRule,
        column_type: Option<ColumnType>,
    ) -> bool {
        let op = &rule.op;
        if op.is_date() {
            return datetime::compare_dates(op, cell, &rule.value, rule.value2.as_ref());
        }
        let numeric_equality = column_type == Some(ColumnType::Number)
            && matches!(op, FilterOp::Equals | FilterOp::NotEquals);
        if op.is_numeric() || numeric_equality {
            return comparison::compare_numeric(op, cell, &rule.value, rule.value2.as_ref());
        }
        match op {
            FilterOp::Equals | FilterOp::NotEquals | FilterOp::Contains => {
                comparison::compare_lexical(op, cell, &rule.value)
            }
            FilterOp::Unknown(name) => {
                warn!(
                    "unknown filter operator '{name}' on field '{}'; rule passes permissively",
                    rule.field
                );
                true
            }
            // Emptiness, membership, numeric, and date operators were all
            // dispatched above.
            _ => true,
        }
    }

    fn eval_membership(
        &self,
        record: &PatientRecord,
        rule: &FilterRule,
        ctx: &FilterContext<'_>,
    ) -> bool {
        let cohort_id = rule.value.to_display_string();
        if cohort_id.is_empty() {
            warn!("membership rule {} names no cohort; passing open", rule.id);
            return true;
        }
        let identity = patient_identity(record, ctx.patient_id_column());
        match ctx.membership.membership(&cohort_id, &identity) {
            Some(member) => {
                if matches!(rule.op, FilterOp::InCohort) {
                    member
                } else {
                    !member
                }
            }
            // Fail-open: absent cohort data must not silently exclude all
            // patients.
            None => {
                warn!("cohort '{cohort_id}' not found; membership passes open");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_model::{ColumnSchema, FilterTreeBuilder, records_from_json};
    use serde_json::json;

    fn schema() -> ColumnSchema {
        [
            ("age", ColumnType::Number),
            ("sex", ColumnType::Categorical),
        ]
        .into_iter()
        .collect()
    }

    fn records(schema: &ColumnSchema) -> Vec<PatientRecord> {
        records_from_json(
            &[
                json!({"age": 45, "sex": "F"}),
                json!({"age": 17, "sex": "M"}),
                json!({"age": null, "sex": "F"}),
            ],
            schema,
        )
    }

    #[test]
    fn empty_group_is_a_noop() {
        let schema = schema();
        let ctx = FilterContext::new(&schema);
        let engine = FilterEngine::new();
        let mut b = FilterTreeBuilder::new();
        let tree = b.group(GroupLogic::And, []);
        for record in records(&schema) {
            assert!(engine.evaluate(&record, &tree, &ctx));
        }
    }

    #[test]
    fn negate_flips_every_outcome() {
        let schema = schema();
        let ctx = FilterContext::new(&schema);
        let engine = FilterEngine::new();
        let mut b = FilterTreeBuilder::new();
        let rule = b.rule("age", FilterOp::Gte, 18);
        let trees = [
            b.group(GroupLogic::And, [rule.clone().into()]),
            b.group(GroupLogic::Or, [rule.into()]),
            b.group(GroupLogic::And, []),
        ];
        for tree in trees {
            let negated = tree.clone().negated();
            for record in records(&schema) {
                assert_eq!(
                    engine.evaluate(&record, &negated, &ctx),
                    !engine.evaluate(&record, &tree, &ctx),
                );
            }
        }
    }

    #[test]
    fn numeric_equality_on_number_columns() {
        let schema = schema();
        let ctx = FilterContext::new(&schema);
        let engine = FilterEngine::new();
        let mut b = FilterTreeBuilder::new();
        // "45.0" as text equals 45 numerically on a number column.
        let rule = b.rule("age", FilterOp::Equals, "45.0");
        let tree = b.group(GroupLogic::And, [rule.into()]);
        let rows = records(&schema);
        assert!(engine.evaluate(&rows[0], &tree, &ctx));
        assert!(!engine.evaluate(&rows[1], &tree, &ctx));
    }

    #[test]
    fn unknown_operator_passes_permissively() {
        let schema = schema();
        let ctx = FilterContext::new(&schema);
        let engine = FilterEngine::new();
        let tree: FilterGroup = serde_json::from_str(
            r#"{"logic": "AND", "rules": [
                {"field": "age", "operator": "fuzzy_match", "value": 99}
            ]}"#,
        )
        .unwrap();
        for record in records(&schema) {
            assert!(engine.evaluate(&record, &tree, &ctx));
        }
    }

    #[test]
    fn rule_level_missing_override_beats_everything() {
        let schema = schema();
        let ctx = FilterContext::builder(&schema).exclude_dirty_data(true).build();
        let engine = FilterEngine::new();
        let mut b = FilterTreeBuilder::new();
        let include = b
            .rule("age", FilterOp::Gte, 18)
            .with_include_missing_data(true);
        let tree = b.group(GroupLogic::And, [include.into()]);

        let rows = records(&schema);
        // Row 2 has a null age; the rule-level override makes the predicate
        // treat it as satisfied.
        assert!(engine.evaluate(&rows[2], &tree, &ctx));
    }

    #[test]
    fn deep_nesting_dispatches_exhaustively() {
        let schema = schema();
        let ctx = FilterContext::new(&schema);
        let engine = FilterEngine::new();
        let mut b = FilterTreeBuilder::new();
        // age >= 18 AND NOT (sex = M OR age > 80)
        let adult = b.rule("age", FilterOp::Gte, 18);
        let male = b.rule("sex", FilterOp::Equals, "M");
        let elderly = b.rule("age", FilterOp::Gt, 80);
        let excluded = b
            .group(GroupLogic::Or, [male.into(), elderly.into()])
            .negated();
        let tree = b.group(GroupLogic::And, [adult.into(), excluded.into()]);

        let rows = records(&schema);
        assert!(engine.evaluate(&rows[0], &tree, &ctx));
        assert!(!engine.evaluate(&rows[1], &tree, &ctx));
    }
}
