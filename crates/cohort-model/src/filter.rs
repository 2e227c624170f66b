//! Filter trees
//!
//! Inclusion/exclusion logic is a nested boolean tree: groups combine their
//! children with AND/OR (optionally negated), leaves compare one logical
//! field against a value. Trees arrive either from the UI builder here or as
//! JSON fragments from the external criteria-to-formula service, so the
//! serde shape mirrors that wire format (camelCase keys, `rules` children,
//! snake_case operator names).

use crate::value::CellValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a filter node, unique within a tree built through
/// [`FilterTreeBuilder`]. Externally produced trees may violate uniqueness;
/// the engine never keys evaluation on IDs, so duplicates degrade nothing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Boolean connective of a [`FilterGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupLogic {
    And,
    Or,
}

/// Leaf predicate operator.
///
/// Unrecognized operator strings deserialize to [`FilterOp::Unknown`] rather
/// than failing the whole tree; the evaluator treats them permissively and
/// the engine exposes them as a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOp {
    Equals,
    NotEquals,
    Contains,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
    IsEmpty,
    IsNotEmpty,
    OnDate,
    Before,
    After,
    OnOrBefore,
    OnOrAfter,
    BetweenDates,
    InCohort,
    NotInCohort,
    /// Operator string this crate does not recognize, kept verbatim.
    Unknown(String),
}

impl FilterOp {
    /// Wire-format name of the operator.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Between => "between",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
            Self::OnDate => "on_date",
            Self::Before => "before",
            Self::After => "after",
            Self::OnOrBefore => "on_or_before",
            Self::OnOrAfter => "on_or_after",
            Self::BetweenDates => "between_dates",
            Self::InCohort => "in_cohort",
            Self::NotInCohort => "not_in_cohort",
            Self::Unknown(s) => s,
        }
    }

    /// Operators that compare numerically regardless of column type.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Gt | Self::Gte | Self::Lt | Self::Lte | Self::Between
        )
    }

    /// Date-comparison operators.
    pub fn is_date(&self) -> bool {
        matches!(
            self,
            Self::OnDate
                | Self::Before
                | Self::After
                | Self::OnOrBefore
                | Self::OnOrAfter
                | Self::BetweenDates
        )
    }

    /// Cross-cohort membership operators; `field` on such rules names no
    /// dataset column.
    pub fn is_membership(&self) -> bool {
        matches!(self, Self::InCohort | Self::NotInCohort)
    }

    /// Emptiness operators, which evaluate emptiness directly and bypass the
    /// missing-data policy.
    pub fn is_emptiness(&self) -> bool {
        matches!(self, Self::IsEmpty | Self::IsNotEmpty)
    }

    /// Range operators requiring `value2`.
    pub fn requires_second_value(&self) -> bool {
        matches!(self, Self::Between | Self::BetweenDates)
    }
}

impl From<String> for FilterOp {
    fn from(s: String) -> Self {
        match s.as_str() {
            "equals" => Self::Equals,
            "not_equals" => Self::NotEquals,
            "contains" => Self::Contains,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "between" => Self::Between,
            "is_empty" => Self::IsEmpty,
            "is_not_empty" => Self::IsNotEmpty,
            "on_date" => Self::OnDate,
            "before" => Self::Before,
            "after" => Self::After,
            "on_or_before" => Self::OnOrBefore,
            "on_or_after" => Self::OnOrAfter,
            "between_dates" => Self::BetweenDates,
            "in_cohort" => Self::InCohort,
            "not_in_cohort" => Self::NotInCohort,
            _ => Self::Unknown(s),
        }
    }
}

impl From<FilterOp> for String {
    fn from(op: FilterOp) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaf rule: one predicate over one logical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRule {
    #[serde(default)]
    pub id: NodeId,
    /// Logical field name, resolved to an actual record key at evaluation
    /// time (column mappings, then case-insensitive match).
    pub field: String,
    #[serde(rename = "operator")]
    pub op: FilterOp,
    /// Comparison value; for membership operators, the referenced cohort ID.
    /// Ignored by `is_empty`/`is_not_empty`.
    #[serde(default)]
    pub value: CellValue,
    /// Upper bound for `between`/`between_dates`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<CellValue>,
    /// Rule-level missing-data override, the highest-precedence tier of the
    /// policy: `Some(true)` treats a missing value as satisfying this rule,
    /// `Some(false)` as failing it, `None` defers to column/global policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_missing_data: Option<bool>,
}

impl FilterRule {
    /// Set the upper bound for a range rule.
    pub fn with_value2(mut self, value2: impl Into<CellValue>) -> Self {
        self.value2 = Some(value2.into());
        self
    }

    /// Set the rule-level missing-data override.
    pub fn with_include_missing_data(mut self, include: bool) -> Self {
        self.include_missing_data = Some(include);
        self
    }
}

/// Internal node: children combined with AND/OR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterGroup {
    #[serde(default)]
    pub id: NodeId,
    pub logic: GroupLogic,
    #[serde(rename = "rules", default)]
    pub children: Vec<FilterNode>,
    /// Flip the combined result of this group.
    #[serde(default)]
    pub negate: bool,
    /// Global missing-data policy; meaningful only on the root group. When
    /// set, rows with an empty cell in any declared column are swept out
    /// before tree evaluation.
    #[serde(default)]
    pub exclude_dirty_data: bool,
}

impl FilterGroup {
    /// Mark this group as negated.
    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    /// Set the global dirty-data flag (root groups only).
    pub fn with_exclude_dirty_data(mut self, exclude: bool) -> Self {
        self.exclude_dirty_data = exclude;
        self
    }

    /// Visit every leaf rule in the subtree, depth-first in child order.
    pub fn walk_rules<'a>(&'a self, visit: &mut impl FnMut(&'a FilterRule)) {
        for child in &self.children {
            match child {
                FilterNode::Rule(rule) => visit(rule),
                FilterNode::Group(group) => group.walk_rules(visit),
            }
        }
    }
}

/// A node of the filter tree: either a nested group or a leaf rule.
///
/// Untagged on the wire; groups are recognized by their `logic` key, rules by
/// `field`/`operator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    Group(FilterGroup),
    Rule(FilterRule),
}

impl FilterNode {
    pub fn as_group(&self) -> Option<&FilterGroup> {
        match self {
            Self::Group(g) => Some(g),
            Self::Rule(_) => None,
        }
    }

    pub fn as_rule(&self) -> Option<&FilterRule> {
        match self {
            Self::Rule(r) => Some(r),
            Self::Group(_) => None,
        }
    }
}

impl From<FilterGroup> for FilterNode {
    fn from(group: FilterGroup) -> Self {
        Self::Group(group)
    }
}

impl From<FilterRule> for FilterNode {
    fn from(rule: FilterRule) -> Self {
        Self::Rule(rule)
    }
}

/// The single authoritative constructor for filter trees.
///
/// IDs are allocated from a per-builder counter, so every node built through
/// one builder carries a distinct ID and no defensive dedup scan is needed at
/// evaluation time. Externally deserialized trees can be normalized with
/// [`FilterTreeBuilder::reassign_ids`].
#[derive(Debug, Default)]
pub struct FilterTreeBuilder {
    next_id: u32,
}

impl FilterTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }

    /// Build a leaf rule.
    pub fn rule(
        &mut self,
        field: impl Into<String>,
        op: FilterOp,
        value: impl Into<CellValue>,
    ) -> FilterRule {
        FilterRule {
            id: self.alloc(),
            field: field.into(),
            op,
            value: value.into(),
            value2: None,
            include_missing_data: None,
        }
    }

    /// Build a group from already-built children.
    pub fn group(
        &mut self,
        logic: GroupLogic,
        children: impl IntoIterator<Item = FilterNode>,
    ) -> FilterGroup {
        FilterGroup {
            id: self.alloc(),
            logic,
            children: children.into_iter().collect(),
            negate: false,
            exclude_dirty_data: false,
        }
    }

    /// Walk an externally produced tree and give every node a fresh unique
    /// ID. Merge logic for AI-generated fragments runs this before handing a
    /// combined tree to the engine.
    pub fn reassign_ids(&mut self, group: &mut FilterGroup) {
        group.id = self.alloc();
        for child in &mut group.children {
            match child {
                FilterNode::Rule(rule) => rule.id = self.alloc(),
                FilterNode::Group(nested) => self.reassign_ids(nested),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_assigns_unique_ids() {
        let mut b = FilterTreeBuilder::new();
        let r1 = b.rule("age", FilterOp::Gte, 18);
        let r2 = b.rule("sex", FilterOp::Equals, "F");
        let inner = b.group(GroupLogic::Or, [r2.clone().into()]);
        let root = b.group(GroupLogic::And, [r1.clone().into(), inner.clone().into()]);

        let mut ids = vec![r1.id, r2.id, inner.id, root.id];
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn deserializes_wire_format_tree() {
        let json = r#"{
            "id": 1,
            "logic": "AND",
            "excludeDirtyData": true,
            "rules": [
                {"id": 2, "field": "age", "operator": "gte", "value": 18},
                {
                    "id": 3,
                    "logic": "OR",
                    "negate": true,
                    "rules": [
                        {"id": 4, "field": "dx_code", "operator": "contains", "value": "C3"}
                    ]
                }
            ]
        }"#;
        let group: FilterGroup = serde_json::from_str(json).unwrap();
        assert_eq!(group.logic, GroupLogic::And);
        assert!(group.exclude_dirty_data);
        assert_eq!(group.children.len(), 2);

        let rule = group.children[0].as_rule().unwrap();
        assert_eq!(rule.op, FilterOp::Gte);
        assert_eq!(rule.value, CellValue::Number(18.0));

        let nested = group.children[1].as_group().unwrap();
        assert!(nested.negate);
        assert_eq!(nested.children.len(), 1);
    }

    #[test]
    fn unknown_operator_survives_deserialization() {
        let json = r#"{"id": 1, "field": "age", "operator": "fuzzy_match", "value": 10}"#;
        let rule: FilterRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.op, FilterOp::Unknown("fuzzy_match".to_string()));
        // And round-trips verbatim.
        let back = serde_json::to_value(&rule).unwrap();
        assert_eq!(back["operator"], "fuzzy_match");
    }

    #[test]
    fn between_serializes_value2() {
        let mut b = FilterTreeBuilder::new();
        let rule = b.rule("age", FilterOp::Between, 18).with_value2(65);
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["value2"], 65.0);
        assert_eq!(json["operator"], "between");
    }

    #[test]
    fn reassign_ids_normalizes_duplicates() {
        let json = r#"{
            "id": 7, "logic": "AND", "rules": [
                {"id": 7, "field": "a", "operator": "equals", "value": 1},
                {"id": 7, "logic": "OR", "rules": [
                    {"id": 7, "field": "b", "operator": "equals", "value": 2}
                ]}
            ]
        }"#;
        let mut group: FilterGroup = serde_json::from_str(json).unwrap();
        FilterTreeBuilder::new().reassign_ids(&mut group);

        let mut ids = vec![group.id, group.children[1].as_group().unwrap().id];
        group.walk_rules(&mut |r| ids.push(r.id));
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn missing_id_defaults_instead_of_failing() {
        let json = r#"{"logic": "OR", "rules": [{"field": "sex", "operator": "equals", "value": "F"}]}"#;
        let group: FilterGroup = serde_json::from_str(json).unwrap();
        assert_eq!(group.id, NodeId(0));
    }
}
