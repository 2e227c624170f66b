//! Missing-data policy resolution
//!
//! Clinical datasets have pervasive partial columns, so a single global
//! switch is too coarse. The policy composes three tiers, highest wins:
//! an explicit rule-level override, a per-column override supplied alongside
//! the filter tree, then the global `exclude_dirty_data` flag on the root.

use cohort_model::NullPolicyOverrides;

/// Resolved missing-data policy for one evaluation pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingDataPolicy<'a> {
    overrides: Option<&'a NullPolicyOverrides>,
    exclude_dirty_data: bool,
}

impl<'a> MissingDataPolicy<'a> {
    pub fn new(overrides: Option<&'a NullPolicyOverrides>, exclude_dirty_data: bool) -> Self {
        Self {
            overrides,
            exclude_dirty_data,
        }
    }

    /// Fold the root group's `exclude_dirty_data` flag into the policy; the
    /// caller-supplied flag and the flag on the tree are equivalent inputs.
    pub fn or_global(self, exclude_dirty_data: bool) -> Self {
        Self {
            exclude_dirty_data: self.exclude_dirty_data || exclude_dirty_data,
            ..self
        }
    }

    /// Whether a missing value in `column` satisfies a predicate.
    ///
    /// `rule_setting` is the rule-level `include_missing_data` override and
    /// always wins. Below it, a column-level force-exclude rejects the
    /// predicate outright; a column-level force-include only spares the row
    /// from the sweep and never satisfies a comparison on a value that is
    /// not there, so it falls through to the global flag. Emptiness
    /// operators never consult this: for them, emptiness is the predicate
    /// outcome itself.
    pub fn include_missing(&self, column: &str, rule_setting: Option<bool>) -> bool {
        if let Some(include) = rule_setting {
            return include;
        }
        if self.overrides.and_then(|o| o.get(column)) == Some(false) {
            return false;
        }
        !self.exclude_dirty_data
    }

    /// Whether an empty cell in `column` disqualifies the whole row during
    /// the pre-filter sweep. Rule-level overrides do not participate here.
    pub fn exclude_when_empty(&self, column: &str) -> bool {
        match self.overrides.and_then(|o| o.get(column)) {
            Some(include) => !include,
            None => self.exclude_dirty_data,
        }
    }

    /// The sweep runs only when it can have an effect.
    pub fn sweep_active(&self) -> bool {
        self.exclude_dirty_data || self.overrides.is_some_and(|o| !o.is_empty())
    }
}
