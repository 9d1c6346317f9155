use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Shows `target_field_id` only while the answer to `source_field_id`
/// equals `required_value` exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VisibilityRule {
    pub target_field_id: String,
    pub source_field_id: String,
    pub required_value: String,
}

impl VisibilityRule {
    pub fn new(
        target_field_id: impl Into<String>,
        source_field_id: impl Into<String>,
        required_value: impl Into<String>,
    ) -> Self {
        Self {
            target_field_id: target_field_id.into(),
            source_field_id: source_field_id.into(),
            required_value: required_value.into(),
        }
    }
}

/// Visibility rules keyed by target field id, at most one per target.
///
/// Serialized as a list ordered by target id. Building from a list keeps the
/// last rule supplied for each target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<VisibilityRule>", into = "Vec<VisibilityRule>")]
pub struct RuleSet {
    by_target: BTreeMap<String, VisibilityRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `rule`, returning the rule it replaced for the same target.
    pub fn insert(&mut self, rule: VisibilityRule) -> Option<VisibilityRule> {
        self.by_target.insert(rule.target_field_id.clone(), rule)
    }

    pub fn remove(&mut self, target_field_id: &str) -> Option<VisibilityRule> {
        self.by_target.remove(target_field_id)
    }

    pub fn for_target(&self, target_field_id: &str) -> Option<&VisibilityRule> {
        self.by_target.get(target_field_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisibilityRule> {
        self.by_target.values()
    }

    pub fn len(&self) -> usize {
        self.by_target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }
}

impl From<Vec<VisibilityRule>> for RuleSet {
    fn from(rules: Vec<VisibilityRule>) -> Self {
        rules.into_iter().collect()
    }
}

impl From<RuleSet> for Vec<VisibilityRule> {
    fn from(rules: RuleSet) -> Self {
        rules.by_target.into_values().collect()
    }
}

impl FromIterator<VisibilityRule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = VisibilityRule>>(iter: T) -> Self {
        let mut set = RuleSet::new();
        for rule in iter {
            set.insert(rule);
        }
        set
    }
}
