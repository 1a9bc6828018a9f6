use serde::{Deserialize, Serialize};

use crate::options::OptionBag;

// ---------------------------------------------------------------------------
// RuleTree
// ---------------------------------------------------------------------------

/// The full rule tree of one property version: a single root rule (holding
/// the standard behaviors every property carries) plus the rule format the
/// tree was authored against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTree {
    pub rule_format: String,
    #[serde(rename = "rules")]
    pub rule: Rule,
}

impl RuleTree {
    pub fn new(rule_format: impl Into<String>) -> Self {
        Self {
            rule_format: rule_format.into(),
            rule: Rule::new("default"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// How a rule combines its criteria.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    All,
    Any,
}

/// A named node of the rule tree. Behavior and criteria identity within a
/// node is the *name*; merge operations upsert by name and never touch the
/// relative order of entries that were already present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub name: String,
    #[serde(default)]
    pub comments: String,
    #[serde(rename = "criteriaMustSatisfy", default)]
    pub criteria_match: MatchMode,
    #[serde(default)]
    pub criteria: Vec<Criteria>,
    #[serde(default)]
    pub behaviors: Vec<Behavior>,
    #[serde(default)]
    pub children: Vec<Rule>,
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl Rule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comments: String::new(),
            criteria_match: MatchMode::All,
            criteria: Vec::new(),
            behaviors: Vec::new(),
            children: Vec::new(),
            variables: Vec::new(),
        }
    }

    pub fn behavior(&self, name: &str) -> Option<&Behavior> {
        self.behaviors.iter().find(|b| b.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&Rule> {
        self.children.iter().find(|c| c.name == name)
    }
}

// ---------------------------------------------------------------------------
// Behavior / Criteria / Variable
// ---------------------------------------------------------------------------

/// A named, parameterized action applied to matching traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Behavior {
    pub name: String,
    #[serde(default)]
    pub options: OptionBag,
}

impl Behavior {
    pub fn new(name: impl Into<String>, options: OptionBag) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

/// A named, parameterized match condition gating a rule's behaviors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    pub name: String,
    #[serde(default)]
    pub options: OptionBag,
}

impl Criteria {
    pub fn new(name: impl Into<String>, options: OptionBag) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

/// A user variable attached to a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub value: String,
    pub hidden: bool,
    pub sensitive: bool,
}

// ---------------------------------------------------------------------------
// RuleViolation
// ---------------------------------------------------------------------------

/// One structured violation from a rejected rule-tree save. The remote plane
/// may return several of these; they must all be surfaced, never just the
/// first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleViolation {
    #[serde(rename = "type")]
    pub violation_type: String,
    pub title: String,
    pub detail: String,
    pub instance: String,
    #[serde(default)]
    pub behavior_name: String,
}

impl RuleViolation {
    /// The one-line rendering used when violations are aggregated into a
    /// single error message.
    pub fn summary(&self) -> String {
        format!(
            "rule validation error: {} {} {} {} {}",
            self.violation_type, self.title, self.detail, self.instance, self.behavior_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_tree_wire_shape() {
        let tree = RuleTree::new("v2025-02-18");
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["ruleFormat"], "v2025-02-18");
        assert_eq!(json["rules"]["name"], "default");
        assert_eq!(json["rules"]["criteriaMustSatisfy"], "all");
    }

    #[test]
    fn behavior_lookup_is_by_name() {
        let mut rule = Rule::new("default");
        rule.behaviors.push(Behavior::new("origin", OptionBag::new()));
        assert!(rule.behavior("origin").is_some());
        assert!(rule.behavior("cpCode").is_none());
    }
}
