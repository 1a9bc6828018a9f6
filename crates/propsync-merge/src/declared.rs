//! Application of the declared rule set onto a remote tree.

use propsync_model::{
    normalize, normalize_values, Behavior, BehaviorSpec, Criteria, CriteriaSpec, OptionBag,
    OptionSpec, Rule, RuleSpec, RulesSpec, Variable,
};

use crate::tree::{merge_behavior, merge_child_rule, merge_criteria};

// ---------------------------------------------------------------------------
// Option extraction
// ---------------------------------------------------------------------------

/// Build an option bag from declared option entries, recovering each value's
/// type through the normalizer. A non-empty `values` list wins over the
/// single `value`.
pub fn extract_options(options: &[OptionSpec]) -> OptionBag {
    let mut bag = OptionBag::new();
    for option in options {
        if !option.values.is_empty() {
            bag.insert(option.key.clone(), normalize_values(&option.values));
        } else {
            bag.insert(option.key.clone(), normalize(&option.value));
        }
    }
    bag
}

fn behavior_from_spec(spec: &BehaviorSpec) -> Behavior {
    Behavior::new(spec.name.clone(), extract_options(&spec.options))
}

fn criteria_from_spec(spec: &CriteriaSpec) -> Criteria {
    Criteria::new(spec.name.clone(), extract_options(&spec.options))
}

// ---------------------------------------------------------------------------
// Rule construction
// ---------------------------------------------------------------------------

/// Build an owned rule subtree from one declared rule, normalizing every
/// option along the way. Children are folded in through the same name-keyed
/// merge the remote tree gets, so duplicate names inside one declaration
/// collapse rather than duplicate.
pub fn build_rule(spec: &RuleSpec) -> Rule {
    let mut rule = Rule::new(spec.name.clone());
    rule.comments = spec.comment.clone();
    rule.criteria_match = spec.criteria_match;
    for behavior in &spec.behaviors {
        merge_behavior(&mut rule, behavior_from_spec(behavior));
    }
    for criteria in &spec.criteria {
        merge_criteria(&mut rule, criteria_from_spec(criteria));
    }
    for variable in &spec.variables {
        rule.variables.push(Variable {
            name: variable.name.clone(),
            description: variable.description.clone(),
            value: variable.value.clone(),
            hidden: variable.hidden,
            sensitive: variable.sensitive,
        });
    }
    for child in &spec.children {
        merge_child_rule(&mut rule, build_rule(child));
    }
    rule
}

/// Merge the declared rule set into the root rule: root-level behaviors and
/// criteria upsert directly into the root, child rules merge recursively.
pub fn apply_rules_spec(root: &mut Rule, rules: &RulesSpec) {
    for behavior in &rules.behaviors {
        merge_behavior(root, behavior_from_spec(behavior));
    }
    for criteria in &rules.criteria {
        merge_criteria(root, criteria_from_spec(criteria));
    }
    for child in &rules.children {
        merge_child_rule(root, build_rule(child));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
