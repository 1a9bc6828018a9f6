use propsync_model::{Behavior, Criteria, OptionBag, Rule, Variable};

// ---------------------------------------------------------------------------
// Name-keyed upserts
// ---------------------------------------------------------------------------

/// Upsert a behavior into `rule`. A same-named behavior has its option bag
/// replaced wholesale; otherwise the behavior is appended, keeping the
/// remote-only entries in their original positions.
pub fn merge_behavior(rule: &mut Rule, behavior: Behavior) {
    if let Some(existing) = rule.behaviors.iter_mut().find(|b| b.name == behavior.name) {
        existing.options = behavior.options;
    } else {
        rule.behaviors.push(behavior);
    }
}

/// Upsert a criteria entry into `rule`; same replacement semantics as
/// [`merge_behavior`].
pub fn merge_criteria(rule: &mut Rule, criteria: Criteria) {
    if let Some(existing) = rule.criteria.iter_mut().find(|c| c.name == criteria.name) {
        existing.options = criteria.options;
    } else {
        rule.criteria.push(criteria);
    }
}

/// Upsert a variable into `rule` by name.
pub fn merge_variable(rule: &mut Rule, variable: Variable) {
    if let Some(existing) = rule.variables.iter_mut().find(|v| v.name == variable.name) {
        *existing = variable;
    } else {
        rule.variables.push(variable);
    }
}

/// Deep-merge extra options into a behavior: individual keys are added or
/// overwritten, untouched keys survive. This is the one merge that is NOT a
/// wholesale replace.
pub fn merge_options(behavior: &mut Behavior, extra: OptionBag) {
    for (key, value) in extra {
        behavior.options.insert(key, value);
    }
}

/// Recursively merge a child rule into `rule`.
///
/// Matching is by name at the current level. On a match the child's
/// behaviors, criteria, variables and grandchildren are merged into the
/// existing node (its comment and match mode are taken from the incoming
/// declaration); with no match the child is appended as a new subtree.
pub fn merge_child_rule(rule: &mut Rule, child: Rule) {
    match rule.children.iter_mut().find(|c| c.name == child.name) {
        Some(existing) => {
            existing.comments = child.comments;
            existing.criteria_match = child.criteria_match;
            for behavior in child.behaviors {
                merge_behavior(existing, behavior);
            }
            for criteria in child.criteria {
                merge_criteria(existing, criteria);
            }
            for variable in child.variables {
                merge_variable(existing, variable);
            }
            for grandchild in child.children {
                merge_child_rule(existing, grandchild);
            }
        }
        None => rule.children.push(child),
    }
}

// ---------------------------------------------------------------------------
// Path lookup
// ---------------------------------------------------------------------------

/// Find a behavior at a fixed path like `/Performance/sureRoute`: every
/// segment but the last names a child rule, the last names the behavior.
/// Matching is case-insensitive, as the remote client does it.
pub fn find_behavior_mut<'a>(root: &'a mut Rule, path: &str) -> Option<&'a mut Behavior> {
    let mut segments: Vec<&str> = path
        .trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let behavior_name = segments.pop()?;

    let mut node = root;
    for segment in segments {
        node = node
            .children
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(segment))?;
    }
    node.behaviors
        .iter_mut()
        .find(|b| b.name.eq_ignore_ascii_case(behavior_name))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
