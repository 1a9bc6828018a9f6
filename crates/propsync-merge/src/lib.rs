//! Rule tree merging.
//!
//! A declarative rule set is folded into the remote tree by name-keyed
//! upserts: behaviors, criteria and child rules match on their name, and
//! everything the remote tree holds that the declaration does not mention is
//! left exactly where it was. The merge is structural recursion over node
//! names; nothing here aliases or rewires nodes.

pub mod declared;
pub mod standard;
pub mod tree;

pub use declared::{apply_rules_spec, build_rule, extract_options};
pub use standard::{
    apply_standard_behaviors, fixup_performance_behaviors, origin_options, SURE_ROUTE_PATH,
};
pub use tree::{
    find_behavior_mut, merge_behavior, merge_child_rule, merge_criteria, merge_options,
    merge_variable,
};
