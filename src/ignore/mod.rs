//! Ignore rules.
//!
//! Operators use ignore rules to tell move detection that some attribute
//! differences are expected after a refactor (a renamed tag, a regenerated
//! description) and should not count against a pairing.

mod rule;
mod set;

pub use rule::{parse_rule, parse_rules, pattern_matches, IgnoreRule, PatternSegment, TypeSelector};
pub use set::RuleSet;
