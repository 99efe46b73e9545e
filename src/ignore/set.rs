//! Evaluation of a collection of ignore rules.

use tracing::debug;

use crate::error::Result;
use crate::plan::AttributePath;

use super::rule::{parse_rules, IgnoreRule};

/// An ordered collection of ignore rules, evaluated as a logical OR.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<IgnoreRule>,
}

impl RuleSet {
    /// Creates a rule set from parsed rules.
    #[must_use]
    pub const fn new(rules: Vec<IgnoreRule>) -> Self {
        Self { rules }
    }

    /// Parses raw rule strings into a rule set.
    ///
    /// # Errors
    ///
    /// Returns the first invalid rule's error.
    pub fn parse<S: AsRef<str>>(raws: &[S]) -> Result<Self> {
        let rules = parse_rules(raws)?;
        debug!("Parsed {} ignore rules", rules.len());
        Ok(Self::new(rules))
    }

    /// Returns true if any rule covers `path` for `resource_type`.
    #[must_use]
    pub fn is_ignored(&self, resource_type: &str, path: &AttributePath) -> bool {
        self.rules.iter().any(|rule| rule.matches(resource_type, path))
    }

    /// Returns the rules, in the order they were given.
    #[must_use]
    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    /// Returns true if the set holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the rules that cover none of the given (type, path) pairs.
    #[must_use]
    pub fn unused<'a, I>(&self, covered: I) -> Vec<&IgnoreRule>
    where
        I: IntoIterator<Item = (&'a str, &'a AttributePath)>,
    {
        let mut used = vec![false; self.rules.len()];
        for (resource_type, path) in covered {
            for (i, rule) in self.rules.iter().enumerate() {
                if !used[i] && rule.matches(resource_type, path) {
                    used[i] = true;
                }
            }
        }
        self.rules
            .iter()
            .zip(used)
            .filter_map(|(rule, used)| (!used).then_some(rule))
            .collect()
    }
}
