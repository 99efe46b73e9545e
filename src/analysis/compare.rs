//! Comparison of one delete candidate against one create candidate.

use std::sync::Arc;

use crate::ignore::RuleSet;
use crate::plan::Candidate;

use super::diff::{AttributeDiffer, AttributeDifference};

/// The differences between a delete candidate and a create candidate.
#[derive(Debug, Clone)]
pub struct PairDiff {
    /// The destroyed resource.
    pub delete: Arc<Candidate>,
    /// The created resource.
    pub create: Arc<Candidate>,
    /// Every difference found, in path order.
    pub differences: Vec<AttributeDifference>,
    /// Number of differences not covered by an ignore rule.
    pub unresolved: usize,
}

/// Produces the [`PairDiff`] of two candidates.
///
/// Implementations must be pure: the solver may call them from several
/// threads and in any order.
pub trait PairDiffer: Sync {
    /// Compares a delete candidate with a create candidate.
    fn diff_pair(&self, delete: &Arc<Candidate>, create: &Arc<Candidate>) -> PairDiff;
}

/// Attribute diffing followed by ignore rule evaluation.
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    differ: AttributeDiffer,
    rules: RuleSet,
}

impl PairDiff {
    /// Builds a pair diff and counts its unresolved differences.
    #[must_use]
    pub fn new(
        delete: Arc<Candidate>,
        create: Arc<Candidate>,
        differences: Vec<AttributeDifference>,
    ) -> Self {
        let unresolved = differences.iter().filter(|d| !d.ignored).count();
        Self {
            delete,
            create,
            differences,
            unresolved,
        }
    }

    /// The pair's score. Lower means more likely the same object.
    #[must_use]
    pub const fn score(&self) -> usize {
        self.unresolved
    }

    /// Combined size of both attribute trees.
    #[must_use]
    pub fn combined_size(&self) -> usize {
        self.delete.size() + self.create.size()
    }

    /// Differences not covered by an ignore rule.
    pub fn unresolved_differences(&self) -> impl Iterator<Item = &AttributeDifference> {
        self.differences.iter().filter(|d| !d.ignored)
    }
}

impl Comparator {
    /// Creates a comparator using the given ignore rules.
    #[must_use]
    pub const fn new(rules: RuleSet) -> Self {
        Self {
            differ: AttributeDiffer::new(),
            rules,
        }
    }

    /// The ignore rules in use.
    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl PairDiffer for Comparator {
    fn diff_pair(&self, delete: &Arc<Candidate>, create: &Arc<Candidate>) -> PairDiff {
        let mut differences =
            self.differ
                .diff(&delete.attributes, &create.attributes, create.unknown.as_ref());

        for difference in &mut differences {
            difference.ignored = self.rules.is_ignored(&create.resource_type, &difference.path);
        }

        PairDiff::new(Arc::clone(delete), Arc::clone(create), differences)
    }
}
