//! Pairing of delete candidates with create candidates.
//!
//! Every (delete, create) pair of the same resource type is scored by its
//! number of unresolved differences. Pairs are then committed greedily,
//! best score first, skipping any pair whose delete or create was already
//! taken. Exact ties are broken by smaller combined attribute tree, then by
//! delete address, then by create address, so identical input always
//! yields identical output.
//!
//! Greedy commitment is not a minimum-cost assignment. Near-zero pairs
//! rarely compete for the same partner, and greedy keeps the result easy
//! to predict.

use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};
use crate::plan::{Candidate, Side};

use super::cancel::CancelToken;
use super::compare::{PairDiff, PairDiffer};

/// A committed pairing of one delete and one create.
#[derive(Debug, Clone)]
pub struct Match {
    /// The destroyed resource.
    pub delete: Arc<Candidate>,
    /// The created resource.
    pub create: Arc<Candidate>,
    /// The differences between them.
    pub diff: PairDiff,
}

/// The result of pairing one plan's candidates.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Matches, in commit order (best first).
    pub matches: Vec<Match>,
    /// Deletes left without a partner, in plan order.
    pub unmatched_deletes: Vec<Arc<Candidate>>,
    /// Creates left without a partner, in plan order.
    pub unmatched_creates: Vec<Arc<Candidate>>,
    /// Every scored pair, in scoring order.
    pub comparisons: Vec<PairDiff>,
}

/// Greedy, deterministic pairing of candidates.
pub struct MatchSolver<'a, D: PairDiffer> {
    differ: &'a D,
    parallel: bool,
    cancel: CancelToken,
}

impl<'a, D: PairDiffer> MatchSolver<'a, D> {
    /// Creates a solver that scores pairs with `differ`.
    #[must_use]
    pub fn new(differ: &'a D) -> Self {
        Self {
            differ,
            parallel: true,
            cancel: CancelToken::new(),
        }
    }

    /// Enables or disables parallel scoring.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the token used to abort the run.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Pairs deletes with creates.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::DuplicateAddress`] if two candidates on the
    /// same side share an address, or [`AnalysisError::Cancelled`] if the
    /// token is cancelled before the run completes.
    pub fn solve(
        &self,
        deletes: &[Arc<Candidate>],
        creates: &[Arc<Candidate>],
    ) -> Result<Analysis> {
        check_unique(deletes, Side::Delete)?;
        check_unique(creates, Side::Create)?;
        self.cancel.check()?;

        let pairs: Vec<(usize, usize)> = deletes
            .iter()
            .enumerate()
            .flat_map(|(d, delete)| {
                creates
                    .iter()
                    .enumerate()
                    .filter(move |(_, create)| create.resource_type == delete.resource_type)
                    .map(move |(c, _)| (d, c))
            })
            .collect();

        info!(
            "Scoring {} eligible pairs ({} deletes, {} creates)",
            pairs.len(),
            deletes.len(),
            creates.len()
        );

        let score = |&(d, c): &(usize, usize)| -> Result<PairDiff> {
            self.cancel.check()?;
            Ok(self.differ.diff_pair(&deletes[d], &creates[c]))
        };

        let comparisons: Vec<PairDiff> = if self.parallel {
            pairs.par_iter().map(score).collect::<Result<_>>()?
        } else {
            pairs.iter().map(score).collect::<Result<_>>()?
        };

        let mut order: Vec<usize> = (0..comparisons.len()).collect();
        order.sort_by(|&a, &b| compare_pairs(&comparisons[a], &comparisons[b]));

        // Scores never change once computed, so one pass over the sorted
        // pairs commits the same pairs as repeatedly taking the minimum.
        let mut delete_taken = vec![false; deletes.len()];
        let mut create_taken = vec![false; creates.len()];
        let mut matches = Vec::new();

        for i in order {
            self.cancel.check()?;
            let (d, c) = pairs[i];
            if delete_taken[d] || create_taken[c] {
                continue;
            }
            delete_taken[d] = true;
            create_taken[c] = true;

            let diff = comparisons[i].clone();
            debug!(
                "Matched {} -> {} (score {})",
                diff.delete.address,
                diff.create.address,
                diff.score()
            );
            matches.push(Match {
                delete: Arc::clone(&diff.delete),
                create: Arc::clone(&diff.create),
                diff,
            });
        }

        let unmatched_deletes = untaken(deletes, &delete_taken);
        let unmatched_creates = untaken(creates, &create_taken);

        info!(
            "Committed {} matches; {} deletes and {} creates unmatched",
            matches.len(),
            unmatched_deletes.len(),
            unmatched_creates.len()
        );

        Ok(Analysis {
            matches,
            unmatched_deletes,
            unmatched_creates,
            comparisons,
        })
    }
}

/// Orders pairs by score, combined size, delete address, create address.
fn compare_pairs(a: &PairDiff, b: &PairDiff) -> Ordering {
    a.score()
        .cmp(&b.score())
        .then_with(|| a.combined_size().cmp(&b.combined_size()))
        .then_with(|| a.delete.address.cmp(&b.delete.address))
        .then_with(|| a.create.address.cmp(&b.create.address))
}

fn check_unique(candidates: &[Arc<Candidate>], side: Side) -> Result<()> {
    let mut seen = HashSet::with_capacity(candidates.len());
    for candidate in candidates {
        if !seen.insert(candidate.address.as_str()) {
            return Err(AnalysisError::DuplicateAddress {
                side: side.to_string(),
                address: candidate.address.clone(),
            }
            .into());
        }
    }
    Ok(())
}

fn untaken(candidates: &[Arc<Candidate>], taken: &[bool]) -> Vec<Arc<Candidate>> {
    candidates
        .iter()
        .zip(taken)
        .filter(|(_, taken)| !**taken)
        .map(|(candidate, _)| Arc::clone(candidate))
        .collect()
}

impl Analysis {
    /// Returns true if no candidates were found at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
            && self.unmatched_deletes.is_empty()
            && self.unmatched_creates.is_empty()
    }

    /// Scored pairs involving the given create, best first.
    #[must_use]
    pub fn comparisons_for_create(&self, address: &str) -> Vec<&PairDiff> {
        let mut found: Vec<&PairDiff> = self
            .comparisons
            .iter()
            .filter(|c| c.create.address == address)
            .collect();
        found.sort_by(|a, b| compare_pairs(a, b));
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::compare::Comparator;
    use crate::ignore::RuleSet;
    use crate::plan::AttributeValue;
    use serde_json::json;
    use std::collections::HashMap;

    fn candidate(
        address: &str,
        resource_type: &str,
        side: Side,
        attributes: serde_json::Value,
    ) -> Arc<Candidate> {
        Arc::new(Candidate {
            address: address.to_string(),
            resource_type: resource_type.to_string(),
            provider_name: String::from("registry.terraform.io/hashicorp/aws"),
            side,
            attributes: AttributeValue::from(attributes),
            unknown: None,
        })
    }

    /// Scores pairs from a fixed table instead of diffing attributes.
    struct TableDiffer {
        scores: HashMap<(String, String), usize>,
    }

    impl PairDiffer for TableDiffer {
        fn diff_pair(&self, delete: &Arc<Candidate>, create: &Arc<Candidate>) -> PairDiff {
            let mut diff = PairDiff::new(Arc::clone(delete), Arc::clone(create), vec![]);
            diff.unresolved = self.scores[&(delete.address.clone(), create.address.clone())];
            diff
        }
    }

    fn addresses(analysis: &Analysis) -> Vec<(String, String)> {
        analysis
            .matches
            .iter()
            .map(|m| (m.delete.address.clone(), m.create.address.clone()))
            .collect()
    }

    #[test]
    fn test_single_pair_with_difference_is_matched() {
        let deletes = vec![candidate(
            "aws_instance.old[\"web\"]",
            "aws_instance",
            Side::Delete,
            json!({"ami": "x", "tags": {"Name": "web"}}),
        )];
        let creates = vec![candidate(
            "aws_instance.new[\"web\"]",
            "aws_instance",
            Side::Create,
            json!({"ami": "x", "tags": {"Name": "web2"}}),
        )];

        let comparator = Comparator::default();
        let analysis = MatchSolver::new(&comparator).solve(&deletes, &creates).unwrap();

        assert_eq!(analysis.matches.len(), 1);
        let m = &analysis.matches[0];
        assert_eq!(m.diff.score(), 1);
        assert_eq!(m.diff.differences[0].path.to_string(), "tags.Name");
        assert!(analysis.unmatched_deletes.is_empty());
        assert!(analysis.unmatched_creates.is_empty());
    }

    #[test]
    fn test_ignore_rule_brings_score_to_zero() {
        let deletes = vec![candidate(
            "aws_instance.old[\"web\"]",
            "aws_instance",
            Side::Delete,
            json!({"ami": "x", "tags": {"Name": "web"}}),
        )];
        let creates = vec![candidate(
            "aws_instance.new[\"web\"]",
            "aws_instance",
            Side::Create,
            json!({"ami": "x", "tags": {"Name": "web2"}}),
        )];

        let comparator = Comparator::new(RuleSet::parse(&["aws_instance.tags.Name"]).unwrap());
        let analysis = MatchSolver::new(&comparator).solve(&deletes, &creates).unwrap();

        assert_eq!(analysis.matches.len(), 1);
        assert_eq!(analysis.matches[0].diff.score(), 0);
        assert!(analysis.matches[0].diff.differences[0].ignored);
    }

    #[test]
    fn test_zero_score_pairs_win_over_cross_combination() {
        let deletes = vec![
            candidate("t.d1", "t", Side::Delete, json!({})),
            candidate("t.d2", "t", Side::Delete, json!({})),
        ];
        let creates = vec![
            candidate("t.c1", "t", Side::Create, json!({})),
            candidate("t.c2", "t", Side::Create, json!({})),
        ];
        let scores = [
            (("t.d1", "t.c1"), 0),
            (("t.d1", "t.c2"), 2),
            (("t.d2", "t.c1"), 1),
            (("t.d2", "t.c2"), 0),
        ]
        .into_iter()
        .map(|((d, c), s)| ((d.to_string(), c.to_string()), s))
        .collect();
        let differ = TableDiffer { scores };

        let analysis = MatchSolver::new(&differ).solve(&deletes, &creates).unwrap();
        assert_eq!(
            addresses(&analysis),
            vec![
                (String::from("t.d1"), String::from("t.c1")),
                (String::from("t.d2"), String::from("t.c2")),
            ]
        );
        assert_eq!(analysis.comparisons.len(), 4);
    }

    #[test]
    fn test_greedy_takes_lowest_score_first() {
        let deletes = vec![
            candidate("t.d1", "t", Side::Delete, json!({})),
            candidate("t.d2", "t", Side::Delete, json!({})),
        ];
        let creates = vec![candidate("t.c1", "t", Side::Create, json!({}))];
        let scores = [(("t.d1", "t.c1"), 3), (("t.d2", "t.c1"), 1)]
            .into_iter()
            .map(|((d, c), s)| ((d.to_string(), c.to_string()), s))
            .collect();
        let differ = TableDiffer { scores };

        let analysis = MatchSolver::new(&differ).solve(&deletes, &creates).unwrap();
        assert_eq!(
            addresses(&analysis),
            vec![(String::from("t.d2"), String::from("t.c1"))]
        );
        assert_eq!(analysis.unmatched_deletes.len(), 1);
        assert_eq!(analysis.unmatched_deletes[0].address, "t.d1");
    }

    #[test]
    fn test_different_types_never_matched() {
        let deletes = vec![candidate("aws_instance.a", "aws_instance", Side::Delete, json!({"x": 1}))];
        let creates = vec![candidate("aws_eip.a", "aws_eip", Side::Create, json!({"x": 1}))];

        let comparator = Comparator::default();
        let analysis = MatchSolver::new(&comparator).solve(&deletes, &creates).unwrap();

        assert!(analysis.matches.is_empty());
        assert!(analysis.comparisons.is_empty());
        assert_eq!(analysis.unmatched_deletes.len(), 1);
        assert_eq!(analysis.unmatched_creates.len(), 1);
    }

    #[test]
    fn test_ties_broken_by_size_then_address() {
        let deletes = vec![
            candidate("t.b", "t", Side::Delete, json!({"k": "v"})),
            candidate("t.a", "t", Side::Delete, json!({"k": "v"})),
            candidate("t.small", "t", Side::Delete, json!({})),
        ];
        let creates = vec![candidate("t.c", "t", Side::Create, json!({}))];
        let scores = [(("t.b", "t.c"), 0), (("t.a", "t.c"), 0), (("t.small", "t.c"), 0)]
            .into_iter()
            .map(|((d, c), s)| ((d.to_string(), c.to_string()), s))
            .collect();
        let differ = TableDiffer { scores };

        let analysis = MatchSolver::new(&differ).solve(&deletes, &creates).unwrap();
        assert_eq!(analysis.matches[0].delete.address, "t.small");

        let analysis = MatchSolver::new(&differ)
            .solve(&deletes[..2], &creates)
            .unwrap();
        assert_eq!(analysis.matches[0].delete.address, "t.a");
    }

    #[test]
    fn test_each_candidate_matched_at_most_once() {
        let deletes: Vec<_> = (0..6)
            .map(|i| {
                candidate(
                    &format!("t.d{i}"),
                    "t",
                    Side::Delete,
                    json!({"n": i % 3, "z": "same"}),
                )
            })
            .collect();
        let creates: Vec<_> = (0..4)
            .map(|i| candidate(&format!("t.c{i}"), "t", Side::Create, json!({"n": i % 2})))
            .collect();

        let comparator = Comparator::default();
        let analysis = MatchSolver::new(&comparator).solve(&deletes, &creates).unwrap();

        let mut seen_deletes = HashSet::new();
        let mut seen_creates = HashSet::new();
        for m in &analysis.matches {
            assert!(seen_deletes.insert(m.delete.address.clone()));
            assert!(seen_creates.insert(m.create.address.clone()));
            assert_eq!(m.delete.resource_type, m.create.resource_type);
        }
        assert_eq!(analysis.matches.len(), 4);
        assert_eq!(
            analysis.matches.len() + analysis.unmatched_deletes.len(),
            deletes.len()
        );
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let deletes: Vec<_> = (0..8)
            .map(|i| candidate(&format!("t.d{i}"), "t", Side::Delete, json!({"n": i, "m": i % 2})))
            .collect();
        let creates: Vec<_> = (0..8)
            .map(|i| candidate(&format!("t.c{i}"), "t", Side::Create, json!({"n": 7 - i, "m": 0})))
            .collect();

        let comparator = Comparator::default();
        let parallel = MatchSolver::new(&comparator).solve(&deletes, &creates).unwrap();
        let sequential = MatchSolver::new(&comparator)
            .with_parallel(false)
            .solve(&deletes, &creates)
            .unwrap();
        let again = MatchSolver::new(&comparator).solve(&deletes, &creates).unwrap();

        assert_eq!(addresses(&parallel), addresses(&sequential));
        assert_eq!(addresses(&parallel), addresses(&again));
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let deletes = vec![
            candidate("t.a", "t", Side::Delete, json!({})),
            candidate("t.a", "t", Side::Delete, json!({})),
        ];

        let comparator = Comparator::default();
        let err = MatchSolver::new(&comparator).solve(&deletes, &[]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AutomvError::Analysis(AnalysisError::DuplicateAddress { .. })
        ));
    }

    #[test]
    fn test_cancelled_token_aborts() {
        let deletes = vec![candidate("t.a", "t", Side::Delete, json!({}))];
        let creates = vec![candidate("t.b", "t", Side::Create, json!({}))];

        let token = CancelToken::new();
        token.cancel();

        let comparator = Comparator::default();
        let err = MatchSolver::new(&comparator)
            .with_cancel_token(token)
            .solve(&deletes, &creates)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::AutomvError::Analysis(AnalysisError::Cancelled)
        ));
    }

    #[test]
    fn test_comparisons_for_create() {
        let deletes = vec![
            candidate("t.far", "t", Side::Delete, json!({"a": 1, "b": 2})),
            candidate("t.near", "t", Side::Delete, json!({"a": 1, "b": 3})),
        ];
        let creates = vec![candidate("t.c", "t", Side::Create, json!({"a": 1, "b": 3}))];

        let comparator = Comparator::default();
        let analysis = MatchSolver::new(&comparator).solve(&deletes, &creates).unwrap();
        let found = analysis.comparisons_for_create("t.c");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].delete.address, "t.near");
        assert_eq!(found[1].delete.address, "t.far");
    }
}
