//! End-to-end analysis of a plan.

use tracing::{info, warn};

use crate::error::Result;
use crate::ignore::{IgnoreRule, RuleSet};
use crate::plan::{extract_candidates, Plan};

use super::cancel::CancelToken;
use super::compare::Comparator;
use super::solver::{Analysis, MatchSolver};

/// Runs extraction, scoring and matching over one plan.
#[derive(Debug, Clone)]
pub struct Analyzer {
    comparator: Comparator,
    parallel: bool,
    cancel: CancelToken,
}

impl Analyzer {
    /// Creates an analyzer using the given ignore rules.
    #[must_use]
    pub fn new(rules: RuleSet) -> Self {
        Self {
            comparator: Comparator::new(rules),
            parallel: true,
            cancel: CancelToken::new(),
        }
    }

    /// Enables or disables parallel pair scoring.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the token used to abort the analysis.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Analyzes a plan.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan is malformed, contains duplicate
    /// candidate addresses, or the analysis is cancelled.
    pub fn analyze(&self, plan: &Plan) -> Result<Analysis> {
        self.cancel.check()?;

        let candidates = extract_candidates(plan)?;
        info!(
            "Found {} resources to destroy and {} to create",
            candidates.deletes.len(),
            candidates.creates.len()
        );

        let analysis = MatchSolver::new(&self.comparator)
            .with_parallel(self.parallel)
            .with_cancel_token(self.cancel.clone())
            .solve(&candidates.deletes, &candidates.creates)?;

        self.warn_unused_rules(&analysis);

        Ok(analysis)
    }

    fn warn_unused_rules(&self, analysis: &Analysis) {
        let rules = self.comparator.rules();
        if rules.is_empty() {
            return;
        }

        let covered = analysis.comparisons.iter().flat_map(|pair| {
            pair.differences
                .iter()
                .filter(|d| d.ignored)
                .map(move |d| (pair.create.resource_type.as_str(), &d.path))
        });

        for rule in rules.unused(covered) {
            warn!("Ignore rule {:?} did not match any difference", rule.as_str());
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}

/// Analyzes a plan with the given rules, using default settings.
///
/// # Errors
///
/// See [`Analyzer::analyze`].
pub fn analysis_from_plan(plan: &Plan, rules: &[IgnoreRule]) -> Result<Analysis> {
    Analyzer::new(RuleSet::new(rules.to_vec())).analyze(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::moves::moves_from_analysis;
    use crate::ignore::parse_rule;
    use serde_json::json;

    fn plan(changes: serde_json::Value) -> Plan {
        serde_json::from_value(json!({ "resource_changes": changes })).unwrap()
    }

    fn entry(
        address: &str,
        resource_type: &str,
        action: &str,
        attributes: serde_json::Value,
    ) -> serde_json::Value {
        let (before, after) = if action == "delete" {
            (attributes, json!(null))
        } else {
            (json!(null), attributes)
        };
        json!({
            "address": address,
            "mode": "managed",
            "type": resource_type,
            "provider_name": "registry.terraform.io/hashicorp/aws",
            "change": {"actions": [action], "before": before, "after": after}
        })
    }

    fn rename_plan() -> Plan {
        plan(json!([
            entry(
                "aws_instance.old[\"web\"]",
                "aws_instance",
                "delete",
                json!({"ami": "x", "tags": {"Name": "web"}})
            ),
            entry(
                "aws_instance.new[\"web\"]",
                "aws_instance",
                "create",
                json!({"ami": "x", "tags": {"Name": "web2"}})
            ),
        ]))
    }

    #[test]
    fn test_rename_without_rules() {
        let analysis = analysis_from_plan(&rename_plan(), &[]).unwrap();

        assert_eq!(analysis.matches.len(), 1);
        assert_eq!(analysis.matches[0].diff.score(), 1);

        let moves = moves_from_analysis(&analysis);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].from, "aws_instance.old[\"web\"]");
        assert_eq!(moves[0].to, "aws_instance.new[\"web\"]");
    }

    #[test]
    fn test_rename_with_rule() {
        let rules = vec![parse_rule("aws_instance.tags.Name").unwrap()];
        let analysis = analysis_from_plan(&rename_plan(), &rules).unwrap();

        assert_eq!(analysis.matches[0].diff.score(), 0);

        let without = analysis_from_plan(&rename_plan(), &[]).unwrap();
        assert_eq!(moves_from_analysis(&analysis), moves_from_analysis(&without));
    }

    #[test]
    fn test_type_change_is_not_a_move() {
        let analysis = analysis_from_plan(
            &plan(json!([
                entry("aws_instance.a", "aws_instance", "delete", json!({"x": 1})),
                entry("aws_spot_instance.a", "aws_spot_instance", "create", json!({"x": 1})),
            ])),
            &[],
        )
        .unwrap();

        assert!(moves_from_analysis(&analysis).is_empty());
        assert_eq!(analysis.unmatched_deletes.len(), 1);
        assert_eq!(analysis.unmatched_creates.len(), 1);
    }

    #[test]
    fn test_replace_is_not_a_move() {
        let analysis = analysis_from_plan(
            &plan(json!([{
                "address": "aws_instance.web",
                "type": "aws_instance",
                "change": {
                    "actions": ["delete", "create"],
                    "before": {"ami": "x"},
                    "after": {"ami": "y"}
                }
            }])),
            &[],
        )
        .unwrap();

        assert!(analysis.is_empty());
        assert!(moves_from_analysis(&analysis).is_empty());
    }

    #[test]
    fn test_deposed_object_is_not_moved() {
        let mut deposed = entry("aws_instance.a", "aws_instance", "delete", json!({"ami": "x"}));
        deposed["deposed"] = json!("a1b2c3d4");
        let analysis = analysis_from_plan(
            &plan(json!([
                deposed,
                entry("aws_instance.b", "aws_instance", "create", json!({"ami": "x"})),
            ])),
            &[],
        )
        .unwrap();

        assert!(moves_from_analysis(&analysis).is_empty());
        assert!(analysis.unmatched_deletes.is_empty());
        assert_eq!(analysis.unmatched_creates.len(), 1);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let changes = json!([
            entry("aws_instance.a", "aws_instance", "delete", json!({"ami": "1"})),
            entry("aws_instance.b", "aws_instance", "delete", json!({"ami": "2"})),
            entry("aws_instance.c", "aws_instance", "delete", json!({"ami": "1"})),
            entry("aws_instance.x", "aws_instance", "create", json!({"ami": "2"})),
            entry("aws_instance.y", "aws_instance", "create", json!({"ami": "1"})),
        ]);

        let first = analysis_from_plan(&plan(changes.clone()), &[]).unwrap();
        let second = analysis_from_plan(&plan(changes), &[]).unwrap();

        assert_eq!(moves_from_analysis(&first), moves_from_analysis(&second));
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(first.matches.len(), 2);
        assert_eq!(first.unmatched_deletes[0].address, "aws_instance.c");
    }

    #[test]
    fn test_malformed_plan_produces_no_analysis() {
        let result = analysis_from_plan(
            &plan(json!([
                entry("aws_instance.a", "aws_instance", "delete", json!({"x": 1})),
                {"address": "aws_instance.b", "type": "aws_instance",
                 "change": {"actions": ["create"]}},
            ])),
            &[],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancelToken::new();
        token.cancel();
        let result = Analyzer::default()
            .with_cancel_token(token)
            .analyze(&rename_plan());
        assert!(result.is_err());
    }
}
