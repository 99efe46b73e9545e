//! Extraction of destroy and create candidates from a plan.
//!
//! Only pure creations and pure destructions can be halves of a rename.
//! Replacements at an unchanged address, updates, reads and no-ops are
//! dropped. Plan order is preserved so that later tie-breaking is stable.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::error::{PlanError, Result};

use super::types::{ChangeKind, Plan, ResourceChange};
use super::value::AttributeValue;

/// Which half of a destroy/create pair a candidate is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The resource is being destroyed.
    Delete,
    /// The resource is being created.
    Create,
}

/// One side of a resource change considered for matching.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Resource instance address.
    pub address: String,
    /// Resource type.
    pub resource_type: String,
    /// Provider that manages the resource.
    pub provider_name: String,
    /// Destroy or create.
    pub side: Side,
    /// Before-tree for deletes, after-tree for creates.
    pub attributes: AttributeValue,
    /// For creates, the mask of values only known after apply.
    pub unknown: Option<AttributeValue>,
}

/// Ordered candidate lists extracted from one plan.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    /// Delete candidates, in plan order.
    pub deletes: Vec<Arc<Candidate>>,
    /// Create candidates, in plan order.
    pub creates: Vec<Arc<Candidate>>,
}

/// Extracts delete and create candidates from a plan.
///
/// # Errors
///
/// Returns [`PlanError::Malformed`] if an entry lacks its address or type,
/// carries an action set the planner never produces, or is missing the
/// attribute tree its actions require.
pub fn extract_candidates(plan: &Plan) -> Result<Candidates> {
    let mut classified = Vec::with_capacity(plan.resource_changes.len());
    for rc in &plan.resource_changes {
        classified.push((rc, validate_entry(rc)?));
    }

    // A create and a delete reported separately at one address is still a
    // replacement.
    let created: HashSet<&str> = classified
        .iter()
        .filter(|(rc, kind)| *kind == ChangeKind::Create && !rc.is_deposed())
        .map(|(rc, _)| rc.address.as_str())
        .collect();
    let deleted: HashSet<&str> = classified
        .iter()
        .filter(|(rc, kind)| *kind == ChangeKind::Delete && !rc.is_deposed())
        .map(|(rc, _)| rc.address.as_str())
        .collect();

    let mut candidates = Candidates::default();

    for (rc, kind) in classified {
        if rc.is_data_source() {
            debug!("Skipping data source {}", rc.address);
            continue;
        }
        if let Some(key) = &rc.deposed {
            debug!("Skipping deposed object {} of {}", key, rc.address);
            continue;
        }

        match kind {
            ChangeKind::Create if !deleted.contains(rc.address.as_str()) => {
                let attributes = rc.change.after.clone().map(AttributeValue::from);
                let unknown = rc
                    .change
                    .after_unknown
                    .clone()
                    .map(AttributeValue::from)
                    .filter(|mask| !matches!(mask, AttributeValue::Scalar(_)) || mask.is_true());
                candidates.creates.push(Arc::new(Candidate {
                    address: rc.address.clone(),
                    resource_type: rc.resource_type.clone(),
                    provider_name: rc.provider_name.clone(),
                    side: Side::Create,
                    attributes: attributes.unwrap_or_else(AttributeValue::null),
                    unknown,
                }));
            }
            ChangeKind::Delete if !created.contains(rc.address.as_str()) => {
                let attributes = rc.change.before.clone().map(AttributeValue::from);
                candidates.deletes.push(Arc::new(Candidate {
                    address: rc.address.clone(),
                    resource_type: rc.resource_type.clone(),
                    provider_name: rc.provider_name.clone(),
                    side: Side::Delete,
                    attributes: attributes.unwrap_or_else(AttributeValue::null),
                    unknown: None,
                }));
            }
            ChangeKind::Create | ChangeKind::Delete | ChangeKind::Replace => {
                debug!("Skipping in-place replacement of {}", rc.address);
            }
            ChangeKind::Other => {}
        }
    }

    debug!(
        "Extracted {} delete and {} create candidates",
        candidates.deletes.len(),
        candidates.creates.len()
    );

    Ok(candidates)
}

/// Checks one entry's identity and action/attribute consistency.
fn validate_entry(rc: &ResourceChange) -> Result<ChangeKind> {
    if rc.address.is_empty() {
        return Err(PlanError::malformed("", "missing address").into());
    }
    if rc.resource_type.is_empty() {
        return Err(PlanError::malformed(&rc.address, "missing resource type").into());
    }

    let kind = ChangeKind::classify(&rc.change.actions).ok_or_else(|| {
        let actions: Vec<String> = rc.change.actions.iter().map(ToString::to_string).collect();
        PlanError::malformed(
            &rc.address,
            format!("unsupported action set [{}]", actions.join(", ")),
        )
    })?;

    let missing = match kind {
        ChangeKind::Create if rc.change.after.is_none() => Some("create without an after value"),
        ChangeKind::Delete if rc.change.before.is_none() => Some("delete without a before value"),
        ChangeKind::Delete if rc.change.after.is_some() => Some("delete with an after value"),
        ChangeKind::Replace if rc.change.before.is_none() || rc.change.after.is_none() => {
            Some("replace without both before and after values")
        }
        _ => None,
    };

    match missing {
        Some(reason) => Err(PlanError::malformed(&rc.address, reason).into()),
        None => Ok(kind),
    }
}

impl Candidate {
    /// Number of nodes in the candidate's attribute tree.
    #[must_use]
    pub fn size(&self) -> usize {
        self.attributes.size()
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Delete => "delete",
            Self::Create => "create",
        };
        write!(f, "{s}")
    }
}
