//! Serde model of a machine-readable plan.
//!
//! These types map to the JSON document produced by `terraform show -json`.
//! Only the parts of the document that move detection needs are modeled;
//! everything else is ignored during deserialization.

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// A decoded plan document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Plan format version.
    #[serde(default)]
    pub format_version: Option<String>,
    /// Version of the planner that produced the plan.
    #[serde(default)]
    pub terraform_version: Option<String>,
    /// Resource changes, in plan order.
    #[serde(default)]
    pub resource_changes: Vec<ResourceChange>,
}

/// A proposed change to one resource instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceChange {
    /// Full resource instance address.
    #[serde(default)]
    pub address: String,
    /// Resource mode ("managed" or "data").
    #[serde(default)]
    pub mode: Option<String>,
    /// Resource type.
    #[serde(default, rename = "type")]
    pub resource_type: String,
    /// Resource name within its module.
    #[serde(default)]
    pub name: Option<String>,
    /// Provider that manages the resource.
    #[serde(default)]
    pub provider_name: String,
    /// Key of a deposed object left behind by create-before-destroy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposed: Option<String>,
    /// The change itself.
    pub change: Change,
}

/// Before/after description of a change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Change {
    /// Actions the planner intends to take.
    pub actions: Vec<Action>,
    /// Attribute tree before the change.
    #[serde(default)]
    pub before: Option<serde_json::Value>,
    /// Attribute tree after the change.
    #[serde(default)]
    pub after: Option<serde_json::Value>,
    /// Mask of attributes only known after apply.
    #[serde(default)]
    pub after_unknown: Option<serde_json::Value>,
}

/// A single planner action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Nothing to do.
    NoOp,
    /// Read a data source.
    Read,
    /// Update in place.
    Update,
    /// Create a new object.
    Create,
    /// Destroy an existing object.
    Delete,
    /// Drop the object from state without destroying it.
    Forget,
    /// An action this version does not know about.
    #[serde(other)]
    Unrecognized,
}

/// What an action set amounts to, as far as move detection is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// No-op, read, in-place update, forget or an unrecognized action.
    Other,
    /// Pure creation.
    Create,
    /// Pure destruction.
    Delete,
    /// Destroy and recreate at the same address.
    Replace,
}

impl Plan {
    /// Decodes a plan from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid plan.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| {
            PlanError::Parse {
                message: e.to_string(),
            }
            .into()
        })
    }
}

impl ResourceChange {
    /// Returns true if this change targets a deposed object rather than the
    /// current object at its address.
    #[must_use]
    pub const fn is_deposed(&self) -> bool {
        self.deposed.is_some()
    }

    /// Returns true if this change targets a data source.
    #[must_use]
    pub fn is_data_source(&self) -> bool {
        self.mode.as_deref() == Some("data")
    }
}

impl ChangeKind {
    /// Classifies an action set.
    ///
    /// Returns `None` for action sets the planner never produces.
    #[must_use]
    pub fn classify(actions: &[Action]) -> Option<Self> {
        match actions {
            [
                Action::NoOp
                | Action::Read
                | Action::Update
                | Action::Forget
                | Action::Unrecognized,
            ] => Some(Self::Other),
            [Action::Create] => Some(Self::Create),
            [Action::Delete] => Some(Self::Delete),
            [Action::Delete, Action::Create] | [Action::Create, Action::Delete] => {
                Some(Self::Replace)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NoOp => "no-op",
            Self::Read => "read",
            Self::Update => "update",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Forget => "forget",
            Self::Unrecognized => "unrecognized",
        };
        write!(f, "{s}")
    }
}
