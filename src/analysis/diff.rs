//! Structural diff between two attribute trees.
//!
//! The differ answers "could these be the same object?" for a destroyed
//! resource's before-tree and a created resource's after-tree. It walks both
//! trees together and reports every leaf path where they disagree:
//!
//! - maps are compared over the union of their keys, in lexical order;
//! - lists are compared index by index, extra tail elements are differences;
//! - scalars are compared after numeric normalization;
//! - a shape mismatch is one difference at the path where it occurs.
//!
//! Lists are not realigned. An element inserted at the front of a list
//! shows up as a difference at every following index.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::plan::{AttributePath, AttributeValue, PathSegment};

/// A single disagreement between two attribute trees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeDifference {
    /// Where the trees disagree.
    pub path: AttributePath,
    /// Value on the delete side, `None` when the path is absent there.
    pub before: Option<AttributeValue>,
    /// Value on the create side, `None` when the path is absent there.
    pub after: Option<AttributeValue>,
    /// Whether an ignore rule covers this difference.
    pub ignored: bool,
}

/// Computes differences between attribute trees.
#[derive(Debug, Default, Clone, Copy)]
pub struct AttributeDiffer;

impl AttributeDiffer {
    /// Creates a new differ.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Diffs `before` against `after`.
    ///
    /// `unknown` is the create side's mask of values only known after apply;
    /// any path it marks `true` (and everything below it) is skipped. All
    /// returned differences have `ignored` set to false.
    #[must_use]
    pub fn diff(
        &self,
        before: &AttributeValue,
        after: &AttributeValue,
        unknown: Option<&AttributeValue>,
    ) -> Vec<AttributeDifference> {
        let mut out = Vec::new();
        walk(&AttributePath::root(), Some(before), Some(after), unknown, &mut out);
        out
    }
}

fn walk(
    path: &AttributePath,
    before: Option<&AttributeValue>,
    after: Option<&AttributeValue>,
    unknown: Option<&AttributeValue>,
    out: &mut Vec<AttributeDifference>,
) {
    if unknown.is_some_and(AttributeValue::is_true) {
        return;
    }

    match (before, after) {
        (Some(AttributeValue::Map(a)), Some(AttributeValue::Map(b))) => {
            let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
            for key in keys {
                let segment = PathSegment::Key(key.clone());
                let mask = unknown.and_then(|u| u.child(&segment));
                walk(&path.join(segment), a.get(key), b.get(key), mask, out);
            }
        }
        (Some(AttributeValue::List(a)), Some(AttributeValue::List(b))) => {
            for i in 0..a.len().max(b.len()) {
                let segment = PathSegment::Index(i);
                let mask = unknown.and_then(|u| u.child(&segment));
                walk(&path.join(segment), a.get(i), b.get(i), mask, out);
            }
        }
        (Some(AttributeValue::Scalar(a)), Some(AttributeValue::Scalar(b))) if a.normalized_eq(b) => {}
        (None, None) => {}
        _ => out.push(AttributeDifference {
            path: path.clone(),
            before: before.cloned(),
            after: after.cloned(),
            ignored: false,
        }),
    }
}

impl std::fmt::Display for AttributeDifference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let side = |value: &Option<AttributeValue>| {
            value
                .as_ref()
                .map_or_else(|| String::from("<absent>"), ToString::to_string)
        };
        write!(f, "{}: {} => {}", self.path, side(&self.before), side(&self.after))?;
        if self.ignored {
            write!(f, " (ignored)")?;
        }
        Ok(())
    }
}
