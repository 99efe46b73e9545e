//! Ignore rule grammar and matching.
//!
//! A rule reads `<type>.<segment>.<segment>...`:
//!
//! - `<type>` is a resource type or `*` for any type.
//! - Each segment is a map key, a list index, or `*` for exactly one
//!   segment of any value.
//! - `**` as the final segment matches whatever remains of the path,
//!   including nothing.
//! - A rule without segments covers every attribute of its type.
//!
//! ```text
//! aws_instance.tags.Name
//! aws_security_group.ingress.*.description
//! *.tags_all.**
//! google_compute_instance
//! ```

use serde::{Serialize, Serializer};
use std::fmt;
use tracing::warn;

use crate::error::{Result, RuleError};
use crate::plan::{AttributePath, PathSegment};

/// Which resource types a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSelector {
    /// Every resource type.
    Any,
    /// A single resource type.
    Exact(String),
}

/// One element of a rule's path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Matches a key or index with exactly this text.
    Literal(String),
    /// Matches exactly one segment.
    Any,
    /// Matches the rest of the path. Only valid last.
    Rest,
}

/// A parsed ignore rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRule {
    raw: String,
    selector: TypeSelector,
    pattern: Vec<PatternSegment>,
}

const WILDCARD: &str = "*";
const REST_WILDCARD: &str = "**";

/// Parses a single rule.
///
/// # Errors
///
/// Returns [`RuleError::Invalid`] if the rule is empty, has an empty type
/// selector or path segment, or places a wildcard badly.
pub fn parse_rule(raw: &str) -> Result<IgnoreRule> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RuleError::invalid(raw, "rule is empty").into());
    }

    let mut parts = trimmed.split('.');
    let selector = match parts.next() {
        Some("") | None => return Err(RuleError::invalid(raw, "empty type selector").into()),
        Some(WILDCARD) => TypeSelector::Any,
        Some(s) if s.contains('*') => {
            return Err(RuleError::invalid(raw, "type selector must be a name or '*'").into());
        }
        Some(s) => TypeSelector::Exact(s.to_string()),
    };

    let parts: Vec<&str> = parts.collect();
    let mut pattern = Vec::with_capacity(parts.len().max(1));

    for (i, part) in parts.iter().enumerate() {
        let segment = match *part {
            "" => return Err(RuleError::invalid(raw, "empty path segment").into()),
            WILDCARD => PatternSegment::Any,
            REST_WILDCARD if i + 1 == parts.len() => PatternSegment::Rest,
            REST_WILDCARD => {
                return Err(
                    RuleError::invalid(raw, "'**' may only appear as the last segment").into(),
                );
            }
            p if p.contains('*') => {
                return Err(RuleError::invalid(
                    raw,
                    format!("segment {p:?} mixes '*' with other characters"),
                )
                .into());
            }
            p => PatternSegment::Literal(p.to_string()),
        };
        pattern.push(segment);
    }

    if pattern.is_empty() {
        pattern.push(PatternSegment::Rest);
    }

    if selector == TypeSelector::Any && pattern == [PatternSegment::Rest] {
        warn!("Ignore rule {trimmed:?} ignores every attribute, so every same-type pair scores 0");
    }

    Ok(IgnoreRule {
        raw: trimmed.to_string(),
        selector,
        pattern,
    })
}

/// Parses a list of raw rules, failing on the first invalid one.
///
/// # Errors
///
/// Returns the first [`RuleError`] encountered.
pub fn parse_rules<S: AsRef<str>>(raws: &[S]) -> Result<Vec<IgnoreRule>> {
    raws.iter().map(|raw| parse_rule(raw.as_ref())).collect()
}

/// Matches a path pattern against a concrete path, segment by segment.
///
/// `Any` consumes exactly one segment and there is no backtracking.
#[must_use]
pub fn pattern_matches(pattern: &[PatternSegment], path: &[PathSegment]) -> bool {
    match (pattern.split_first(), path.split_first()) {
        (None, None) | (Some((PatternSegment::Rest, _)), _) => true,
        (Some((PatternSegment::Any, pattern_rest)), Some((_, path_rest))) => {
            pattern_matches(pattern_rest, path_rest)
        }
        (Some((PatternSegment::Literal(literal), pattern_rest)), Some((segment, path_rest))) => {
            segment.matches_literal(literal) && pattern_matches(pattern_rest, path_rest)
        }
        _ => false,
    }
}

impl IgnoreRule {
    /// Returns true if this rule covers `path` on a resource of `resource_type`.
    #[must_use]
    pub fn matches(&self, resource_type: &str, path: &AttributePath) -> bool {
        self.selector.matches(resource_type) && pattern_matches(&self.pattern, path.segments())
    }

    /// The rule as written (whitespace trimmed).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The rule's type selector.
    #[must_use]
    pub const fn selector(&self) -> &TypeSelector {
        &self.selector
    }

    /// The rule's path pattern.
    #[must_use]
    pub fn pattern(&self) -> &[PatternSegment] {
        &self.pattern
    }
}

impl TypeSelector {
    /// Returns true if the selector accepts `resource_type`.
    #[must_use]
    pub fn matches(&self, resource_type: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(t) => t == resource_type,
        }
    }
}

impl std::str::FromStr for IgnoreRule {
    type Err = crate::error::AutomvError;

    fn from_str(s: &str) -> Result<Self> {
        parse_rule(s)
    }
}

impl fmt::Display for IgnoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Serialize for IgnoreRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}
