//! Attribute trees and paths into them.
//!
//! A resource's attributes are a recursive value: scalars, ordered lists,
//! and maps with unique string keys. The set of shapes is fixed by the plan
//! format, so it is a closed enum.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Any number, integral or not.
    Number(f64),
    /// String.
    String(String),
}

/// One side (before or after) of a resource's attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Leaf value.
    Scalar(Scalar),
    /// Ordered sequence.
    List(Vec<AttributeValue>),
    /// Mapping with unique keys, iterated in lexical key order.
    Map(BTreeMap<String, AttributeValue>),
}

/// One step in an attribute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Map key or object field.
    Key(String),
    /// List index.
    Index(usize),
}

/// A concrete path from the root of an attribute tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AttributePath(Vec<PathSegment>);

impl Scalar {
    /// Compares two scalars after normalizing numbers.
    ///
    /// `1` equals `1.0`, and a string equals a number when it parses to
    /// the same value (`"80"` equals `80`).
    #[must_use]
    pub fn normalized_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Number(n), Self::String(s)) | (Self::String(s), Self::Number(n)) => {
                s.parse::<f64>().is_ok_and(|parsed| parsed == *n)
            }
            _ => self == other,
        }
    }
}

impl AttributeValue {
    /// Shorthand for a null scalar.
    #[must_use]
    pub const fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    /// Number of nodes in the tree, counting the root.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::List(items) => 1 + items.iter().map(Self::size).sum::<usize>(),
            Self::Map(entries) => 1 + entries.values().map(Self::size).sum::<usize>(),
        }
    }

    /// Returns the child at the given segment, if any.
    #[must_use]
    pub fn child(&self, segment: &PathSegment) -> Option<&Self> {
        match (self, segment) {
            (Self::Map(entries), PathSegment::Key(key)) => entries.get(key),
            (Self::List(items), PathSegment::Index(i)) => items.get(*i),
            _ => None,
        }
    }

    /// Returns the value at the given path, if any.
    #[must_use]
    pub fn lookup(&self, path: &AttributePath) -> Option<&Self> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Returns true if this is the boolean `true`.
    #[must_use]
    pub const fn is_true(&self) -> bool {
        matches!(self, Self::Scalar(Scalar::Bool(true)))
    }
}

impl From<serde_json::Value> for AttributeValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::null(),
            serde_json::Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            serde_json::Value::Number(n) => {
                n.as_f64().map_or_else(Self::null, |f| Self::Scalar(Scalar::Number(f)))
            }
            serde_json::Value::String(s) => Self::Scalar(Scalar::String(s)),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(Scalar::Null) => serializer.serialize_unit(),
            Self::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Self::Scalar(Scalar::Number(n)) => serialize_number(*n, serializer),
            Self::Scalar(Scalar::String(s)) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

/// Largest magnitude below which every integer is exact in an `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Writes whole numbers as integers so `80` does not come back as `80.0`.
#[allow(clippy::cast_possible_truncation)]
fn serialize_number<S: Serializer>(n: f64, serializer: S) -> Result<S::Ok, S::Error> {
    if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
        serializer.serialize_i64(n as i64)
    } else {
        serializer.serialize_f64(n)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl PathSegment {
    /// Returns true if a literal rule segment names this segment.
    #[must_use]
    pub fn matches_literal(&self, literal: &str) -> bool {
        match self {
            Self::Key(key) => key == literal,
            Self::Index(i) => literal.parse::<usize>().is_ok_and(|n| n == *i),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

impl AttributePath {
    /// Creates the empty (root) path.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns the path's segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Returns true for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a new path extended by one segment.
    #[must_use]
    pub fn join(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }
}

impl From<Vec<PathSegment>> for AttributePath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl Serialize for AttributePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        let value = AttributeValue::from(json!({"b": [1, "x"], "a": null}));
        let AttributeValue::Map(entries) = &value else {
            panic!("expected a map");
        };
        let keys: Vec<_> = entries.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(value.size(), 5);
    }

    #[test]
    fn test_normalized_eq() {
        let one = Scalar::Number(1.0);
        assert!(one.normalized_eq(&Scalar::Number(1.0)));
        assert!(one.normalized_eq(&Scalar::String(String::from("1"))));
        assert!(one.normalized_eq(&Scalar::String(String::from("1.0"))));
        assert!(!one.normalized_eq(&Scalar::String(String::from("one"))));
        assert!(!one.normalized_eq(&Scalar::Bool(true)));
        assert!(Scalar::Null.normalized_eq(&Scalar::Null));
        assert!(!Scalar::Null.normalized_eq(&Scalar::String(String::new())));
    }

    #[test]
    fn test_integer_and_float_json_numbers_equal() {
        let a = AttributeValue::from(json!(1));
        let b = AttributeValue::from(json!(1.0));
        match (a, b) {
            (AttributeValue::Scalar(x), AttributeValue::Scalar(y)) => assert!(x.normalized_eq(&y)),
            _ => panic!("expected scalars"),
        }
    }

    #[test]
    fn test_lookup() {
        let value = AttributeValue::from(json!({"ingress": [{"port": 80}]}));
        let path = AttributePath::from(vec![
            PathSegment::Key(String::from("ingress")),
            PathSegment::Index(0),
            PathSegment::Key(String::from("port")),
        ]);
        assert_eq!(
            value.lookup(&path),
            Some(&AttributeValue::Scalar(Scalar::Number(80.0)))
        );
        assert_eq!(path.to_string(), "ingress.0.port");
        assert_eq!(AttributePath::root().to_string(), "<root>");
    }

    #[test]
    fn test_segment_matches_literal() {
        assert!(PathSegment::Index(3).matches_literal("3"));
        assert!(!PathSegment::Index(3).matches_literal("03x"));
        assert!(PathSegment::Key(String::from("Name")).matches_literal("Name"));
        assert!(!PathSegment::Key(String::from("Name")).matches_literal("name"));
    }

    #[test]
    fn test_serialize_whole_numbers_as_integers() {
        let value = AttributeValue::from(json!({"port": 80, "ratio": 0.5, "offset": -3}));
        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(text, r#"{"offset":-3,"port":80,"ratio":0.5}"#);
    }

    #[test]
    fn test_serialize() {
        let value = AttributeValue::from(json!({"a": [true, null, "s"]}));
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({"a": [true, null, "s"]})
        );
    }
}
