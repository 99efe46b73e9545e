//! Plan model and candidate extraction.
//!
//! This module decodes machine-readable plans, converts attribute trees into
//! [`AttributeValue`]s, and extracts the destroy/create candidates that move
//! detection works on.

mod extract;
mod types;
mod value;

pub use extract::{extract_candidates, Candidate, Candidates, Side};
pub use types::{Action, Change, ChangeKind, Plan, ResourceChange};
pub use value::{AttributePath, AttributeValue, PathSegment, Scalar};
