//! Move detection.
//!
//! This module compares every destroyed resource against every created
//! resource of the same type, pairs them up, and turns the pairs into move
//! directives.

mod analyzer;
mod cancel;
mod compare;
mod diff;
mod moves;
mod solver;

pub use analyzer::{analysis_from_plan, Analyzer};
pub use cancel::CancelToken;
pub use compare::{Comparator, PairDiff, PairDiffer};
pub use diff::{AttributeDiffer, AttributeDifference};
pub use moves::{fingerprint, moves_from_analysis, Move};
pub use solver::{Analysis, Match, MatchSolver};
