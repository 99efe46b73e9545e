//! Move directives derived from an analysis.

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::solver::Analysis;

/// Relocates one resource's state from one address to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Move {
    /// Address the state currently lives at.
    pub from: String,
    /// Address the state should move to.
    pub to: String,
}

/// Projects an analysis's matches into moves, in commit order.
///
/// Every match yields a move, whatever its residual score: accepting an
/// imperfect match is the operator's call.
#[must_use]
pub fn moves_from_analysis(analysis: &Analysis) -> Vec<Move> {
    analysis
        .matches
        .iter()
        .map(|m| Move {
            from: m.delete.address.clone(),
            to: m.create.address.clone(),
        })
        .collect()
}

/// Computes a SHA-256 fingerprint of an ordered list of moves.
#[must_use]
pub fn fingerprint(moves: &[Move]) -> String {
    let mut hasher = Sha256::new();
    for m in moves {
        hasher.update(m.from.as_bytes());
        hasher.update([0u8]);
        hasher.update(m.to.as_bytes());
        hasher.update([b'\n']);
    }
    hex::encode(hasher.finalize())
}

impl Analysis {
    /// Fingerprint of the moves this analysis produces.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        fingerprint(&moves_from_analysis(self))
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
