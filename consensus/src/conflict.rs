//! Competing chains and the outcome of resolving them.
//!
//! Selection itself is [`ConsensusEngine::resolve_conflict`]: longest valid
//! chain wins, first seen wins a tie.
//!
//! [`ConsensusEngine::resolve_conflict`]: crate::ConsensusEngine::resolve_conflict

use poaw_ledger::Block;

/// A chain offered by a peer.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Where the chain came from (peer address), for logs and reports.
    pub source: String,
    pub chain: Vec<Block>,
}

impl Candidate {
    pub fn new(source: impl Into<String>, chain: Vec<Block>) -> Self {
        Self {
            source: source.into(),
            chain,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// No candidate is both longer and valid.
    KeepLocal,
    /// Replace the local chain with `chain`.
    Adopt { source: String, chain: Vec<Block> },
}
