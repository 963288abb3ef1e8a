//! The node's shared chain state.

use std::path::Path;

use tracing::{info, warn};

use poaw_consensus::ConsensusEngine;
use poaw_ledger::{ChainSnapshot, Ledger, PendingPool};

/// Ledger and pending pool, guarded together by one mutex so that
/// propose + append + clear, inbound appends and chain replacement are each
/// a single critical section.
#[derive(Debug)]
pub struct ChainState {
    pub ledger: Ledger,
    pub pool: PendingPool,
}

impl ChainState {
    /// Fresh state holding only genesis.
    pub fn new(pool_limit: usize) -> Self {
        Self {
            ledger: Ledger::with_genesis(),
            pool: PendingPool::new(pool_limit),
        }
    }

    /// Restore the chain from `dir` if a valid snapshot is there, otherwise
    /// start from genesis. A snapshot that fails re-verification is ignored.
    pub fn restore(dir: Option<&Path>, engine: &ConsensusEngine, pool_limit: usize) -> Self {
        let mut state = Self::new(pool_limit);
        let Some(dir) = dir else {
            return state;
        };
        match ChainSnapshot::load(dir) {
            Ok(Some(snapshot)) => match snapshot.into_ledger(engine) {
                Ok(ledger) => {
                    info!(length = ledger.len(), dir = %dir.display(), "restored chain from snapshot");
                    state.ledger = ledger;
                }
                Err(e) => warn!(error = %e, "snapshot failed verification, starting from genesis"),
            },
            Ok(None) => info!(dir = %dir.display(), "no snapshot found, starting from genesis"),
            Err(e) => warn!(error = %e, "cannot read snapshot, starting from genesis"),
        }
        state
    }

    /// Write the current chain to `dir`. Failures are logged, not returned:
    /// the in-memory chain stays authoritative.
    pub fn persist(&self, dir: Option<&Path>) {
        let Some(dir) = dir else {
            return;
        };
        if let Err(e) = ChainSnapshot::save(dir, self.ledger.blocks()) {
            warn!(error = %e, dir = %dir.display(), "failed to write chain snapshot");
        }
    }

    /// Index the next block will carry.
    pub fn next_index(&self) -> u64 {
        self.ledger.head().map_or(0, |h| h.index + 1)
    }
}
