//! Work admission and block proposal.

use std::sync::Arc;

use tracing::debug;

use poaw_ledger::{AdmissionCheck, Block, Ledger};
use poaw_types::{Timestamp, Transaction, WorkPayload};
use poaw_work::WorkOracle;

use crate::conflict::{Candidate, Resolution};
use crate::error::{AdmissionFailure, ConsensusError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConsensusConfig {
    /// Reject non-genesis blocks that carry no work at all.
    pub require_work: bool,
}

/// Decides which blocks enter the chain.
///
/// The engine holds no chain state; every decision is a function of the
/// block (or chains) handed in and the oracle's verdict.
#[derive(Clone)]
pub struct ConsensusEngine {
    oracle: Arc<dyn WorkOracle>,
    config: ConsensusConfig,
}

impl ConsensusEngine {
    pub fn new(oracle: Arc<dyn WorkOracle>, config: ConsensusConfig) -> Self {
        Self { oracle, config }
    }

    pub fn oracle(&self) -> &Arc<dyn WorkOracle> {
        &self.oracle
    }

    pub fn config(&self) -> ConsensusConfig {
        self.config
    }

    /// Decide whether `block`'s work is admissible.
    ///
    /// Genesis is always admitted. A block with both a task and a solution is
    /// judged by the oracle. A block with exactly one of them is refused. A
    /// block with neither is admitted unless work is required.
    pub fn admit(&self, block: &Block) -> Result<(), AdmissionFailure> {
        if block.is_genesis() {
            return Ok(());
        }
        match (&block.work_task, &block.work_solution) {
            (Some(task), Some(solution)) => match self.oracle.verify(task, solution) {
                Ok(true) => Ok(()),
                Ok(false) => Err(AdmissionFailure::Rejected),
                Err(e) => Err(AdmissionFailure::Oracle(e.to_string())),
            },
            (None, None) if self.config.require_work => Err(AdmissionFailure::MissingWork),
            (None, None) => Ok(()),
            _ => Err(AdmissionFailure::IncompleteWork),
        }
    }

    /// Build the next block on `ledger`'s head and admit it.
    ///
    /// Neither the ledger nor `pending` is modified: on success the caller
    /// appends the returned block and clears its pool.
    pub fn propose_block(
        &self,
        producer: &str,
        task: WorkPayload,
        solution: WorkPayload,
        pending: &[Transaction],
        ledger: &Ledger,
    ) -> Result<Block, ConsensusError> {
        let head = ledger.head()?;
        let block = Block::new(
            head.index + 1,
            Timestamp::now(),
            pending.to_vec(),
            head.hash,
            Some(task),
            Some(solution),
            producer,
        );
        self.admit(&block)?;
        debug!(index = block.index, hash = %block.hash, txs = block.transactions.len(), "block proposed");
        Ok(block)
    }

    /// Full validation of a candidate chain under this engine's admission rule.
    pub fn validate(&self, chain: &[Block]) -> bool {
        Ledger::validate(chain, self)
    }

    /// Pick the chain to adopt among `remotes`.
    ///
    /// Only candidates strictly longer than `local` that validate in full
    /// are eligible. The longest wins; among equally long candidates the one
    /// that appears first in `remotes` is kept.
    pub fn resolve_conflict(
        &self,
        local: &[Block],
        remotes: impl IntoIterator<Item = Candidate>,
    ) -> Resolution {
        let mut best: Option<Candidate> = None;
        for candidate in remotes {
            let best_len = best.as_ref().map_or(local.len(), |b| b.chain.len());
            if candidate.chain.len() <= best_len {
                continue;
            }
            if let Err(fault) = Ledger::check_chain(&candidate.chain, self) {
                debug!(source = %candidate.source, %fault, "ignoring invalid candidate chain");
                continue;
            }
            best = Some(candidate);
        }
        match best {
            Some(Candidate { source, chain }) => Resolution::Adopt { source, chain },
            None => Resolution::KeepLocal,
        }
    }
}

impl AdmissionCheck for ConsensusEngine {
    type Rejection = AdmissionFailure;

    fn check_admission(&self, block: &Block) -> Result<(), Self::Rejection> {
        self.admit(block)
    }
}

impl std::fmt::Debug for ConsensusEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsensusEngine")
            .field("oracle", &self.oracle.name())
            .field("config", &self.config)
            .finish()
    }
}
