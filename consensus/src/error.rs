use poaw_ledger::LedgerError;
use thiserror::Error;

/// Why a block's work was not admitted.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AdmissionFailure {
    #[error("work oracle rejected the solution")]
    Rejected,

    #[error("block carries a task without a solution, or a solution without a task")]
    IncompleteWork,

    #[error("block carries no work")]
    MissingWork,

    #[error("work oracle failed: {0}")]
    Oracle(String),
}

#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("block not admitted: {0}")]
    Admission(#[from] AdmissionFailure),
}
