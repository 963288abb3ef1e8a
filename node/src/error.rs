use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger error: {0}")]
    Ledger(#[from] poaw_ledger::LedgerError),

    #[error("consensus error: {0}")]
    Consensus(#[from] poaw_consensus::ConsensusError),

    #[error("network error: {0}")]
    Network(#[from] poaw_network::NetworkError),

    #[error("work oracle error: {0}")]
    Work(#[from] poaw_work::WorkError),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("invalid peer: {0}")]
    InvalidPeer(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("background task failed: {0}")]
    Task(String),

    #[error("metrics error: {0}")]
    Metrics(String),
}
