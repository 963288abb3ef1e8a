use poaw_types::BlockHash;
use thiserror::Error;

/// Why two blocks do not chain together (or a genesis is malformed).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LinkageFault {
    #[error("previous hash {found} does not match head {expected}")]
    PreviousHash { expected: BlockHash, found: BlockHash },

    #[error("stored hash {stored} does not match computed {computed}")]
    Hash { stored: BlockHash, computed: BlockHash },

    #[error("index {found} does not follow {expected}")]
    Index { expected: u64, found: u64 },

    #[error("malformed genesis: {0}")]
    Genesis(String),
}

/// First reason a candidate chain (or continuation block) was refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChainFault {
    #[error("candidate chain is empty")]
    Empty,

    #[error("linkage broken at block {index}: {fault}")]
    Linkage { index: u64, fault: LinkageFault },

    #[error("work not admitted at block {index}: {reason}")]
    Admission { index: u64, reason: String },
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("chain is empty: genesis has not been created")]
    EmptyChain,

    #[error("chain linkage error at block {index}: {fault}")]
    ChainLinkage { index: u64, fault: LinkageFault },

    #[error("invalid chain: {0}")]
    InvalidChain(#[from] ChainFault),

    #[error("pending pool is full ({0} transactions)")]
    PoolFull(usize),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
