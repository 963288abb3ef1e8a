//! Hash-linked chain ledger.
//!
//! A single append-only sequence of blocks, each committing to its
//! predecessor's hash. The ledger owns structural integrity (linkage and
//! digests); whether a block's work is admissible is decided elsewhere and
//! reached through the [`AdmissionCheck`] trait, so this crate does not
//! depend on consensus.

pub mod admission;
pub mod block;
pub mod error;
pub mod genesis;
pub mod ledger;
pub mod pool;
pub mod snapshot;

pub use admission::{AdmissionCheck, StructuralOnly};
pub use block::Block;
pub use error::{ChainFault, LedgerError, LinkageFault};
pub use genesis::{genesis_block, genesis_hash, GENESIS_PRODUCER};
pub use ledger::Ledger;
pub use pool::{PendingPool, DEFAULT_POOL_LIMIT};
pub use snapshot::{ChainSnapshot, SNAPSHOT_FILE};
