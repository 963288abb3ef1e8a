//! Fundamental types for the PoAW ledger.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! block hashes, timestamps, transactions and the opaque work payloads that carry
//! oracle tasks and solutions.

pub mod block;
pub mod error;
pub mod payload;
pub mod time;
pub mod transaction;

pub use block::BlockHash;
pub use error::TypesError;
pub use payload::WorkPayload;
pub use time::Timestamp;
pub use transaction::Transaction;
