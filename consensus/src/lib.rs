//! Consensus: decides which blocks and chains a node accepts.
//!
//! - A block is admitted when its work verifies under the node's
//!   [`WorkOracle`](poaw_work::WorkOracle).
//! - New blocks are proposed on top of the local head from the pending pool
//!   and a task/solution pair.
//! - Between competing chains the longest valid one wins; on equal length
//!   the first one seen is kept.
//!
//! ## Module overview
//!
//! - [`engine`]: Admission rule and block proposal.
//! - [`conflict`]: Choosing among remote chains.
//! - [`error`]: Consensus error types.

pub mod conflict;
pub mod engine;
pub mod error;

pub use conflict::{Candidate, Resolution};
pub use engine::{ConsensusConfig, ConsensusEngine};
pub use error::{AdmissionFailure, ConsensusError};
