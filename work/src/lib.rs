//! Proof-of-AI-work.
//!
//! Not hash mining: a block is admissible when it carries a task posed by a
//! work oracle together with a solution the oracle judges correct. The ledger
//! treats both as opaque [`WorkPayload`](poaw_types::WorkPayload)s; this crate
//! defines the oracle boundary, the numeric tolerance policy oracles use to
//! compare continuous results, and a reference oracle built on least-squares
//! regression.

pub mod error;
pub mod linalg;
pub mod oracle;
pub mod regression;
pub mod tolerance;

pub use error::WorkError;
pub use oracle::WorkOracle;
pub use regression::{RegressionOracle, RegressionParams, RegressionSolution, RegressionTask};
pub use tolerance::{ToleranceKind, TolerancePolicy};
