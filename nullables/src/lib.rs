//! Nullable infrastructure for deterministic testing.
//!
//! The node's external dependencies (the work oracle and the peer network)
//! sit behind traits. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the network or spawn real work
//!
//! Usage: swap real implementations for nullables in tests.

pub mod network;
pub mod oracle;

pub use network::NullPeerClient;
pub use oracle::{NullOracle, Verdict};
