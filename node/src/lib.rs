//! PoAW full node: ties the ledger, consensus and peer network together.
//!
//! The node:
//! - Accepts transactions into the pending pool
//! - Mines blocks by asking the work oracle for a task and its solution
//! - Accepts blocks pushed by peers that extend its head
//! - Periodically adopts the longest valid chain among its peers
//! - Persists its chain to a JSON snapshot when a data directory is set

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod shutdown;
pub mod state;
pub mod sync;
pub mod tracing_spans;

pub use config::{MiningConfig, NodeConfig};
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use metrics::NodeMetrics;
pub use node::Node;
pub use shutdown::{ShutdownController, StopListener};
pub use state::ChainState;
pub use sync::{SyncReport, SyncService};
