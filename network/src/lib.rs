//! Networking layer for the PoAW node.
//!
//! Peers are plain `host:port` strings. Every peer speaks the same HTTP API
//! the node exposes to clients; this crate holds the registry of known peers
//! and the client side of that API.

pub mod broadcast;
pub mod client;
pub mod error;
pub mod http;
pub mod registry;

pub use broadcast::{broadcast_block, BroadcastResult};
pub use client::PeerClient;
pub use error::NetworkError;
pub use http::HttpPeerClient;
pub use registry::{normalize_address, PeerRegistry};
