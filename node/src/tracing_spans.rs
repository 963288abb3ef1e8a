//! Pre-built [`tracing::Span`] constructors for common node operations.
//!
//! Consistent span names and field sets make mining, sync and request
//! traces easy to filter and correlate.

use tracing::{info_span, Span};

/// Span covering one mining attempt, from task proposal to broadcast.
pub fn mine_span(producer: &str, next_index: u64) -> Span {
    info_span!("mine", producer = %producer, index = next_index)
}

/// Span covering one sync tick across all peers.
pub fn sync_span(peer_count: usize) -> Span {
    info_span!("sync", peers = peer_count)
}

/// Span covering the handling of a block pushed by a peer.
pub fn block_receive_span(block_hash: &str, index: u64) -> Span {
    info_span!("block_receive", hash = %block_hash, index = index)
}

/// Span covering the broadcast of a block to registered peers.
pub fn broadcast_span(index: u64, peer_count: usize) -> Span {
    info_span!("broadcast", index = index, peer_count = peer_count)
}

/// Span covering a single HTTP request handled by the API server.
pub fn rpc_span(method: &str, route: &str) -> Span {
    info_span!("rpc", method = %method, route = %route)
}
