//! Best-effort block propagation.
//!
//! Every registered peer gets the announcement concurrently; failures are
//! logged and counted, never retried.

use futures_util::future::join_all;
use tracing::warn;

use poaw_messages::BlockAnnouncement;

use crate::PeerClient;

/// Outcome of a broadcast attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BroadcastResult {
    /// Peers that took delivery.
    pub sent: usize,
    /// Peers that were unreachable, timed out or errored.
    pub failed: usize,
}

/// Announce a block to all `peers`.
pub async fn broadcast_block(
    client: &dyn PeerClient,
    peers: &[String],
    announcement: &BlockAnnouncement,
) -> BroadcastResult {
    let outcomes = join_all(
        peers
            .iter()
            .map(|peer| async move { (peer, client.announce_block(peer, announcement).await) }),
    )
    .await;

    let mut result = BroadcastResult::default();
    for (peer, outcome) in outcomes {
        match outcome {
            Ok(()) => result.sent += 1,
            Err(e) => {
                warn!(peer = %peer, error = %e, index = announcement.block.index, "block announcement failed");
                result.failed += 1;
            }
        }
    }
    result
}
