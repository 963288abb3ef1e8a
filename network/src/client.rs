//! The peer-facing operations a node needs, behind a trait so tests can
//! substitute an in-memory network.

use futures_util::future::BoxFuture;

use poaw_messages::{BlockAnnouncement, ChainResponse};

use crate::NetworkError;

/// Client side of the node API, addressed by peer `host:port`.
///
/// Implementations bound every call with their own timeout; a peer that does
/// not answer in time yields [`NetworkError::Timeout`].
pub trait PeerClient: Send + Sync {
    /// Fetch the peer's full chain. Responses whose declared length does not
    /// match the chain are [`NetworkError::Malformed`].
    fn fetch_chain<'a>(&'a self, peer: &'a str) -> BoxFuture<'a, Result<ChainResponse, NetworkError>>;

    /// Push a newly produced block to the peer.
    fn announce_block<'a>(
        &'a self,
        peer: &'a str,
        announcement: &'a BlockAnnouncement,
    ) -> BoxFuture<'a, Result<(), NetworkError>>;
}
