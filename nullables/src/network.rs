//! Nullable peer network: an in-memory table of peer chains.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use poaw_ledger::Block;
use poaw_messages::{BlockAnnouncement, ChainResponse};
use poaw_network::{NetworkError, PeerClient};

/// A test network that serves canned chains and records announcements
/// instead of sending them.
#[derive(Default)]
pub struct NullPeerClient {
    chains: Mutex<HashMap<String, ChainResponse>>,
    unreachable: Mutex<HashSet<String>>,
    slow: Mutex<HashSet<String>>,
    announced: Mutex<Vec<(String, Block)>>,
}

impl NullPeerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `chain` for `peer`.
    pub fn set_chain(&self, peer: &str, chain: Vec<Block>) {
        self.set_response(peer, ChainResponse::new(chain));
    }

    /// Serve a raw response for `peer`, which may be inconsistent.
    pub fn set_response(&self, peer: &str, response: ChainResponse) {
        self.chains.lock().unwrap().insert(peer.to_string(), response);
    }

    /// Make calls to `peer` fail as if the host were down.
    pub fn set_unreachable(&self, peer: &str) {
        self.unreachable.lock().unwrap().insert(peer.to_string());
    }

    /// Make calls to `peer` fail as if they had timed out.
    pub fn set_slow(&self, peer: &str) {
        self.slow.lock().unwrap().insert(peer.to_string());
    }

    /// Every `(peer, block)` announced so far.
    pub fn announced(&self) -> Vec<(String, Block)> {
        self.announced.lock().unwrap().clone()
    }

    fn check_reachable(&self, peer: &str) -> Result<(), NetworkError> {
        if self.unreachable.lock().unwrap().contains(peer) {
            return Err(NetworkError::PeerUnreachable {
                peer: peer.to_string(),
                reason: "connection refused".into(),
            });
        }
        if self.slow.lock().unwrap().contains(peer) {
            return Err(NetworkError::Timeout {
                peer: peer.to_string(),
                after: Duration::ZERO,
            });
        }
        Ok(())
    }

    fn chain_for(&self, peer: &str) -> Result<ChainResponse, NetworkError> {
        self.check_reachable(peer)?;
        let response = self
            .chains
            .lock()
            .unwrap()
            .get(peer)
            .cloned()
            .ok_or_else(|| NetworkError::PeerUnreachable {
                peer: peer.to_string(),
                reason: "no such peer".into(),
            })?;
        if !response.is_consistent() {
            return Err(NetworkError::Malformed {
                peer: peer.to_string(),
                reason: "length does not match chain".into(),
            });
        }
        Ok(response)
    }
}

impl PeerClient for NullPeerClient {
    fn fetch_chain<'a>(&'a self, peer: &'a str) -> BoxFuture<'a, Result<ChainResponse, NetworkError>> {
        let result = self.chain_for(peer);
        async move { result }.boxed()
    }

    fn announce_block<'a>(
        &'a self,
        peer: &'a str,
        announcement: &'a BlockAnnouncement,
    ) -> BoxFuture<'a, Result<(), NetworkError>> {
        let result = self.check_reachable(peer).map(|()| {
            self.announced
                .lock()
                .unwrap()
                .push((peer.to_string(), announcement.block.clone()));
        });
        async move { result }.boxed()
    }
}
