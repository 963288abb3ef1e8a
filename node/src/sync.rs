//! Periodic chain synchronisation with registered peers.
//!
//! Each tick fetches every peer's chain, lets consensus pick the longest
//! valid one and installs it through [`Ledger::replace`]. Ticks carry no state
//! between them and never touch the pending pool.
//!
//! [`Ledger::replace`]: poaw_ledger::Ledger::replace

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn, Instrument};

use poaw_consensus::{Candidate, ConsensusEngine, Resolution};
use poaw_ledger::Block;
use poaw_messages::SyncResponse;
use poaw_network::{NetworkError, PeerClient, PeerRegistry};

use crate::metrics::NodeMetrics;
use crate::shutdown::StopListener;
use crate::state::ChainState;
use crate::tracing_spans::sync_span;

/// Outcome of one sync tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Peers asked for their chain.
    pub peers_polled: usize,
    /// Peers that were down, timed out or sent a malformed answer.
    pub unreachable: usize,
    /// Whether the local chain was replaced.
    pub replaced: bool,
    /// Peer whose chain was adopted.
    pub adopted_from: Option<String>,
    /// Local chain length after the tick.
    pub length: usize,
}

impl From<SyncReport> for SyncResponse {
    fn from(r: SyncReport) -> Self {
        SyncResponse {
            peers_polled: r.peers_polled,
            unreachable: r.unreachable,
            replaced: r.replaced,
            adopted_from: r.adopted_from,
            length: r.length,
        }
    }
}

#[derive(Clone)]
pub struct SyncService {
    state: Arc<Mutex<ChainState>>,
    peers: Arc<RwLock<PeerRegistry>>,
    engine: ConsensusEngine,
    client: Arc<dyn PeerClient>,
    metrics: Arc<NodeMetrics>,
    peer_timeout: Duration,
    data_dir: Option<PathBuf>,
}

impl SyncService {
    pub fn new(
        state: Arc<Mutex<ChainState>>,
        peers: Arc<RwLock<PeerRegistry>>,
        engine: ConsensusEngine,
        client: Arc<dyn PeerClient>,
        metrics: Arc<NodeMetrics>,
        peer_timeout: Duration,
        data_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            state,
            peers,
            engine,
            client,
            metrics,
            peer_timeout,
            data_dir,
        }
    }

    /// Run one sync round against every registered peer.
    pub async fn tick(&self) -> SyncReport {
        let peers = self.peers.read().await.list();
        self.tick_peers(&peers).instrument(sync_span(peers.len())).await
    }

    async fn tick_peers(&self, peers: &[String]) -> SyncReport {
        let mut report = SyncReport {
            peers_polled: peers.len(),
            ..SyncReport::default()
        };

        // Registration order is preserved, so equal-length chains resolve
        // in favour of the earliest registered peer.
        let fetched = join_all(peers.iter().map(|peer| self.fetch(peer))).await;
        let mut candidates = Vec::new();
        for (peer, outcome) in peers.iter().zip(fetched) {
            match outcome {
                Ok(chain) => candidates.push(Candidate::new(peer.clone(), chain)),
                Err(e) => {
                    warn!(peer = %peer, error = %e, "sync: peer skipped");
                    self.metrics.sync_failures.inc();
                    report.unreachable += 1;
                }
            }
        }

        let local = self.state.lock().await.ledger.blocks().to_vec();
        let local_len = local.len();
        candidates.retain(|c| c.chain.len() > local_len);

        if !candidates.is_empty() {
            // Full validation asks the oracle about every block: resolve on the
            // blocking pool against a copy, without holding the chain lock.
            let engine = self.engine.clone();
            let resolved =
                tokio::task::spawn_blocking(move || engine.resolve_conflict(&local, candidates)).await;
            match resolved {
                Ok(Resolution::Adopt { source, chain }) => self.adopt(source, chain, &mut report).await,
                Ok(Resolution::KeepLocal) => debug!("no longer valid chain among peers"),
                Err(e) => warn!(error = %e, "sync: conflict resolution task failed"),
            }
        }

        report.length = self.state.lock().await.ledger.len();
        self.metrics.chain_height.set(report.length as i64);
        report
    }

    /// Install the winning chain. The local chain may have grown since the
    /// copy was taken, so `replace` checks length and validity again.
    async fn adopt(&self, source: String, chain: Vec<Block>, report: &mut SyncReport) {
        let mut state = self.state.lock().await;
        let from = state.ledger.len();
        let to = chain.len();
        if state.ledger.replace(chain, &self.engine) {
            info!(peer = %source, from, to, "adopted longer chain");
            self.metrics.chain_replacements.inc();
            state.persist(self.data_dir.as_deref());
            report.replaced = true;
            report.adopted_from = Some(source);
        } else {
            warn!(peer = %source, from, to, "winning chain no longer applies, keeping local chain");
        }
    }

    async fn fetch(&self, peer: &str) -> Result<Vec<Block>, NetworkError> {
        match tokio::time::timeout(self.peer_timeout, self.client.fetch_chain(peer)).await {
            Ok(Ok(response)) if response.is_consistent() => Ok(response.chain),
            Ok(Ok(response)) => Err(NetworkError::Malformed {
                peer: peer.to_string(),
                reason: format!(
                    "declared length {} but {} blocks",
                    response.length,
                    response.chain.len()
                ),
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(NetworkError::Timeout {
                peer: peer.to_string(),
                after: self.peer_timeout,
            }),
        }
    }

    /// Tick every `interval` until stopped. A tick that has begun is
    /// finished before the stop is observed.
    pub async fn run(self, interval: Duration, mut stop: StopListener) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = stop.stopped() => {
                    info!("sync task shutting down");
                    break;
                }
                _ = ticker.tick() => {}
            }
            let report = self.tick().await;
            debug!(?report, "sync tick complete");
        }
    }
}
