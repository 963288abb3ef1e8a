//! The PoAW node: transport-independent operations plus background loops.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};

use poaw_consensus::{ConsensusConfig, ConsensusEngine, ConsensusError};
use poaw_ledger::{Block, ChainFault};
use poaw_messages::{
    BlockAnnouncement, BlockSubmissionResponse, ChainResponse, HealthResponse, NewTransaction,
    PeerList, PendingTransactions, RegisterPeersResponse, TransactionAccepted,
};
use poaw_network::{broadcast_block, normalize_address, HttpPeerClient, PeerClient, PeerRegistry};
use poaw_types::{Timestamp, WorkPayload};
use poaw_work::{RegressionOracle, WorkError, WorkOracle};

use crate::metrics::NodeMetrics;
use crate::shutdown::{ShutdownController, StopListener};
use crate::state::ChainState;
use crate::sync::{SyncReport, SyncService};
use crate::tracing_spans::{block_receive_span, broadcast_span, mine_span};
use crate::{NodeConfig, NodeError};

/// A running PoAW node.
pub struct Node {
    pub config: NodeConfig,
    pub metrics: Arc<NodeMetrics>,
    pub shutdown: Arc<ShutdownController>,
    engine: ConsensusEngine,
    state: Arc<Mutex<ChainState>>,
    peers: Arc<RwLock<PeerRegistry>>,
    client: Arc<dyn PeerClient>,
    sync: SyncService,
    /// Handles for spawned background tasks (joined during shutdown).
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Node {
    /// Build a node with the regression oracle and the HTTP peer client.
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        config.check()?;
        let oracle = Arc::new(RegressionOracle::new(config.oracle, config.tolerance));
        let client = Arc::new(HttpPeerClient::new(config.peer_timeout())?);
        Self::with_parts(config, oracle, client)
    }

    /// Build a node around the given oracle and peer client.
    ///
    /// Restores the chain from `data_dir` when a valid snapshot exists and
    /// registers the bootstrap peers; malformed bootstrap entries are skipped.
    pub fn with_parts(
        config: NodeConfig,
        oracle: Arc<dyn WorkOracle>,
        client: Arc<dyn PeerClient>,
    ) -> Result<Self, NodeError> {
        config.check()?;
        let engine = ConsensusEngine::new(
            oracle,
            ConsensusConfig {
                require_work: config.require_work,
            },
        );
        let metrics = Arc::new(NodeMetrics::new());

        let state = ChainState::restore(config.data_dir.as_deref(), &engine, config.max_pending);
        metrics.chain_height.set(state.ledger.len() as i64);
        let state = Arc::new(Mutex::new(state));

        let mut registry = PeerRegistry::new();
        for peer in &config.bootstrap_peers {
            if let Err(e) = registry.register(peer) {
                warn!(peer = %peer, error = %e, "ignoring bootstrap peer");
            }
        }
        metrics.peer_count.set(registry.len() as i64);
        let peers = Arc::new(RwLock::new(registry));

        let sync = SyncService::new(
            Arc::clone(&state),
            Arc::clone(&peers),
            engine.clone(),
            Arc::clone(&client),
            Arc::clone(&metrics),
            config.peer_timeout(),
            config.data_dir.clone(),
        );

        info!(
            producer = %config.producer,
            oracle = engine.oracle().name(),
            require_work = config.require_work,
            "node initialised"
        );

        Ok(Self {
            config,
            metrics,
            shutdown: Arc::new(ShutdownController::new()),
            engine,
            state,
            peers,
            client,
            sync,
            task_handles: Mutex::new(Vec::new()),
        })
    }

    pub fn engine(&self) -> &ConsensusEngine {
        &self.engine
    }

    fn data_dir(&self) -> Option<&Path> {
        self.config.data_dir.as_deref()
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// The full chain and its length.
    pub async fn chain(&self) -> ChainResponse {
        let state = self.state.lock().await;
        ChainResponse::new(state.ledger.blocks().to_vec())
    }

    pub async fn pending(&self) -> PendingTransactions {
        let state = self.state.lock().await;
        PendingTransactions {
            transactions: state.pool.snapshot(),
            count: state.pool.len(),
        }
    }

    pub async fn peers(&self) -> PeerList {
        PeerList {
            nodes: self.peers.read().await.list(),
        }
    }

    pub async fn health(&self) -> HealthResponse {
        let length = self.state.lock().await.ledger.len();
        HealthResponse {
            status: "ok".to_string(),
            length,
            peers: self.peers.read().await.len(),
        }
    }

    /// Prometheus text exposition of the node metrics.
    pub fn metrics_text(&self) -> Result<String, NodeError> {
        self.metrics.encode()
    }

    // ── Commands ────────────────────────────────────────────────────────

    /// Queue a transaction for the next block. Never triggers mining.
    pub async fn submit_transaction(
        &self,
        request: NewTransaction,
    ) -> Result<TransactionAccepted, NodeError> {
        let tx = request.into_transaction(Timestamp::now());
        tx.check_well_formed()
            .map_err(|e| NodeError::InvalidTransaction(e.to_string()))?;

        let mut state = self.state.lock().await;
        let block_index = state.next_index();
        state.pool.push(tx)?;
        self.metrics.transactions_received.inc();
        self.metrics.pending_transactions.set(state.pool.len() as i64);
        debug!(block_index, pending = state.pool.len(), "transaction queued");

        Ok(TransactionAccepted {
            message: format!("Transaction will be added to block {block_index}"),
            block_index,
        })
    }

    /// Register peers. All addresses are validated before any is added.
    pub async fn register_peers(
        &self,
        nodes: Vec<String>,
    ) -> Result<RegisterPeersResponse, NodeError> {
        if nodes.is_empty() {
            return Err(NodeError::InvalidPeer("no nodes supplied".into()));
        }
        for node in &nodes {
            normalize_address(node).map_err(|e| NodeError::InvalidPeer(e.to_string()))?;
        }

        let mut registry = self.peers.write().await;
        let mut added = Vec::new();
        for node in &nodes {
            if registry.register(node)? {
                added.push(normalize_address(node)?);
            }
        }
        self.metrics.peer_count.set(registry.len() as i64);
        if !added.is_empty() {
            info!(added = ?added, total = registry.len(), "peers registered");
        }

        Ok(RegisterPeersResponse {
            message: "New nodes have been added".to_string(),
            added,
            total_nodes: registry.list(),
        })
    }

    /// Handle a block pushed by a peer.
    ///
    /// The block must extend the current head and pass admission; otherwise
    /// the chain is left unchanged and the response says why. Pending
    /// transactions are not pruned.
    pub async fn receive_block(
        &self,
        announcement: BlockAnnouncement,
    ) -> Result<BlockSubmissionResponse, NodeError> {
        let span = block_receive_span(&announcement.block.hash.to_hex(), announcement.block.index);
        self.receive_block_inner(announcement).instrument(span).await
    }

    async fn receive_block_inner(
        &self,
        announcement: BlockAnnouncement,
    ) -> Result<BlockSubmissionResponse, NodeError> {
        let BlockAnnouncement { block, origin } = announcement;

        if let Some(origin) = origin {
            let mut registry = self.peers.write().await;
            match registry.register(&origin) {
                Ok(true) => {
                    self.metrics.peer_count.set(registry.len() as i64);
                    debug!(peer = %origin, "registered announcing peer");
                }
                Ok(false) => {}
                Err(e) => debug!(peer = %origin, error = %e, "ignoring announcement origin"),
            }
        }

        self.metrics.blocks_received.inc();
        let mut state = self.state.lock().await;

        if let Err(fault) = state.ledger.check_continuation(&block, &self.engine) {
            self.metrics.blocks_rejected.inc();
            if matches!(fault, ChainFault::Admission { .. }) {
                self.metrics.admission_failures.inc();
            }
            warn!(index = block.index, reason = %fault, "rejected peer block");
            return Ok(BlockSubmissionResponse {
                accepted: false,
                reason: Some(fault.to_string()),
                length: state.ledger.len(),
            });
        }

        let index = block.index;
        state.ledger.append(block)?;
        state.persist(self.data_dir());
        self.metrics.chain_height.set(state.ledger.len() as i64);
        info!(index, length = state.ledger.len(), "appended peer block");

        Ok(BlockSubmissionResponse {
            accepted: true,
            reason: None,
            length: state.ledger.len(),
        })
    }

    /// Mine one block from the pending pool and broadcast it.
    ///
    /// Task proposal and solving run on the blocking pool under
    /// `oracle_timeout`. Proposal, append and pool clear then happen in one
    /// critical section; if the solution is rejected the pool and chain are
    /// untouched. Broadcast is best-effort.
    pub async fn mine(&self) -> Result<Block, NodeError> {
        let next_index = self.state.lock().await.next_index();
        let span = mine_span(&self.config.producer, next_index);
        self.mine_inner().instrument(span).await
    }

    async fn mine_inner(&self) -> Result<Block, NodeError> {
        let (task, solution) = self.obtain_work().await?;

        let block = {
            let mut state = self.state.lock().await;
            let proposed = self.engine.propose_block(
                &self.config.producer,
                task,
                solution,
                state.pool.transactions(),
                &state.ledger,
            );
            let block = match proposed {
                Ok(block) => block,
                Err(e) => {
                    if matches!(e, ConsensusError::Admission(_)) {
                        self.metrics.admission_failures.inc();
                    }
                    warn!(error = %e, "mined block not admitted");
                    return Err(e.into());
                }
            };
            state.ledger.append(block.clone())?;
            state.pool.clear();
            state.persist(self.data_dir());
            self.metrics.chain_height.set(state.ledger.len() as i64);
            self.metrics.pending_transactions.set(0);
            block
        };

        self.metrics.blocks_mined.inc();
        info!(
            index = block.index,
            hash = %block.hash,
            txs = block.transactions.len(),
            "mined block"
        );

        self.broadcast(&block).await;
        Ok(block)
    }

    /// Ask the oracle for a task and its solution, off the async runtime.
    ///
    /// On timeout the blocking thread is left to finish on its own; its
    /// result is discarded.
    async fn obtain_work(&self) -> Result<(WorkPayload, WorkPayload), NodeError> {
        let oracle = Arc::clone(self.engine.oracle());
        let timeout = self.config.oracle_timeout();
        let started = Instant::now();

        let job = tokio::task::spawn_blocking(move || -> Result<_, WorkError> {
            let task = oracle.propose_task()?;
            let solution = oracle.solve(&task)?;
            Ok((task, solution))
        });

        let work = match tokio::time::timeout(timeout, job).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_err)) => return Err(NodeError::Task(join_err.to_string())),
            Err(_) => {
                warn!(?timeout, "work oracle timed out");
                return Err(WorkError::Timeout(timeout).into());
            }
        };
        self.metrics
            .oracle_time_ms
            .observe(started.elapsed().as_secs_f64() * 1000.0);
        Ok(work)
    }

    async fn broadcast(&self, block: &Block) {
        let peers = self.peers.read().await.list();
        if peers.is_empty() {
            return;
        }
        let announcement = BlockAnnouncement {
            block: block.clone(),
            origin: None,
        };
        let result = broadcast_block(self.client.as_ref(), &peers, &announcement)
            .instrument(broadcast_span(block.index, peers.len()))
            .await;
        debug!(sent = result.sent, failed = result.failed, "block broadcast");
    }

    /// Run one sync round now.
    pub async fn sync_now(&self) -> SyncReport {
        self.sync.tick().await
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Spawn the mining and sync loops. They run until [`Node::stop`].
    ///
    /// Once the node has been stopped this spawns nothing.
    pub async fn start(self: &Arc<Self>) {
        if self.shutdown.is_raised() {
            warn!("start requested after stop, ignoring");
            return;
        }
        let mut handles = self.task_handles.lock().await;

        if self.config.mining.enabled {
            let node = Arc::clone(self);
            let stop = self.shutdown.listener();
            handles.push(tokio::spawn(async move {
                node.mining_loop(stop).await;
            }));
        }

        let sync = self.sync.clone();
        let interval = self.config.sync_interval();
        handles.push(tokio::spawn(sync.run(interval, self.shutdown.listener())));

        info!(
            mining = self.config.mining.enabled,
            sync_interval_secs = self.config.sync_interval_secs,
            "PoAW node started"
        );
    }

    /// Attempt a block every mining interval. Stop is only honoured between
    /// attempts; an attempt in progress runs to completion, broadcast included.
    async fn mining_loop(&self, mut stop: StopListener) {
        let mut interval = tokio::time::interval(self.config.mining_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so a fresh node syncs first.
        interval.tick().await;
        loop {
            tokio::select! {
                biased;
                _ = stop.stopped() => {
                    info!("mining task shutting down");
                    break;
                }
                _ = interval.tick() => {}
            }
            if !self.config.mining.mine_empty_blocks && self.state.lock().await.pool.is_empty() {
                continue;
            }
            if let Err(e) = self.mine().await {
                warn!(error = %e, "mining attempt failed");
            }
        }
    }

    /// Signal every background task and wait for them to finish, then write
    /// a final snapshot.
    pub async fn stop(&self) -> Result<(), NodeError> {
        info!("PoAW node stopping");
        self.shutdown.raise();

        let handles: Vec<_> = self.task_handles.lock().await.drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "background task ended abnormally");
            }
        }

        self.state.lock().await.persist(self.data_dir());
        info!("PoAW node stopped");
        Ok(())
    }
}
