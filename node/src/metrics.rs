//! Prometheus metrics for the PoAW node.
//!
//! Counters and gauges cover mining, inbound blocks, sync and the pending
//! pool. The [`NodeMetrics`] struct owns a dedicated [`Registry`] that the
//! `/metrics` endpoint encodes into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge,
    Opts, Registry, TextEncoder,
};

use crate::NodeError;

/// Central collection of all node-level Prometheus metrics.
pub struct NodeMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Blocks this node mined and appended.
    pub blocks_mined: IntCounter,
    /// Blocks pushed by peers, accepted or not.
    pub blocks_received: IntCounter,
    /// Blocks pushed by peers that failed linkage or admission.
    pub blocks_rejected: IntCounter,
    /// Blocks whose work the oracle refused or could not judge.
    pub admission_failures: IntCounter,
    /// Times the local chain was replaced by a peer's.
    pub chain_replacements: IntCounter,
    /// Per-peer chain fetches that failed during sync.
    pub sync_failures: IntCounter,
    /// Transactions accepted into the pending pool.
    pub transactions_received: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Current number of blocks in the chain.
    pub chain_height: IntGauge,
    /// Current number of pending transactions.
    pub pending_transactions: IntGauge,
    /// Current number of registered peers.
    pub peer_count: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Time spent proposing and solving a task, in milliseconds.
    pub oracle_time_ms: Histogram,
}

impl NodeMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        // Counters
        let blocks_mined = register_int_counter_with_registry!(
            Opts::new("poaw_blocks_mined_total", "Total blocks mined by this node"),
            registry
        )
        .expect("failed to register blocks_mined counter");

        let blocks_received = register_int_counter_with_registry!(
            Opts::new(
                "poaw_blocks_received_total",
                "Total blocks received from peers"
            ),
            registry
        )
        .expect("failed to register blocks_received counter");

        let blocks_rejected = register_int_counter_with_registry!(
            Opts::new(
                "poaw_blocks_rejected_total",
                "Total peer blocks rejected"
            ),
            registry
        )
        .expect("failed to register blocks_rejected counter");

        let admission_failures = register_int_counter_with_registry!(
            Opts::new(
                "poaw_admission_failures_total",
                "Total blocks whose work was not admitted"
            ),
            registry
        )
        .expect("failed to register admission_failures counter");

        let chain_replacements = register_int_counter_with_registry!(
            Opts::new(
                "poaw_chain_replacements_total",
                "Total times the local chain was replaced by a longer valid one"
            ),
            registry
        )
        .expect("failed to register chain_replacements counter");

        let sync_failures = register_int_counter_with_registry!(
            Opts::new(
                "poaw_sync_failures_total",
                "Total failed peer chain fetches"
            ),
            registry
        )
        .expect("failed to register sync_failures counter");

        let transactions_received = register_int_counter_with_registry!(
            Opts::new(
                "poaw_transactions_received_total",
                "Total transactions accepted into the pending pool"
            ),
            registry
        )
        .expect("failed to register transactions_received counter");

        // Gauges
        let chain_height = register_int_gauge_with_registry!(
            Opts::new("poaw_chain_height", "Current number of blocks in the chain"),
            registry
        )
        .expect("failed to register chain_height gauge");

        let pending_transactions = register_int_gauge_with_registry!(
            Opts::new(
                "poaw_pending_transactions",
                "Current number of pending transactions"
            ),
            registry
        )
        .expect("failed to register pending_transactions gauge");

        let peer_count = register_int_gauge_with_registry!(
            Opts::new("poaw_peer_count", "Current number of registered peers"),
            registry
        )
        .expect("failed to register peer_count gauge");

        // Histograms: exponential buckets covering 1 ms to ~16 s.
        let oracle_time_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "poaw_oracle_time_ms",
                "Task proposal plus solving time in milliseconds"
            )
            .buckets(
                prometheus::exponential_buckets(1.0, 2.0, 15)
                    .expect("static bucket parameters are valid")
            ),
            registry
        )
        .expect("failed to register oracle_time_ms histogram");

        Self {
            registry,
            blocks_mined,
            blocks_received,
            blocks_rejected,
            admission_failures,
            chain_replacements,
            sync_failures,
            transactions_received,
            chain_height,
            pending_transactions,
            peer_count,
            oracle_time_ms,
        }
    }

    /// Encode every metric in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, NodeError> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buf)
            .map_err(|e| NodeError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| NodeError::Metrics(e.to_string()))
    }
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_includes_registered_metrics() {
        let metrics = NodeMetrics::new();
        metrics.blocks_mined.inc();
        metrics.chain_height.set(4);
        let text = metrics.encode().unwrap();
        assert!(text.contains("poaw_blocks_mined_total 1"));
        assert!(text.contains("poaw_chain_height 4"));
    }

    #[test]
    fn instances_do_not_share_registries() {
        let a = NodeMetrics::new();
        let b = NodeMetrics::new();
        a.transactions_received.inc();
        assert_eq!(b.transactions_received.get(), 0);
    }
}
