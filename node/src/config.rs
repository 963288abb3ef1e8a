//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use poaw_ledger::DEFAULT_POOL_LIMIT;
use poaw_work::{RegressionParams, TolerancePolicy};

use crate::NodeError;

/// Configuration for a PoAW node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Interface the HTTP API binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// HTTP API port.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Directory for chain snapshots. No persistence when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Identity recorded as `producer` on blocks this node mines.
    #[serde(default = "default_producer")]
    pub producer: String,

    /// Peers registered at startup.
    #[serde(default)]
    pub bootstrap_peers: Vec<String>,

    #[serde(default)]
    pub mining: MiningConfig,

    /// Seconds between sync ticks.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,

    /// Upper bound on any single call to a peer.
    #[serde(default = "default_peer_timeout_ms")]
    pub peer_timeout_ms: u64,

    /// Upper bound on task proposal plus solving.
    #[serde(default = "default_oracle_timeout_ms")]
    pub oracle_timeout_ms: u64,

    /// How the work oracle compares continuous results.
    #[serde(default)]
    pub tolerance: TolerancePolicy,

    /// Shape of the regression tasks this node poses.
    #[serde(default)]
    pub oracle: RegressionParams,

    /// Refuse non-genesis blocks that carry no work.
    #[serde(default)]
    pub require_work: bool,

    /// Maximum number of pending transactions.
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to serve Prometheus metrics at `/metrics`.
    #[serde(default)]
    pub enable_metrics: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MiningConfig {
    /// Run the periodic mining loop.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds between mining attempts.
    #[serde(default = "default_mining_interval_secs")]
    pub interval_secs: u64,

    /// Mine even when no transactions are pending.
    #[serde(default)]
    pub mine_empty_blocks: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_rpc_port() -> u16 {
    5000
}

fn default_producer() -> String {
    "poaw-node".to_string()
}

fn default_sync_interval_secs() -> u64 {
    30
}

fn default_peer_timeout_ms() -> u64 {
    5_000
}

fn default_oracle_timeout_ms() -> u64 {
    30_000
}

fn default_max_pending() -> usize {
    DEFAULT_POOL_LIMIT
}

fn default_true() -> bool {
    true
}

fn default_mining_interval_secs() -> u64 {
    10
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("NodeConfig is always serializable to TOML")
    }

    /// Reject values the node cannot run with.
    pub fn check(&self) -> Result<(), NodeError> {
        if self.producer.trim().is_empty() {
            return Err(NodeError::Config("producer must not be empty".into()));
        }
        if !self.tolerance.is_valid() {
            return Err(NodeError::Config(format!(
                "tolerance threshold {} must be finite and non-negative",
                self.tolerance.threshold
            )));
        }
        if self.mining.interval_secs == 0 || self.sync_interval_secs == 0 {
            return Err(NodeError::Config("intervals must be at least one second".into()));
        }
        if self.peer_timeout_ms == 0 || self.oracle_timeout_ms == 0 {
            return Err(NodeError::Config("timeouts must be non-zero".into()));
        }
        Ok(())
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_timeout_ms)
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn mining_interval(&self) -> Duration {
        Duration::from_secs(self.mining.interval_secs)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            rpc_port: default_rpc_port(),
            data_dir: None,
            producer: default_producer(),
            bootstrap_peers: Vec::new(),
            mining: MiningConfig::default(),
            sync_interval_secs: default_sync_interval_secs(),
            peer_timeout_ms: default_peer_timeout_ms(),
            oracle_timeout_ms: default_oracle_timeout_ms(),
            tolerance: TolerancePolicy::default(),
            oracle: RegressionParams::default(),
            require_work: false,
            max_pending: default_max_pending(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            enable_metrics: false,
        }
    }
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_secs: default_mining_interval_secs(),
            mine_empty_blocks: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poaw_work::ToleranceKind;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.rpc_port, config.rpc_port);
        assert_eq!(parsed.producer, config.producer);
        assert_eq!(parsed.tolerance, config.tolerance);
        assert_eq!(parsed.oracle, config.oracle);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.rpc_port, 5000);
        assert!(config.data_dir.is_none());
        assert!(config.mining.enabled);
        assert!(!config.mining.mine_empty_blocks);
        assert!(!config.require_work);
        assert_eq!(config.peer_timeout(), Duration::from_secs(5));
        assert_eq!(config.log_format, "human");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            rpc_port = 9999
            producer = "miner-7"
            bootstrap_peers = ["10.0.0.2:5000"]
            data_dir = "/var/lib/poaw"

            [mining]
            interval_secs = 3
            mine_empty_blocks = true

            [tolerance]
            kind = "relative-epsilon"
            threshold = 0.05

            [oracle]
            samples = 128
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.rpc_port, 9999);
        assert_eq!(config.producer, "miner-7");
        assert_eq!(config.bootstrap_peers, vec!["10.0.0.2:5000"]);
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/poaw")));
        assert_eq!(config.mining.interval_secs, 3);
        assert!(config.mining.enabled); // default
        assert_eq!(config.tolerance.kind, ToleranceKind::RelativeEpsilon);
        assert_eq!(config.oracle.samples, 128);
        assert_eq!(config.oracle.features, RegressionParams::default().features);
        assert_eq!(config.log_format, "human"); // default
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for toml in [
            "producer = \"  \"",
            "sync_interval_secs = 0",
            "peer_timeout_ms = 0",
            "[tolerance]\nkind = \"absolute-epsilon\"\nthreshold = -1.0",
        ] {
            assert!(
                matches!(NodeConfig::from_toml_str(toml), Err(NodeError::Config(_))),
                "{toml:?} should be rejected"
            );
        }
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NodeConfig::from_toml_file("/nonexistent/poaw.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }
}
