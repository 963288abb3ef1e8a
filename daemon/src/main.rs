//! PoAW daemon: entry point for running a PoAW node.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use poaw_node::{init_logging, LogFormat, Node, NodeConfig};
use poaw_rpc::RpcServer;

#[derive(Parser)]
#[command(name = "poaw-daemon", about = "Proof-of-AI-Work ledger node")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "POAW_CONFIG")]
    config: Option<PathBuf>,

    /// Address the API server binds to.
    #[arg(long, env = "POAW_LISTEN_ADDR")]
    listen_addr: Option<String>,

    /// API server port.
    #[arg(long, env = "POAW_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Directory for chain snapshots. Without it the chain lives in memory.
    #[arg(long, env = "POAW_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Identity recorded as the producer of mined blocks.
    #[arg(long, env = "POAW_PRODUCER")]
    producer: Option<String>,

    /// Bootstrap peer addresses (comma-separated: "10.0.0.1:5000,10.0.0.2:5000").
    #[arg(long, env = "POAW_BOOTSTRAP_PEERS", value_delimiter = ',')]
    bootstrap_peers: Vec<String>,

    /// Do not run the periodic mining loop (POST /mine still works).
    #[arg(long, env = "POAW_NO_MINING")]
    no_mining: bool,

    /// Mine on schedule even when no transactions are pending.
    #[arg(long, env = "POAW_MINE_EMPTY_BLOCKS")]
    mine_empty_blocks: bool,

    /// Seconds between mining attempts.
    #[arg(long, env = "POAW_MINING_INTERVAL")]
    mining_interval_secs: Option<u64>,

    /// Seconds between sync ticks.
    #[arg(long, env = "POAW_SYNC_INTERVAL")]
    sync_interval_secs: Option<u64>,

    /// Refuse blocks that carry no work.
    #[arg(long, env = "POAW_REQUIRE_WORK")]
    require_work: bool,

    /// Enable the Prometheus metrics endpoint.
    #[arg(long, env = "POAW_ENABLE_METRICS")]
    metrics: bool,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "POAW_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "POAW_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the node and its API server until SIGINT/SIGTERM.
    Run,
    /// Print the effective configuration as TOML and exit.
    PrintConfig,
}

impl Cli {
    /// Merge the file config (or defaults) with CLI and env overrides.
    fn resolve_config(&self) -> anyhow::Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_toml_file(path)
                .with_context(|| format!("loading config file {}", path.display()))?,
            None => NodeConfig::default(),
        };

        if let Some(addr) = &self.listen_addr {
            config.listen_addr = addr.clone();
        }
        if let Some(port) = self.rpc_port {
            config.rpc_port = port;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if let Some(producer) = &self.producer {
            config.producer = producer.clone();
        }
        if !self.bootstrap_peers.is_empty() {
            config.bootstrap_peers = self.bootstrap_peers.clone();
        }
        if self.no_mining {
            config.mining.enabled = false;
        }
        config.mining.mine_empty_blocks |= self.mine_empty_blocks;
        if let Some(secs) = self.mining_interval_secs {
            config.mining.interval_secs = secs;
        }
        if let Some(secs) = self.sync_interval_secs {
            config.sync_interval_secs = secs;
        }
        config.require_work |= self.require_work;
        config.enable_metrics |= self.metrics;
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.log_format = format.clone();
        }

        config.check().context("invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    if let Command::PrintConfig = cli.command {
        print!("{}", config.to_toml_string());
        return Ok(());
    }

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level);

    info!(
        listen = %config.listen_addr,
        rpc_port = config.rpc_port,
        producer = %config.producer,
        mining = config.mining.enabled,
        data_dir = ?config.data_dir,
        "starting PoAW node"
    );
    if !config.bootstrap_peers.is_empty() {
        info!(peers = %config.bootstrap_peers.join(", "), "bootstrap peers");
    }

    let node = Arc::new(Node::new(config).context("building node")?);
    node.start().await;

    let server = RpcServer::new(Arc::clone(&node));
    let mut api = tokio::spawn(server.start(node.shutdown.listener()));

    tokio::select! {
        _ = node.shutdown.wait_for_os_signal() => {}
        result = &mut api => {
            match result {
                Ok(Ok(())) => info!("API server stopped"),
                Ok(Err(e)) => error!(error = %e, "API server failed"),
                Err(e) => error!(error = %e, "API server task panicked"),
            }
        }
    }

    info!("shutdown signal received, stopping node");
    node.stop().await?;
    if !api.is_finished() {
        // The server listens on the same stop signal as the node loops.
        let _ = api.await;
    }

    info!("PoAW daemon exited cleanly");
    Ok(())
}
