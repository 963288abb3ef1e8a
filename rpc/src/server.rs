//! Axum-based API server.

use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{debug, info, Instrument};

use poaw_node::tracing_spans::rpc_span;
use poaw_node::{Node, StopListener};

use crate::error::RpcError;
use crate::handlers;

/// Build the API router over a shared node.
pub fn router(node: Arc<Node>) -> Router {
    Router::new()
        .route("/chain", get(handlers::get_chain))
        .route("/blocks", post(handlers::post_block))
        .route("/mine", post(handlers::post_mine))
        .route("/sync", post(handlers::post_sync))
        .route("/transactions", post(handlers::post_transaction))
        .route("/transactions/pending", get(handlers::get_pending))
        .route("/peers", get(handlers::get_peers).post(handlers::post_peers))
        .route("/health", get(handlers::get_health))
        .route("/metrics", get(handlers::get_metrics))
        .layer(middleware::from_fn(trace_request))
        .with_state(node)
}

async fn trace_request(req: Request, next: Next) -> Response {
    let span = rpc_span(req.method().as_str(), req.uri().path());
    async move {
        let response = next.run(req).await;
        debug!(status = %response.status(), "request handled");
        response
    }
    .instrument(span)
    .await
}

pub struct RpcServer {
    node: Arc<Node>,
}

impl RpcServer {
    pub fn new(node: Arc<Node>) -> Self {
        Self { node }
    }

    /// Bind `listen_addr:rpc_port` from the node config and serve until
    /// the stop signal is raised.
    pub async fn start(self, stop: StopListener) -> Result<(), RpcError> {
        let addr = format!(
            "{}:{}",
            self.node.config.listen_addr, self.node.config.rpc_port
        );
        let listener = TcpListener::bind(&addr).await?;
        self.serve(listener, stop).await
    }

    /// Serve on an already-bound listener until the stop signal is raised.
    /// Requests already accepted are drained first.
    pub async fn serve(
        self,
        listener: TcpListener,
        mut stop: StopListener,
    ) -> Result<(), RpcError> {
        let local = listener.local_addr()?;
        info!(addr = %local, "API server listening");

        axum::serve(listener, router(self.node))
            .with_graceful_shutdown(async move {
                stop.stopped().await;
                info!("API server shutting down");
            })
            .await?;
        Ok(())
    }
}
