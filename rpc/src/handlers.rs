//! Route handlers. Each one is a thin adapter from JSON to a [`Node`] call.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use poaw_messages::{
    BlockAnnouncement, BlockSubmissionResponse, ChainResponse, HealthResponse, MineResponse,
    NewTransaction, PeerList, PendingTransactions, RegisterPeers, RegisterPeersResponse,
    SyncResponse, TransactionAccepted,
};
use poaw_node::Node;

use crate::error::RpcError;

pub type ApiState = Arc<Node>;

// ── Chain ────────────────────────────────────────────────────────────────

/// GET /chain
pub async fn get_chain(State(node): State<ApiState>) -> Json<ChainResponse> {
    Json(node.chain().await)
}

/// POST /blocks
///
/// A block that does not extend the head is answered with 409 and the
/// reason; the body shape is the same either way.
pub async fn post_block(
    State(node): State<ApiState>,
    payload: Result<Json<BlockAnnouncement>, JsonRejection>,
) -> Result<(StatusCode, Json<BlockSubmissionResponse>), RpcError> {
    let Json(announcement) = payload?;
    let response = node.receive_block(announcement).await?;
    let status = if response.accepted {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    };
    Ok((status, Json(response)))
}

/// POST /mine
pub async fn post_mine(
    State(node): State<ApiState>,
) -> Result<(StatusCode, Json<MineResponse>), RpcError> {
    let block = node.mine().await?;
    Ok((
        StatusCode::CREATED,
        Json(MineResponse {
            message: format!("Block {} forged", block.index),
            block,
        }),
    ))
}

/// POST /sync
pub async fn post_sync(State(node): State<ApiState>) -> Json<SyncResponse> {
    Json(node.sync_now().await.into())
}

// ── Transactions ─────────────────────────────────────────────────────────

/// POST /transactions
pub async fn post_transaction(
    State(node): State<ApiState>,
    payload: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionAccepted>), RpcError> {
    let Json(request) = payload?;
    let accepted = node.submit_transaction(request).await?;
    Ok((StatusCode::CREATED, Json(accepted)))
}

/// GET /transactions/pending
pub async fn get_pending(State(node): State<ApiState>) -> Json<PendingTransactions> {
    Json(node.pending().await)
}

// ── Peers ────────────────────────────────────────────────────────────────

/// POST /peers
pub async fn post_peers(
    State(node): State<ApiState>,
    payload: Result<Json<RegisterPeers>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterPeersResponse>), RpcError> {
    let Json(RegisterPeers { nodes }) = payload?;
    let response = node.register_peers(nodes).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /peers
pub async fn get_peers(State(node): State<ApiState>) -> Json<PeerList> {
    Json(node.peers().await)
}

// ── Telemetry ────────────────────────────────────────────────────────────

/// GET /health
pub async fn get_health(State(node): State<ApiState>) -> Json<HealthResponse> {
    Json(node.health().await)
}

/// GET /metrics
pub async fn get_metrics(State(node): State<ApiState>) -> Result<impl IntoResponse, RpcError> {
    if !node.config.enable_metrics {
        return Err(RpcError::MetricsDisabled);
    }
    let body = node.metrics_text()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
