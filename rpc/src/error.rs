//! RPC error types and their HTTP mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::warn;

use poaw_consensus::ConsensusError;
use poaw_ledger::LedgerError;
use poaw_messages::ErrorResponse;
use poaw_node::NodeError;
use poaw_work::WorkError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("metrics are disabled")]
    MetricsDisabled,

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("server error: {0}")]
    Server(String),
}

impl From<JsonRejection> for RpcError {
    fn from(rejection: JsonRejection) -> Self {
        RpcError::InvalidRequest(rejection.body_text())
    }
}

impl From<std::io::Error> for RpcError {
    fn from(e: std::io::Error) -> Self {
        RpcError::Server(e.to_string())
    }
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::MetricsDisabled => StatusCode::NOT_FOUND,
            RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RpcError::Node(e) => node_status(e),
        }
    }
}

fn node_status(e: &NodeError) -> StatusCode {
    match e {
        NodeError::InvalidTransaction(_) | NodeError::InvalidPeer(_) => StatusCode::BAD_REQUEST,
        NodeError::Consensus(ConsensusError::Admission(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        NodeError::Consensus(ConsensusError::Ledger(_)) => StatusCode::CONFLICT,
        NodeError::Ledger(LedgerError::ChainLinkage { .. } | LedgerError::InvalidChain(_)) => {
            StatusCode::CONFLICT
        }
        NodeError::Ledger(LedgerError::PoolFull(_)) => StatusCode::SERVICE_UNAVAILABLE,
        NodeError::Work(WorkError::Timeout(_) | WorkError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        NodeError::Network(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(%status, error = %self, "request failed");
        }
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
