use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("invalid peer address {0:?}: expected host:port")]
    InvalidAddress(String),

    #[error("peer {peer} unreachable: {reason}")]
    PeerUnreachable { peer: String, reason: String },

    #[error("peer {peer} timed out after {after:?}")]
    Timeout { peer: String, after: Duration },

    #[error("peer {peer} returned status {status}")]
    Status { peer: String, status: u16 },

    #[error("malformed response from {peer}: {reason}")]
    Malformed { peer: String, reason: String },

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl NetworkError {
    /// The peer the error concerns, if any.
    pub fn peer(&self) -> Option<&str> {
        match self {
            Self::PeerUnreachable { peer, .. }
            | Self::Timeout { peer, .. }
            | Self::Status { peer, .. }
            | Self::Malformed { peer, .. } => Some(peer),
            Self::InvalidAddress(_) | Self::Client(_) => None,
        }
    }
}
