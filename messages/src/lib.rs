//! Message types for PoAW node-to-node and client-to-node communication.
//!
//! Every body is JSON. Peers use [`ChainResponse`] for sync and
//! [`BlockAnnouncement`] to push freshly mined blocks; the rest serve the
//! client-facing routes.

use poaw_ledger::Block;
use poaw_types::{Timestamp, Transaction};
use serde::{Deserialize, Serialize};

/// A node's full chain, as served by `GET /chain`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    /// Must equal `chain.len()`; receivers treat a mismatch as malformed.
    pub length: usize,
}

impl ChainResponse {
    pub fn new(chain: Vec<Block>) -> Self {
        let length = chain.len();
        Self { chain, length }
    }

    /// Whether the declared length agrees with the chain.
    pub fn is_consistent(&self) -> bool {
        self.length == self.chain.len()
    }
}

/// Body of `POST /transactions`.
///
/// The timestamp is optional; the node stamps the transaction on receipt when
/// it is absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl NewTransaction {
    pub fn into_transaction(self, received_at: Timestamp) -> Transaction {
        Transaction::new(
            self.sender,
            self.recipient,
            self.amount,
            self.timestamp.unwrap_or(received_at),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAccepted {
    pub message: String,
    /// Index of the block expected to include the transaction.
    pub block_index: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingTransactions {
    pub transactions: Vec<Transaction>,
    pub count: usize,
}

/// Body of `POST /peers`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterPeers {
    pub nodes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterPeersResponse {
    pub message: String,
    /// Addresses that were not known before this request.
    pub added: Vec<String>,
    pub total_nodes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerList {
    pub nodes: Vec<String>,
}

/// Body of `POST /blocks`: a block pushed by a peer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockAnnouncement {
    pub block: Block,
    /// Announcing node's own address, if it wants to be registered back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSubmissionResponse {
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub length: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineResponse {
    pub message: String,
    pub block: Block,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResponse {
    pub peers_polled: usize,
    pub unreachable: usize,
    pub replaced: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adopted_from: Option<String>,
    pub length: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub length: usize,
    pub peers: usize,
}

/// Error body returned with every non-2xx status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
