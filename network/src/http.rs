//! [`PeerClient`] over HTTP/JSON.

use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tracing::debug;

use poaw_messages::{BlockAnnouncement, ChainResponse};

use crate::{NetworkError, PeerClient};

pub struct HttpPeerClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpPeerClient {
    pub fn new(timeout: Duration) -> Result<Self, NetworkError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::Client(e.to_string()))?;
        Ok(Self { http, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(peer: &str, path: &str) -> String {
        format!("http://{peer}{path}")
    }

    fn map_error(&self, peer: &str, err: reqwest::Error) -> NetworkError {
        if err.is_timeout() {
            NetworkError::Timeout {
                peer: peer.to_string(),
                after: self.timeout,
            }
        } else if err.is_decode() {
            NetworkError::Malformed {
                peer: peer.to_string(),
                reason: err.to_string(),
            }
        } else {
            NetworkError::PeerUnreachable {
                peer: peer.to_string(),
                reason: err.to_string(),
            }
        }
    }

    async fn get_chain(&self, peer: &str) -> Result<ChainResponse, NetworkError> {
        let response = self
            .http
            .get(Self::url(peer, "/chain"))
            .send()
            .await
            .map_err(|e| self.map_error(peer, e))?;
        if !response.status().is_success() {
            return Err(NetworkError::Status {
                peer: peer.to_string(),
                status: response.status().as_u16(),
            });
        }
        let chain: ChainResponse = response.json().await.map_err(|e| self.map_error(peer, e))?;
        if !chain.is_consistent() {
            return Err(NetworkError::Malformed {
                peer: peer.to_string(),
                reason: format!(
                    "declared length {} but {} blocks",
                    chain.length,
                    chain.chain.len()
                ),
            });
        }
        debug!(peer, length = chain.length, "fetched peer chain");
        Ok(chain)
    }

    async fn post_block(
        &self,
        peer: &str,
        announcement: &BlockAnnouncement,
    ) -> Result<(), NetworkError> {
        let response = self
            .http
            .post(Self::url(peer, "/blocks"))
            .json(announcement)
            .send()
            .await
            .map_err(|e| self.map_error(peer, e))?;
        // A peer that refuses the block (409/422) still received it.
        let status = response.status();
        if status.is_server_error() {
            return Err(NetworkError::Status {
                peer: peer.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// Run `fut` under the client timeout, mapping expiry to [`NetworkError::Timeout`].
    async fn bounded<T>(
        &self,
        peer: &str,
        fut: impl std::future::Future<Output = Result<T, NetworkError>>,
    ) -> Result<T, NetworkError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(NetworkError::Timeout {
                peer: peer.to_string(),
                after: self.timeout,
            }),
        }
    }
}

impl PeerClient for HttpPeerClient {
    fn fetch_chain<'a>(&'a self, peer: &'a str) -> BoxFuture<'a, Result<ChainResponse, NetworkError>> {
        self.bounded(peer, self.get_chain(peer)).boxed()
    }

    fn announce_block<'a>(
        &'a self,
        peer: &'a str,
        announcement: &'a BlockAnnouncement,
    ) -> BoxFuture<'a, Result<(), NetworkError>> {
        self.bounded(peer, self.post_block(peer, announcement)).boxed()
    }
}
