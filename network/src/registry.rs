//! The set of known peers.

use std::collections::HashSet;

use crate::NetworkError;

/// Canonical `host:port` form of a peer address.
///
/// Accepts a bare `host:port` or a URL such as `http://host:port/`; the
/// scheme, any path and surrounding whitespace are dropped and the host is
/// lowercased. The port must be a non-zero decimal `u16`.
pub fn normalize_address(raw: &str) -> Result<String, NetworkError> {
    let invalid = || NetworkError::InvalidAddress(raw.to_string());

    let trimmed = raw.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map_or(trimmed, |(_, rest)| rest);
    let authority = without_scheme
        .split('/')
        .next()
        .unwrap_or_default();

    let (host, port) = authority.rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(invalid());
    }
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let port: u16 = port.parse().map_err(|_| invalid())?;
    if port == 0 {
        return Err(invalid());
    }
    Ok(format!("{}:{port}", host.to_ascii_lowercase()))
}

/// Known peers, kept in registration order.
///
/// No liveness tracking: a peer stays registered until removed, whether or
/// not it answers.
#[derive(Clone, Debug, Default)]
pub struct PeerRegistry {
    order: Vec<String>,
    known: HashSet<String>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer. Returns whether it was new.
    pub fn register(&mut self, address: &str) -> Result<bool, NetworkError> {
        let address = normalize_address(address)?;
        if !self.known.insert(address.clone()) {
            return Ok(false);
        }
        self.order.push(address);
        Ok(true)
    }

    /// Remove a peer. Returns whether it was present.
    pub fn remove(&mut self, address: &str) -> bool {
        let Ok(address) = normalize_address(address) else {
            return false;
        };
        if !self.known.remove(&address) {
            return false;
        }
        self.order.retain(|a| a != &address);
        true
    }

    pub fn contains(&self, address: &str) -> bool {
        normalize_address(address).is_ok_and(|a| self.known.contains(&a))
    }

    /// Registered peers, oldest first.
    pub fn list(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
