//! Opaque work payloads (oracle tasks and solutions).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::TypesError;

/// An opaque blob produced by a work oracle.
///
/// The ledger never interprets these bytes; it only hashes and stores them.
/// On the wire they travel as a lowercase hex string so that the exact bytes
/// survive any JSON round trip.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct WorkPayload(Vec<u8>);

impl WorkPayload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_hex(s: &str) -> Result<Self, TypesError> {
        hex::decode(s)
            .map(Self)
            .map_err(|e| TypesError::InvalidPayload(e.to_string()))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl From<Vec<u8>> for WorkPayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for WorkPayload {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for WorkPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkPayload({} bytes)", self.0.len())
    }
}

impl Serialize for WorkPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for WorkPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_wire_form() {
        let payload = WorkPayload::new(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(serde_json::to_string(&payload).unwrap(), "\"deadbeef\"");
    }

    #[test]
    fn optional_payload_is_null_when_absent() {
        let none: Option<WorkPayload> = None;
        assert_eq!(serde_json::to_string(&none).unwrap(), "null");
    }

    #[test]
    fn odd_length_hex_rejected() {
        assert!(WorkPayload::from_hex("abc").is_err());
    }
}
