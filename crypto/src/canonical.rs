//! Canonical pre-image encoding.
//!
//! Every variable-length field is prefixed with its length as a little-endian
//! u64, so `("ab", "c")` and `("a", "bc")` never produce the same bytes. The
//! caller decides the field order; the encoder only guarantees that the same
//! sequence of `put_*` calls always yields the same bytes.

use poaw_types::BlockHash;

use crate::hash::hash_block;

/// Append-only builder for hash pre-images.
pub struct CanonicalEncoder {
    buf: Vec<u8>,
}

impl CanonicalEncoder {
    /// Start a pre-image with a domain-separation tag.
    pub fn new(domain: &[u8]) -> Self {
        let mut encoder = Self {
            buf: Vec::with_capacity(256),
        };
        encoder.put_bytes(domain);
        encoder
    }

    pub fn put_u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Floats are encoded by IEEE-754 bit pattern, so `0.0` and `-0.0` differ.
    pub fn put_f64(&mut self, value: f64) -> &mut Self {
        self.put_u64(value.to_bits())
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.put_u64(bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn put_str(&mut self, s: &str) -> &mut Self {
        self.put_bytes(s.as_bytes())
    }

    /// Fixed-width field; no length prefix.
    pub fn put_hash(&mut self, hash: &BlockHash) -> &mut Self {
        self.buf.extend_from_slice(hash.as_bytes());
        self
    }

    /// Presence byte followed by the length-prefixed bytes when present.
    pub fn put_optional_bytes(&mut self, bytes: Option<&[u8]>) -> &mut Self {
        match bytes {
            Some(b) => {
                self.buf.push(1);
                self.put_bytes(b)
            }
            None => {
                self.buf.push(0);
                self
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn finish(&self) -> BlockHash {
        hash_block(&self.buf)
    }
}
