//! Hashing primitives for the PoAW ledger.
//!
//! - **SHA-256** for block digests
//! - A length-prefixed canonical encoder so a digest depends only on an
//!   explicit field list, never on serializer internals or map ordering

pub mod canonical;
pub mod hash;

pub use canonical::CanonicalEncoder;
pub use hash::{hash_block, sha256, sha256_multi};
