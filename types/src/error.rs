//! Errors raised while parsing or validating the shared types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid block hash: {0}")]
    InvalidHash(String),

    #[error("invalid work payload: {0}")]
    InvalidPayload(String),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
}
