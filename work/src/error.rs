use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkError {
    #[error("malformed work payload: {0}")]
    MalformedPayload(String),

    #[error("task is degenerate: {0}")]
    Degenerate(String),

    #[error("oracle call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}
