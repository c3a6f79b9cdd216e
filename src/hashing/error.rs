// Sqlauth - Hashing error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Password is {len} bytes, the hashing primitive accepts at most {max}")]
    InputTooLong { len: usize, max: usize },

    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    #[error("Malformed digest: {0}")]
    MalformedDigest(String),

    #[error("Hashing backend failure: {0}")]
    Backend(String),
}
