// Sqlauth - Store error types

use thiserror::Error;

use crate::hashing::HashError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The credential table could not be created; the store is unusable.
    #[error("Schema initialization failed: {0}")]
    Init(#[source] rusqlite::Error),

    /// The password was rejected by the hashing primitive. Nothing was written.
    #[error("Hashing failed: {0}")]
    Hashing(#[source] HashError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No credential row exists for the identity. Expected input, not a fault.
    #[error("Credential not found: {0}")]
    NotFound(String),

    /// The stored digest could not be checked (malformed or backend fault).
    /// Distinct from a password mismatch.
    #[error("Verification failed: {0}")]
    Verification(#[source] HashError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
