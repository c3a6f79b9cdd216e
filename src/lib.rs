// Sqlauth - Library root
//
// Re-exports the hashing, lock, store and CLI modules.

pub mod cli;
pub mod error;
pub mod hashing;
pub mod lock;
pub mod store;

pub use error::{Result, SqlauthError};
pub use hashing::{CredentialHasher, HashAlgorithm, HashError, HashingConfig};
pub use lock::{KeyedGuard, KeyedMutex};
pub use store::{
    AuthOutcome, CredentialRecord, Database, PasswordStore, SqlitePasswordStore, StoreConfig,
    StoreError, WriteMode,
};
