// Sqlauth - Store Module
//
// Salted password digests persisted in SQLite, one row per identity.
// Writes are either a native atomic upsert or a read-decide-write sequence
// serialized per identity through the keyed lock registry.

mod config;
mod db;
mod error;
mod models;
mod repository;
mod table;

pub use config::{StoreConfig, WriteMode, DEFAULT_TABLE};
pub use db::Database;
pub use error::StoreError;
pub use models::{AuthOutcome, CredentialRecord};
pub use repository::{PasswordStore, SqlitePasswordStore};
pub use table::CredentialTable;
