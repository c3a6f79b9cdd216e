// Sqlauth - Store configuration

use serde::{Deserialize, Serialize};

use crate::hashing::HashingConfig;

/// Default name of the credential table.
pub const DEFAULT_TABLE: &str = "auth_password";

/// How `set` makes its insert-or-update atomic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// `INSERT ... ON CONFLICT(identity) DO UPDATE` in one statement.
    #[default]
    Upsert,
    /// Count, then insert or update, under the per-identity lock.
    /// For storage that lacks a native upsert.
    Serialized,
}

/// Configuration for [`SqlitePasswordStore`](super::SqlitePasswordStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Credential table name. Must be a plain SQL identifier.
    pub table: String,

    pub write_mode: WriteMode,

    /// Report unknown identities from `authenticate` as a plain rejection
    /// (`Ok(false)`) instead of `NotFound`, so the error channel cannot be
    /// used to enumerate identities.
    pub hide_unknown_identities: bool,

    /// Prune idle per-identity locks once the lock table holds more than
    /// this many entries. `None` keeps every entry.
    pub lock_prune_threshold: Option<usize>,

    pub hashing: HashingConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            write_mode: WriteMode::default(),
            hide_unknown_identities: false,
            lock_prune_threshold: None,
            hashing: HashingConfig::default(),
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = name.into();
        self
    }

    pub fn write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    pub fn hide_unknown_identities(mut self, hide: bool) -> Self {
        self.hide_unknown_identities = hide;
        self
    }

    pub fn lock_prune_threshold(mut self, threshold: Option<usize>) -> Self {
        self.lock_prune_threshold = threshold;
        self
    }

    pub fn hashing(mut self, hashing: HashingConfig) -> Self {
        self.hashing = hashing;
        self
    }
}
