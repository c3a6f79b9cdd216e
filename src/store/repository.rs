// Sqlauth - Password Store
//
// Composes the hashing capability, the credential table and the keyed lock
// registry into `set` / `get` / `authenticate`.
//
// `authenticate` has three outcomes:
//   Ok(true)   password matches
//   Ok(false)  password does not match (not an error)
//   Err(_)     unknown identity, storage fault or unverifiable digest

use std::sync::Arc;

use crate::hashing::CredentialHasher;
use crate::lock::KeyedMutex;

use super::config::{StoreConfig, WriteMode};
use super::db::Database;
use super::models::CredentialRecord;
use super::table::CredentialTable;
use super::StoreError;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over password credential storage.
pub trait PasswordStore {
    /// Hash `password` and make it the current credential for `identity`,
    /// creating the record on first use.
    fn set(&self, identity: &str, password: &str) -> Result<(), StoreError>;

    /// The stored digest for `identity`.
    fn get(&self, identity: &str) -> Result<Vec<u8>, StoreError>;

    /// Check `password` against the stored digest for `identity`.
    fn authenticate(&self, identity: &str, password: &str) -> Result<bool, StoreError>;
}

// ─── SQLite Implementation ──────────────────────────────────────────────────

pub struct SqlitePasswordStore<'a> {
    table: CredentialTable<'a>,
    locks: Arc<KeyedMutex>,
    hasher: Box<dyn CredentialHasher>,
    config: StoreConfig,
}

impl<'a> SqlitePasswordStore<'a> {
    /// Open a store over `db`, creating the credential table if needed.
    pub fn open(db: &'a Database, config: StoreConfig) -> Result<Self, StoreError> {
        let hasher = config
            .hashing
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;
        Self::with_hasher(db, config, hasher)
    }

    /// Like [`open`](Self::open) but with a caller-supplied hasher; the
    /// `hashing` section of `config` is ignored.
    pub fn with_hasher(
        db: &'a Database,
        config: StoreConfig,
        hasher: Box<dyn CredentialHasher>,
    ) -> Result<Self, StoreError> {
        let table = CredentialTable::new(db, &config.table)?;
        table.ensure_schema().map_err(StoreError::Init)?;

        tracing::debug!(
            table = %table.name(),
            mode = ?config.write_mode,
            "Password store opened"
        );

        Ok(Self {
            table,
            locks: Arc::new(KeyedMutex::new()),
            hasher,
            config,
        })
    }

    /// Share a lock registry with other stores writing to the same table.
    pub fn with_lock_registry(mut self, locks: Arc<KeyedMutex>) -> Self {
        self.locks = locks;
        self
    }

    pub fn lock_registry(&self) -> &Arc<KeyedMutex> {
        &self.locks
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The full record (digest and last write time) for `identity`.
    pub fn record(&self, identity: &str) -> Result<CredentialRecord, StoreError> {
        self.table.select_record(identity)
    }

    /// Count, then insert or update, while holding the identity's lock.
    /// Without the lock two first-time writers could both see a count of
    /// zero and race to insert.
    fn write_serialized(&self, identity: &str, digest: &[u8]) -> Result<(), StoreError> {
        {
            let _guard = self.locks.lock(identity);

            // A row removed between the count and the update leaves nothing
            // to update; write it fresh instead of reporting a write that
            // did not happen.
            if self.table.count_by_identity(identity)? == 0
                || self.table.update(identity, digest)? == 0
            {
                self.table.insert(identity, digest)?;
            }
        }

        self.prune_locks();
        Ok(())
    }

    fn prune_locks(&self) {
        if let Some(threshold) = self.config.lock_prune_threshold {
            if self.locks.len() > threshold {
                let pruned = self.locks.prune_idle();
                tracing::debug!(pruned, "Pruned idle identity locks");
            }
        }
    }
}

impl<'a> PasswordStore for SqlitePasswordStore<'a> {
    fn set(&self, identity: &str, password: &str) -> Result<(), StoreError> {
        // Hash before touching storage so a rejected password writes nothing.
        let digest = self.hasher.hash(password).map_err(StoreError::Hashing)?;

        match self.config.write_mode {
            WriteMode::Upsert => self.table.upsert(identity, &digest)?,
            WriteMode::Serialized => self.write_serialized(identity, &digest)?,
        }

        tracing::info!(identity = %identity, "Password set");
        Ok(())
    }

    fn get(&self, identity: &str) -> Result<Vec<u8>, StoreError> {
        self.table.select_digest(identity)
    }

    fn authenticate(&self, identity: &str, password: &str) -> Result<bool, StoreError> {
        let digest = match self.get(identity) {
            Ok(digest) => digest,
            Err(StoreError::NotFound(_)) if self.config.hide_unknown_identities => {
                return Ok(false)
            }
            Err(e) => return Err(e),
        };

        self.hasher
            .verify(&digest, password)
            .map_err(StoreError::Verification)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
