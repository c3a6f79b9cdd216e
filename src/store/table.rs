// Sqlauth - Credential Table
//
// Schema and queries for the `identity -> digest` mapping. The identity is
// the sole primary key, so the table holds at most one digest per identity.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::db::Database;
use super::models::CredentialRecord;
use super::StoreError;

/// Longest accepted table name.
const MAX_TABLE_NAME_LEN: usize = 63;

/// SQL text for one table name, built once at construction.
struct Queries {
    create: String,
    count: String,
    insert: String,
    update: String,
    upsert: String,
    select_digest: String,
    select_record: String,
}

impl Queries {
    fn for_table(t: &str) -> Self {
        Self {
            create: format!(
                "CREATE TABLE IF NOT EXISTS {t} (
                    identity    TEXT NOT NULL PRIMARY KEY,
                    digest      BLOB NOT NULL,
                    updated_at  TEXT NOT NULL
                )"
            ),
            count: format!("SELECT COUNT(*) FROM {t} WHERE identity = ?1"),
            insert: format!(
                "INSERT INTO {t} (identity, digest, updated_at) VALUES (?1, ?2, ?3)"
            ),
            update: format!("UPDATE {t} SET digest = ?2, updated_at = ?3 WHERE identity = ?1"),
            upsert: format!(
                "INSERT INTO {t} (identity, digest, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(identity) DO UPDATE
                 SET digest = excluded.digest, updated_at = excluded.updated_at"
            ),
            select_digest: format!("SELECT digest FROM {t} WHERE identity = ?1"),
            select_record: format!("SELECT digest, updated_at FROM {t} WHERE identity = ?1"),
        }
    }
}

/// Accepts `[A-Za-z_][A-Za-z0-9_]*`, the names that are safe to splice
/// into SQL text unquoted.
fn validate_table_name(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest || name.len() > MAX_TABLE_NAME_LEN {
        return Err(StoreError::Config(format!(
            "invalid credential table name: {:?}",
            name
        )));
    }
    Ok(())
}

pub struct CredentialTable<'a> {
    db: &'a Database,
    name: String,
    sql: Queries,
}

impl<'a> CredentialTable<'a> {
    pub fn new(db: &'a Database, name: &str) -> Result<Self, StoreError> {
        validate_table_name(name)?;
        Ok(Self {
            db,
            name: name.to_string(),
            sql: Queries::for_table(name),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create the table if it does not exist yet.
    pub fn ensure_schema(&self) -> Result<(), rusqlite::Error> {
        self.db.conn().execute_batch(&self.sql.create)?;
        tracing::debug!(table = %self.name, "Credential table ready");
        Ok(())
    }

    pub fn count_by_identity(&self, identity: &str) -> Result<i64, StoreError> {
        let n = self
            .db
            .conn()
            .query_row(&self.sql.count, params![identity], |row| row.get(0))?;
        Ok(n)
    }

    /// Add a row. Fails if the identity already has one.
    pub fn insert(&self, identity: &str, digest: &[u8]) -> Result<(), StoreError> {
        self.db
            .conn()
            .execute(&self.sql.insert, params![identity, digest, now()])?;
        Ok(())
    }

    /// Replace the digest of an existing row. Returns the number of rows
    /// changed (0 when the identity is unknown).
    pub fn update(&self, identity: &str, digest: &[u8]) -> Result<usize, StoreError> {
        let changed = self
            .db
            .conn()
            .execute(&self.sql.update, params![identity, digest, now()])?;
        Ok(changed)
    }

    /// Insert or replace the row for `identity` in a single statement.
    pub fn upsert(&self, identity: &str, digest: &[u8]) -> Result<(), StoreError> {
        self.db
            .conn()
            .execute(&self.sql.upsert, params![identity, digest, now()])?;
        Ok(())
    }

    /// Current digest for `identity`, or `NotFound`.
    pub fn select_digest(&self, identity: &str) -> Result<Vec<u8>, StoreError> {
        self.db
            .conn()
            .query_row(&self.sql.select_digest, params![identity], |row| row.get(0))
            .optional()?
            .ok_or_else(|| StoreError::NotFound(identity.to_string()))
    }

    pub fn select_record(&self, identity: &str) -> Result<CredentialRecord, StoreError> {
        self.db
            .conn()
            .query_row(&self.sql.select_record, params![identity], |row| {
                let digest: Vec<u8> = row.get(0)?;
                let updated_at_str: String = row.get(1)?;

                let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            1,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;

                Ok(CredentialRecord::new(identity.to_string(), digest, updated_at))
            })
            .optional()?
            .ok_or_else(|| StoreError::NotFound(identity.to_string()))
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
