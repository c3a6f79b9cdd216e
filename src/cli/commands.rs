// Sqlauth - CLI Command Handlers
//
// Each function handles one CLI subcommand against a store opened from the
// global flags. `verify` is a login boundary: it prints only the generic
// outcome message, never the reason a login failed.

use std::io::BufRead;
use std::path::PathBuf;

use zeroize::Zeroizing;

use crate::error::SqlauthError;
use crate::hashing::{HashAlgorithm, HashingConfig};
use crate::store::{
    AuthOutcome, Database, PasswordStore, SqlitePasswordStore, StoreConfig, WriteMode,
};

use super::{Cli, Commands};

/// Exit code for a rejected or indeterminate `verify`.
const EXIT_REJECTED: i32 = 1;

/// Default directory for sqlauth data files.
fn data_dir() -> PathBuf {
    let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("sqlauth")
}

/// Path to the database file.
fn db_path(cli: &Cli) -> PathBuf {
    cli.db
        .clone()
        .unwrap_or_else(|| data_dir().join("sqlauth.db"))
}

/// Store configuration derived from the global flags.
pub(crate) fn build_config(cli: &Cli) -> Result<StoreConfig, SqlauthError> {
    let mut hashing = HashingConfig {
        algorithm: cli.algorithm,
        ..HashingConfig::default()
    };
    if let Some(cost) = cli.cost {
        if cli.algorithm != HashAlgorithm::Bcrypt {
            return Err(SqlauthError::Other("--cost applies to bcrypt only".into()));
        }
        hashing.bcrypt_cost = cost;
    }

    let write_mode = if cli.serialized {
        WriteMode::Serialized
    } else {
        WriteMode::Upsert
    };

    Ok(StoreConfig::new()
        .table(cli.table.clone())
        .write_mode(write_mode)
        .hide_unknown_identities(cli.hide_unknown)
        .hashing(hashing))
}

/// Take the password from the flag, or else one line of `input`.
pub(crate) fn read_password(
    flag: Option<String>,
    input: &mut impl BufRead,
) -> Result<Zeroizing<String>, SqlauthError> {
    if let Some(password) = flag {
        return Ok(Zeroizing::new(password));
    }

    let mut line = Zeroizing::new(String::new());
    if input.read_line(&mut line)? == 0 {
        return Err(SqlauthError::Other("no password given on stdin".into()));
    }
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(line)
}

fn open_db(cli: &Cli) -> Result<(Database, PathBuf), SqlauthError> {
    let path = db_path(cli);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let db = Database::open(&path)?;
    Ok((db, path))
}

fn stdin_password(flag: Option<String>) -> Result<Zeroizing<String>, SqlauthError> {
    read_password(flag, &mut std::io::stdin().lock())
}

/// Execute the parsed CLI command. Returns the process exit code.
pub fn execute(cli: Cli) -> Result<i32, SqlauthError> {
    let config = build_config(&cli)?;
    let (db, path) = open_db(&cli)?;
    let store = SqlitePasswordStore::open(&db, config)?;

    match cli.command {
        Commands::Init => {
            println!("✓ Credential store ready at {}", path.display());
            Ok(0)
        }
        Commands::Set { identity, password } => {
            let password = stdin_password(password)?;
            cmd_set(&store, &identity, &password)
        }
        Commands::Verify { identity, password } => {
            let password = stdin_password(password)?;
            Ok(cmd_verify(&store, &identity, &password))
        }
        Commands::Get { identity } => cmd_get(&store, &identity),
    }
}

fn cmd_set(
    store: &SqlitePasswordStore<'_>,
    identity: &str,
    password: &str,
) -> Result<i32, SqlauthError> {
    store.set(identity, password)?;
    println!("✓ Password set for {}", identity);
    Ok(0)
}

fn cmd_verify(store: &SqlitePasswordStore<'_>, identity: &str, password: &str) -> i32 {
    let result = store.authenticate(identity, password);
    let outcome = AuthOutcome::from_result(&result);

    // The operator sees the cause in the log; the output stays generic.
    if let (AuthOutcome::Unavailable, Err(e)) = (outcome, &result) {
        tracing::error!(error = %e, "Authentication could not be completed");
    }

    println!("{}", outcome);
    if outcome.is_authenticated() {
        0
    } else {
        EXIT_REJECTED
    }
}

fn cmd_get(store: &SqlitePasswordStore<'_>, identity: &str) -> Result<i32, SqlauthError> {
    let record = store.record(identity)?;

    println!("Identity:   {}", record.identity);
    println!("Updated:    {}", record.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Digest:     {}", String::from_utf8_lossy(record.digest()));
    Ok(0)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
