// Sqlauth - CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: init, set, verify, get.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::hashing::HashAlgorithm;

pub use commands::execute;

/// Sqlauth: salted password credentials in SQLite.
#[derive(Parser, Debug)]
#[command(name = "sqlauth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Database file (defaults to the user data directory).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Credential table name.
    #[arg(long, global = true, default_value = crate::store::DEFAULT_TABLE)]
    pub table: String,

    /// Hashing algorithm for new passwords.
    #[arg(long, global = true, value_enum, default_value_t = HashAlgorithm::Bcrypt)]
    pub algorithm: HashAlgorithm,

    /// bcrypt cost factor (4-31). Rejected with `--algorithm argon2id`.
    #[arg(long, global = true)]
    pub cost: Option<u32>,

    /// Use count-then-write under a per-identity lock instead of a native upsert.
    #[arg(long, global = true)]
    pub serialized: bool,

    /// Report unknown identities as a plain authentication failure.
    #[arg(long, global = true)]
    pub hide_unknown: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and credential table.
    Init,

    /// Set (or replace) the password for an identity.
    Set {
        identity: String,

        /// The password. Read from one line of stdin when omitted, which
        /// keeps it out of shell history.
        #[arg(long)]
        password: Option<String>,
    },

    /// Check a password. Exits 0 only when it matches.
    Verify {
        identity: String,

        #[arg(long)]
        password: Option<String>,
    },

    /// Show the stored record for an identity.
    Get { identity: String },
}
