// Sqlauth - Application Entry Point
//
// Parses CLI arguments, initializes structured logging and dispatches to the
// command handler. Passwords and digests are never logged at any level.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sqlauth::cli::{execute, Cli};

fn main() {
    // RUST_LOG=sqlauth=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sqlauth=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match execute(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}
