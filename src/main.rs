//! Wallet Ledger CLI
//!
//! Command-line interface for replaying wallet ledger operations from CSV
//! files and reporting the resulting account balances.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- ops.csv > summaries.csv
//! cargo run -- --events stripe_events.csv ops.csv > summaries.csv
//! cargo run -- --events stripe_events.csv --batch-size 2000 --max-concurrent 8 ops.csv
//! ```
//!
//! The program replays the ops file strictly in order (registrations,
//! deposits, transfers, inline provider credits), then ingests the optional
//! provider-events file concurrently, and writes one summary row per
//! account to stdout.
//!
//! Structured logs go to stderr and are controlled with `RUST_LOG`, e.g.
//! `RUST_LOG=wallet_ledger=debug`.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use std::process;

use tracing_subscriber::EnvFilter;

use wallet_ledger::cli;
use wallet_ledger::replay;

fn main() {
    // Logs to stderr so stdout stays clean CSV
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();
    let config = args.to_ingest_config();

    let mut output = std::io::stdout();
    if let Err(e) = replay::run(
        &args.ops_file,
        args.events_file.as_deref(),
        &config,
        args.recent,
        &mut output,
    ) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
