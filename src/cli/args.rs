use crate::core::engine::SUMMARY_WINDOW;
use crate::replay::IngestConfig;
use clap::Parser;
use std::path::PathBuf;

/// Replay wallet ledger operations and report account balances
#[derive(Parser, Debug)]
#[command(name = "wallet-ledger")]
#[command(about = "Replay wallet ledger operations and report account balances", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing ledger operations
    #[arg(value_name = "OPS", help = "Path to the ops CSV file")]
    pub ops_file: PathBuf,

    /// Optional provider-events CSV file, ingested concurrently after the ops
    #[arg(
        long = "events",
        value_name = "EVENTS",
        help = "Path to a provider-events CSV file ingested after the ops replay"
    )]
    pub events_file: Option<PathBuf>,

    /// Number of provider events per ingestion batch
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of provider events per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Worker threads for concurrent event ingestion
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Worker threads for event ingestion (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,

    /// Number of recent entries listed per account summary
    #[arg(
        long = "recent",
        value_name = "COUNT",
        default_value_t = SUMMARY_WINDOW,
        help = "Recent entries per account in the summary output"
    )]
    pub recent: usize,
}

impl CliArgs {
    /// Create an IngestConfig from CLI arguments
    ///
    /// Uses the CLI values when provided and falls back to defaults
    /// otherwise. Zero values fall back with a logged warning.
    ///
    /// # Returns
    ///
    /// An `IngestConfig` with values from CLI arguments or defaults.
    pub fn to_ingest_config(&self) -> IngestConfig {
        if self.batch_size.is_some() || self.max_concurrent.is_some() {
            let default = IngestConfig::default();
            IngestConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent.unwrap_or(default.max_concurrent),
            )
        } else {
            IngestConfig::default()
        }
    }
}
