//! Replay pipeline
//!
//! The replay tool drives the ledger core from CSV files: an ops file
//! (register/deposit/transfer/provider-credit rows) applied strictly in
//! file order, and an optional provider-events file ingested concurrently
//! in batches. Final per-account summaries are written as CSV.
//!
//! # Ordering
//!
//! Ops are a recorded request log: deposits fund later transfers, transfers
//! reference accounts registered earlier, so the ops file replays
//! sequentially. Provider events carry no ordering (webhook deliveries are
//! unordered and idempotent), which is exactly why they may be ingested
//! concurrently.
//!
//! # Error Handling
//!
//! Fatal errors (file not found, runtime construction) abort the run.
//! Per-record failures - malformed rows, rejected ops, unverifiable
//! events - are logged at `warn` and replay continues with the next record.

pub mod events;

pub use events::{EventIngestor, IngestStats};

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::directory::AccountDirectory;
use crate::core::engine::{AccountSummary, WalletEngine};
use crate::core::ledger::LedgerStore;
use crate::core::reconciler::ExternalCreditReconciler;
use crate::io::async_reader::EventReader;
use crate::io::csv_format::{write_summaries_csv, ReplayOp};
use crate::io::sync_reader::OpReader;
use crate::types::NewAccount;

/// Configuration for concurrent provider-event ingestion
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Number of events per batch
    pub batch_size: usize,
    /// Worker threads for the ingestion runtime
    pub max_concurrent: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent: num_cpus::get(),
        }
    }
}

impl IngestConfig {
    /// Create a config, falling back to defaults for zero values
    pub fn new(batch_size: usize, max_concurrent: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                "invalid batch_size (0), using default ({})",
                default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent = if max_concurrent == 0 {
            warn!(
                "invalid max_concurrent (0), using default ({})",
                default.max_concurrent
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self {
            batch_size,
            max_concurrent,
        }
    }
}

/// Run a full replay: ops in order, then events concurrently, then summaries
///
/// # Errors
///
/// Returns an error for fatal conditions only: unreadable input files,
/// runtime construction failure, or output write failure. Per-record
/// failures are logged and skipped.
pub fn run(
    ops_path: &Path,
    events_path: Option<&Path>,
    config: &IngestConfig,
    window: usize,
    output: &mut dyn Write,
) -> Result<(), String> {
    let directory = Arc::new(AccountDirectory::new());
    let ledger = Arc::new(LedgerStore::new());
    let engine = WalletEngine::new(Arc::clone(&directory), Arc::clone(&ledger));
    let reconciler = Arc::new(ExternalCreditReconciler::new(
        Arc::clone(&directory),
        Arc::clone(&ledger),
    ));

    replay_ops(ops_path, &engine, &reconciler)?;

    if let Some(events_path) = events_path {
        ingest_events(events_path, Arc::clone(&reconciler), config)?;
    }

    let summaries = collect_summaries(&engine, window)?;
    write_summaries_csv(&summaries, output)
}

/// Apply the ops file strictly in file order
fn replay_ops(
    ops_path: &Path,
    engine: &WalletEngine,
    reconciler: &ExternalCreditReconciler,
) -> Result<(), String> {
    let reader = OpReader::new(ops_path)?;

    for result in reader {
        let op = match result {
            Ok(op) => op,
            Err(e) => {
                warn!("skipping malformed op row: {}", e);
                continue;
            }
        };

        if let Err(e) = apply_op(&op, engine, reconciler) {
            warn!(code = e.code(), "op rejected: {}", e);
        }
    }

    Ok(())
}

fn apply_op(
    op: &ReplayOp,
    engine: &WalletEngine,
    reconciler: &ExternalCreditReconciler,
) -> Result<(), crate::types::LedgerError> {
    match op {
        ReplayOp::Register {
            email,
            phone,
            username,
        } => {
            let account = engine.directory().register(NewAccount {
                email: email.clone(),
                phone_number: phone.clone(),
                username: username.clone(),
            })?;
            debug!(account = account.id, "registered account");
        }

        ReplayOp::Deposit {
            account,
            amount,
            currency,
            method,
            option,
        } => {
            engine.deposit(
                *account,
                *amount,
                currency,
                method.as_deref(),
                option.as_deref(),
            )?;
        }

        ReplayOp::Transfer {
            account,
            recipient,
            amount,
            currency,
            label,
        } => {
            engine.transfer(*account, recipient, *amount, currency, label.as_deref())?;
        }

        ReplayOp::ProviderCredit(event) => {
            reconciler.reconcile(event)?;
        }
    }

    Ok(())
}

/// Ingest the provider-events file concurrently in batches
fn ingest_events(
    events_path: &Path,
    reconciler: Arc<ExternalCreditReconciler>,
    config: &IngestConfig,
) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.max_concurrent)
        .build()
        .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

    let batch_size = config.batch_size;
    let events_path = events_path.to_path_buf();

    runtime.block_on(async move {
        let file = tokio::fs::File::open(&events_path)
            .await
            .map_err(|e| format!("Failed to open file '{}': {}", events_path.display(), e))?;

        let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
        let mut reader = EventReader::new(compat_file);
        let ingestor = EventIngestor::new(reconciler);

        let mut total = IngestStats::default();
        loop {
            let batch = reader.read_batch(batch_size).await;
            if batch.is_empty() {
                break;
            }
            total.merge(ingestor.process_batch(batch).await);
        }

        EventIngestor::report(total);
        Ok(())
    })
}

fn collect_summaries(engine: &WalletEngine, window: usize) -> Result<Vec<AccountSummary>, String> {
    engine
        .directory()
        .get_all_accounts()
        .into_iter()
        .map(|account| {
            engine
                .summary(account.id, window)
                .map_err(|e| format!("Failed to summarize account {}: {}", account.id, e))
        })
        .collect()
}
