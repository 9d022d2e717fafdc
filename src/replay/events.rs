//! Concurrent provider-event ingestion
//!
//! Provider webhook deliveries are independent and idempotent, so a batch of
//! them can be ingested concurrently: ordering carries no meaning and the
//! ledger's (provider, reference) uniqueness claim resolves duplicate
//! deliveries regardless of interleaving. Batches are read sequentially;
//! within a batch, every event gets its own task.

use std::sync::Arc;

use tracing::{info, warn};

use crate::core::reconciler::{ExternalCreditReconciler, ProviderEvent, ReconcileOutcome};

/// Outcome counters for one ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Events that appended a credit
    pub credited: usize,
    /// Duplicate deliveries acknowledged without a write
    pub duplicates: usize,
    /// Malformed or unverifiable events rejected
    pub rejected: usize,
}

/// Ingests provider events concurrently through a shared reconciler
#[derive(Debug, Clone)]
pub struct EventIngestor {
    reconciler: Arc<ExternalCreditReconciler>,
}

impl EventIngestor {
    pub fn new(reconciler: Arc<ExternalCreditReconciler>) -> Self {
        Self { reconciler }
    }

    /// Ingest one batch, spawning a task per event
    ///
    /// All events are attempted even when some fail; failures are counted
    /// and logged, never propagated, since a webhook endpoint acknowledges
    /// what it can and rejects per delivery.
    pub async fn process_batch(&self, batch: Vec<ProviderEvent>) -> IngestStats {
        let mut tasks = Vec::with_capacity(batch.len());
        for event in batch {
            let reconciler = Arc::clone(&self.reconciler);
            tasks.push(tokio::spawn(async move {
                let outcome = reconciler.reconcile(&event);
                (event, outcome)
            }));
        }

        let mut stats = IngestStats::default();
        for task in tasks {
            match task.await {
                Ok((_, Ok(ReconcileOutcome::Credited(_)))) => stats.credited += 1,
                Ok((_, Ok(ReconcileOutcome::AlreadyProcessed))) => stats.duplicates += 1,
                Ok((event, Err(e))) => {
                    stats.rejected += 1;
                    warn!(
                        code = e.code(),
                        provider = event.provider.as_str(),
                        reference = event.reference.as_str(),
                        "provider event rejected: {}",
                        e
                    );
                }
                Err(e) => {
                    stats.rejected += 1;
                    warn!("ingestion task panicked: {:?}", e);
                }
            }
        }

        stats
    }

    /// Log a finished run
    pub fn report(total: IngestStats) {
        info!(
            credited = total.credited,
            duplicates = total.duplicates,
            rejected = total.rejected,
            "provider event ingestion finished"
        );
    }
}

impl IngestStats {
    pub fn merge(&mut self, other: IngestStats) {
        self.credited += other.credited;
        self.duplicates += other.duplicates;
        self.rejected += other.rejected;
    }
}
