//! External-credit reconciliation
//!
//! This module consumes succeeded-payment events from the card-payment
//! provider and credits the paying account exactly once. The provider
//! delivers events at least once, so the reconciler must treat a duplicate
//! delivery as an idempotent acknowledgement, never as a second credit and
//! never as an error: `AlreadyProcessed` is success-shaped so the caller can
//! acknowledge the provider and stop its retries.
//!
//! Provider amounts arrive in minor units (integer cents) and are converted
//! to the ledger's major-unit decimal representation before persisting.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::core::directory::AccountDirectory;
use crate::core::ledger::{ExternalAppend, LedgerStore};
use crate::types::{AccountId, LedgerError, TransactionDraft, TransactionId};

/// A succeeded-charge notification from the payment provider
///
/// Carries everything the core consumes from the provider: the amount in
/// minor units, the currency, the provider-assigned event reference, and the
/// paying account id (passed through as charge metadata at creation time,
/// outside this core's scope).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderEvent {
    /// Provider name (e.g. "stripe")
    pub provider: String,
    /// Provider-assigned event/charge reference, unique per event
    pub reference: String,
    /// Amount in minor units (integer cents)
    pub amount_minor: i64,
    /// Currency code as reported by the provider
    pub currency: String,
    /// The paying account
    pub account: AccountId,
}

/// Outcome of reconciling one provider event
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// First delivery: one credit was appended
    Credited(TransactionId),

    /// Duplicate delivery: the reference was already recorded, nothing written
    AlreadyProcessed,
}

/// Credits provider events into the ledger, exactly once per reference
#[derive(Debug, Clone)]
pub struct ExternalCreditReconciler {
    directory: Arc<AccountDirectory>,
    ledger: Arc<LedgerStore>,
}

impl ExternalCreditReconciler {
    pub fn new(directory: Arc<AccountDirectory>, ledger: Arc<LedgerStore>) -> Self {
        Self { directory, ledger }
    }

    /// Reconcile one succeeded-payment event
    ///
    /// Malformed or unattributable events are rejected without processing;
    /// the provider must not retry those. Duplicate references return
    /// [`ReconcileOutcome::AlreadyProcessed`] with no write, including under
    /// concurrent delivery, where the storage-level uniqueness claim decides
    /// the winner.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::ProviderEventUnverifiable`] if the provider or
    ///   reference is blank, the amount is not positive, or the paying
    ///   account is unknown
    pub fn reconcile(&self, event: &ProviderEvent) -> Result<ReconcileOutcome, LedgerError> {
        let provider = event.provider.trim();
        if provider.is_empty() {
            return Err(LedgerError::unverifiable_event("missing provider"));
        }

        let reference = event.reference.trim();
        if reference.is_empty() {
            return Err(LedgerError::unverifiable_event("missing reference"));
        }

        if event.amount_minor <= 0 {
            return Err(LedgerError::unverifiable_event("non-positive amount"));
        }

        if !self.directory.contains(event.account) {
            return Err(LedgerError::unverifiable_event("unknown paying account"));
        }

        // Minor units to major: 1050 cents -> 10.50
        let amount = Decimal::new(event.amount_minor, 2);
        let currency = event.currency.trim().to_uppercase();
        let label = format!("Deposit via {}", provider);

        let draft = TransactionDraft::credit(event.account, amount, &currency, &label);

        match self.ledger.append_external(draft, provider, reference) {
            ExternalAppend::Appended(tx) => Ok(ReconcileOutcome::Credited(tx.id)),
            ExternalAppend::DuplicateReference(existing) => {
                debug!(
                    provider,
                    reference, existing, "duplicate provider event acknowledged"
                );
                Ok(ReconcileOutcome::AlreadyProcessed)
            }
        }
    }
}
