//! Append-only ledger store and balance derivation
//!
//! This module provides the `LedgerStore`, the source of truth for balances.
//! Entries are appended, never mutated or deleted; a balance is derived by
//! folding an account's history (`+amount` for credits, `-amount` for
//! debits). Corrections are compensating entries, not edits.
//!
//! # Thread Safety
//!
//! Per-account entry lists live in a `DashMap`, so appends to different
//! accounts proceed concurrently while appends to the same account serialize
//! on its entry lock. Readers see an entry list that is always consistent
//! as of some point; slightly stale reads are acceptable everywhere except
//! the solvency check, which the engine serializes with its own per-sender
//! lock.
//!
//! # Idempotency
//!
//! The `(provider, reference)` pair is unique among externally funded
//! entries. The uniqueness check and the index insertion are a single atomic
//! step through the DashMap entry API, so two concurrent deliveries of the
//! same provider event cannot both append: the loser observes the occupied
//! entry and reports the duplicate. This is deliberately a storage-level
//! invariant rather than an application lock, since webhook retries may
//! arrive on different workers.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::types::{
    AccountId, Direction, LedgerError, Transaction, TransactionDraft, TransactionId,
    TransactionStatus,
};

/// Outcome of an externally funded append
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalAppend {
    /// The entry was appended; first delivery of this reference
    Appended(Transaction),

    /// The (provider, reference) pair was already recorded; nothing written
    DuplicateReference(TransactionId),
}

/// Append-only transaction store
///
/// Safe to share behind an `Arc` and call from many threads.
#[derive(Debug, Default)]
pub struct LedgerStore {
    /// Ledger entry id assignment counter
    next_id: AtomicU64,

    /// Per-account entry lists, append order preserved
    entries: DashMap<AccountId, Vec<Transaction>>,

    /// Unique index of (provider, reference) to the entry it created
    provider_refs: DashMap<(String, String), TransactionId>,
}

impl LedgerStore {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry, assigning its id and timestamp
    ///
    /// The append is atomic with respect to readers of this account: a
    /// balance fold sees the entry either fully present or not at all.
    pub fn append(&self, draft: TransactionDraft) -> Transaction {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;

        let transaction = Transaction {
            id,
            account: draft.account,
            direction: draft.direction,
            amount: draft.amount,
            currency: draft.currency,
            label: draft.label,
            provider: draft.provider,
            reference: draft.reference,
            status: draft.status,
            created_at: Utc::now(),
            meta: draft.meta,
        };

        self.entries
            .entry(draft.account)
            .or_default()
            .push(transaction.clone());

        transaction
    }

    /// Append an externally funded credit, deduplicated by (provider, reference)
    ///
    /// If the pair was already recorded, nothing is written and the existing
    /// entry id is reported. A race between two concurrent deliveries is
    /// resolved here: the second claim fails on the occupied index entry.
    pub fn append_external(
        &self,
        draft: TransactionDraft,
        provider: &str,
        reference: &str,
    ) -> ExternalAppend {
        let key = (provider.to_string(), reference.to_string());

        match self.provider_refs.entry(key) {
            Entry::Occupied(occupied) => ExternalAppend::DuplicateReference(*occupied.get()),
            Entry::Vacant(vacant) => {
                // The vacant entry is held while we append, so no other
                // delivery of this reference can get past the claim.
                let transaction = self.append(TransactionDraft {
                    provider: Some(provider.to_string()),
                    reference: Some(reference.to_string()),
                    ..draft
                });
                vacant.insert(transaction.id);
                ExternalAppend::Appended(transaction)
            }
        }
    }

    /// Derive an account's balance from its full history
    ///
    /// Folds every `Succeeded` entry with checked arithmetic. This is the
    /// only balance a solvency decision may use; the windowed summary view
    /// is a display optimization.
    pub fn balance(&self, account: AccountId) -> Result<Decimal, LedgerError> {
        let Some(entries) = self.entries.get(&account) else {
            return Ok(Decimal::ZERO);
        };

        let mut balance = Decimal::ZERO;
        for entry in entries.iter() {
            if entry.status != TransactionStatus::Succeeded {
                continue;
            }
            balance = match entry.direction {
                Direction::Credit => balance.checked_add(entry.amount),
                Direction::Debit => balance.checked_sub(entry.amount),
            }
            .ok_or_else(|| LedgerError::arithmetic_overflow("balance", account))?;
        }

        Ok(balance)
    }

    /// The most recent entries for an account, newest first
    pub fn recent(&self, account: AccountId, limit: usize) -> Vec<Transaction> {
        self.entries
            .get(&account)
            .map(|entries| entries.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Number of entries recorded for an account
    pub fn count(&self, account: AccountId) -> usize {
        self.entries.get(&account).map(|e| e.len()).unwrap_or(0)
    }
}
