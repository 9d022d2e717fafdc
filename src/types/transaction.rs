//! Transaction-related types for the wallet ledger
//!
//! This module defines the immutable ledger entry and its supporting
//! enumerations. A transaction is never mutated or deleted once appended;
//! corrections are made by appending a compensating entry.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AccountId;

/// Ledger entry identifier
///
/// Assigned by the ledger store from a monotonic counter.
pub type TransactionId = u64;

/// Default currency for ledger entries
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Direction of a ledger entry
///
/// The stored amount is always positive; the sign of an entry is derived
/// from its direction, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Funds entering the account (deposit, incoming transfer, provider credit)
    Credit,

    /// Funds leaving the account (outgoing transfer)
    Debit,
}

/// Settlement status of a ledger entry
///
/// Only `Succeeded` entries participate in balance derivation. The core
/// writes `Succeeded` entries exclusively; `Pending` and `Failed` exist for
/// entries recorded around asynchronous provider settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Succeeded,
    Failed,
}

/// Audit metadata attached to transfer legs
///
/// The recipient input is free text classified at runtime; the outcome of
/// that classification is recorded as a tagged variant rather than loose
/// strings so that audit consumers get typed data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionMeta {
    /// Attached to the debit leg of a transfer
    OutgoingTransfer {
        /// Classification of the recipient input (email, phone, username, raw)
        recipient_kind: String,
        /// Normalized value used for the lookup
        recipient_value: String,
        /// Matched account, if any (None for off-platform recipients)
        recipient_account: Option<AccountId>,
    },

    /// Attached to the credit leg of a transfer
    IncomingTransfer {
        /// The account that sent the funds
        sender_account: AccountId,
        /// Sender email at transfer time, for display
        sender_email: Option<String>,
        /// Sender phone at transfer time, for display
        sender_phone: Option<String>,
    },
}

/// One immutable ledger entry
///
/// The pair (provider, reference) is unique among entries where the
/// reference is present; this is the sole idempotency guard against
/// duplicate external-payment credits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// Ledger entry identifier
    pub id: TransactionId,

    /// The account this entry belongs to
    pub account: AccountId,

    /// Credit or debit; the sign of the entry
    pub direction: Direction,

    /// Amount, always positive, at most two decimal places
    pub amount: Decimal,

    /// ISO 4217 currency code
    pub currency: String,

    /// Human-readable label
    pub label: String,

    /// External payment provider name, if this entry was externally funded
    pub provider: Option<String>,

    /// Provider-assigned reference (event/charge id)
    pub reference: Option<String>,

    /// Settlement status
    pub status: TransactionStatus,

    /// Creation timestamp, assigned by the store
    pub created_at: DateTime<Utc>,

    /// Optional audit metadata (transfer legs only)
    pub meta: Option<TransactionMeta>,
}

impl Transaction {
    /// Signed amount for display: credits positive, debits negative
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Credit => self.amount,
            Direction::Debit => -self.amount,
        }
    }
}

/// Draft of a ledger entry, before the store assigns id and timestamp
///
/// This is the only way new entries reach the ledger; clients never
/// construct a [`Transaction`] directly.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub account: AccountId,
    pub direction: Direction,
    pub amount: Decimal,
    pub currency: String,
    pub label: String,
    pub provider: Option<String>,
    pub reference: Option<String>,
    pub status: TransactionStatus,
    pub meta: Option<TransactionMeta>,
}

impl TransactionDraft {
    /// Draft a succeeded credit with no provider attribution
    pub fn credit(account: AccountId, amount: Decimal, currency: &str, label: &str) -> Self {
        Self {
            account,
            direction: Direction::Credit,
            amount,
            currency: currency.to_string(),
            label: label.to_string(),
            provider: None,
            reference: None,
            status: TransactionStatus::Succeeded,
            meta: None,
        }
    }

    /// Draft a succeeded debit
    pub fn debit(account: AccountId, amount: Decimal, currency: &str, label: &str) -> Self {
        Self {
            direction: Direction::Debit,
            ..Self::credit(account, amount, currency, label)
        }
    }

    /// Attach audit metadata
    pub fn with_meta(mut self, meta: TransactionMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}
