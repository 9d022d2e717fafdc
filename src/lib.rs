//! Wallet Ledger Library
//! # Overview
//!
//! This library provides a custodial wallet balance ledger: an append-only
//! transaction store with derived balances, flexible recipient resolution,
//! a transfer engine, and idempotent crediting of external payment-provider
//! events.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Transaction, errors)
//! - [`cli`] - CLI argument parsing
//! - [`core`] - Business logic components:
//!   - [`core::directory`] - Account registry with unique identifier indexes
//!   - [`core::ledger`] - Append-only transaction store and derived balances
//!   - [`core::resolver`] - Recipient string classification and lookup
//!   - [`core::engine`] - Deposit, transfer and summary orchestration
//!   - [`core::reconciler`] - Idempotent external payment crediting
//! - [`io`] - CSV reading and summary output
//! - [`replay`] - Sequential ops replay and concurrent event ingestion
//!
//! # Ledger Model
//!
//! Balances are never stored. Every money movement is an immutable
//! transaction row (a credit or a debit), and an account's balance is the
//! fold of its succeeded transactions. A transfer writes a debit for the
//! sender and, when the recipient resolves to a known account, a paired
//! credit for the recipient.
//!
//! # Recipient Resolution
//!
//! Transfer recipients are free-form strings classified in a fixed order:
//! `@handle` username lookup, then email shape, then phone shape (with
//! normalization), then raw free text. Identifiable recipients with no
//! matching account are rejected; raw recipients are accepted debit-only.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod replay;
pub mod types;

pub use core::{
    AccountDirectory, AccountSummary, ExternalCreditReconciler, LedgerStore, ProviderEvent,
    ReconcileOutcome, RecipientResolver, TransferReceipt, WalletEngine, SUMMARY_WINDOW,
};
pub use io::write_summaries_csv;
pub use types::{
    Account, AccountId, Direction, LedgerError, NewAccount, RecipientKind, Resolution,
    Transaction, TransactionId, TransactionStatus,
};
