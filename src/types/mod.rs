//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: wallet identity types
//! - `transaction`: immutable ledger entry types
//! - `resolution`: recipient classification types
//! - `error`: error taxonomy

pub mod account;
pub mod error;
pub mod resolution;
pub mod transaction;

pub use account::{Account, AccountId, NewAccount};
pub use error::LedgerError;
pub use resolution::{RecipientKind, Resolution};
pub use transaction::{
    Direction, Transaction, TransactionDraft, TransactionId, TransactionMeta, TransactionStatus,
    DEFAULT_CURRENCY,
};
