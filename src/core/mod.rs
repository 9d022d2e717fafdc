//! Core business logic module
//!
//! This module contains the ledger and transfer components:
//! - `directory` - account identities and unique identifier indexes
//! - `ledger` - append-only transaction store and balance derivation
//! - `resolver` - recipient classification and lookup
//! - `engine` - deposit/transfer/summary orchestration
//! - `reconciler` - exactly-once crediting of provider events

pub mod directory;
pub mod engine;
pub mod ledger;
pub mod reconciler;
pub mod resolver;

pub use directory::AccountDirectory;
pub use engine::{AccountSummary, SummaryLine, TransferReceipt, WalletEngine, SUMMARY_WINDOW};
pub use ledger::{ExternalAppend, LedgerStore};
pub use reconciler::{ExternalCreditReconciler, ProviderEvent, ReconcileOutcome};
pub use resolver::RecipientResolver;
