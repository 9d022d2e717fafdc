//! Error types for the wallet ledger
//!
//! This module defines all errors that can occur in the ledger core and its
//! replay tooling. Every rejection carries a distinct, stable machine-readable
//! code (see [`LedgerError::code`]) so that callers can render a precise
//! message without string-matching prose.
//!
//! # Error Categories
//!
//! - **Precondition failures**: invalid amount, missing recipient, unknown
//!   sender, insufficient funds, self-transfer, unresolvable recipient.
//!   All detected before any write.
//! - **Registration failures**: identifier missing or already taken.
//! - **Provider event failures**: malformed or unverifiable events.
//! - **Infrastructure failures**: storage unavailable, arithmetic overflow,
//!   file I/O and CSV parsing in the replay layer.
//!
//! Note that a duplicate provider reference is *not* an error: the reconciler
//! reports it as `ReconcileOutcome::AlreadyProcessed`, success-shaped by
//! design.

use rust_decimal::Decimal;
use thiserror::Error;

use super::{AccountId, RecipientKind};

/// Main error type for the wallet ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Amount is zero, negative, or carries more than two decimal places
    ///
    /// Rejected before any write.
    #[error("Invalid amount '{amount}'")]
    InvalidAmount {
        /// The offending amount, as given
        amount: String,
    },

    /// Recipient string is empty or blank after trimming
    #[error("Recipient is required")]
    RecipientRequired,

    /// The authenticated sender has no account
    ///
    /// Also returned for deposits and summaries against an unknown account.
    #[error("Sender account {account} not found")]
    SenderNotFound {
        /// The account id that failed to resolve
        account: AccountId,
    },

    /// Full-history balance does not cover the requested debit
    ///
    /// The ledger is left untouched; no transaction is written.
    #[error("Insufficient funds for account {account}: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Sender account id
        account: AccountId,
        /// Derived balance at the time of the check
        available: Decimal,
        /// Requested transfer amount
        requested: Decimal,
    },

    /// The resolved recipient is the sender itself
    #[error("Account {account} cannot transfer to itself")]
    SelfTransferRejected {
        /// The sender (and resolved recipient) account id
        account: AccountId,
    },

    /// Recipient looked identifiable (email/phone/handle) but no account matched
    ///
    /// Only raw/unknown classifications may proceed without a match.
    #[error("No account found for {kind} '{value}'")]
    RecipientNotFound {
        /// Classification of the recipient input
        kind: RecipientKind,
        /// Normalized value that was looked up
        value: String,
    },

    /// Registration without any reachable identifier
    ///
    /// At least one of email or phone is required.
    #[error("An email or phone number is required to register an account")]
    IdentifierRequired,

    /// Registration identifier already belongs to another account
    #[error("The {field} '{value}' is already registered")]
    IdentifierTaken {
        /// Which identifier collided ("email", "phone", "username")
        field: String,
        /// The normalized value that collided
        value: String,
    },

    /// Provider event is malformed or cannot be attributed
    ///
    /// Rejected without processing; the provider should not retry.
    #[error("Provider event rejected: {reason}")]
    ProviderEventUnverifiable {
        /// Why the event was rejected
        reason: String,
    },

    /// Transient storage failure; safe for the caller to retry
    #[error("Storage unavailable: {message}")]
    StorageUnavailable {
        /// Description of the failure
        message: String,
    },

    /// Balance fold or write would overflow
    ///
    /// The operation is rejected to keep the ledger consistent.
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account id
        account: AccountId,
    },

    /// I/O error in the replay layer
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error in the replay layer
    ///
    /// Recoverable: the malformed record is skipped and replay continues.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred, if known
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl LedgerError {
    /// Stable machine-readable code for this rejection
    ///
    /// These strings are part of the public contract: clients key display
    /// logic on them, so they never change once shipped.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount { .. } => "invalid_amount",
            LedgerError::RecipientRequired => "recipient_required",
            LedgerError::SenderNotFound { .. } => "sender_not_found",
            LedgerError::InsufficientFunds { .. } => "insufficient_funds",
            LedgerError::SelfTransferRejected { .. } => "self_transfer_rejected",
            LedgerError::RecipientNotFound { .. } => "recipient_not_found",
            LedgerError::IdentifierRequired => "identifier_required",
            LedgerError::IdentifierTaken { .. } => "identifier_taken",
            LedgerError::ProviderEventUnverifiable { .. } => "provider_event_unverifiable",
            LedgerError::StorageUnavailable { .. } => "storage_unavailable",
            LedgerError::ArithmeticOverflow { .. } => "arithmetic_overflow",
            LedgerError::IoError { .. } => "io_error",
            LedgerError::ParseError { .. } => "parse_error",
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: impl ToString) -> Self {
        LedgerError::InvalidAmount {
            amount: amount.to_string(),
        }
    }

    /// Create a SenderNotFound error
    pub fn sender_not_found(account: AccountId) -> Self {
        LedgerError::SenderNotFound { account }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, available: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account,
            available,
            requested,
        }
    }

    /// Create a SelfTransferRejected error
    pub fn self_transfer(account: AccountId) -> Self {
        LedgerError::SelfTransferRejected { account }
    }

    /// Create a RecipientNotFound error
    pub fn recipient_not_found(kind: RecipientKind, value: &str) -> Self {
        LedgerError::RecipientNotFound {
            kind,
            value: value.to_string(),
        }
    }

    /// Create an IdentifierTaken error
    pub fn identifier_taken(field: &str, value: &str) -> Self {
        LedgerError::IdentifierTaken {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Create a ProviderEventUnverifiable error
    pub fn unverifiable_event(reason: &str) -> Self {
        LedgerError::ProviderEventUnverifiable {
            reason: reason.to_string(),
        }
    }

    /// Create a StorageUnavailable error
    pub fn storage_unavailable(message: &str) -> Self {
        LedgerError::StorageUnavailable {
            message: message.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case::invalid_amount(
        LedgerError::invalid_amount("-3"),
        "Invalid amount '-3'"
    )]
    #[case::recipient_required(
        LedgerError::RecipientRequired,
        "Recipient is required"
    )]
    #[case::sender_not_found(
        LedgerError::sender_not_found(9),
        "Sender account 9 not found"
    )]
    #[case::insufficient_funds(
        LedgerError::insufficient_funds(1, Decimal::new(5000, 2), Decimal::new(10000, 2)),
        "Insufficient funds for account 1: available 50.00, requested 100.00"
    )]
    #[case::self_transfer(
        LedgerError::self_transfer(4),
        "Account 4 cannot transfer to itself"
    )]
    #[case::recipient_not_found(
        LedgerError::recipient_not_found(RecipientKind::Email, "nobody@nowhere.test"),
        "No account found for email 'nobody@nowhere.test'"
    )]
    #[case::identifier_taken(
        LedgerError::identifier_taken("email", "bob@example.com"),
        "The email 'bob@example.com' is already registered"
    )]
    #[case::unverifiable(
        LedgerError::unverifiable_event("missing reference"),
        "Provider event rejected: missing reference"
    )]
    #[case::parse_error_with_line(
        LedgerError::ParseError { line: Some(42), message: "bad field".to_string() },
        "CSV parse error at line 42: bad field"
    )]
    #[case::parse_error_without_line(
        LedgerError::ParseError { line: None, message: "bad field".to_string() },
        "CSV parse error: bad field"
    )]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::invalid_amount(LedgerError::invalid_amount("0"), "invalid_amount")]
    #[case::recipient_required(LedgerError::RecipientRequired, "recipient_required")]
    #[case::sender_not_found(LedgerError::sender_not_found(1), "sender_not_found")]
    #[case::insufficient_funds(
        LedgerError::insufficient_funds(1, Decimal::ZERO, Decimal::ONE),
        "insufficient_funds"
    )]
    #[case::self_transfer(LedgerError::self_transfer(1), "self_transfer_rejected")]
    #[case::recipient_not_found(
        LedgerError::recipient_not_found(RecipientKind::Phone, "+33612345678"),
        "recipient_not_found"
    )]
    #[case::unverifiable(LedgerError::unverifiable_event("x"), "provider_event_unverifiable")]
    #[case::storage(LedgerError::storage_unavailable("x"), "storage_unavailable")]
    fn test_error_codes_are_stable(#[case] error: LedgerError, #[case] code: &str) {
        assert_eq!(error.code(), code);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: LedgerError = io_error.into();
        assert!(matches!(error, LedgerError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }

    #[test]
    fn test_recipient_kind_renders_lowercase_in_messages() {
        let error = LedgerError::recipient_not_found(RecipientKind::Username, "alice");
        assert_eq!(error.to_string(), "No account found for username 'alice'");
    }
}
