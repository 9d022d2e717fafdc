//! Wallet engine
//!
//! This module provides the `WalletEngine` that orchestrates ledger
//! operations by coordinating between the AccountDirectory, the
//! RecipientResolver and the LedgerStore.
//!
//! The engine enforces the business rules on the money path:
//! - Amount validation (positive, at most two decimal places)
//! - Solvency checks against the full-history derived balance
//! - Self-transfer rejection and recipient resolution
//! - The paired debit/credit write of a transfer
//!
//! # Concurrency
//!
//! Two simultaneous transfers from the same sender must not both pass the
//! solvency check against a stale balance. The engine closes this race with
//! a per-sender serialization point: a mutex per account id, held from the
//! balance check through both ledger writes. Only the sender's lock is ever
//! taken (the credit leg needs no solvency check), so no lock ordering
//! issue can arise between two opposite-direction transfers.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::directory::AccountDirectory;
use crate::core::ledger::LedgerStore;
use crate::core::resolver::RecipientResolver;
use crate::types::{
    Account, AccountId, LedgerError, RecipientKind, Transaction, TransactionDraft, TransactionId,
    TransactionMeta,
};

/// Number of entries in the summary window
///
/// Display only: solvency decisions always use the unbounded fold.
pub const SUMMARY_WINDOW: usize = 50;

/// One display line of the account summary
///
/// The amount is signed: credits positive, debits negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryLine {
    pub id: TransactionId,
    pub label: String,
    pub amount: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Balance and recent activity for one account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub account: AccountId,
    /// Full-history derived balance
    pub balance: Decimal,
    /// Most recent entries, newest first, windowed
    pub transactions: Vec<SummaryLine>,
}

/// Result of an accepted transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    /// Sender balance before the debit
    pub sender_balance_before: Decimal,
    /// Sender balance after the debit
    pub sender_balance_after: Decimal,
    /// How the recipient input was classified
    pub recipient_kind: RecipientKind,
    /// Normalized recipient value used for the lookup
    pub recipient_value: String,
    /// Matched recipient account, if any
    pub recipient_account: Option<AccountId>,
    /// The debit entry written for the sender
    pub debit: TransactionId,
    /// The paired credit entry, when a recipient account matched
    pub credit: Option<TransactionId>,
}

/// Orchestrates deposits, transfers and summaries over the shared stores
///
/// Cheap to share behind an `Arc`; all methods take `&self` and are safe to
/// call from many threads.
#[derive(Debug)]
pub struct WalletEngine {
    directory: Arc<AccountDirectory>,
    ledger: Arc<LedgerStore>,
    resolver: RecipientResolver,

    /// Per-sender serialization points for the solvency-check-plus-write span
    transfer_locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl WalletEngine {
    /// Create an engine over shared directory and ledger stores
    pub fn new(directory: Arc<AccountDirectory>, ledger: Arc<LedgerStore>) -> Self {
        let resolver = RecipientResolver::new(Arc::clone(&directory));
        WalletEngine {
            directory,
            ledger,
            resolver,
            transfer_locks: DashMap::new(),
        }
    }

    /// Balance and recent activity for an account
    ///
    /// The balance is the unbounded fold; the transaction list is a
    /// newest-first window of at most `window` display lines with signed
    /// amounts.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::SenderNotFound`] if the account does not exist
    pub fn summary(
        &self,
        account: AccountId,
        window: usize,
    ) -> Result<AccountSummary, LedgerError> {
        if !self.directory.contains(account) {
            return Err(LedgerError::sender_not_found(account));
        }

        let balance = self.ledger.balance(account)?;
        let transactions = self
            .ledger
            .recent(account, window)
            .into_iter()
            .map(|tx| SummaryLine {
                id: tx.id,
                label: tx.label.clone(),
                amount: tx.signed_amount(),
                currency: tx.currency,
                created_at: tx.created_at,
            })
            .collect();

        Ok(AccountSummary {
            account,
            balance,
            transactions,
        })
    }

    /// Record a direct credit for an account
    ///
    /// The label reflects the deposit method when given: `"Deposit"`,
    /// `"Deposit via {method}"` or `"Deposit via {method} ({option})"`.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::InvalidAmount`] if the amount is not positive or has
    ///   more than two decimal places
    /// * [`LedgerError::SenderNotFound`] if the account does not exist
    pub fn deposit(
        &self,
        account: AccountId,
        amount: Decimal,
        currency: &str,
        method: Option<&str>,
        option: Option<&str>,
    ) -> Result<Transaction, LedgerError> {
        validate_amount(amount)?;

        if !self.directory.contains(account) {
            return Err(LedgerError::sender_not_found(account));
        }

        let label = match (method, option) {
            (Some(method), Some(option)) => format!("Deposit via {} ({})", method, option),
            (Some(method), None) => format!("Deposit via {}", method),
            (None, _) => "Deposit".to_string(),
        };

        Ok(self
            .ledger
            .append(TransactionDraft::credit(account, amount, currency, &label)))
    }

    /// Transfer funds from a sender to a resolved recipient
    ///
    /// Preconditions are checked in order, each with a distinct rejection;
    /// any failure aborts before any write. On success, exactly one debit is
    /// appended for the sender, and one paired credit for the recipient when
    /// an account matched. Raw free-text recipients are accepted debit-only:
    /// value leaves the ledger to an off-platform recipient recorded by
    /// label, not held in escrow.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::InvalidAmount`] if the amount is not positive or too precise
    /// * [`LedgerError::RecipientRequired`] if the recipient is blank after trimming
    /// * [`LedgerError::SenderNotFound`] if no account matches the sender id
    /// * [`LedgerError::InsufficientFunds`] if the full-history balance is below the amount
    /// * [`LedgerError::SelfTransferRejected`] if the recipient resolved to the sender
    /// * [`LedgerError::RecipientNotFound`] if an identifiable recipient has no match
    pub fn transfer(
        &self,
        sender: AccountId,
        recipient: &str,
        amount: Decimal,
        currency: &str,
        label: Option<&str>,
    ) -> Result<TransferReceipt, LedgerError> {
        validate_amount(amount)?;

        let recipient_input = recipient.trim();
        if recipient_input.is_empty() {
            return Err(LedgerError::RecipientRequired);
        }

        let sender_account = self
            .directory
            .get(sender)
            .ok_or_else(|| LedgerError::sender_not_found(sender))?;

        // Serialize the solvency check and both writes per sender. Without
        // this, two concurrent transfers could both pass the check against
        // the same stale balance.
        let lock = self.sender_lock(sender);
        let _guard = match lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let balance = self.ledger.balance(sender)?;
        if balance < amount {
            return Err(LedgerError::insufficient_funds(sender, balance, amount));
        }

        let resolution = self.resolver.resolve(recipient_input);

        if let Some(matched) = &resolution.account {
            if matched.id == sender {
                return Err(LedgerError::self_transfer(sender));
            }
        }

        if resolution.kind.is_identifiable() && resolution.account.is_none() {
            return Err(LedgerError::recipient_not_found(
                resolution.kind,
                &resolution.value,
            ));
        }

        // Debit leg first; written even without a matched account.
        let debit_label = label
            .map(str::to_string)
            .unwrap_or_else(|| format!("Transfer to {}", recipient_input));
        let debit = self.ledger.append(
            TransactionDraft::debit(sender, amount, currency, &debit_label).with_meta(
                TransactionMeta::OutgoingTransfer {
                    recipient_kind: resolution.kind.as_str().to_string(),
                    recipient_value: resolution.value.clone(),
                    recipient_account: resolution.account.as_ref().map(|a| a.id),
                },
            ),
        );

        // Paired credit leg, only when an account matched.
        let credit = resolution.account.as_ref().map(|matched| {
            let credit_label = label
                .map(str::to_string)
                .unwrap_or_else(|| format!("Received from {}", sender_account.display_identifier()));
            self.ledger
                .append(
                    TransactionDraft::credit(matched.id, amount, currency, &credit_label)
                        .with_meta(TransactionMeta::IncomingTransfer {
                            sender_account: sender,
                            sender_email: sender_account.email.clone(),
                            sender_phone: sender_account.phone_number.clone(),
                        }),
                )
                .id
        });

        Ok(TransferReceipt {
            sender_balance_before: balance,
            sender_balance_after: balance - amount,
            recipient_kind: resolution.kind,
            recipient_value: resolution.value,
            recipient_account: resolution.account.as_ref().map(|a| a.id),
            debit: debit.id,
            credit,
        })
    }

    /// The account directory backing this engine
    pub fn directory(&self) -> &Arc<AccountDirectory> {
        &self.directory
    }

    /// The ledger store backing this engine
    pub fn ledger(&self) -> &Arc<LedgerStore> {
        &self.ledger
    }

    fn sender_lock(&self, sender: AccountId) -> Arc<Mutex<()>> {
        self.transfer_locks
            .entry(sender)
            .or_default()
            .clone()
    }
}

/// Amounts must be positive and at currency-minor-unit precision
fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO || amount.normalize().scale() > 2 {
        return Err(LedgerError::invalid_amount(amount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, NewAccount, DEFAULT_CURRENCY};
    use rstest::rstest;

    fn engine() -> WalletEngine {
        let directory = Arc::new(AccountDirectory::new());
        let ledger = Arc::new(LedgerStore::new());
        WalletEngine::new(directory, ledger)
    }

    /// Engine with alice (id 1, funded 100.00) and bob (id 2, unfunded)
    fn funded_engine() -> WalletEngine {
        let engine = engine();
        engine
            .directory()
            .register(NewAccount::with_email("alice@example.com").and_username("alice"))
            .unwrap();
        engine
            .directory()
            .register(NewAccount::with_email("bob@example.com").and_username("bob"))
            .unwrap();
        engine
            .deposit(1, Decimal::new(10000, 2), DEFAULT_CURRENCY, None, None)
            .unwrap();
        engine
    }

    fn eur(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[rstest]
    #[case::zero(Decimal::ZERO)]
    #[case::negative(Decimal::new(-100, 2))]
    #[case::three_decimals(Decimal::new(10001, 3))]
    fn test_deposit_rejects_invalid_amounts(#[case] amount: Decimal) {
        let engine = funded_engine();

        let result = engine.deposit(1, amount, DEFAULT_CURRENCY, None, None);
        assert!(matches!(result, Err(LedgerError::InvalidAmount { .. })));
        // No transaction written
        assert_eq!(engine.ledger().count(1), 1);
    }

    #[test]
    fn test_deposit_labels_reflect_method_and_option() {
        let engine = funded_engine();

        let plain = engine
            .deposit(1, eur(100), DEFAULT_CURRENCY, None, None)
            .unwrap();
        assert_eq!(plain.label, "Deposit");

        let with_method = engine
            .deposit(1, eur(100), DEFAULT_CURRENCY, Some("card"), None)
            .unwrap();
        assert_eq!(with_method.label, "Deposit via card");

        let with_option = engine
            .deposit(1, eur(100), DEFAULT_CURRENCY, Some("card"), Some("visa"))
            .unwrap();
        assert_eq!(with_option.label, "Deposit via card (visa)");
    }

    #[test]
    fn test_deposit_unknown_account_rejected() {
        let engine = funded_engine();
        let result = engine.deposit(99, eur(100), DEFAULT_CURRENCY, None, None);
        assert_eq!(result.unwrap_err(), LedgerError::sender_not_found(99));
    }

    #[test]
    fn test_transfer_happy_path_to_resolvable_email() {
        let engine = funded_engine();

        let receipt = engine
            .transfer(1, "bob@example.com", eur(4000), DEFAULT_CURRENCY, None)
            .unwrap();

        assert_eq!(receipt.sender_balance_before, eur(10000));
        assert_eq!(receipt.sender_balance_after, eur(6000));
        assert_eq!(receipt.recipient_kind, RecipientKind::Email);
        assert_eq!(receipt.recipient_value, "bob@example.com");
        assert_eq!(receipt.recipient_account, Some(2));
        assert!(receipt.credit.is_some());

        assert_eq!(engine.ledger().balance(1).unwrap(), eur(6000));
        assert_eq!(engine.ledger().balance(2).unwrap(), eur(4000));
    }

    #[test]
    fn test_transfer_writes_audit_metadata_on_both_legs() {
        let engine = funded_engine();
        engine
            .transfer(1, "@bob", eur(2500), DEFAULT_CURRENCY, None)
            .unwrap();

        let debit = &engine.ledger().recent(1, 1)[0];
        assert_eq!(debit.direction, Direction::Debit);
        assert_eq!(debit.label, "Transfer to @bob");
        assert_eq!(
            debit.meta,
            Some(TransactionMeta::OutgoingTransfer {
                recipient_kind: "username".to_string(),
                recipient_value: "bob".to_string(),
                recipient_account: Some(2),
            })
        );

        let credit = &engine.ledger().recent(2, 1)[0];
        assert_eq!(credit.direction, Direction::Credit);
        assert_eq!(credit.label, "Received from alice@example.com");
        assert_eq!(
            credit.meta,
            Some(TransactionMeta::IncomingTransfer {
                sender_account: 1,
                sender_email: Some("alice@example.com".to_string()),
                sender_phone: None,
            })
        );
    }

    #[test]
    fn test_transfer_invalid_amount_rejected_before_any_write() {
        let engine = funded_engine();

        let result = engine.transfer(1, "@bob", Decimal::ZERO, DEFAULT_CURRENCY, None);
        assert!(matches!(result, Err(LedgerError::InvalidAmount { .. })));
        assert_eq!(engine.ledger().count(1), 1);
        assert_eq!(engine.ledger().count(2), 0);
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("   ")]
    fn test_transfer_blank_recipient_rejected(#[case] recipient: &str) {
        let engine = funded_engine();

        let result = engine.transfer(1, recipient, eur(100), DEFAULT_CURRENCY, None);
        assert_eq!(result.unwrap_err(), LedgerError::RecipientRequired);
        assert_eq!(engine.ledger().count(1), 1);
    }

    #[test]
    fn test_transfer_unknown_sender_rejected() {
        let engine = funded_engine();

        let result = engine.transfer(99, "@bob", eur(100), DEFAULT_CURRENCY, None);
        assert_eq!(result.unwrap_err(), LedgerError::sender_not_found(99));
    }

    #[test]
    fn test_transfer_insufficient_funds_writes_nothing() {
        let engine = funded_engine();

        let result = engine.transfer(1, "@bob", eur(10001), DEFAULT_CURRENCY, None);
        assert_eq!(
            result.unwrap_err(),
            LedgerError::insufficient_funds(1, eur(10000), eur(10001))
        );
        assert_eq!(engine.ledger().count(1), 1);
        assert_eq!(engine.ledger().count(2), 0);
    }

    #[rstest]
    #[case::by_handle("@alice")]
    #[case::by_email("alice@example.com")]
    #[case::by_email_cased("ALICE@Example.Com")]
    fn test_transfer_to_self_rejected_however_spelled(#[case] recipient: &str) {
        let engine = funded_engine();

        let result = engine.transfer(1, recipient, eur(100), DEFAULT_CURRENCY, None);
        assert_eq!(result.unwrap_err(), LedgerError::self_transfer(1));
        assert_eq!(engine.ledger().count(1), 1);
    }

    #[test]
    fn test_transfer_identifiable_but_unmatched_recipient_rejected() {
        let engine = funded_engine();

        let result = engine.transfer(1, "unknown@nowhere.test", eur(4000), DEFAULT_CURRENCY, None);
        assert_eq!(
            result.unwrap_err(),
            LedgerError::recipient_not_found(RecipientKind::Email, "unknown@nowhere.test")
        );
        assert_eq!(engine.ledger().count(1), 1);
        assert_eq!(engine.ledger().count(2), 0);
    }

    #[test]
    fn test_transfer_to_raw_recipient_is_debit_only() {
        let engine = funded_engine();

        let receipt = engine
            .transfer(
                1,
                "Grandma's birthday gift",
                eur(4000),
                DEFAULT_CURRENCY,
                None,
            )
            .unwrap();

        assert_eq!(receipt.recipient_kind, RecipientKind::Raw);
        assert!(receipt.recipient_account.is_none());
        assert!(receipt.credit.is_none());

        // Sender debited, no credit row anywhere
        assert_eq!(engine.ledger().balance(1).unwrap(), eur(6000));
        assert_eq!(engine.ledger().count(1), 2);
        assert_eq!(engine.ledger().count(2), 0);
    }

    #[test]
    fn test_transfer_uses_caller_label_on_both_legs() {
        let engine = funded_engine();

        engine
            .transfer(1, "@bob", eur(100), DEFAULT_CURRENCY, Some("Lunch"))
            .unwrap();

        assert_eq!(engine.ledger().recent(1, 1)[0].label, "Lunch");
        assert_eq!(engine.ledger().recent(2, 1)[0].label, "Lunch");
    }

    #[test]
    fn test_summary_signed_amounts_newest_first() {
        let engine = funded_engine();
        engine
            .transfer(1, "@bob", eur(2500), DEFAULT_CURRENCY, None)
            .unwrap();

        let summary = engine.summary(1, SUMMARY_WINDOW).unwrap();
        assert_eq!(summary.balance, eur(7500));
        assert_eq!(summary.transactions.len(), 2);
        // Newest first: the debit leads, negative
        assert_eq!(summary.transactions[0].amount, eur(-2500));
        assert_eq!(summary.transactions[1].amount, eur(10000));
    }

    #[test]
    fn test_summary_window_does_not_affect_balance() {
        let engine = funded_engine();
        for _ in 0..60 {
            engine
                .deposit(1, eur(100), DEFAULT_CURRENCY, None, None)
                .unwrap();
        }

        let summary = engine.summary(1, SUMMARY_WINDOW).unwrap();
        assert_eq!(summary.transactions.len(), SUMMARY_WINDOW);
        // 100.00 initial + 60 * 1.00
        assert_eq!(summary.balance, eur(16000));
    }

    #[test]
    fn test_summary_unknown_account_rejected() {
        let engine = funded_engine();
        let result = engine.summary(99, SUMMARY_WINDOW);
        assert_eq!(result.unwrap_err(), LedgerError::sender_not_found(99));
    }

    #[test]
    fn test_concurrent_transfers_cannot_overdraw_sender() {
        let engine = Arc::new(funded_engine());

        // 100.00 available; ten concurrent transfers of 40.00 can succeed
        // at most twice.
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    engine.transfer(1, "@bob", Decimal::new(4000, 2), DEFAULT_CURRENCY, None)
                })
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count();

        assert_eq!(accepted, 2, "exactly two 40.00 transfers fit in 100.00");
        assert_eq!(engine.ledger().balance(1).unwrap(), eur(2000));
        assert_eq!(engine.ledger().balance(2).unwrap(), eur(8000));
    }
}
