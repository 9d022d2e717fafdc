//! Thread-safe account directory
//!
//! This module provides the `AccountDirectory`, the read-mostly store of
//! wallet identities. The ledger core treats it as Identity's data: transfers
//! and reconciliation only read it; registration exists so that the replay
//! tool and tests can stand in for the identity service.
//!
//! # Design
//!
//! Accounts live in a `DashMap` keyed by account id, with one unique
//! secondary index per identifier (email, phone, username). Uniqueness under
//! concurrent registration is enforced by claiming index entries through the
//! DashMap entry API: the claim and the existence check are a single atomic
//! step, so two racing registrations of the same identifier cannot both
//! succeed.
//!
//! # Normalization
//!
//! Identifiers are normalized before storage so that lookups during recipient
//! resolution hit: email is trimmed and lowercased, phone goes through the
//! same normalization the resolver applies to recipient input.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::core::resolver::normalize_phone;
use crate::types::{Account, AccountId, LedgerError, NewAccount};

/// Thread-safe directory of wallet accounts
///
/// Safe to share behind an `Arc` and call from many threads. Lookups are
/// lock-free snapshots; registration serializes only on the claimed index
/// entries.
#[derive(Debug, Default)]
pub struct AccountDirectory {
    /// Account id assignment counter
    next_id: AtomicU64,

    /// All accounts, keyed by id
    accounts: DashMap<AccountId, Account>,

    /// Unique index: lowercased email to account id
    by_email: DashMap<String, AccountId>,

    /// Unique index: normalized phone to account id
    by_phone: DashMap<String, AccountId>,

    /// Unique index: username to account id
    by_username: DashMap<String, AccountId>,
}

impl AccountDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new account
    ///
    /// Normalizes the identifiers, enforces that at least one of email or
    /// phone is present, and claims each identifier atomically. If a later
    /// identifier collides, earlier claims made by this registration are
    /// released before returning the error.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::IdentifierRequired`] if neither email nor phone is given
    /// * [`LedgerError::IdentifierTaken`] if any identifier already belongs to
    ///   another account
    pub fn register(&self, new: NewAccount) -> Result<Account, LedgerError> {
        let email = normalize_optional(new.email.as_deref()).map(|e| e.to_lowercase());
        let phone = normalize_optional(new.phone_number.as_deref())
            .map(|p| normalize_phone(&p))
            .filter(|p| !p.is_empty());
        let username = normalize_optional(new.username.as_deref());

        if email.is_none() && phone.is_none() {
            return Err(LedgerError::IdentifierRequired);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;

        if let Some(email) = &email {
            self.claim(&self.by_email, "email", email, id)?;
        }
        if let Some(phone) = &phone {
            if let Err(e) = self.claim(&self.by_phone, "phone", phone, id) {
                self.release(&self.by_email, email.as_deref());
                return Err(e);
            }
        }
        if let Some(username) = &username {
            if let Err(e) = self.claim(&self.by_username, "username", username, id) {
                self.release(&self.by_email, email.as_deref());
                self.release(&self.by_phone, phone.as_deref());
                return Err(e);
            }
        }

        let account = Account {
            id,
            email,
            phone_number: phone,
            username,
        };
        self.accounts.insert(id, account.clone());

        Ok(account)
    }

    /// Look up an account by id
    pub fn get(&self, id: AccountId) -> Option<Account> {
        self.accounts.get(&id).map(|a| a.clone())
    }

    /// Whether an account exists
    pub fn contains(&self, id: AccountId) -> bool {
        self.accounts.contains_key(&id)
    }

    /// Look up by lowercased email
    pub fn find_by_email(&self, email: &str) -> Option<Account> {
        self.find_in(&self.by_email, email)
    }

    /// Look up by normalized phone
    pub fn find_by_phone(&self, phone: &str) -> Option<Account> {
        self.find_in(&self.by_phone, phone)
    }

    /// Look up by username (without the `@` prefix)
    pub fn find_by_username(&self, username: &str) -> Option<Account> {
        self.find_in(&self.by_username, username)
    }

    /// All accounts sorted by id, for deterministic output
    pub fn get_all_accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.accounts.iter().map(|a| a.clone()).collect();
        accounts.sort_by_key(|account| account.id);
        accounts
    }

    /// Atomically claim `value` in `index` for account `id`
    fn claim(
        &self,
        index: &DashMap<String, AccountId>,
        field: &str,
        value: &str,
        id: AccountId,
    ) -> Result<(), LedgerError> {
        match index.entry(value.to_string()) {
            Entry::Occupied(_) => Err(LedgerError::identifier_taken(field, value)),
            Entry::Vacant(vacant) => {
                vacant.insert(id);
                Ok(())
            }
        }
    }

    /// Release a previously claimed index entry
    fn release(&self, index: &DashMap<String, AccountId>, value: Option<&str>) {
        if let Some(value) = value {
            index.remove(value);
        }
    }

    fn find_in(&self, index: &DashMap<String, AccountId>, value: &str) -> Option<Account> {
        let id = *index.get(value)?;
        self.get(id)
    }
}

/// Trim and drop empty identifier values
fn normalize_optional(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
