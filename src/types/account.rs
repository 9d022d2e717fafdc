//! Account-related types for the wallet ledger
//!
//! An account is a user's wallet identity: an opaque id plus up to three
//! contact identifiers used for recipient resolution. The ledger core never
//! stores a balance on the account; balances are derived from transactions.

use serde::Serialize;

/// Account identifier
///
/// Assigned by the account directory from a monotonic counter.
pub type AccountId = u64;

/// A user's wallet identity
///
/// Each identifier (email, phone, username) is optional but unique across
/// all accounts when present; absent identifiers never collide. Email is
/// stored lowercased and phone in normalized E.164-like form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// The account id
    pub id: AccountId,

    /// Email, lowercased (unique when present)
    pub email: Option<String>,

    /// Phone number in normalized form (unique when present)
    pub phone_number: Option<String>,

    /// Handle looked up via the `@handle` recipient syntax (unique when present)
    pub username: Option<String>,
}

impl Account {
    /// Display name for transfer labels: email, then phone, then a fallback
    pub fn display_identifier(&self) -> &str {
        self.email
            .as_deref()
            .or(self.phone_number.as_deref())
            .unwrap_or("a user")
    }
}

/// Registration request consumed by the account directory
///
/// At least one of email or phone must be present; the directory rejects
/// unreachable accounts.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub username: Option<String>,
}

impl NewAccount {
    pub fn with_email(email: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            ..Self::default()
        }
    }

    pub fn with_phone(phone: &str) -> Self {
        Self {
            phone_number: Some(phone.to_string()),
            ..Self::default()
        }
    }

    pub fn and_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }
}
