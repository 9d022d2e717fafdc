//! Recipient resolution result types
//!
//! A recipient is supplied as free text and classified at runtime. The
//! outcome is a tagged value: the classification, the normalized value used
//! for the lookup, and the matched account (if any). Absence of a match is
//! not an error at this level; the transfer engine decides whether it is.

use serde::Serialize;

use super::Account;

/// Classification of a recipient input string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientKind {
    /// `@handle` syntax
    Username,
    /// Standard single-`@`, dotted-domain email shape
    Email,
    /// Looks like a phone number (leading `+`/`00` or enough digits)
    Phone,
    /// Free text: no lookup performed, recorded by label only
    Raw,
    /// Empty or unparseable input
    Unknown,
}

impl RecipientKind {
    /// Stable lowercase name, used in audit metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientKind::Username => "username",
            RecipientKind::Email => "email",
            RecipientKind::Phone => "phone",
            RecipientKind::Raw => "raw",
            RecipientKind::Unknown => "unknown",
        }
    }

    /// Whether this classification names a specific on-platform identifier
    ///
    /// Identifiable kinds must resolve to an account for a transfer to
    /// proceed; raw/unknown inputs may proceed without a match.
    pub fn is_identifiable(&self) -> bool {
        matches!(
            self,
            RecipientKind::Username | RecipientKind::Email | RecipientKind::Phone
        )
    }
}

impl std::fmt::Display for RecipientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of resolving a recipient string
///
/// Ephemeral: never persisted, only echoed into transfer metadata and the
/// transfer receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// How the input was classified
    pub kind: RecipientKind,

    /// Normalized value used for the lookup (lowercased email, normalized
    /// phone, stripped handle); the trimmed input for raw classification
    pub value: String,

    /// The matched account, if the lookup found one
    pub account: Option<Account>,
}

impl Resolution {
    pub fn unknown(value: &str) -> Self {
        Self {
            kind: RecipientKind::Unknown,
            value: value.to_string(),
            account: None,
        }
    }
}
