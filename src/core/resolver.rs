//! Recipient resolution
//!
//! This module maps a user-supplied recipient string (handle, email, phone,
//! or free text) to an internal account. Classification is deterministic and
//! ordered, first match wins:
//!
//! 1. `@handle`: strip the prefix, look up by username
//! 2. email shape: lowercase, look up by email
//! 3. phone shape: normalize, look up by phone
//! 4. anything else is `Raw`: no lookup, recorded by label only
//!
//! Blank input classifies as `Unknown`. "Not found" is never an error here:
//! absence is represented in the [`Resolution`] and the transfer engine
//! decides whether it is fatal.
//!
//! # Phone normalization
//!
//! Separators (whitespace, dashes, parens, dots) are stripped, a `00` prefix
//! becomes `+`, and inputs without a leading `+` are reduced to digits only.
//! The resolver does **not** guess a country code; that responsibility stays
//! with the caller.

use std::sync::Arc;

use crate::core::directory::AccountDirectory;
use crate::types::{RecipientKind, Resolution};

/// Resolves recipient strings against the account directory
///
/// Side-effect free: only read-only lookups are performed.
#[derive(Debug, Clone)]
pub struct RecipientResolver {
    directory: Arc<AccountDirectory>,
}

impl RecipientResolver {
    pub fn new(directory: Arc<AccountDirectory>) -> Self {
        Self { directory }
    }

    /// Classify a recipient string and look up the matching account
    pub fn resolve(&self, recipient: &str) -> Resolution {
        let input = recipient.trim();
        if input.is_empty() {
            return Resolution::unknown("");
        }

        // @handle
        if let Some(rest) = input.strip_prefix('@') {
            if !rest.is_empty() {
                let username = rest.trim();
                if username.is_empty() {
                    return Resolution::unknown(input);
                }
                return Resolution {
                    kind: RecipientKind::Username,
                    value: username.to_string(),
                    account: self.directory.find_by_username(username),
                };
            }
            // A bare "@" falls through to the remaining checks
        }

        if looks_like_email(input) {
            let email = input.to_lowercase();
            let account = self.directory.find_by_email(&email);
            return Resolution {
                kind: RecipientKind::Email,
                value: email,
                account,
            };
        }

        if looks_like_phone(input) {
            let phone = normalize_phone(input);
            let account = self.directory.find_by_phone(&phone);
            return Resolution {
                kind: RecipientKind::Phone,
                value: phone,
                account,
            };
        }

        Resolution {
            kind: RecipientKind::Raw,
            value: input.to_string(),
            account: None,
        }
    }
}

/// Whether the input has the standard single-`@`, dotted-domain email shape
///
/// No whitespace anywhere, exactly one `@` with a non-empty local part, and
/// a domain containing a `.` with at least one character on each side.
pub fn looks_like_email(input: &str) -> bool {
    let s = input.trim();
    if s.is_empty() || s.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = s.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let Some(domain) = parts.next() else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // The dot must be an inner character of the domain
    let chars: Vec<char> = domain.chars().collect();
    chars.len() >= 3 && chars[1..chars.len() - 1].contains(&'.')
}

/// Whether the input plausibly denotes a phone number
///
/// Leading `+` requires at least 8 digits; a `00` prefix is accepted
/// unconditionally; otherwise at least 8 digits after separator stripping.
pub fn looks_like_phone(input: &str) -> bool {
    let v = input.trim();
    if v.is_empty() {
        return false;
    }

    let digits = v.chars().filter(|c| c.is_ascii_digit()).count();

    if v.starts_with('+') {
        return digits >= 8;
    }
    if v.starts_with("00") {
        return true;
    }
    digits >= 8
}

/// Normalize a phone number to E.164-like form
///
/// Conservative: strips separators, rewrites `00` to `+`, and keeps digits
/// only when no leading `+` remains. Never guesses a country code.
pub fn normalize_phone(raw: &str) -> String {
    let mut phone: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')' | '.'))
        .collect();

    if let Some(rest) = phone.strip_prefix("00") {
        phone = format!("+{}", rest);
    }

    if phone.starts_with('+') {
        phone
    } else {
        phone.chars().filter(|c| c.is_ascii_digit()).collect()
    }
}
