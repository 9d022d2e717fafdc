//! CSV format handling for replay input and summary output
//!
//! This module centralizes the replay tool's CSV concerns:
//! - `OpRecord`: one row of the ops file (register/deposit/transfer/provider-credit)
//! - `EventRecord`: one row of the provider events file
//! - Conversion from raw rows to typed replay operations
//! - Account summary output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use std::io::Write;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::core::engine::AccountSummary;
use crate::core::reconciler::ProviderEvent;
use crate::types::{AccountId, DEFAULT_CURRENCY};

/// Raw ops-file row
///
/// Every column except `op` is optional; which ones are required depends on
/// the operation and is enforced during conversion.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct OpRecord {
    pub op: String,
    pub account: Option<AccountId>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub username: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub label: Option<String>,
    pub method: Option<String>,
    pub option: Option<String>,
    pub provider: Option<String>,
    pub reference: Option<String>,
}

/// Raw events-file row: one provider webhook delivery
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EventRecord {
    pub account: AccountId,
    pub amount_minor: i64,
    pub currency: String,
    pub provider: String,
    pub reference: String,
}

impl From<EventRecord> for ProviderEvent {
    fn from(record: EventRecord) -> Self {
        ProviderEvent {
            provider: record.provider,
            reference: record.reference,
            amount_minor: record.amount_minor,
            currency: record.currency,
            account: record.account,
        }
    }
}

/// A typed replay operation, converted from an [`OpRecord`]
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayOp {
    /// Register an account with the directory
    Register {
        email: Option<String>,
        phone: Option<String>,
        username: Option<String>,
    },

    /// Direct credit for an account
    Deposit {
        account: AccountId,
        amount: Decimal,
        currency: String,
        method: Option<String>,
        option: Option<String>,
    },

    /// Transfer from an account to a recipient string
    Transfer {
        account: AccountId,
        recipient: String,
        amount: Decimal,
        currency: String,
        label: Option<String>,
    },

    /// Provider webhook delivery replayed inline with the ops
    ProviderCredit(ProviderEvent),
}

/// Convert a raw ops row into a typed replay operation
///
/// Validates that the columns each operation requires are present and
/// parseable. Amounts in ops rows are major-unit decimals, except for
/// `provider-credit` where the amount column carries integer minor units as
/// the provider reports them.
pub fn convert_op_record(record: OpRecord) -> Result<ReplayOp, String> {
    match record.op.to_lowercase().as_str() {
        "register" => Ok(ReplayOp::Register {
            email: record.email,
            phone: record.phone,
            username: record.username,
        }),

        "deposit" => Ok(ReplayOp::Deposit {
            account: require_account(&record)?,
            amount: require_amount(&record)?,
            currency: currency_or_default(&record),
            method: record.method,
            option: record.option,
        }),

        "transfer" => {
            let recipient = record
                .recipient
                .clone()
                .ok_or_else(|| format!("transfer record requires a recipient: {:?}", record.op))?;
            Ok(ReplayOp::Transfer {
                account: require_account(&record)?,
                recipient,
                amount: require_amount(&record)?,
                currency: currency_or_default(&record),
                label: record.label,
            })
        }

        "provider-credit" => {
            let amount_minor = record
                .amount
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .ok_or_else(|| "provider-credit record requires an amount in minor units".to_string())?
                .parse::<i64>()
                .map_err(|_| {
                    format!(
                        "Invalid minor-unit amount '{}' for provider-credit",
                        record.amount.as_deref().unwrap_or_default()
                    )
                })?;

            Ok(ReplayOp::ProviderCredit(ProviderEvent {
                provider: record
                    .provider
                    .clone()
                    .ok_or_else(|| "provider-credit record requires a provider".to_string())?,
                reference: record
                    .reference
                    .clone()
                    .ok_or_else(|| "provider-credit record requires a reference".to_string())?,
                amount_minor,
                currency: currency_or_default(&record),
                account: require_account(&record)?,
            }))
        }

        other => Err(format!("Invalid operation type: '{}'", other)),
    }
}

fn require_account(record: &OpRecord) -> Result<AccountId, String> {
    record
        .account
        .ok_or_else(|| format!("{} record requires an account", record.op))
}

fn require_amount(record: &OpRecord) -> Result<Decimal, String> {
    let amount = record
        .amount
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| format!("{} record requires an amount", record.op))?;

    Decimal::from_str(amount).map_err(|_| format!("Invalid amount '{}'", amount))
}

fn currency_or_default(record: &OpRecord) -> String {
    record
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CURRENCY)
        .to_string()
}

/// Write account summaries to CSV
///
/// Columns: account, balance, transactions (entry count in the window).
/// Callers pass summaries already sorted by account id for deterministic
/// output.
pub fn write_summaries_csv(
    summaries: &[AccountSummary],
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["account", "balance", "transactions"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for summary in summaries {
        writer
            .write_record(&[
                summary.account.to_string(),
                format!("{:.2}", summary.balance),
                summary.transactions.len().to_string(),
            ])
            .map_err(|e| format!("Failed to write CSV record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush CSV output: {}", e))?;

    Ok(())
}
