//! CSV format handling for transaction records and account output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to domain types
//! - Snapshot output serialization
//!
//! Conversion and formatting are pure; the writer only touches the sink it
//! is handed.
//!
//! # Output format
//!
//! Output is plain CSV with a bare `,` between fields and no padding:
//! `client,available,held,total,locked`. Fields are never separated by
//! `", "`.

use crate::types::{
    round_amount, Account, ClientId, ReplayError, TransactionId, TransactionRecord,
    TransactionType, AMOUNT_SCALE,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// Output header, written before any account line
///
/// Fields are joined with a bare `,`, never `", "`.
pub const OUTPUT_HEADER: [&str; 5] = ["client", "available", "held", "total", "locked"];

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: type, client, tx, amount.
/// The amount column may be empty or missing entirely for dispute, resolve
/// and chargeback rows.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub tx_type: String,
    pub client: ClientId,
    pub tx: TransactionId,
    pub amount: Option<String>,
}

/// Convert a CsvRecord to a TransactionRecord
///
/// This function:
/// - Parses the transaction type; unrecognized text becomes `Unknown`
/// - Parses the amount (if present) and truncates it to four fractional digits
/// - Rejects negative amounts
/// - Rejects deposits and withdrawals without an amount
///
/// # Returns
///
/// Result containing either:
/// - Ok(TransactionRecord) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<TransactionRecord, String> {
    let tx_type = TransactionType::parse(&csv_record.tx_type);

    let amount = match csv_record.amount {
        Some(amount_str) if !amount_str.trim().is_empty() => {
            Some(parse_amount(amount_str.trim()).ok_or_else(|| {
                format!("Invalid amount '{}' for tx {}", amount_str, csv_record.tx)
            })?)
        }
        _ => None,
    };

    if tx_type.requires_amount() && amount.is_none() {
        return Err(format!(
            "{} transaction {} for client {} requires an amount",
            tx_type, csv_record.tx, csv_record.client
        ));
    }

    Ok(TransactionRecord {
        tx_type,
        client: csv_record.client,
        tx: csv_record.tx,
        amount,
    })
}

/// Parse a non-negative amount, truncated to [`AMOUNT_SCALE`] digits
fn parse_amount(text: &str) -> Option<Decimal> {
    let amount = Decimal::from_str(text).ok()?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return None;
    }
    Some(amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::ToZero))
}

/// Incremental writer for account snapshots
///
/// Writes the header on creation, then one line per account in the order
/// accounts are handed to it.
pub struct SnapshotWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> SnapshotWriter<W> {
    /// Wrap `output` and write the header line
    pub fn new(output: W) -> Result<Self, ReplayError> {
        let mut writer = csv::Writer::from_writer(output);
        writer
            .write_record(OUTPUT_HEADER)
            .map_err(|e| write_error("Failed to write CSV header", e))?;
        Ok(Self { writer })
    }

    /// Write one account line
    ///
    /// Balances are rounded to four fractional digits and always printed
    /// with exactly four; `locked` is `true` or `false`.
    pub fn write_account(&mut self, account: &Account) -> Result<(), ReplayError> {
        self.writer
            .write_record(&[
                account.client.to_string(),
                format_amount(account.available),
                format_amount(account.held),
                format_amount(account.total),
                account.locked.to_string(),
            ])
            .map_err(|e| write_error("Failed to write account record", e))
    }

    /// Flush buffered lines to the underlying sink
    pub fn flush(&mut self) -> Result<(), ReplayError> {
        self.writer.flush().map_err(|e| ReplayError::IoError {
            message: format!("Failed to flush output: {}", e),
        })
    }
}

/// Render a balance with exactly four fractional digits
pub fn format_amount(value: Decimal) -> String {
    format!("{:.4}", round_amount(value))
}

fn write_error(context: &str, error: csv::Error) -> ReplayError {
    ReplayError::IoError {
        message: format!("{}: {}", context, error),
    }
}

/// Write account states to CSV format
///
/// Writes the header followed by one line per account, sorted by client ID
/// for deterministic output.
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), ReplayError> {
    let mut writer = SnapshotWriter::new(output)?;

    let mut sorted_accounts: Vec<&Account> = accounts.iter().collect();
    sorted_accounts.sort_by_key(|account| account.client);

    for account in sorted_accounts {
        writer.write_account(account)?;
    }

    writer.flush()
}
