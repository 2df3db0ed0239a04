//! Transaction-related types for the ledger replay engine
//!
//! This module defines transaction types and the decoded transaction record
//! that flows from the readers, through the partitioner, into each account's
//! ledger.

use rust_decimal::Decimal;
use std::fmt;

/// Client (account) identifier
///
/// Supports client IDs from 0 to 65,535
pub type ClientId = u16;

/// Transaction identifier
///
/// Scoped to a single account's stream: the same ID may appear for several
/// clients, and dispute lifecycle records reference a prior record of the
/// same client by this ID.
pub type TransactionId = u32;

/// Transaction types understood by the replay engine
///
/// A closed set: every decoded record carries exactly one of these variants
/// and the ledger matches on them exhaustively. Type text that is not
/// recognized by the reader decodes to [`TransactionType::Unknown`], which the
/// ledger logs and ignores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Credit funds to an account
    ///
    /// Increases both available and total balances by the transaction amount.
    Deposit,

    /// Debit funds from an account
    ///
    /// Decreases both available and total balances by the transaction amount.
    /// Rejected when it would overdraw the available balance.
    Withdrawal,

    /// Claim that a prior deposit was unauthorized
    ///
    /// Moves the deposit's amount from available to held, keeping total
    /// unchanged.
    Dispute,

    /// Cancel an open dispute
    ///
    /// Moves the disputed amount from held back to available.
    Resolve,

    /// Finalize an open dispute against the account holder
    ///
    /// Removes the held amount from the account and locks it permanently.
    Chargeback,

    /// Any type text the reader did not recognize
    Unknown,
}

impl TransactionType {
    /// Parse the `type` column of an input row
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Anything unrecognized maps to [`TransactionType::Unknown`].
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "deposit" => TransactionType::Deposit,
            "withdrawal" => TransactionType::Withdrawal,
            "dispute" => TransactionType::Dispute,
            "resolve" => TransactionType::Resolve,
            "chargeback" => TransactionType::Chargeback,
            _ => TransactionType::Unknown,
        }
    }

    /// Whether records of this type carry an amount of their own
    pub fn requires_amount(self) -> bool {
        matches!(self, TransactionType::Deposit | TransactionType::Withdrawal)
    }

    /// Lowercase name as it appears in the input
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Dispute => "dispute",
            TransactionType::Resolve => "resolve",
            TransactionType::Chargeback => "chargeback",
            TransactionType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded transaction record
///
/// Immutable once decoded. The amount is present for deposits and
/// withdrawals and absent for dispute, resolve and chargeback records, which
/// reference an earlier record of the same client through `tx`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// The type of transaction
    pub tx_type: TransactionType,

    /// The client this transaction applies to
    pub client: ClientId,

    /// Transaction identifier, unique only within the client's stream
    pub tx: TransactionId,

    /// Transaction amount with 4 decimal places precision
    pub amount: Option<Decimal>,
}

impl TransactionRecord {
    /// Build a record with an amount (deposit or withdrawal)
    pub fn with_amount(
        tx_type: TransactionType,
        client: ClientId,
        tx: TransactionId,
        amount: Decimal,
    ) -> Self {
        Self {
            tx_type,
            client,
            tx,
            amount: Some(amount),
        }
    }

    /// Build a record that references an earlier transaction
    pub fn reference(tx_type: TransactionType, client: ClientId, tx: TransactionId) -> Self {
        Self {
            tx_type,
            client,
            tx,
            amount: None,
        }
    }
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.amount {
            Some(amount) => write!(
                f,
                "{} client={} tx={} amount={}",
                self.tx_type, self.client, self.tx, amount
            ),
            None => write!(f, "{} client={} tx={}", self.tx_type, self.client, self.tx),
        }
    }
}
