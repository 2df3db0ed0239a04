//! Error types for the ledger replay engine
//!
//! Two families live here:
//!
//! - [`ReplayError`]: faults. I/O and parse failures at the edges, and the
//!   unexpected internal faults that abort a single account's replay.
//! - [`Rejection`]: business-rule violations. A rejected record simply has no
//!   balance effect; the replay carries on with the next record.

use super::transaction::{ClientId, TransactionId, TransactionType};
use rust_decimal::Decimal;
use thiserror::Error;

/// Fault raised while reading input, replaying an account or writing output
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplayError {
    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error
    ///
    /// Raised for rows that cannot be decoded. Readers log and skip these.
    #[error("CSV parse error{}: {message}", line_suffix(line))]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// A deposit or withdrawal reached a ledger without an amount
    #[error("{tx_type} transaction {tx} for client {client} has no amount")]
    MissingAmount {
        /// Transaction type that requires an amount
        tx_type: TransactionType,
        /// Transaction ID
        tx: TransactionId,
        /// Client ID
        client: ClientId,
    },

    /// A checked balance operation overflowed
    #[error("Arithmetic overflow in {operation} for client {client}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Client ID
        client: ClientId,
    },

    /// An account's replay panicked
    #[error("Replay of client {client} panicked: {message}")]
    Panicked {
        /// Client whose replay panicked
        client: ClientId,
        /// Panic payload, when it was a string
        message: String,
    },

    /// The worker pool could not be started
    #[error("Failed to start replay runtime: {message}")]
    Runtime {
        /// Description of the runtime failure
        message: String,
    },

    /// One or more accounts failed to replay
    ///
    /// Returned only after every other account's snapshot was written.
    #[error("Replay failed for {} account(s): {}", clients.len(), format_clients(clients))]
    AccountsFailed {
        /// Clients whose replay was aborted, in ascending order
        clients: Vec<ClientId>,
    },
}

/// Business-rule violation: the record is ignored, the replay continues
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    /// Withdrawal larger than the available balance
    #[error(
        "insufficient funds: requested {requested} from available {available} while held={held}"
    )]
    InsufficientFunds {
        /// Requested withdrawal amount
        requested: Decimal,
        /// Available balance at the time
        available: Decimal,
        /// Held balance at the time
        held: Decimal,
    },

    /// Dispute of a transaction whose dispute was already resolved or charged back
    #[error("transaction {tx} was already settled")]
    AlreadySettled {
        /// Referenced transaction ID
        tx: TransactionId,
    },

    /// Dispute whose reference does not match exactly one earlier record
    #[error("transaction {tx} matches {candidates} earlier records, expected exactly one")]
    AmbiguousDisputeTarget {
        /// Referenced transaction ID
        tx: TransactionId,
        /// Number of earlier amount-bearing records with this ID
        candidates: usize,
    },

    /// Dispute of a transaction that is already under dispute
    #[error("transaction {tx} is already under dispute")]
    AlreadyDisputed {
        /// Referenced transaction ID
        tx: TransactionId,
    },

    /// Dispute of a transaction that is not a deposit
    #[error("transaction {tx} is a {kind}, only deposits can be disputed")]
    NonDepositTarget {
        /// Referenced transaction ID
        tx: TransactionId,
        /// Type of the referenced record
        kind: TransactionType,
    },

    /// Resolve or chargeback without an open dispute
    #[error("no active dispute for transaction {tx} ({operation})")]
    NoActiveDispute {
        /// Referenced transaction ID
        tx: TransactionId,
        /// The resolve or chargeback that was attempted
        operation: TransactionType,
    },

    /// Record with an unrecognized transaction type
    #[error("unrecognized transaction type for transaction {tx}")]
    UnknownKind {
        /// Transaction ID of the ignored record
        tx: TransactionId,
    },
}

fn line_suffix(line: &Option<u64>) -> String {
    line.map(|l| format!(" at line {}", l)).unwrap_or_default()
}

fn format_clients(clients: &[ClientId]) -> String {
    clients
        .iter()
        .map(ClientId::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<std::io::Error> for ReplayError {
    fn from(error: std::io::Error) -> Self {
        ReplayError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for ReplayError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        ReplayError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl ReplayError {
    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, client: ClientId) -> Self {
        ReplayError::ArithmeticOverflow {
            operation: operation.to_string(),
            client,
        }
    }

    /// Create a MissingAmount error
    pub fn missing_amount(tx_type: TransactionType, tx: TransactionId, client: ClientId) -> Self {
        ReplayError::MissingAmount {
            tx_type,
            tx,
            client,
        }
    }

    /// Create a Panicked error from a `catch_unwind` payload
    pub fn panicked(client: ClientId, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());

        ReplayError::Panicked { client, message }
    }

    /// Client whose replay this error aborted, if it is an account-level fault
    pub fn client(&self) -> Option<ClientId> {
        match self {
            ReplayError::MissingAmount { client, .. }
            | ReplayError::ArithmeticOverflow { client, .. }
            | ReplayError::Panicked { client, .. } => Some(*client),
            _ => None,
        }
    }
}
