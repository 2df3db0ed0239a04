//! Types module
//!
//! Contains core data structures used throughout the application:
//! - `account`: account balance state and output rounding
//! - `transaction`: transaction types, records and identifiers
//! - `error`: faults and business-rule rejections

pub mod account;
pub mod error;
pub mod transaction;

pub use account::{round_amount, Account, AMOUNT_SCALE};
pub use error::{Rejection, ReplayError};
pub use transaction::{ClientId, TransactionId, TransactionRecord, TransactionType};
