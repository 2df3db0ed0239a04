//! Ledger Replay Library
//! # Overview
//!
//! This library replays a chronological log of account transactions and
//! derives the final balance snapshot of every account. The log is split
//! into independent per-account streams that can be replayed sequentially or
//! concurrently on a worker pool; both produce identical snapshots.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, TransactionRecord, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Replay components:
//!   - [`core::partitioner`] - Per-client grouping that preserves input order
//!   - [`core::ledger`] - Single-account replay state machine
//!   - [`core::replay_log`] - Per-account logging handle
//!   - [`core::r#async`] - Concurrent scheduling of account replays
//! - [`io`] - CSV decoding and snapshot output
//! - [`strategy`] - Sequential and parallel replay pipelines
//!
//! # Transaction Types
//!
//! - **Deposit**: Credit funds to an account
//! - **Withdrawal**: Debit funds from an account (requires sufficient available balance)
//! - **Dispute**: Challenge an earlier deposit, moving its amount to held
//! - **Resolve**: Release disputed funds back to available
//! - **Chargeback**: Remove disputed funds and lock the account
//!
//! Records with any other type are logged and ignored.
//!
//! # Account States
//!
//! Each account maintains:
//! - `available`: Funds available for withdrawal
//! - `held`: Funds frozen due to disputes
//! - `total`: Sum of available and held funds
//! - `locked`: Whether the account is locked (due to chargeback)

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use self::core::{
    partition_by_client, replay_account, AccountLedger, AccountStream, ReplayOutcome,
};
pub use io::write_accounts_csv;
pub use strategy::{create_strategy, OutputOrder, ProcessingStrategy, ReplayConfig};
pub use types::{
    Account, ClientId, Rejection, ReplayError, TransactionId, TransactionRecord, TransactionType,
};
