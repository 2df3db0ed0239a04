//! Core business logic module
//!
//! This module contains the replay components:
//! - `partitioner` - Splits the input into one ordered stream per client
//! - `ledger` - Replays one client's stream into its final account state
//! - `replay_log` - Per-account logging handle
//! - `async` - Concurrent scheduling of account replays

pub mod r#async;
pub mod ledger;
pub mod partitioner;
pub mod replay_log;

pub use ledger::{replay_account, AccountLedger, ReplayOutcome, StepOutcome};
pub use partitioner::{partition_by_client, AccountStream, Partitioner};
pub use r#async::{PendingReplays, ReplayScheduler};
pub use replay_log::ReplayLog;
