//! Asynchronous scheduling of account replays
//!
//! Accounts are independent, so the parallel strategy replays each one as
//! its own tokio task on a bounded worker pool. Nothing in here shares
//! mutable state between tasks; results travel back over a channel.

pub mod scheduler;

pub use scheduler::{PendingReplays, ReplayScheduler};
