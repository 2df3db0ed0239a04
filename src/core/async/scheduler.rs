//! Concurrent dispatch of account replays onto the tokio worker pool
//!
//! The `ReplayScheduler` spawns one task per account stream. Accounts share
//! nothing, so tasks never synchronize with each other; the only meeting
//! point is the channel that carries finished outcomes back to the caller.
//!
//! # Architecture
//!
//! ```text
//! Vec<AccountStream> ──► ReplayScheduler::spawn ──► tokio task per client
//!                                                        │
//!                     PendingReplays::next ◄── mpsc ◄────┘
//! ```
//!
//! Outcomes arrive in completion order. A task that ends without reporting
//! is surfaced as a `Panicked` outcome for its client, so every spawned
//! account yields exactly one outcome.

use std::collections::BTreeSet;

use log::{debug, LevelFilter};
use tokio::sync::mpsc;

use crate::core::ledger::{replay_account, ReplayOutcome};
use crate::core::partitioner::AccountStream;
use crate::types::{ClientId, ReplayError};

/// Spawns account replays onto the current tokio runtime
#[derive(Debug, Clone, Copy)]
pub struct ReplayScheduler {
    /// Severity ceiling handed to every account's log handle
    max_level: LevelFilter,
}

impl ReplayScheduler {
    pub fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }

    /// Spawn one replay task per stream
    ///
    /// Must be called from within a tokio runtime. Streams are expected to
    /// carry distinct clients, as produced by the partitioner.
    pub fn spawn(&self, streams: Vec<AccountStream>) -> PendingReplays {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut pending = BTreeSet::new();

        for stream in streams {
            pending.insert(stream.client);
            let sender = sender.clone();
            let max_level = self.max_level;

            tokio::spawn(async move {
                let outcome = replay_account(&stream, max_level);
                if sender.send(outcome).is_err() {
                    debug!("client {}: outcome dropped, receiver closed", stream.client);
                }
            });
        }

        PendingReplays { receiver, pending }
    }
}

/// Outcomes of spawned replays that have not been consumed yet
#[derive(Debug)]
pub struct PendingReplays {
    receiver: mpsc::UnboundedReceiver<ReplayOutcome>,
    pending: BTreeSet<ClientId>,
}

impl PendingReplays {
    /// Number of accounts whose outcome has not been returned yet
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Next finished replay, in completion order
    ///
    /// Returns `None` once every spawned account has produced an outcome.
    pub async fn next(&mut self) -> Option<ReplayOutcome> {
        if self.pending.is_empty() {
            return None;
        }

        if let Some(outcome) = self.receiver.recv().await {
            self.pending.remove(&outcome.client);
            return Some(outcome);
        }

        // All senders are gone: the remaining clients lost their task.
        let client = self.pending.pop_first()?;
        Some(ReplayOutcome {
            client,
            result: Err(ReplayError::Panicked {
                client,
                message: "replay task ended without reporting an outcome".to_string(),
            }),
        })
    }

    /// Wait for every outcome, in completion order
    pub async fn collect(mut self) -> Vec<ReplayOutcome> {
        let mut outcomes = Vec::with_capacity(self.pending.len());
        while let Some(outcome) = self.next().await {
            outcomes.push(outcome);
        }
        outcomes
    }
}
