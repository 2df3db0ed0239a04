//! Processing strategy module for ledger replay
//!
//! This module defines the Strategy pattern for complete replay pipelines,
//! encompassing CSV parsing, per-account replay and snapshot output. This
//! allows different scheduling implementations (sequential, parallel) to be
//! selected at runtime while producing identical account snapshots.

use crate::cli::StrategyType;
use crate::types::ReplayError;
use clap::ValueEnum;
use log::{warn, LevelFilter};
use std::io::Write;
use std::path::Path;

pub mod collector;
pub mod parallel;
pub mod sync;

pub use collector::SnapshotCollector;
pub use parallel::ParallelProcessingStrategy;
pub use sync::SyncProcessingStrategy;

/// Order in which account snapshots are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputOrder {
    /// Ascending client id, identical for every run
    #[default]
    Sorted,
    /// As each account's replay finishes
    Completion,
}

/// Runtime configuration shared by all strategies
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayConfig {
    /// Worker threads in the replay pool
    pub workers: usize,
    /// Records per async read batch
    pub batch_size: usize,
    /// Snapshot output order
    pub order: OutputOrder,
    /// Severity ceiling for each account's log handle
    pub log_level: LevelFilter,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            batch_size: 1000,
            order: OutputOrder::default(),
            log_level: LevelFilter::Warn,
        }
    }
}

impl ReplayConfig {
    /// Create a ReplayConfig, replacing zero sizes with their defaults
    pub fn new(
        workers: usize,
        batch_size: usize,
        order: OutputOrder,
        log_level: LevelFilter,
    ) -> Self {
        let default = Self::default();

        let workers = if workers == 0 {
            warn!(
                "Invalid workers ({}), using default ({})",
                workers, default.workers
            );
            default.workers
        } else {
            workers
        };

        let batch_size = if batch_size == 0 {
            warn!(
                "Invalid batch_size ({}), using default ({})",
                batch_size, default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        Self {
            workers,
            batch_size,
            order,
            log_level,
        }
    }
}

/// Processing strategy trait for complete replay pipelines
///
/// Each strategy reads transaction records from a CSV file, replays every
/// account and writes the final snapshots to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Replay the input file and write account snapshots to `output`
    ///
    /// # Errors
    ///
    /// - The input file cannot be opened or its header read
    /// - Output cannot be written
    /// - `ReplayError::AccountsFailed` when one or more accounts faulted;
    ///   all other snapshots have already been written at that point
    ///
    /// Undecodable rows and business-rule rejections are logged and never
    /// cause an error here.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), ReplayError>;
}

/// Create a processing strategy based on the specified strategy type
pub fn create_strategy(
    strategy_type: StrategyType,
    config: ReplayConfig,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(config)),
        StrategyType::Parallel => Box::new(ParallelProcessingStrategy::new(config)),
    }
}
