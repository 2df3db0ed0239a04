//! Synchronous processing strategy
//!
//! This module provides a sequential, single-threaded implementation of the
//! ProcessingStrategy trait. It runs the same partition-then-replay pipeline
//! as the parallel strategy, one account after another on the caller thread,
//! and serves as the reference the parallel strategy is tested against.
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Grouping by client to `Partitioner`
//! - Account replay to `core::ledger::replay_account`
//! - Output to `SnapshotCollector`

use crate::core::{replay_account, Partitioner};
use crate::io::sync_reader::SyncReader;
use crate::strategy::{ProcessingStrategy, ReplayConfig, SnapshotCollector};
use crate::types::ReplayError;
use log::{info, warn};
use std::io::Write;
use std::path::Path;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use ledger_replay::strategy::{ProcessingStrategy, ReplayConfig, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(ReplayConfig::default());
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("transactions.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SyncProcessingStrategy {
    config: ReplayConfig,
}

impl SyncProcessingStrategy {
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Replay the input file sequentially
    ///
    /// 1. Streams records from the CSV file, logging undecodable rows
    /// 2. Partitions them by client
    /// 3. Replays each account in first-seen order
    /// 4. Writes snapshots through the collector
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), ReplayError> {
        let reader = SyncReader::new(input_path)?;
        let mut partitioner = Partitioner::new();

        for result in reader {
            match result {
                Ok(record) => partitioner.push(record),
                Err(e) => warn!("Skipping record: {}", e),
            }
        }

        info!(
            "Partitioned {} records into {} accounts",
            partitioner.record_count(),
            partitioner.client_count()
        );

        let mut collector = SnapshotCollector::new(output, self.config.order)?;
        for stream in partitioner.into_streams() {
            collector.accept(replay_account(&stream, self.config.log_level))?;
        }

        let written = collector.finish()?;
        info!("Wrote {} account snapshots", written);

        Ok(())
    }
}
