//! Parallel processing strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. Input is read in batches, partitioned by
//! client, and every account is then replayed as its own task on a bounded
//! tokio worker pool.
//!
//! # Architecture
//!
//! ```text
//! ParallelProcessingStrategy
//!     ├── ReplayConfig (workers, batch_size, order, log_level)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── Partitioner (per-client streams, fed batch by batch)
//!     ├── ReplayScheduler (one task per account, mpsc results)
//!     └── SnapshotCollector (output in sorted or completion order)
//! ```
//!
//! # Thread-Based Parallelism
//!
//! - The whole input is partitioned before any replay starts, so each task
//!   sees its account's complete history in input order
//! - Tasks own their ledger outright; no account state is shared
//! - A faulted account is reported after all other snapshots are written

use crate::core::{Partitioner, ReplayScheduler};
use crate::io::async_reader::AsyncReader;
use crate::strategy::{ProcessingStrategy, ReplayConfig, SnapshotCollector};
use crate::types::ReplayError;
use log::{info, warn};
use std::io::{self, Write};
use std::path::Path;

/// Parallel processing strategy
///
/// # Configuration
///
/// The strategy accepts a ReplayConfig with:
/// - `workers`: Number of worker threads (default: CPU cores)
/// - `batch_size`: Records per read batch (default: 1000)
#[derive(Debug, Clone, Default)]
pub struct ParallelProcessingStrategy {
    config: ReplayConfig,
}

impl ParallelProcessingStrategy {
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }

    async fn read_partitioned(&self, input_path: &Path) -> Result<Partitioner, ReplayError> {
        let file = tokio::fs::File::open(input_path)
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ReplayError::FileNotFound {
                    path: input_path.display().to_string(),
                },
                _ => ReplayError::IoError {
                    message: format!("Failed to open file '{}': {}", input_path.display(), e),
                },
            })?;

        // csv-async reads futures::io streams
        let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
        let mut reader = AsyncReader::new(compat_file);
        let mut partitioner = Partitioner::new();

        loop {
            let batch = reader.read_batch(self.config.batch_size).await;
            if batch.is_empty() {
                break;
            }
            partitioner.extend(batch);
        }

        if reader.skipped() > 0 {
            warn!("Skipped {} undecodable records", reader.skipped());
        }

        Ok(partitioner)
    }
}

impl ProcessingStrategy for ParallelProcessingStrategy {
    /// Replay the input file on the worker pool
    ///
    /// 1. Creates a tokio multi-threaded runtime sized by `workers`
    /// 2. Reads and partitions all records in batches
    /// 3. Spawns one replay task per account
    /// 4. Writes snapshots as outcomes arrive over the result channel
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), ReplayError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.workers)
            .build()
            .map_err(|e| ReplayError::Runtime {
                message: e.to_string(),
            })?;

        runtime.block_on(async {
            let partitioner = self.read_partitioned(input_path).await?;

            info!(
                "Partitioned {} records into {} accounts across {} workers",
                partitioner.record_count(),
                partitioner.client_count(),
                self.config.workers
            );

            let mut collector = SnapshotCollector::new(output, self.config.order)?;
            let mut pending =
                ReplayScheduler::new(self.config.log_level).spawn(partitioner.into_streams());

            while let Some(outcome) = pending.next().await {
                collector.accept(outcome)?;
            }

            let written = collector.finish()?;
            info!("Wrote {} account snapshots", written);

            Ok(())
        })
    }
}
