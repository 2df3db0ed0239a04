use crate::strategy::{OutputOrder, ReplayConfig};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

/// Replay a transaction log into per-account balance snapshots
#[derive(Parser, Debug)]
#[command(name = "ledger-replay")]
#[command(about = "Replay a transaction log into per-account balance snapshots", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing transaction records
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Scheduling strategy for account replays
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "parallel",
        help = "Replay strategy: 'sync' for sequential or 'parallel' for the worker pool"
    )]
    pub strategy: StrategyType,

    /// Worker threads in the replay pool (parallel mode only)
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Number of replay worker threads (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// Number of records per read batch (parallel mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of records per read batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Snapshot output order
    #[arg(long = "order", value_name = "ORDER", default_value = "sorted")]
    pub order: OutputOrder,

    /// Maximum severity of diagnostics written to stderr
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "warn",
        help = "Default log level: off, error, warn, info, debug or trace (RUST_LOG overrides)"
    )]
    pub log_level: LevelFilter,
}

/// Available scheduling strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Parallel,
}

impl CliArgs {
    /// Create a ReplayConfig from CLI arguments
    ///
    /// Missing values fall back to defaults; zero values fall back with a
    /// warning.
    pub fn to_replay_config(&self) -> ReplayConfig {
        let default = ReplayConfig::default();
        ReplayConfig::new(
            self.workers.unwrap_or(default.workers),
            self.batch_size.unwrap_or(default.batch_size),
            self.order,
            self.log_level,
        )
    }
}
