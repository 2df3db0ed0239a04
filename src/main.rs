//! Ledger replay CLI
//!
//! Replays a CSV transaction log and prints the final state of every account.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- transactions.csv > accounts.csv
//! cargo run -- --strategy sync transactions.csv > accounts.csv
//! cargo run -- --workers 8 --batch-size 2000 transactions.csv > accounts.csv
//! cargo run -- --order completion --log-level info transactions.csv > accounts.csv
//! ```
//!
//! Snapshots go to stdout, diagnostics to stderr. `--log-level` sets the
//! default filter. `RUST_LOG` directives replace it or add per-target levels,
//! and they apply to ledger diagnostics too (target `ledger`).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (file not found, output not writable, or an account failed to replay)

use ledger_replay::cli;
use ledger_replay::strategy;
use std::io;
use std::process;

fn main() {
    let args = cli::parse_args();

    let log_level = cli::init_logging(args.log_level);
    let mut config = args.to_replay_config();
    config.log_level = log_level;

    let strategy = strategy::create_strategy(args.strategy, config);

    let mut output = io::stdout().lock();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
