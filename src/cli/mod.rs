// CLI module
// Command-line interface, argument parsing and logger setup

mod args;

pub use args::{CliArgs, StrategyType};

use clap::Parser;
use log::LevelFilter;

/// Parse command-line arguments using clap
///
/// If parsing fails (invalid arguments, missing input path, or `--help`),
/// clap displays an error or help text and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Build the stderr logger
///
/// `default_level` applies to every target. `rust_log` holds `RUST_LOG`
/// style directives that replace the default level or add per-target levels.
pub fn logger_builder(default_level: LevelFilter, rust_log: Option<&str>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(default_level);
    if let Some(filters) = rust_log {
        builder.parse_filters(filters);
    }
    builder
}

/// Install the global logger from `--log-level` and `RUST_LOG`
///
/// Returns the most verbose level the installed filter lets through. Account
/// log handles use it as their ceiling, so a `RUST_LOG` directive can raise
/// ledger diagnostics above `--log-level`.
pub fn init_logging(default_level: LevelFilter) -> LevelFilter {
    let rust_log = std::env::var("RUST_LOG").ok();
    logger_builder(default_level, rust_log.as_deref()).init();
    log::max_level()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::default_only(LevelFilter::Warn, None, LevelFilter::Warn)]
    #[case::rust_log_raises(LevelFilter::Warn, Some("info"), LevelFilter::Info)]
    #[case::rust_log_lowers(LevelFilter::Info, Some("error"), LevelFilter::Error)]
    #[case::ledger_target(LevelFilter::Warn, Some("ledger=debug"), LevelFilter::Debug)]
    #[case::off_by_default(LevelFilter::Off, Some("ledger=info"), LevelFilter::Info)]
    fn test_logger_ceiling(
        #[case] default_level: LevelFilter,
        #[case] rust_log: Option<&str>,
        #[case] expected: LevelFilter,
    ) {
        let logger = logger_builder(default_level, rust_log).build();
        assert_eq!(logger.filter(), expected);
    }
}
