//! Per-account logging handle
//!
//! Every replay unit owns a `ReplayLog`. It tags each message with the
//! client being replayed and applies the unit's own severity ceiling before
//! handing the message to the `log` facade, so no replay ever touches
//! process-wide logging configuration.

use crate::types::ClientId;
use log::{Level, LevelFilter};
use std::fmt;

/// Log target used for all ledger diagnostics
pub const LEDGER_TARGET: &str = "ledger";

/// Logging handle owned by a single account's replay
#[derive(Debug, Clone, Copy)]
pub struct ReplayLog {
    client: ClientId,
    max_level: LevelFilter,
}

impl ReplayLog {
    /// Create a handle for `client` that emits messages up to `max_level`
    pub fn new(client: ClientId, max_level: LevelFilter) -> Self {
        Self { client, max_level }
    }

    /// A handle that emits nothing
    pub fn silent(client: ClientId) -> Self {
        Self::new(client, LevelFilter::Off)
    }

    /// The client this handle reports for
    pub fn client(&self) -> ClientId {
        self.client
    }

    /// Whether a message at `level` would be emitted
    ///
    /// Lets callers skip building expensive messages.
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.max_level && log::log_enabled!(target: LEDGER_TARGET, level)
    }

    /// Emit a message at `level`
    pub fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        if level <= self.max_level {
            log::log!(target: LEDGER_TARGET, level, "client {}: {}", self.client, args);
        }
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, args);
    }
}
