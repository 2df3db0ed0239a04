//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over transaction records from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The SyncReader reads one raw record at a time into a reusable
//! `StringRecord`, deserializes it against the header row and hands it to
//! the csv_format module for conversion. Memory usage is O(1) per record.
//!
//! Lines starting with `#` are comments and never reach the iterator.
//!
//! ```no_run
//! use ledger_replay::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("transactions.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(record) => println!("replaying {}", record),
//!         Err(e) => log::warn!("{}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, unreadable header) are returned from `new()`
//! - Rows that cannot be decoded are yielded as `ReplayError::ParseError`
//!   carrying the physical line number of the row

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{ReplayError, TransactionRecord};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Build the CSV reader shared by all synchronous input paths
///
/// - Trim whitespace from all fields
/// - Allow flexible field counts (for the optional amount column)
/// - Skip `#` comment lines
pub(crate) fn input_reader<R: Read>(source: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .comment(Some(b'#'))
        .buffer_capacity(8 * 1024)
        .from_reader(source)
}

/// Synchronous CSV reader
///
/// # Examples
///
/// ```no_run
/// use ledger_replay::io::sync_reader::SyncReader;
/// use std::path::Path;
///
/// let reader = SyncReader::new(Path::new("transactions.csv")).unwrap();
/// let records: Vec<_> = reader.filter_map(Result::ok).collect();
/// println!("Successfully parsed {} records", records.len());
/// ```
#[derive(Debug)]
pub struct SyncReader<R: Read = File> {
    reader: csv::Reader<R>,
    headers: StringRecord,
    record: StringRecord,
}

impl SyncReader<File> {
    /// Open a CSV file for streaming iteration
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReader)` if the file was opened and its header read
    /// * `Err(ReplayError::FileNotFound)` if the path does not exist
    /// * `Err(ReplayError)` for any other I/O or header failure
    pub fn new(path: &Path) -> Result<Self, ReplayError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ReplayError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ReplayError::IoError {
                message: format!("Failed to open file '{}': {}", path.display(), e),
            },
        })?;

        Self::from_reader(file)
    }
}

impl<R: Read> SyncReader<R> {
    /// Wrap any byte source, reading its header row immediately
    pub fn from_reader(source: R) -> Result<Self, ReplayError> {
        let mut reader = input_reader(source);
        let headers = reader.headers()?.clone();

        Ok(Self {
            reader,
            headers,
            record: StringRecord::new(),
        })
    }

    fn decode_current(&self) -> Result<TransactionRecord, ReplayError> {
        let line = self.record.position().map(|pos| pos.line());
        let parse_error = |message: String| ReplayError::ParseError { line, message };

        let csv_record: CsvRecord = self
            .record
            .deserialize(Some(&self.headers))
            .map_err(|e| parse_error(e.to_string()))?;

        convert_csv_record(csv_record).map_err(parse_error)
    }
}

impl<R: Read> Iterator for SyncReader<R> {
    type Item = Result<TransactionRecord, ReplayError>;

    /// Get the next transaction record
    ///
    /// # Returns
    ///
    /// * `Some(Ok(TransactionRecord))` - Successfully decoded row
    /// * `Some(Err(ReplayError))` - Row that could not be read or decoded
    /// * `None` - End of input
    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(true) => Some(self.decode_current()),
            Ok(false) => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}
