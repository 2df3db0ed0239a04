//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over transaction records from a CSV file,
//! read in batches so the parallel strategy can partition work while input
//! is still arriving.
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of TransactionRecords
//!                  ↓
//!           csv_format module
//!           (CsvRecord, convert_csv_record)
//! ```
//!
//! Rows that cannot be decoded are logged at warn level and skipped. `#`
//! comment lines are skipped silently.

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::TransactionRecord;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use log::warn;

/// Asynchronous CSV reader
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    skipped: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .comment(Some(b'#'))
            .create_deserializer(reader);

        Self {
            csv_reader,
            skipped: 0,
        }
    }

    /// Read a batch of transaction records
    ///
    /// Reads up to `batch_size` decodable records. Invalid rows are logged
    /// and do not count towards the batch size.
    ///
    /// Returns an empty vector when the end of the input is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<TransactionRecord> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(csv_record)) => match convert_csv_record(csv_record) {
                    Ok(transaction_record) => batch.push(transaction_record),
                    Err(e) => {
                        warn!("Skipping record: {}", e);
                        self.skipped += 1;
                    }
                },
                Some(Err(e)) => {
                    warn!("Skipping record: CSV parse error: {}", e);
                    self.skipped += 1;
                }
                None => break,
            }
        }

        batch
    }

    /// Number of rows skipped so far because they could not be decoded
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionType;
    use futures::io::Cursor;
    use rust_decimal::Decimal;

    fn reader(content: &'static str) -> AsyncReader<Cursor<&'static [u8]>> {
        AsyncReader::new(Cursor::new(content.as_bytes()))
    }

    #[tokio::test]
    async fn test_async_reader_read_batch() {
        let mut async_reader = reader(
            "type,client,tx,amount\ndeposit,1,1,100.0\nwithdrawal,1,2,50.0\ndeposit,2,3,200.0\n",
        );

        let batch = async_reader.read_batch(2).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].client, 1);
        assert_eq!(batch[0].tx, 1);
        assert_eq!(batch[1].client, 1);
        assert_eq!(batch[1].tx, 2);

        let batch = async_reader.read_batch(2).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].client, 2);
        assert_eq!(batch[0].tx, 3);
    }

    #[tokio::test]
    async fn test_async_reader_empty_csv() {
        let mut async_reader = reader("type,client,tx,amount\n");

        let batch = async_reader.read_batch(10).await;
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_skips_undecodable_rows() {
        let mut async_reader = reader(
            "type,client,tx,amount\n\
            deposit,1,1,-100.0\n\
            deposit,x,3,1.0\n\
            withdrawal,1,4,\n\
            deposit,1,2,50.0\n",
        );

        let batch = async_reader.read_batch(10).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].tx, 2);
        assert_eq!(async_reader.skipped(), 3);
    }

    #[tokio::test]
    async fn test_async_reader_keeps_unknown_types() {
        let mut async_reader = reader("type,client,tx,amount\nbonus,1,1,100.0\ndeposit,1,2,50.0\n");

        let batch = async_reader.read_batch(10).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].tx_type, TransactionType::Unknown);
        assert_eq!(async_reader.skipped(), 0);
    }

    #[tokio::test]
    async fn test_async_reader_skips_comments() {
        let mut async_reader = reader(
            "type,client,tx,amount\n\
            # header note\n\
            deposit,1,1,1.0\n\
            #deposit,1,2,2.0\n\
            deposit,1,3,3.0\n",
        );

        let batch = async_reader.read_batch(10).await;
        let txs: Vec<_> = batch.iter().map(|r| r.tx).collect();
        assert_eq!(txs, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_async_reader_dispute_flow() {
        let mut async_reader = reader("type,client,tx,amount\ndeposit,1,1,100.0\ndispute,1,1,\n");

        let batch = async_reader.read_batch(10).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].amount, Some(Decimal::new(1000, 1)));
        assert_eq!(batch[1].amount, None);
    }

    #[tokio::test]
    async fn test_async_reader_multiple_batches() {
        let mut async_reader = reader(
            "type,client,tx,amount\n\
            deposit,1,1,100.0\n\
            deposit,1,2,200.0\n\
            deposit,1,3,300.0\n\
            deposit,1,4,400.0\n\
            deposit,1,5,500.0\n",
        );

        let batch1 = async_reader.read_batch(2).await;
        assert_eq!(batch1.iter().map(|r| r.tx).collect::<Vec<_>>(), vec![1, 2]);

        let batch2 = async_reader.read_batch(2).await;
        assert_eq!(batch2.iter().map(|r| r.tx).collect::<Vec<_>>(), vec![3, 4]);

        let batch3 = async_reader.read_batch(2).await;
        assert_eq!(batch3.iter().map(|r| r.tx).collect::<Vec<_>>(), vec![5]);

        let batch4 = async_reader.read_batch(2).await;
        assert!(batch4.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_whitespace_and_case() {
        let mut async_reader = reader(
            "type,client,tx,amount\n  DEPOSIT  ,  1  ,  1  ,  100.0  \nWithdrawal,1,2,50.0\n",
        );

        let batch = async_reader.read_batch(10).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].tx_type, TransactionType::Deposit);
        assert_eq!(batch[1].tx_type, TransactionType::Withdrawal);
    }
}
