//! Client-based partitioning of the global transaction stream
//!
//! The `Partitioner` splits the input stream into one sub-stream per client.
//! Records of different clients may be interleaved arbitrarily in the input;
//! only the relative order of each client's own records matters, and that
//! order is preserved exactly.
//!
//! # Guarantees
//!
//! - Each record appears in exactly one stream
//! - No records are lost or duplicated
//! - Records within a stream keep their original relative order
//! - Streams are returned in the order their client was first seen

use std::collections::HashMap;

use crate::types::{ClientId, TransactionRecord};

/// All records of one client, in input order
///
/// The 1-based position of a record in `records` is its sequence index.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountStream {
    pub client: ClientId,
    pub records: Vec<TransactionRecord>,
}

/// Incremental, order-preserving grouping of records by client
#[derive(Debug, Default)]
pub struct Partitioner {
    /// Stream position of each client in `streams`
    slots: HashMap<ClientId, usize>,
    streams: Vec<AccountStream>,
    records: usize,
}

impl Partitioner {
    /// Create an empty partitioner
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record to its client's stream
    pub fn push(&mut self, record: TransactionRecord) {
        let client = record.client;
        let slot = *self.slots.entry(client).or_insert_with(|| {
            self.streams.push(AccountStream {
                client,
                records: Vec::new(),
            });
            self.streams.len() - 1
        });

        self.streams[slot].records.push(record);
        self.records += 1;
    }

    /// Number of distinct clients seen so far
    pub fn client_count(&self) -> usize {
        self.streams.len()
    }

    /// Number of records partitioned so far
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Finish partitioning, yielding streams in first-seen client order
    pub fn into_streams(self) -> Vec<AccountStream> {
        self.streams
    }
}

impl Extend<TransactionRecord> for Partitioner {
    fn extend<I: IntoIterator<Item = TransactionRecord>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}

impl FromIterator<TransactionRecord> for Partitioner {
    fn from_iter<I: IntoIterator<Item = TransactionRecord>>(iter: I) -> Self {
        let mut partitioner = Partitioner::new();
        partitioner.extend(iter);
        partitioner
    }
}

/// Partition a complete batch of records by client
pub fn partition_by_client<I>(records: I) -> Vec<AccountStream>
where
    I: IntoIterator<Item = TransactionRecord>,
{
    records.into_iter().collect::<Partitioner>().into_streams()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionType;
    use rust_decimal::Decimal;
    use std::collections::HashSet;

    fn deposit(client: ClientId, tx: u32) -> TransactionRecord {
        TransactionRecord::with_amount(TransactionType::Deposit, client, tx, Decimal::new(10000, 4))
    }

    #[test]
    fn test_partition_empty_batch() {
        let streams = partition_by_client(Vec::new());
        assert!(streams.is_empty());
    }

    #[test]
    fn test_partition_single_client_keeps_order() {
        let streams = partition_by_client(vec![deposit(1, 1), deposit(1, 2), deposit(1, 3)]);

        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].client, 1);
        let txs: Vec<_> = streams[0].records.iter().map(|r| r.tx).collect();
        assert_eq!(txs, vec![1, 2, 3]);
    }

    #[test]
    fn test_partition_interleaved_clients() {
        let streams = partition_by_client(vec![
            deposit(1, 10),
            deposit(2, 20),
            deposit(1, 11),
            deposit(3, 30),
            deposit(1, 12),
            deposit(2, 21),
        ]);

        let clients: Vec<_> = streams.iter().map(|s| s.client).collect();
        assert_eq!(clients, vec![1, 2, 3], "first-seen client order");

        let txs = |i: usize| streams[i].records.iter().map(|r| r.tx).collect::<Vec<_>>();
        assert_eq!(txs(0), vec![10, 11, 12]);
        assert_eq!(txs(1), vec![20, 21]);
        assert_eq!(txs(2), vec![30]);
    }

    #[test]
    fn test_partition_first_seen_order_not_numeric() {
        let streams = partition_by_client(vec![deposit(9, 1), deposit(2, 2), deposit(5, 3)]);

        let clients: Vec<_> = streams.iter().map(|s| s.client).collect();
        assert_eq!(clients, vec![9, 2, 5]);
    }

    #[test]
    fn test_partition_no_records_lost_or_duplicated() {
        let batch: Vec<_> = (0..300u32).map(|i| deposit((i % 7) as u16, i)).collect();
        let original_count = batch.len();

        let mut partitioner = Partitioner::new();
        partitioner.extend(batch);
        assert_eq!(partitioner.record_count(), original_count);
        assert_eq!(partitioner.client_count(), 7);

        let streams = partitioner.into_streams();
        let mut tx_ids = HashSet::new();
        for stream in &streams {
            for record in &stream.records {
                assert_eq!(record.client, stream.client);
                assert!(tx_ids.insert(record.tx), "duplicate record {}", record.tx);
            }
        }
        assert_eq!(tx_ids.len(), original_count);
    }

    #[test]
    fn test_partition_accepts_incremental_batches() {
        let mut partitioner = Partitioner::new();
        partitioner.extend(vec![deposit(1, 1), deposit(2, 2)]);
        partitioner.extend(vec![deposit(2, 3), deposit(1, 4)]);

        let streams = partitioner.into_streams();
        assert_eq!(
            streams[0].records.iter().map(|r| r.tx).collect::<Vec<_>>(),
            vec![1, 4]
        );
        assert_eq!(
            streams[1].records.iter().map(|r| r.tx).collect::<Vec<_>>(),
            vec![2, 3]
        );
    }

    #[test]
    fn test_partition_keeps_lifecycle_records_with_their_client() {
        let streams = partition_by_client(vec![
            deposit(1, 1),
            TransactionRecord::reference(TransactionType::Dispute, 1, 1),
            deposit(2, 2),
        ]);

        assert_eq!(streams[0].records.len(), 2);
        assert_eq!(streams[0].records[0].tx_type, TransactionType::Deposit);
        assert_eq!(streams[0].records[1].tx_type, TransactionType::Dispute);
        assert_eq!(streams[1].records.len(), 1);
    }
}
