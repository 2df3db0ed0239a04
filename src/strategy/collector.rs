//! Collection of replay outcomes into the output snapshot
//!
//! Both strategies feed every `ReplayOutcome` through a `SnapshotCollector`.
//! Successful snapshots are written (immediately, or buffered and sorted on
//! finish); failed accounts are remembered and reported once all other
//! snapshots are out.

use crate::core::ReplayOutcome;
use crate::io::csv_format::SnapshotWriter;
use crate::strategy::OutputOrder;
use crate::types::{Account, ClientId, ReplayError};
use log::error;
use std::io::Write;

/// Writes account snapshots as outcomes arrive
pub struct SnapshotCollector<W: Write> {
    writer: SnapshotWriter<W>,
    order: OutputOrder,
    buffered: Vec<Account>,
    failed: Vec<ClientId>,
    written: usize,
}

impl<W: Write> SnapshotCollector<W> {
    /// Create a collector, writing the output header immediately
    pub fn new(output: W, order: OutputOrder) -> Result<Self, ReplayError> {
        Ok(Self {
            writer: SnapshotWriter::new(output)?,
            order,
            buffered: Vec::new(),
            failed: Vec::new(),
            written: 0,
        })
    }

    /// Accept one account's outcome
    pub fn accept(&mut self, outcome: ReplayOutcome) -> Result<(), ReplayError> {
        match outcome.result {
            Ok(account) => match self.order {
                OutputOrder::Sorted => self.buffered.push(account),
                OutputOrder::Completion => {
                    self.writer.write_account(&account)?;
                    self.written += 1;
                }
            },
            Err(e) => {
                error!("Account {} failed: {}", outcome.client, e);
                self.failed.push(outcome.client);
            }
        }
        Ok(())
    }

    /// Write any buffered snapshots and flush the output
    ///
    /// Returns `ReplayError::AccountsFailed` if any account faulted, after
    /// every successful snapshot has been flushed.
    pub fn finish(mut self) -> Result<usize, ReplayError> {
        self.buffered.sort_by_key(|account| account.client);
        for account in &self.buffered {
            self.writer.write_account(account)?;
        }
        self.written += self.buffered.len();
        self.writer.flush()?;

        if self.failed.is_empty() {
            return Ok(self.written);
        }

        self.failed.sort_unstable();
        Err(ReplayError::AccountsFailed {
            clients: self.failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn ok(client: ClientId, total: i64) -> ReplayOutcome {
        let mut account = Account::new(client);
        account.available = Decimal::new(total, 4);
        account.total = Decimal::new(total, 4);
        ReplayOutcome {
            client,
            result: Ok(account),
        }
    }

    fn failed(client: ClientId) -> ReplayOutcome {
        ReplayOutcome {
            client,
            result: Err(ReplayError::arithmetic_overflow("deposit", client)),
        }
    }

    fn run(
        order: OutputOrder,
        outcomes: Vec<ReplayOutcome>,
    ) -> (String, Result<usize, ReplayError>) {
        let mut output = Vec::new();
        let result = {
            let mut collector = SnapshotCollector::new(&mut output, order).unwrap();
            for outcome in outcomes {
                collector.accept(outcome).unwrap();
            }
            collector.finish()
        };
        (String::from_utf8(output).unwrap(), result)
    }

    #[test]
    fn test_sorted_order_buffers_until_finish() {
        let (output, result) = run(OutputOrder::Sorted, vec![ok(3, 10000), ok(1, 20000)]);

        assert_eq!(result, Ok(2));
        assert_eq!(
            output,
            "client,available,held,total,locked\n\
            1,2.0000,0.0000,2.0000,false\n\
            3,1.0000,0.0000,1.0000,false\n"
        );
    }

    #[test]
    fn test_completion_order_writes_as_received() {
        let (output, _) = run(OutputOrder::Completion, vec![ok(3, 10000), ok(1, 20000)]);

        let clients: Vec<_> = output.lines().skip(1).map(|l| &l[..1]).collect();
        assert_eq!(clients, vec!["3", "1"]);
    }

    #[test]
    fn test_failed_accounts_reported_after_output() {
        let (output, result) = run(
            OutputOrder::Sorted,
            vec![failed(9), ok(2, 10000), failed(4)],
        );

        assert_eq!(
            result,
            Err(ReplayError::AccountsFailed {
                clients: vec![4, 9]
            })
        );
        assert_eq!(
            output,
            "client,available,held,total,locked\n2,1.0000,0.0000,1.0000,false\n"
        );
    }

    #[test]
    fn test_header_written_without_accounts() {
        let (output, result) = run(OutputOrder::Completion, Vec::new());

        assert_eq!(result, Ok(0));
        assert_eq!(output, "client,available,held,total,locked\n");
    }
}
