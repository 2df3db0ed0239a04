//! Account ledger: the per-account replay state machine
//!
//! An `AccountLedger` owns one client's balances together with the dispute
//! bookkeeping needed to interpret that client's stream. Records are applied
//! strictly in stream order; every record advances the cursor, including
//! records that end up skipped or rejected.
//!
//! # Dispute causality
//!
//! A dispute may only target a record that the cursor has already passed.
//! The ledger keeps an index of every earlier record that carried an amount,
//! whether or not that record changed the balances, and a dispute is honored
//! only when exactly one such record has the referenced transaction ID and
//! that record is a deposit.
//!
//! # Faults
//!
//! Business-rule violations come back as [`StepOutcome::Rejected`] and never
//! stop the replay. A [`ReplayError`] from [`AccountLedger::apply`] aborts the
//! whole account: [`AccountLedger::replay`] returns it and no snapshot is
//! produced.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use log::{Level, LevelFilter};
use rust_decimal::Decimal;

use super::partitioner::AccountStream;
use super::replay_log::ReplayLog;
use crate::types::{
    Account, ClientId, Rejection, ReplayError, TransactionId, TransactionRecord, TransactionType,
};

/// Rounding tolerance for the withdrawal sufficiency check (1e-10)
pub const WITHDRAWAL_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 10);

/// What applying a single record did to the ledger
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The record's rule was applied
    Applied,
    /// Deposit or withdrawal on a locked account, ignored
    Skipped,
    /// The record broke a business rule and had no balance effect
    Rejected(Rejection),
}

/// A record a dispute can point at, with its amount unwrapped
#[derive(Debug, Clone, PartialEq)]
pub struct DisputeTarget {
    pub record: TransactionRecord,
    pub amount: Decimal,
}

/// Earlier amount-bearing records sharing one transaction ID
#[derive(Debug, Clone)]
struct Candidates {
    count: usize,
    first: DisputeTarget,
}

/// Replay state for a single account
#[derive(Debug)]
pub struct AccountLedger {
    account: Account,
    /// Open disputes
    disputed: HashMap<TransactionId, DisputeTarget>,
    /// Disputes that were resolved or charged back
    settled: HashMap<TransactionId, DisputeTarget>,
    /// Amount-bearing records the cursor has passed, by transaction ID
    seen: HashMap<TransactionId, Candidates>,
    /// 1-based sequence index of the record being (or last) processed
    cursor: usize,
    log: ReplayLog,
}

impl AccountLedger {
    /// Create an empty ledger for `client`
    pub fn new(client: ClientId, log: ReplayLog) -> Self {
        AccountLedger {
            account: Account::new(client),
            disputed: HashMap::new(),
            settled: HashMap::new(),
            seen: HashMap::new(),
            cursor: 0,
            log,
        }
    }

    /// Current balances
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Sequence index of the most recently processed record (0 before any)
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether `tx` currently has an open dispute
    pub fn is_disputed(&self, tx: TransactionId) -> bool {
        self.disputed.contains_key(&tx)
    }

    /// Whether the dispute on `tx` was resolved or charged back
    pub fn is_settled(&self, tx: TransactionId) -> bool {
        self.settled.contains_key(&tx)
    }

    /// Replay `records` in order and return the final snapshot
    ///
    /// Consumes the ledger: once the stream is exhausted the account is
    /// final and nothing can mutate it again.
    ///
    /// # Errors
    ///
    /// The first internal fault aborts the replay and is returned as is.
    pub fn replay<'a, I>(mut self, records: I) -> Result<Account, ReplayError>
    where
        I: IntoIterator<Item = &'a TransactionRecord>,
    {
        for record in records {
            if let Err(e) = self.apply(record) {
                self.log.debug(format_args!("{} aborted the replay: {}", record, e));
                return Err(e);
            }
        }

        self.log.debug(format_args!(
            "replayed {} records, final balance {}",
            self.cursor,
            describe(&self.account)
        ));
        Ok(self.account)
    }

    /// Apply the next record of the stream
    ///
    /// Advances the cursor before dispatching, then records the row as a
    /// possible dispute target for later records.
    pub fn apply(&mut self, record: &TransactionRecord) -> Result<StepOutcome, ReplayError> {
        self.cursor += 1;

        let outcome = if self.account.locked && record.tx_type.requires_amount() {
            self.log.info(format_args!("account is locked, ignoring {}", record));
            StepOutcome::Skipped
        } else {
            self.dispatch(record)?
        };

        self.index(record);

        match &outcome {
            StepOutcome::Applied => {
                debug_assert!(
                    self.account.check_invariant(),
                    "total != available + held after {}",
                    record
                );
                if self.log.enabled(Level::Debug) {
                    self.log.debug(format_args!(
                        "processed {} --> <{}>",
                        record,
                        describe(&self.account)
                    ));
                }
            }
            StepOutcome::Rejected(rejection) => {
                self.log.emit(
                    rejection_level(rejection),
                    format_args!("ignoring {}: {}", record, rejection),
                );
            }
            StepOutcome::Skipped => {}
        }

        Ok(outcome)
    }

    fn dispatch(&mut self, record: &TransactionRecord) -> Result<StepOutcome, ReplayError> {
        match record.tx_type {
            TransactionType::Deposit => self.deposit(record),
            TransactionType::Withdrawal => self.withdraw(record),
            TransactionType::Dispute => self.dispute(record.tx),
            TransactionType::Resolve => self.resolve(record.tx),
            TransactionType::Chargeback => self.chargeback(record.tx),
            TransactionType::Unknown => Ok(StepOutcome::Rejected(Rejection::UnknownKind {
                tx: record.tx,
            })),
        }
    }

    fn deposit(&mut self, record: &TransactionRecord) -> Result<StepOutcome, ReplayError> {
        let amount = self.required_amount(record)?;
        self.account.credit(amount)?;
        Ok(StepOutcome::Applied)
    }

    fn withdraw(&mut self, record: &TransactionRecord) -> Result<StepOutcome, ReplayError> {
        let amount = self.required_amount(record)?;

        let client = self.account.client;
        let remaining = self
            .account
            .available
            .checked_sub(amount)
            .ok_or_else(|| ReplayError::arithmetic_overflow("withdrawal", client))?;

        if remaining < -WITHDRAWAL_TOLERANCE {
            return Ok(StepOutcome::Rejected(Rejection::InsufficientFunds {
                requested: amount,
                available: self.account.available,
                held: self.account.held,
            }));
        }

        self.account.debit(amount)?;
        Ok(StepOutcome::Applied)
    }

    fn dispute(&mut self, tx: TransactionId) -> Result<StepOutcome, ReplayError> {
        if self.settled.contains_key(&tx) {
            return Ok(StepOutcome::Rejected(Rejection::AlreadySettled { tx }));
        }

        let target = match self.seen.get(&tx) {
            Some(candidates) if candidates.count == 1 => candidates.first.clone(),
            other => {
                return Ok(StepOutcome::Rejected(Rejection::AmbiguousDisputeTarget {
                    tx,
                    candidates: other.map_or(0, |c| c.count),
                }))
            }
        };

        if self.disputed.contains_key(&tx) {
            return Ok(StepOutcome::Rejected(Rejection::AlreadyDisputed { tx }));
        }

        // Only deposits can be disputed.
        if target.record.tx_type != TransactionType::Deposit {
            return Ok(StepOutcome::Rejected(Rejection::NonDepositTarget {
                tx,
                kind: target.record.tx_type,
            }));
        }

        self.account.hold(target.amount)?;
        self.disputed.insert(tx, target);
        Ok(StepOutcome::Applied)
    }

    fn resolve(&mut self, tx: TransactionId) -> Result<StepOutcome, ReplayError> {
        let Some(target) = self.disputed.get(&tx) else {
            return Ok(StepOutcome::Rejected(Rejection::NoActiveDispute {
                tx,
                operation: TransactionType::Resolve,
            }));
        };

        self.account.release(target.amount)?;
        self.settle(tx);
        Ok(StepOutcome::Applied)
    }

    fn chargeback(&mut self, tx: TransactionId) -> Result<StepOutcome, ReplayError> {
        let Some(target) = self.disputed.get(&tx) else {
            return Ok(StepOutcome::Rejected(Rejection::NoActiveDispute {
                tx,
                operation: TransactionType::Chargeback,
            }));
        };

        let amount = target.amount;
        self.account.charge_back(amount)?;
        self.log.warn(format_args!(
            "BUSINESS FLAG RED: account locked due to chargeback of tx {} amount {}",
            tx, amount
        ));
        self.settle(tx);
        Ok(StepOutcome::Applied)
    }

    /// Move an open dispute to the settled set
    fn settle(&mut self, tx: TransactionId) {
        if let Some(target) = self.disputed.remove(&tx) {
            self.settled.insert(tx, target);
        }
    }

    fn required_amount(&self, record: &TransactionRecord) -> Result<Decimal, ReplayError> {
        record
            .amount
            .ok_or_else(|| ReplayError::missing_amount(record.tx_type, record.tx, record.client))
    }

    /// Remember an amount-bearing record as a possible dispute target
    fn index(&mut self, record: &TransactionRecord) {
        let Some(amount) = record.amount else {
            return;
        };

        self.seen
            .entry(record.tx)
            .and_modify(|candidates| candidates.count += 1)
            .or_insert_with(|| Candidates {
                count: 1,
                first: DisputeTarget {
                    record: record.clone(),
                    amount,
                },
            });
    }
}

fn rejection_level(rejection: &Rejection) -> Level {
    match rejection {
        Rejection::AmbiguousDisputeTarget { .. } => Level::Error,
        Rejection::InsufficientFunds { .. }
        | Rejection::AlreadySettled { .. }
        | Rejection::AlreadyDisputed { .. }
        | Rejection::NonDepositTarget { .. } => Level::Warn,
        Rejection::NoActiveDispute { .. } | Rejection::UnknownKind { .. } => Level::Info,
    }
}

fn describe(account: &Account) -> String {
    format!(
        "available={} held={} total={} locked={}",
        account.available, account.held, account.total, account.locked
    )
}

/// Outcome of one account's replay, as collected by the schedulers
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    /// Client whose stream was replayed
    pub client: ClientId,
    /// Final snapshot, or the fault that aborted the replay
    pub result: Result<Account, ReplayError>,
}

/// Replay one account's stream as an isolated unit of work
///
/// Builds a fresh ledger with its own log handle and runs it to completion.
/// A panic inside the replay is caught here and reported as
/// [`ReplayError::Panicked`] for this client only.
pub fn replay_account(stream: &AccountStream, max_level: LevelFilter) -> ReplayOutcome {
    let client = stream.client;
    let ledger = AccountLedger::new(client, ReplayLog::new(client, max_level));
    let result = isolated(client, || ledger.replay(&stream.records));

    ReplayOutcome { client, result }
}

/// Run one account's replay, turning a panic into [`ReplayError::Panicked`]
fn isolated<F>(client: ClientId, replay: F) -> Result<Account, ReplayError>
where
    F: FnOnce() -> Result<Account, ReplayError>,
{
    panic::catch_unwind(AssertUnwindSafe(replay))
        .unwrap_or_else(|payload| Err(ReplayError::panicked(client, payload.as_ref())))
}
