//! Behavioral properties of account replay
//!
//! Exercised through the public API on generated transaction logs:
//! - `total == available + held` after every record
//! - `locked` never goes back to false
//! - repeated disputes act like a single dispute
//! - disputes never reach forward to later records
//! - interleaving of different accounts does not change any account

use ledger_replay::core::{AccountLedger, ReplayLog, StepOutcome};
use ledger_replay::{
    partition_by_client, replay_account, Account, ClientId, Rejection, TransactionRecord,
    TransactionType,
};
use log::LevelFilter;
use rstest::rstest;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

fn deposit(client: ClientId, tx: u32, amount: &str) -> TransactionRecord {
    TransactionRecord::with_amount(
        TransactionType::Deposit,
        client,
        tx,
        amount.parse().unwrap(),
    )
}

fn withdrawal(client: ClientId, tx: u32, amount: &str) -> TransactionRecord {
    TransactionRecord::with_amount(
        TransactionType::Withdrawal,
        client,
        tx,
        amount.parse().unwrap(),
    )
}

fn dispute(client: ClientId, tx: u32) -> TransactionRecord {
    TransactionRecord::reference(TransactionType::Dispute, client, tx)
}

fn resolve(client: ClientId, tx: u32) -> TransactionRecord {
    TransactionRecord::reference(TransactionType::Resolve, client, tx)
}

fn chargeback(client: ClientId, tx: u32) -> TransactionRecord {
    TransactionRecord::reference(TransactionType::Chargeback, client, tx)
}

fn replay(records: &[TransactionRecord]) -> Account {
    let client = records.first().map_or(1, |r| r.client);
    AccountLedger::new(client, ReplayLog::silent(client))
        .replay(records)
        .unwrap()
}

/// Small deterministic generator so failures reproduce
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

/// Generate a mixed log touching `clients` accounts
fn generate_log(seed: u64, clients: u16, len: u32) -> Vec<TransactionRecord> {
    let mut rng = Lcg(seed);
    (1..=len)
        .map(|tx| {
            let client = rng.below(clients as u64) as ClientId;
            let amount = Decimal::new(rng.below(100_000) as i64, 4);
            let target = (rng.below(tx as u64) + 1) as u32;
            match rng.below(10) {
                0..=3 => {
                    TransactionRecord::with_amount(TransactionType::Deposit, client, tx, amount)
                }
                4..=5 => {
                    TransactionRecord::with_amount(TransactionType::Withdrawal, client, tx, amount)
                }
                6..=7 => dispute(client, target),
                8 => resolve(client, target),
                _ => chargeback(client, target),
            }
        })
        .collect()
}

#[rstest]
fn test_invariant_and_lock_monotonic_at_every_step(#[values(1, 7, 42, 1234)] seed: u64) {
    for stream in partition_by_client(generate_log(seed, 5, 600)) {
        let mut ledger = AccountLedger::new(stream.client, ReplayLog::silent(stream.client));
        let mut was_locked = false;

        for record in &stream.records {
            ledger.apply(record).unwrap();
            let account = ledger.account();
            assert!(
                account.check_invariant(),
                "invariant broken after {}",
                record
            );
            assert!(
                !was_locked || account.locked,
                "account unlocked by {}",
                record
            );
            was_locked = account.locked;
        }
    }
}

#[rstest]
fn test_interleaving_does_not_change_accounts(#[values(3, 99)] seed: u64) {
    let log = generate_log(seed, 6, 500);

    let baseline: BTreeMap<_, _> = partition_by_client(log.clone())
        .iter()
        .map(|stream| (stream.client, replay(&stream.records)))
        .collect();

    // Regroup: all records of the highest client first, then the rest.
    let mut regrouped = log.clone();
    regrouped.sort_by_key(|record| std::cmp::Reverse(record.client));

    let reordered: BTreeMap<_, _> = partition_by_client(regrouped)
        .iter()
        .map(|stream| {
            let outcome = replay_account(stream, LevelFilter::Off);
            (outcome.client, outcome.result.unwrap())
        })
        .collect();

    assert_eq!(baseline, reordered);
}

#[test]
fn test_repeated_dispute_equals_single_dispute() {
    let once = replay(&[deposit(1, 1, "4.0"), dispute(1, 1)]);
    let twice = replay(&[deposit(1, 1, "4.0"), dispute(1, 1), dispute(1, 1)]);

    assert_eq!(once, twice);
    assert_eq!(twice.held, Decimal::new(4, 0));
}

#[test]
fn test_dispute_before_its_deposit_has_no_effect() {
    let mut ledger = AccountLedger::new(1, ReplayLog::silent(1));

    let outcome = ledger.apply(&dispute(1, 2)).unwrap();
    assert_eq!(
        outcome,
        StepOutcome::Rejected(Rejection::AmbiguousDisputeTarget {
            tx: 2,
            candidates: 0
        })
    );

    ledger.apply(&deposit(1, 2, "5.0")).unwrap();
    assert_eq!(ledger.account().held, Decimal::ZERO);
    assert_eq!(ledger.account().available, Decimal::new(5, 0));
}

#[rstest]
#[case::two_deposits(
    vec![deposit(1, 1, "1.5"), deposit(1, 2, "2.5")],
    ("4.0", "0", "4.0", false)
)]
#[case::overdraft_rejected(
    vec![deposit(1, 1, "5.0"), withdrawal(1, 2, "6.0")],
    ("5.0", "0", "5.0", false)
)]
#[case::chargeback_locks(
    vec![deposit(1, 1, "3.0"), dispute(1, 1), chargeback(1, 1), deposit(1, 2, "5.0")],
    ("0", "0", "0", true)
)]
#[case::resolve_is_final(
    vec![deposit(1, 1, "3.0"), dispute(1, 1), resolve(1, 1), resolve(1, 1), dispute(1, 1)],
    ("3.0", "0", "3.0", false)
)]
fn test_scenarios(
    #[case] records: Vec<TransactionRecord>,
    #[case] expected: (&str, &str, &str, bool),
) {
    let account = replay(&records);
    let (available, held, total, locked) = expected;

    assert_eq!(account.available, available.parse::<Decimal>().unwrap());
    assert_eq!(account.held, held.parse::<Decimal>().unwrap());
    assert_eq!(account.total, total.parse::<Decimal>().unwrap());
    assert_eq!(account.locked, locked);
}
