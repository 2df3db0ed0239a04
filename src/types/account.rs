//! Account-related types for the ledger replay engine
//!
//! This module defines the Account balance state that a ledger mutates while
//! replaying, and which becomes the account's final snapshot once the replay
//! is finished.

use super::error::ReplayError;
use super::transaction::ClientId;
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits used for amounts and rendered balances
pub const AMOUNT_SCALE: u32 = 4;

/// Client account balance state
///
/// Balances are only changed through the checked operations below, each of
/// which keeps `total == available + held`.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The client ID (u16: 0-65,535)
    pub client: ClientId,

    /// Funds available for withdrawal
    ///
    /// May become negative when a deposit is disputed after part of it was
    /// already withdrawn.
    pub available: Decimal,

    /// Funds frozen by open disputes
    pub held: Decimal,

    /// Total funds (available + held)
    pub total: Decimal,

    /// Whether the account was locked by a chargeback
    ///
    /// Monotonic: once set it is never cleared.
    pub locked: bool,
}

impl Account {
    /// Create a new account with zero balances and unlocked status
    pub fn new(client: ClientId) -> Self {
        Account {
            client,
            available: Decimal::ZERO,
            held: Decimal::ZERO,
            total: Decimal::ZERO,
            locked: false,
        }
    }

    /// Increase available and total (deposit)
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if either balance would overflow. Balances
    /// are left untouched in that case.
    pub fn credit(&mut self, amount: Decimal) -> Result<(), ReplayError> {
        let available = checked_add(self.available, amount, self.client, "deposit")?;
        let total = checked_add(self.total, amount, self.client, "deposit")?;

        self.available = available;
        self.total = total;
        Ok(())
    }

    /// Decrease available and total (withdrawal)
    ///
    /// The sufficiency check is the caller's business; this only guards the
    /// arithmetic.
    pub fn debit(&mut self, amount: Decimal) -> Result<(), ReplayError> {
        let available = checked_sub(self.available, amount, self.client, "withdrawal")?;
        let total = checked_sub(self.total, amount, self.client, "withdrawal")?;

        self.available = available;
        self.total = total;
        Ok(())
    }

    /// Move funds from available to held (dispute)
    pub fn hold(&mut self, amount: Decimal) -> Result<(), ReplayError> {
        let available = checked_sub(self.available, amount, self.client, "dispute")?;
        let held = checked_add(self.held, amount, self.client, "dispute")?;

        self.available = available;
        self.held = held;
        Ok(())
    }

    /// Move funds from held back to available (resolve)
    pub fn release(&mut self, amount: Decimal) -> Result<(), ReplayError> {
        let available = checked_add(self.available, amount, self.client, "resolve")?;
        let held = checked_sub(self.held, amount, self.client, "resolve")?;

        self.available = available;
        self.held = held;
        Ok(())
    }

    /// Remove held funds from the account and lock it (chargeback)
    pub fn charge_back(&mut self, amount: Decimal) -> Result<(), ReplayError> {
        let held = checked_sub(self.held, amount, self.client, "chargeback")?;
        let total = checked_sub(self.total, amount, self.client, "chargeback")?;

        self.held = held;
        self.total = total;
        self.locked = true;
        Ok(())
    }

    /// Verifies the invariant: `total == available + held`
    pub fn check_invariant(&self) -> bool {
        self.available
            .checked_add(self.held)
            .is_some_and(|sum| sum == self.total)
    }

    /// Copy of this account with every balance rounded to [`AMOUNT_SCALE`]
    /// fractional digits, the shape written to the output
    pub fn rounded(&self) -> Self {
        Account {
            client: self.client,
            available: round_amount(self.available),
            held: round_amount(self.held),
            total: round_amount(self.total),
            locked: self.locked,
        }
    }
}

/// Round a balance to four fractional digits, half away from zero
///
/// A result that rounds to zero is normalized to positive zero so it never
/// renders as `-0.0000`.
pub fn round_amount(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

fn checked_add(
    lhs: Decimal,
    rhs: Decimal,
    client: ClientId,
    operation: &str,
) -> Result<Decimal, ReplayError> {
    lhs.checked_add(rhs)
        .ok_or_else(|| ReplayError::arithmetic_overflow(operation, client))
}

fn checked_sub(
    lhs: Decimal,
    rhs: Decimal,
    client: ClientId,
    operation: &str,
) -> Result<Decimal, ReplayError> {
    lhs.checked_sub(rhs)
        .ok_or_else(|| ReplayError::arithmetic_overflow(operation, client))
}
