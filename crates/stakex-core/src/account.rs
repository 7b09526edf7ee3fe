use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::Address;

/// Coin amount in the smallest unit
pub type Amount = u64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount overflow: {current} + {delta}")]
    Overflow { current: Amount, delta: Amount },
    #[error("Amount underflow: {current} - {delta}")]
    Underflow { current: Amount, delta: Amount },
}

pub(crate) fn checked_add(current: Amount, delta: Amount) -> Result<Amount, AmountError> {
    current
        .checked_add(delta)
        .ok_or(AmountError::Overflow { current, delta })
}

pub(crate) fn checked_sub(current: Amount, delta: Amount) -> Result<Amount, AmountError> {
    current
        .checked_sub(delta)
        .ok_or(AmountError::Underflow { current, delta })
}

/// Ledger participant holding a spendable balance.
///
/// Accounts appear on first credit and are never removed; a zero balance is
/// a valid state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    address: Address,
    balance: Amount,
    /// Number of transactions this account has successfully sent
    sequence: u64,
}

impl Account {
    pub fn new(address: Address) -> Self {
        Account {
            address,
            balance: 0,
            sequence: 0,
        }
    }

    /// Account restored with an explicit balance (genesis, fixtures)
    pub fn with_balance(address: Address, balance: Amount) -> Self {
        Account {
            address,
            balance,
            sequence: 0,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn add_to_balance(&mut self, amount: Amount) -> Result<(), AmountError> {
        self.balance = checked_add(self.balance, amount)?;
        Ok(())
    }

    pub fn subtract_from_balance(&mut self, amount: Amount) -> Result<(), AmountError> {
        self.balance = checked_sub(self.balance, amount)?;
        Ok(())
    }

    pub fn increment_sequence(&mut self) {
        self.sequence += 1;
    }
}
