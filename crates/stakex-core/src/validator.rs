// VALIDATOR ENTITY
//
// SAFETY INVARIANTS:
// 1. power is always power_from_stake(stake) while bonded, and 0 once unbonded
// 2. unbonding_height is 0 while bonded and never reset once set
// 3. sequence only moves forward, one step per applied transaction
// 4. validators are never removed; an unbonded record stays for auditing

use serde::{Deserialize, Serialize};

use crate::account::{checked_add, Amount, AmountError};
use crate::crypto::{Address, PublicKey};

/// Voting weight for a bonded stake. Monotonic in `stake`.
pub fn power_from_stake(stake: Amount) -> i64 {
    i64::try_from(stake).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    address: Address,
    public_key: PublicKey,
    stake: Amount,
    power: i64,
    /// Height at which the stake becomes withdrawable; 0 while bonded
    unbonding_height: u64,
    /// Height of the most recent bond into this validator
    last_bonding_height: u64,
    /// Independent from the account sequence of whoever funds the stake
    sequence: u64,
}

impl Validator {
    pub fn new(public_key: PublicKey) -> Self {
        Validator {
            address: public_key.address(),
            public_key,
            stake: 0,
            power: 0,
            unbonding_height: 0,
            last_bonding_height: 0,
            sequence: 0,
        }
    }

    /// Validator restored with an existing stake (genesis, fixtures)
    pub fn with_stake(public_key: PublicKey, stake: Amount) -> Self {
        let mut val = Validator::new(public_key);
        val.stake = stake;
        val.power = power_from_stake(stake);
        val
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn stake(&self) -> Amount {
        self.stake
    }

    pub fn power(&self) -> i64 {
        self.power
    }

    pub fn unbonding_height(&self) -> u64 {
        self.unbonding_height
    }

    pub fn last_bonding_height(&self) -> u64 {
        self.last_bonding_height
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn is_unbonded(&self) -> bool {
        self.unbonding_height != 0
    }

    /// Bond `amount` more coin at `height`. Power follows the new stake.
    pub fn add_to_stake(&mut self, amount: Amount, height: u64) -> Result<(), AmountError> {
        self.stake = checked_add(self.stake, amount)?;
        self.power = power_from_stake(self.stake);
        self.last_bonding_height = height;
        Ok(())
    }

    /// Start unbonding. The stake stays in place until it is withdrawn.
    pub fn unbond(&mut self, unbonding_height: u64) {
        self.power = 0;
        self.unbonding_height = unbonding_height;
    }

    pub fn increment_sequence(&mut self) {
        self.sequence += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_follows_stake() {
        let mut val = Validator::new(PublicKey::generate_test_key());
        assert_eq!(val.power(), 0);

        val.add_to_stake(1000, 7).unwrap();
        assert_eq!(val.power(), 1000);
        assert_eq!(val.last_bonding_height(), 7);

        val.add_to_stake(500, 9).unwrap();
        assert_eq!(val.stake(), 1500);
        assert_eq!(val.power(), 1500);
    }

    #[test]
    fn test_unbond_keeps_stake() {
        let mut val = Validator::with_stake(PublicKey::generate_test_key(), 5_000_000_000);
        assert!(!val.is_unbonded());

        val.unbond(101);
        assert!(val.is_unbonded());
        assert_eq!(val.power(), 0);
        assert_eq!(val.stake(), 5_000_000_000);
        assert_eq!(val.unbonding_height(), 101);
    }

    #[test]
    fn test_address_matches_key() {
        let key = PublicKey::generate_test_key();
        let val = Validator::new(key);
        assert_eq!(val.address(), key.address());
    }
}
