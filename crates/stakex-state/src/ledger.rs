// COMMITTED LEDGER STATE
//
// SAFETY INVARIANTS:
// 1. Every container is ordered (BTreeMap/BTreeSet) so iteration, encoding
//    and the state hash are identical on every node
// 2. Block heights only grow; a block can't be appended below the tip
// 3. Committee members are always known, bonded validators
// 4. State changes arrive only through `apply` with a sandbox change set

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use stakex_core::{Account, Address, Amount, Hash, Stamp, Validator};

use crate::genesis::Genesis;
use crate::state_sandbox::{ChangeSet, StateSandbox};
use crate::supply::SupplyView;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    accounts: BTreeMap<Address, Account>,
    validators: BTreeMap<Address, Validator>,
    block_hashes: BTreeMap<u64, Hash>,
    committee: BTreeSet<Address>,
    /// Fees collected by applied transactions, not yet distributed
    collected_fees: Amount,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the initial state from a genesis description
    pub fn from_genesis(genesis: &Genesis) -> Result<Self, StateError> {
        let mut state = LedgerState::new();

        for acc in &genesis.accounts {
            if state.accounts.contains_key(&acc.address) {
                return Err(StateError::DuplicateAccount(acc.address));
            }
            state
                .accounts
                .insert(acc.address, Account::with_balance(acc.address, acc.balance));
        }

        for val in &genesis.validators {
            let val = Validator::with_stake(val.public_key, val.stake);
            if state.validators.contains_key(&val.address()) {
                return Err(StateError::DuplicateValidator(val.address()));
            }
            state.validators.insert(val.address(), val);
        }

        for block in &genesis.blocks {
            state.append_block(block.height, block.hash)?;
        }

        for addr in &genesis.committee {
            state.join_committee(*addr)?;
        }

        info!(
            "Genesis loaded: {} accounts, {} validators, committee of {}, total coin {}",
            state.accounts.len(),
            state.validators.len(),
            state.committee.len(),
            state.total_coin()
        );

        Ok(state)
    }

    pub fn account(&self, addr: &Address) -> Option<&Account> {
        self.accounts.get(addr)
    }

    pub fn validator(&self, addr: &Address) -> Option<&Validator> {
        self.validators.get(addr)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn validators(&self) -> impl Iterator<Item = &Validator> {
        self.validators.values()
    }

    pub fn collected_fees(&self) -> Amount {
        self.collected_fees
    }

    /// Height of the newest known block, 0 before the first block
    pub fn last_height(&self) -> u64 {
        self.block_hashes.keys().next_back().copied().unwrap_or(0)
    }

    pub fn block_hash(&self, height: u64) -> Option<&Hash> {
        self.block_hashes.get(&height)
    }

    pub fn block_hash_stamp(&self, height: u64) -> Option<Stamp> {
        self.block_hashes.get(&height).map(Hash::stamp)
    }

    pub fn append_block(&mut self, height: u64, hash: Hash) -> Result<(), StateError> {
        if !self.block_hashes.is_empty() && height <= self.last_height() {
            return Err(StateError::NonMonotonicHeight {
                last: self.last_height(),
                got: height,
            });
        }
        debug!("Appending block {} ({})", height, hash);
        self.block_hashes.insert(height, hash);
        Ok(())
    }

    pub fn in_committee(&self, addr: &Address) -> bool {
        self.committee.contains(addr)
    }

    /// Committee selection happens outside the executor; this is the hook it
    /// uses to publish its result.
    pub fn join_committee(&mut self, addr: Address) -> Result<(), StateError> {
        let val = self
            .validators
            .get(&addr)
            .ok_or(StateError::UnknownCommitteeMember(addr))?;
        if val.power() == 0 {
            return Err(StateError::InactiveCommitteeMember(addr));
        }
        self.committee.insert(addr);
        Ok(())
    }

    pub fn leave_committee(&mut self, addr: &Address) -> bool {
        self.committee.remove(addr)
    }

    /// Sandbox scoped to the current tip
    pub fn sandbox(&self, transaction_to_live: u64) -> StateSandbox<'_> {
        StateSandbox::new(self, transaction_to_live)
    }

    /// Make a sandbox's staged changes durable
    pub fn apply(&mut self, changes: ChangeSet) {
        if changes.is_empty() {
            debug!("Empty change set, nothing to apply");
            return;
        }
        debug!(
            "Applying change set: {} accounts, {} validators, {} fees",
            changes.accounts.len(),
            changes.validators.len(),
            changes.collected_fees
        );
        for acc in changes.accounts {
            self.accounts.insert(acc.address(), acc);
        }
        for val in changes.validators {
            self.validators.insert(val.address(), val);
        }
        self.collected_fees = self.collected_fees.saturating_add(changes.collected_fees);
    }

    pub(crate) fn put_account(&mut self, acc: Account) {
        self.accounts.insert(acc.address(), acc);
    }

    pub(crate) fn put_validator(&mut self, val: Validator) {
        self.validators.insert(val.address(), val);
    }

    pub(crate) fn add_collected_fee(&mut self, fee: Amount) {
        self.collected_fees = self.collected_fees.saturating_add(fee);
    }

    /// SHA-256 of the canonical bincode encoding. Equal hashes mean
    /// bit-identical state.
    pub fn state_hash(&self) -> Result<Hash, StateError> {
        let bytes = bincode::serialize(self).map_err(|e| StateError::Encoding(e.to_string()))?;
        Ok(Hash::calc(&bytes))
    }
}

impl SupplyView for LedgerState {
    fn total_balances(&self) -> u128 {
        self.accounts.values().map(|acc| acc.balance() as u128).sum()
    }

    fn total_stakes(&self) -> u128 {
        self.validators.values().map(|val| val.stake() as u128).sum()
    }

    fn total_collected_fees(&self) -> u128 {
        self.collected_fees as u128
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Duplicate account {0}")]
    DuplicateAccount(Address),
    #[error("Duplicate validator {0}")]
    DuplicateValidator(Address),
    #[error("Committee member {0} is not a known validator")]
    UnknownCommitteeMember(Address),
    #[error("Committee member {0} has no voting power")]
    InactiveCommitteeMember(Address),
    #[error("Block height {got} does not extend the tip at {last}")]
    NonMonotonicHeight { last: u64, got: u64 },
    #[error("State encoding failed: {0}")]
    Encoding(String),
    #[error("Invalid genesis file: {0}")]
    InvalidGenesis(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakex_core::PublicKey;

    #[test]
    fn test_append_block_is_monotonic() {
        let mut state = LedgerState::new();
        state.append_block(100, Hash::calc(b"100")).unwrap();
        assert_eq!(state.last_height(), 100);

        assert_eq!(
            state.append_block(100, Hash::calc(b"again")),
            Err(StateError::NonMonotonicHeight { last: 100, got: 100 })
        );
        state.append_block(101, Hash::calc(b"101")).unwrap();
        assert_eq!(state.block_hash_stamp(101), Some(Hash::calc(b"101").stamp()));
    }

    #[test]
    fn test_committee_requires_bonded_validator() {
        let mut state = LedgerState::new();
        let val = Validator::with_stake(PublicKey::generate_test_key(), 1000);
        let addr = val.address();

        assert_eq!(state.join_committee(addr), Err(StateError::UnknownCommitteeMember(addr)));

        state.put_validator(val);
        state.join_committee(addr).unwrap();
        assert!(state.in_committee(&addr));
        assert!(state.leave_committee(&addr));
        assert!(!state.in_committee(&addr));

        let mut idle = Validator::new(PublicKey::generate_test_key());
        idle.unbond(5);
        let idle_addr = idle.address();
        state.put_validator(idle);
        assert_eq!(
            state.join_committee(idle_addr),
            Err(StateError::InactiveCommitteeMember(idle_addr))
        );
    }

    #[test]
    fn test_state_hash_tracks_content() {
        let mut a = LedgerState::new();
        let mut b = LedgerState::new();
        let addr = Address::generate_test_address();
        a.put_account(Account::with_balance(addr, 10));
        b.put_account(Account::with_balance(addr, 10));
        assert_eq!(a.state_hash().unwrap(), b.state_hash().unwrap());

        b.add_collected_fee(1);
        assert_ne!(a.state_hash().unwrap(), b.state_hash().unwrap());
    }
}
