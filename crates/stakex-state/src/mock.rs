//! In-memory sandbox for test suites.
//!
//! Writes land directly in an owned `LedgerState`, and committee membership
//! can be forced on or off for every validator, which is how executor tests
//! flip a validator in and out of the signing committee.

use stakex_core::{Account, Address, Amount, Hash, PublicKey, Stamp, Validator};

use crate::ledger::LedgerState;
use crate::sandbox::Sandbox;
use crate::supply::SupplyView;

pub const DEFAULT_TEST_TTL: u64 = 8640;

#[derive(Debug, Clone)]
pub struct MockSandbox {
    pub state: LedgerState,
    /// When set, overrides committee membership for every address
    pub in_committee: Option<bool>,
    pub transaction_to_live: u64,
}

impl Default for MockSandbox {
    fn default() -> Self {
        MockSandbox {
            state: LedgerState::new(),
            in_committee: None,
            transaction_to_live: DEFAULT_TEST_TTL,
        }
    }
}

impl MockSandbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_new_block(&mut self, height: u64, hash: Hash) {
        if let Err(e) = self.state.append_block(height, hash) {
            panic!("fixture block {}: {}", height, e);
        }
    }

    /// Funded account with a random address
    pub fn add_test_account(&mut self, balance: Amount) -> Address {
        let addr = Address::generate_test_address();
        self.state.put_account(Account::with_balance(addr, balance));
        addr
    }

    /// Bonded validator with a random key
    pub fn add_test_validator(&mut self, stake: Amount) -> Validator {
        let val = Validator::with_stake(PublicKey::generate_test_key(), stake);
        self.state.put_validator(val.clone());
        val
    }

    pub fn set_in_committee(&mut self, in_committee: bool) {
        self.in_committee = Some(in_committee);
    }
}

impl Sandbox for MockSandbox {
    fn account(&self, addr: &Address) -> Option<Account> {
        self.state.account(addr).cloned()
    }

    fn update_account(&mut self, acc: Account) {
        self.state.put_account(acc);
    }

    fn validator(&self, addr: &Address) -> Option<Validator> {
        self.state.validator(addr).cloned()
    }

    fn update_validator(&mut self, val: Validator) {
        self.state.put_validator(val);
    }

    fn in_committee(&self, addr: &Address) -> bool {
        self.in_committee
            .unwrap_or_else(|| self.state.in_committee(addr))
    }

    fn current_height(&self) -> u64 {
        self.state.last_height()
    }

    fn block_hash_stamp(&self, height: u64) -> Option<Stamp> {
        self.state.block_hash_stamp(height)
    }

    fn transaction_to_live(&self) -> u64 {
        self.transaction_to_live
    }

    fn collect_fee(&mut self, fee: Amount) {
        self.state.add_collected_fee(fee);
    }
}

impl SupplyView for MockSandbox {
    fn total_balances(&self) -> u128 {
        self.state.total_balances()
    }

    fn total_stakes(&self) -> u128 {
        self.state.total_stakes()
    }

    fn total_collected_fees(&self) -> u128 {
        self.state.total_collected_fees()
    }
}
