// STAGING SANDBOX
//
// Reads fall through a staged overlay to the committed ledger; writes only
// touch the overlay. The block pipeline takes a checkpoint before each
// transaction and reverts to it when the transaction is rejected, so a
// failed transaction never leaves a trace. `commit` hands the overlay back
// as a change set for `LedgerState::apply`.

use log::trace;
use std::collections::BTreeMap;

use stakex_core::{Account, Address, Amount, Stamp, Validator};

use crate::ledger::LedgerState;
use crate::sandbox::Sandbox;
use crate::supply::SupplyView;

/// Staged entities and fees produced by a sandbox
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub accounts: Vec<Account>,
    pub validators: Vec<Validator>,
    pub collected_fees: Amount,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.validators.is_empty() && self.collected_fees == 0
    }
}

/// Snapshot of the overlay, restored by `StateSandbox::revert`
#[derive(Debug, Clone)]
pub struct Checkpoint {
    accounts: BTreeMap<Address, Account>,
    validators: BTreeMap<Address, Validator>,
    collected_fees: Amount,
}

#[derive(Debug)]
pub struct StateSandbox<'a> {
    ledger: &'a LedgerState,
    accounts: BTreeMap<Address, Account>,
    validators: BTreeMap<Address, Validator>,
    collected_fees: Amount,
    transaction_to_live: u64,
}

impl<'a> StateSandbox<'a> {
    pub fn new(ledger: &'a LedgerState, transaction_to_live: u64) -> Self {
        StateSandbox {
            ledger,
            accounts: BTreeMap::new(),
            validators: BTreeMap::new(),
            collected_fees: 0,
            transaction_to_live,
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            accounts: self.accounts.clone(),
            validators: self.validators.clone(),
            collected_fees: self.collected_fees,
        }
    }

    pub fn revert(&mut self, checkpoint: Checkpoint) {
        trace!("Reverting sandbox to checkpoint");
        self.accounts = checkpoint.accounts;
        self.validators = checkpoint.validators;
        self.collected_fees = checkpoint.collected_fees;
    }

    pub fn is_dirty(&self) -> bool {
        !self.accounts.is_empty() || !self.validators.is_empty() || self.collected_fees != 0
    }

    pub fn commit(self) -> ChangeSet {
        ChangeSet {
            accounts: self.accounts.into_values().collect(),
            validators: self.validators.into_values().collect(),
            collected_fees: self.collected_fees,
        }
    }
}

impl Sandbox for StateSandbox<'_> {
    fn account(&self, addr: &Address) -> Option<Account> {
        self.accounts
            .get(addr)
            .or_else(|| self.ledger.account(addr))
            .cloned()
    }

    fn update_account(&mut self, acc: Account) {
        trace!("Staging account {}", acc.address());
        self.accounts.insert(acc.address(), acc);
    }

    fn validator(&self, addr: &Address) -> Option<Validator> {
        self.validators
            .get(addr)
            .or_else(|| self.ledger.validator(addr))
            .cloned()
    }

    fn update_validator(&mut self, val: Validator) {
        trace!("Staging validator {}", val.address());
        self.validators.insert(val.address(), val);
    }

    fn in_committee(&self, addr: &Address) -> bool {
        self.ledger.in_committee(addr)
    }

    fn current_height(&self) -> u64 {
        self.ledger.last_height()
    }

    fn block_hash_stamp(&self, height: u64) -> Option<Stamp> {
        self.ledger.block_hash_stamp(height)
    }

    fn transaction_to_live(&self) -> u64 {
        self.transaction_to_live
    }

    fn collect_fee(&mut self, fee: Amount) {
        self.collected_fees = self.collected_fees.saturating_add(fee);
    }
}

impl SupplyView for StateSandbox<'_> {
    fn total_balances(&self) -> u128 {
        let committed: u128 = self
            .ledger
            .accounts()
            .filter(|acc| !self.accounts.contains_key(&acc.address()))
            .map(|acc| acc.balance() as u128)
            .sum();
        let staged: u128 = self.accounts.values().map(|acc| acc.balance() as u128).sum();
        committed + staged
    }

    fn total_stakes(&self) -> u128 {
        let committed: u128 = self
            .ledger
            .validators()
            .filter(|val| !self.validators.contains_key(&val.address()))
            .map(|val| val.stake() as u128)
            .sum();
        let staged: u128 = self.validators.values().map(|val| val.stake() as u128).sum();
        committed + staged
    }

    fn total_collected_fees(&self) -> u128 {
        self.ledger.collected_fees() as u128 + self.collected_fees as u128
    }
}
