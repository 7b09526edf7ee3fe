//! The only channel through which executors observe or mutate ledger state.
//!
//! A sandbox is scoped to one block height and owned by exactly one
//! executing context at a time; `&mut self` on every mutation makes the
//! single-writer rule a compile-time property. Entities are handed out by
//! value, so an executor never holds on to state past a call. Staged
//! changes stay invisible outside the sandbox until the caller commits them.

use stakex_core::{Account, Address, Amount, PublicKey, Stamp, Validator};

pub trait Sandbox {
    fn account(&self, addr: &Address) -> Option<Account>;

    /// Fresh zero-balance account. Nothing is staged until `update_account`.
    fn make_new_account(&mut self, addr: Address) -> Account {
        Account::new(addr)
    }

    fn update_account(&mut self, acc: Account);

    /// Current sequence of an account, 0 when the account does not exist
    fn account_sequence(&self, addr: &Address) -> u64 {
        self.account(addr).map(|acc| acc.sequence()).unwrap_or(0)
    }

    fn validator(&self, addr: &Address) -> Option<Validator>;

    /// Fresh unbonded validator. Nothing is staged until `update_validator`.
    fn make_new_validator(&mut self, public_key: PublicKey) -> Validator {
        Validator::new(public_key)
    }

    fn update_validator(&mut self, val: Validator);

    /// Whether the validator is part of the active signing committee
    fn in_committee(&self, addr: &Address) -> bool;

    /// Height of the most recent block known to this sandbox
    fn current_height(&self) -> u64;

    fn block_hash_stamp(&self, height: u64) -> Option<Stamp>;

    /// How many blocks back a transaction stamp may reach
    fn transaction_to_live(&self) -> u64;

    /// Height of the newest block whose hash carries `stamp`, searched within
    /// the last `transaction_to_live` blocks
    fn recent_block_height(&self, stamp: &Stamp) -> Option<u64> {
        let current = self.current_height();
        let oldest = current.saturating_sub(self.transaction_to_live());
        (oldest..=current)
            .rev()
            .find(|height| self.block_hash_stamp(*height).as_ref() == Some(stamp))
    }

    /// Record a fee for aggregate collection at block end
    fn collect_fee(&mut self, fee: Amount);
}
