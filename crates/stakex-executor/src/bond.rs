use tracing::debug;

use stakex_core::{Amount, Payload, PayloadType, Transaction, TransactionError};
use stakex_state::Sandbox;

use crate::error::ExecutorError;
use crate::executor::{mismatch, Executor};
use crate::fee::FeePolicy;
use crate::validation::{check_funds, check_sequence, check_stamp};

/// Moves coin from an account balance into a validator's stake, creating
/// the validator on its first bond.
#[derive(Debug, Clone)]
pub struct BondExecutor {
    strict: bool,
    policy: FeePolicy,
    fee: Amount,
}

impl BondExecutor {
    pub fn new(strict: bool, policy: FeePolicy) -> Self {
        BondExecutor {
            strict,
            policy,
            fee: 0,
        }
    }
}

impl Executor for BondExecutor {
    fn payload_type(&self) -> PayloadType {
        PayloadType::Bond
    }

    fn execute(&mut self, trx: &Transaction, sandbox: &mut dyn Sandbox) -> Result<(), ExecutorError> {
        self.fee = 0;
        let pld = match &trx.payload {
            Payload::Bond(pld) => pld,
            _ => return Err(mismatch(PayloadType::Bond, trx)),
        };
        if pld.stake == 0 {
            return Err(TransactionError::ZeroAmount(PayloadType::Bond).into());
        }

        check_stamp(sandbox, &trx.stamp)?;

        let mut bonder = sandbox
            .account(&pld.bonder)
            .ok_or(ExecutorError::UnknownAccount(pld.bonder))?;
        check_sequence(bonder.sequence(), trx.sequence)?;
        self.policy.check(self.strict, pld.stake, trx.fee)?;
        let total = check_funds(bonder.balance(), pld.stake, trx.fee)?;

        let val_addr = pld.validator.address();
        let mut val = match sandbox.validator(&val_addr) {
            Some(val) if val.is_unbonded() => return Err(ExecutorError::AlreadyUnbonded(val_addr)),
            Some(val) => val,
            None => sandbox.make_new_validator(pld.validator),
        };

        // All checks passed; mutate local copies, then stage them together.
        bonder.subtract_from_balance(total)?;
        val.add_to_stake(pld.stake, sandbox.current_height())?;
        bonder.increment_sequence();

        sandbox.update_account(bonder);
        sandbox.update_validator(val);
        sandbox.collect_fee(trx.fee);
        self.fee = trx.fee;

        debug!(
            bonder = %pld.bonder,
            validator = %val_addr,
            stake = pld.stake,
            fee = trx.fee,
            "bond applied"
        );
        Ok(())
    }

    fn fee(&self) -> Amount {
        self.fee
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakex_core::{Address, Hash, PublicKey};
    use stakex_state::{MockSandbox, SupplyView};

    struct Fixture {
        sandbox: MockSandbox,
        hash100: Hash,
        bonder: Address,
        total_coin: u128,
    }

    fn setup() -> Fixture {
        let mut sandbox = MockSandbox::new();
        let bonder = sandbox.add_test_account(10_000_000);
        sandbox.add_test_validator(5_000_000_000);
        let hash100 = Hash::generate_test_hash();
        sandbox.append_new_block(100, hash100);
        let total_coin = sandbox.total_coin();
        Fixture { sandbox, hash100, bonder, total_coin }
    }

    #[test]
    fn test_bond_creates_validator() {
        let mut f = setup();
        let mut exe = BondExecutor::new(true, FeePolicy::default());
        let key = PublicKey::generate_test_key();
        let seq = f.sandbox.account_sequence(&f.bonder) + 1;

        let trx = Transaction::new_bond_tx(f.hash100.stamp(), seq, f.bonder, key, 1000, 1000, "ok");
        exe.execute(&trx, &mut f.sandbox).unwrap();

        let val = f.sandbox.validator(&key.address()).unwrap();
        assert_eq!(val.stake(), 1000);
        assert_eq!(val.power(), 1000);
        assert_eq!(val.sequence(), 0);
        assert_eq!(val.last_bonding_height(), 100);

        let acc = f.sandbox.account(&f.bonder).unwrap();
        assert_eq!(acc.balance(), 10_000_000 - 2000);
        assert_eq!(acc.sequence(), 1);
        assert_eq!(exe.fee(), 1000);
        assert_eq!(f.sandbox.total_coin(), f.total_coin);
    }

    #[test]
    fn test_bond_adds_to_existing_stake() {
        let mut f = setup();
        let mut exe = BondExecutor::new(true, FeePolicy::default());
        let existing = f.sandbox.add_test_validator(4_000_000);
        f.total_coin = f.sandbox.total_coin();

        let trx = Transaction::new_bond_tx(
            f.hash100.stamp(),
            1,
            f.bonder,
            *existing.public_key(),
            2_000_000,
            2_000,
            "top up",
        );
        exe.execute(&trx, &mut f.sandbox).unwrap();

        let val = f.sandbox.validator(&existing.address()).unwrap();
        assert_eq!(val.stake(), 6_000_000);
        assert_eq!(val.power(), 6_000_000);
        assert_eq!(f.sandbox.account(&f.bonder).unwrap().balance(), 10_000_000 - 2_002_000);
        assert_eq!(f.sandbox.total_coin(), f.total_coin);
    }

    #[test]
    fn test_bond_rejections_leave_state_untouched() {
        let mut f = setup();
        let mut exe = BondExecutor::new(true, FeePolicy::default());
        let key = PublicKey::generate_test_key();
        let stamp = f.hash100.stamp();
        let before = f.sandbox.state.clone();

        let cases = vec![
            (
                Transaction::new_bond_tx(Hash::generate_test_hash().stamp(), 1, f.bonder, key, 1000, 1000, ""),
                "invalid stamp",
            ),
            (
                Transaction::new_bond_tx(stamp, 1, Address::generate_test_address(), key, 1000, 1000, ""),
                "unknown bonder",
            ),
            (Transaction::new_bond_tx(stamp, 2, f.bonder, key, 1000, 1000, ""), "sequence gap"),
            (Transaction::new_bond_tx(stamp, 0, f.bonder, key, 1000, 1000, ""), "stale sequence"),
            (Transaction::new_bond_tx(stamp, 1, f.bonder, key, 1000, 0, ""), "zero fee"),
            (Transaction::new_bond_tx(stamp, 1, f.bonder, key, 1000, 999, ""), "wrong fee"),
            (Transaction::new_bond_tx(stamp, 1, f.bonder, key, 0, 1000, ""), "zero stake"),
            (
                Transaction::new_bond_tx(stamp, 1, f.bonder, key, 20_000_000, 20_000, ""),
                "insufficient funds",
            ),
        ];

        for (trx, case) in cases {
            assert!(exe.execute(&trx, &mut f.sandbox).is_err(), "{} should fail", case);
            assert_eq!(exe.fee(), 0, "{}", case);
            assert_eq!(f.sandbox.state, before, "{} mutated state", case);
        }
    }

    #[test]
    fn test_bond_error_kinds() {
        let mut f = setup();
        let mut exe = BondExecutor::new(true, FeePolicy::default());
        let key = PublicKey::generate_test_key();
        let stamp = f.hash100.stamp();

        let trx = Transaction::new_bond_tx(stamp, 3, f.bonder, key, 1000, 1000, "");
        assert_eq!(
            exe.execute(&trx, &mut f.sandbox),
            Err(ExecutorError::InvalidSequence { expected: 1, got: 3 })
        );

        let trx = Transaction::new_bond_tx(stamp, 1, f.bonder, key, 1000, 0, "");
        assert_eq!(
            exe.execute(&trx, &mut f.sandbox),
            Err(ExecutorError::InvalidFee { expected: 1000, got: 0 })
        );

        let trx = Transaction::new_bond_tx(stamp, 1, f.bonder, key, 9_999_000, 9_999, "");
        assert!(matches!(
            exe.execute(&trx, &mut f.sandbox),
            Err(ExecutorError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn test_lenient_mode_accepts_zero_fee() {
        let mut f = setup();
        let mut strict = BondExecutor::new(true, FeePolicy::default());
        let mut lenient = BondExecutor::new(false, FeePolicy::default());
        let key = PublicKey::generate_test_key();

        let trx = Transaction::new_bond_tx(f.hash100.stamp(), 1, f.bonder, key, 1000, 0, "");
        assert!(strict.execute(&trx, &mut f.sandbox).is_err());
        lenient.execute(&trx, &mut f.sandbox).unwrap();
        assert_eq!(lenient.fee(), 0);
        assert_eq!(f.sandbox.validator(&key.address()).unwrap().stake(), 1000);
        assert_eq!(f.sandbox.total_coin(), f.total_coin);
    }

    #[test]
    fn test_cannot_bond_to_unbonded_validator() {
        let mut f = setup();
        let mut exe = BondExecutor::new(true, FeePolicy::default());
        let mut val = f.sandbox.add_test_validator(1000);
        val.unbond(50);
        f.sandbox.update_validator(val.clone());

        let trx = Transaction::new_bond_tx(f.hash100.stamp(), 1, f.bonder, *val.public_key(), 1000, 1000, "");
        assert_eq!(
            exe.execute(&trx, &mut f.sandbox),
            Err(ExecutorError::AlreadyUnbonded(val.address()))
        );
        assert_eq!(f.sandbox.account_sequence(&f.bonder), 0);
    }

    #[test]
    fn test_rejects_foreign_payload() {
        let mut f = setup();
        let mut exe = BondExecutor::new(true, FeePolicy::default());
        let trx = Transaction::new_unbond_tx(f.hash100.stamp(), 1, f.bonder, "");
        assert_eq!(
            exe.execute(&trx, &mut f.sandbox),
            Err(ExecutorError::PayloadMismatch {
                expected: PayloadType::Bond,
                got: PayloadType::Unbond
            })
        );
    }
}
