// UNBOND EXECUTOR
//
// Deactivates a validator's voting power and schedules its stake for
// withdrawal one block after the unbond lands.
//
// SAFETY INVARIANTS:
// 1. Checks run in a fixed order: fee (strict only), stamp, existence,
//    sequence, committee, already-unbonded. The first failure wins and
//    nothing is staged.
// 2. A committee member is never unbonded mid-term.
// 3. Unbonding is one-shot. The sequence guard rejects a byte-identical
//    replay, and the explicit already-unbonded check rejects a fresh
//    transaction with a correct sequence.
// 4. Stake is not moved; withdrawal is a separate transaction.
// 5. Unbond never charges a fee. Strict executors reject a non-zero fee
//    field; lenient executors ignore it.

use tracing::debug;

use stakex_core::{Amount, Payload, PayloadType, Transaction};
use stakex_state::Sandbox;

use crate::error::ExecutorError;
use crate::executor::{mismatch, Executor};
use crate::validation::{check_sequence, check_stamp};

/// Blocks between an unbond landing and its stake becoming withdrawable
pub const UNBONDING_DELAY: u64 = 1;

#[derive(Debug, Clone)]
pub struct UnbondExecutor {
    strict: bool,
    fee: Amount,
}

impl UnbondExecutor {
    pub fn new(strict: bool) -> Self {
        UnbondExecutor { strict, fee: 0 }
    }
}

impl Executor for UnbondExecutor {
    fn payload_type(&self) -> PayloadType {
        PayloadType::Unbond
    }

    fn execute(&mut self, trx: &Transaction, sandbox: &mut dyn Sandbox) -> Result<(), ExecutorError> {
        self.fee = 0;
        let pld = match &trx.payload {
            Payload::Unbond(pld) => pld,
            _ => return Err(mismatch(PayloadType::Unbond, trx)),
        };
        if self.strict && trx.fee != 0 {
            return Err(ExecutorError::InvalidFee {
                expected: 0,
                got: trx.fee,
            });
        }

        check_stamp(sandbox, &trx.stamp)?;

        let mut val = sandbox
            .validator(&pld.validator)
            .ok_or(ExecutorError::UnknownValidator(pld.validator))?;
        check_sequence(val.sequence(), trx.sequence)?;
        if sandbox.in_committee(&pld.validator) {
            return Err(ExecutorError::InsideCommittee(pld.validator));
        }
        if val.is_unbonded() {
            return Err(ExecutorError::AlreadyUnbonded(pld.validator));
        }

        let unbonding_height = sandbox.current_height().saturating_add(UNBONDING_DELAY);
        val.unbond(unbonding_height);
        val.increment_sequence();
        sandbox.update_validator(val);

        debug!(
            validator = %pld.validator,
            unbonding_height,
            "unbond applied"
        );
        Ok(())
    }

    fn fee(&self) -> Amount {
        self.fee
    }
}
