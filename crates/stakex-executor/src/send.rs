use tracing::debug;

use stakex_core::{Amount, Payload, PayloadType, Transaction, TransactionError};
use stakex_state::Sandbox;

use crate::error::ExecutorError;
use crate::executor::{mismatch, Executor};
use crate::fee::FeePolicy;
use crate::validation::{check_funds, check_sequence, check_stamp};

/// Transfers coin between accounts. The receiver is created on first credit.
#[derive(Debug, Clone)]
pub struct SendExecutor {
    strict: bool,
    policy: FeePolicy,
    fee: Amount,
}

impl SendExecutor {
    pub fn new(strict: bool, policy: FeePolicy) -> Self {
        SendExecutor {
            strict,
            policy,
            fee: 0,
        }
    }
}

impl Executor for SendExecutor {
    fn payload_type(&self) -> PayloadType {
        PayloadType::Send
    }

    fn execute(&mut self, trx: &Transaction, sandbox: &mut dyn Sandbox) -> Result<(), ExecutorError> {
        self.fee = 0;
        let pld = match &trx.payload {
            Payload::Send(pld) => pld,
            _ => return Err(mismatch(PayloadType::Send, trx)),
        };
        if pld.amount == 0 {
            return Err(TransactionError::ZeroAmount(PayloadType::Send).into());
        }
        // Two copies of one account would let the second write mint coin
        if pld.sender == pld.receiver {
            return Err(TransactionError::SelfTransfer.into());
        }

        check_stamp(sandbox, &trx.stamp)?;

        let mut sender = sandbox
            .account(&pld.sender)
            .ok_or(ExecutorError::UnknownAccount(pld.sender))?;
        check_sequence(sender.sequence(), trx.sequence)?;
        self.policy.check(self.strict, pld.amount, trx.fee)?;
        let total = check_funds(sender.balance(), pld.amount, trx.fee)?;

        let mut receiver = match sandbox.account(&pld.receiver) {
            Some(acc) => acc,
            None => sandbox.make_new_account(pld.receiver),
        };

        sender.subtract_from_balance(total)?;
        receiver.add_to_balance(pld.amount)?;
        sender.increment_sequence();

        sandbox.update_account(sender);
        sandbox.update_account(receiver);
        sandbox.collect_fee(trx.fee);
        self.fee = trx.fee;

        debug!(
            sender = %pld.sender,
            receiver = %pld.receiver,
            amount = pld.amount,
            fee = trx.fee,
            "send applied"
        );
        Ok(())
    }

    fn fee(&self) -> Amount {
        self.fee
    }
}
