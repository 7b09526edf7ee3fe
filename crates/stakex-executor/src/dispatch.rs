//! Dispatch table keyed by transaction type.
//!
//! One executor instance per type, built from a single `ExecutorConfig` so
//! every type runs under the same strict/lenient regime.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use stakex_core::{Amount, PayloadType, Transaction};
use stakex_state::Sandbox;

use crate::bond::BondExecutor;
use crate::config::ExecutorConfig;
use crate::error::ExecutorError;
use crate::executor::Executor;
use crate::send::SendExecutor;
use crate::unbond::UnbondExecutor;

pub struct TransactionExecutor {
    executors: BTreeMap<PayloadType, Box<dyn Executor>>,
    max_memo_length: usize,
    /// Fees charged since the last `take_accumulated_fee`
    accumulated_fee: Amount,
}

impl TransactionExecutor {
    pub fn new(config: &ExecutorConfig) -> Self {
        let mut exe = TransactionExecutor {
            executors: BTreeMap::new(),
            max_memo_length: config.max_memo_length,
            accumulated_fee: 0,
        };
        exe.register(Box::new(SendExecutor::new(config.strict, config.fee.clone())));
        exe.register(Box::new(BondExecutor::new(config.strict, config.fee.clone())));
        exe.register(Box::new(UnbondExecutor::new(config.strict)));
        exe
    }

    /// Replace the executor for its payload type
    pub fn register(&mut self, executor: Box<dyn Executor>) {
        self.executors.insert(executor.payload_type(), executor);
    }

    pub fn execute(&mut self, trx: &Transaction, sandbox: &mut dyn Sandbox) -> Result<Amount, ExecutorError> {
        let result = self.dispatch(trx, sandbox);
        match &result {
            Ok(fee) => {
                self.accumulated_fee = self.accumulated_fee.saturating_add(*fee);
                debug!(id = %trx.id(), kind = %trx.payload_type(), fee, "transaction executed");
            }
            Err(err) => {
                warn!(
                    id = %trx.id(),
                    kind = %trx.payload_type(),
                    reason = ?err.kind(),
                    "transaction rejected: {}",
                    err
                );
            }
        }
        result
    }

    fn dispatch(&mut self, trx: &Transaction, sandbox: &mut dyn Sandbox) -> Result<Amount, ExecutorError> {
        trx.sanity_check(self.max_memo_length)?;
        let executor = self
            .executors
            .get_mut(&trx.payload_type())
            .ok_or(ExecutorError::UnsupportedPayload(trx.payload_type()))?;
        executor.execute(trx, sandbox)?;
        Ok(executor.fee())
    }

    pub fn accumulated_fee(&self) -> Amount {
        self.accumulated_fee
    }

    pub fn take_accumulated_fee(&mut self) -> Amount {
        std::mem::take(&mut self.accumulated_fee)
    }
}
