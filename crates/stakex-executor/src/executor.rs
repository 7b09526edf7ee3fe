use stakex_core::{Amount, PayloadType, Transaction};
use stakex_state::Sandbox;

use crate::error::ExecutorError;

/// Semantic validation and state mutation for one transaction type.
///
/// `execute` either applies the full mutation set to the sandbox or returns
/// an error having touched nothing. No I/O, no retries.
pub trait Executor {
    /// Transaction type this executor accepts
    fn payload_type(&self) -> PayloadType;

    fn execute(&mut self, trx: &Transaction, sandbox: &mut dyn Sandbox) -> Result<(), ExecutorError>;

    /// Fee charged by the most recent `execute`; 0 if it failed
    fn fee(&self) -> Amount;
}

pub(crate) fn mismatch(expected: PayloadType, trx: &Transaction) -> ExecutorError {
    ExecutorError::PayloadMismatch {
        expected,
        got: trx.payload_type(),
    }
}
