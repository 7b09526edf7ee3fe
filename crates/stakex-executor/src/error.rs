use thiserror::Error;

use stakex_core::{Address, Amount, AmountError, PayloadType, Stamp, TransactionError};

/// Coarse classification of a rejection, for mempool/consensus policy.
///
/// Every kind means the transaction was rejected and nothing was mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Stamp does not reference a known recent block
    MalformedReference,
    /// Structurally invalid payload, arithmetic overflow, wrong executor
    Malformed,
    /// Sequence is not the expected next value
    Replay,
    InsufficientFunds,
    /// Referenced account or validator does not exist
    UnknownEntity,
    /// Committee unbonding, double unbonding, strict-mode fee
    PolicyViolation,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("Invalid stamp {0}: no recent block carries it")]
    InvalidStamp(Stamp),
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(#[from] TransactionError),
    #[error("Arithmetic error: {0}")]
    Arithmetic(#[from] AmountError),
    #[error("Payload type {got} does not match the {expected} executor")]
    PayloadMismatch {
        expected: PayloadType,
        got: PayloadType,
    },
    #[error("No executor registered for {0} transactions")]
    UnsupportedPayload(PayloadType),
    #[error("Invalid sequence: expected {expected}, got {got}")]
    InvalidSequence { expected: u64, got: u64 },
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Amount, available: Amount },
    #[error("Invalid account {0}")]
    UnknownAccount(Address),
    #[error("Invalid validator {0}")]
    UnknownValidator(Address),
    #[error("Validator {0} is inside committee")]
    InsideCommittee(Address),
    #[error("Validator {0} has already unbonded")]
    AlreadyUnbonded(Address),
    #[error("Invalid fee: expected {expected}, got {got}")]
    InvalidFee { expected: Amount, got: Amount },
}

impl ExecutorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecutorError::InvalidStamp(_) => ErrorKind::MalformedReference,
            ExecutorError::InvalidTransaction(_)
            | ExecutorError::Arithmetic(_)
            | ExecutorError::PayloadMismatch { .. }
            | ExecutorError::UnsupportedPayload(_) => ErrorKind::Malformed,
            ExecutorError::InvalidSequence { .. } => ErrorKind::Replay,
            ExecutorError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            ExecutorError::UnknownAccount(_) | ExecutorError::UnknownValidator(_) => {
                ErrorKind::UnknownEntity
            }
            ExecutorError::InsideCommittee(_)
            | ExecutorError::AlreadyUnbonded(_)
            | ExecutorError::InvalidFee { .. } => ErrorKind::PolicyViolation,
        }
    }
}
