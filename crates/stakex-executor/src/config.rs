use serde::{Deserialize, Serialize};
use thiserror::Error;

use stakex_core::MAX_MEMO_LENGTH;

use crate::fee::FeePolicy;

/// Blocks a stamp may reach back by default (one day of 10s blocks)
pub const DEFAULT_TRANSACTION_TO_LIVE: u64 = 8640;

/// Network-wide execution policy.
///
/// Fixed when executors are built; never switched per transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Enforce the policy fee exactly. Off only during bootstrap/migration.
    pub strict: bool,
    pub fee: FeePolicy,
    pub transaction_to_live: u64,
    pub max_memo_length: usize,
    /// Re-check coin conservation after every applied block
    pub check_invariants: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig {
            strict: true,
            fee: FeePolicy::default(),
            transaction_to_live: DEFAULT_TRANSACTION_TO_LIVE,
            max_memo_length: MAX_MEMO_LENGTH,
            check_invariants: true,
        }
    }
}

impl ExecutorConfig {
    pub fn lenient() -> Self {
        ExecutorConfig {
            strict: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fee.validate()?;
        if self.transaction_to_live == 0 {
            return Err(ConfigError::InvalidTransactionToLive);
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid fee policy: {0}")]
    InvalidFeePolicy(String),
    #[error("transaction_to_live must be > 0")]
    InvalidTransactionToLive,
}
