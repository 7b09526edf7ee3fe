//! FEE POLICY
//!
//! Fees are a fixed fraction of the transferred amount, clamped to
//! [min_fee, max_fee]. Strict executors require the exact policy fee;
//! lenient executors (bootstrap, migrations) accept whatever the
//! transaction carries, zero included.

use serde::{Deserialize, Serialize};

use stakex_core::Amount;

use crate::config::ConfigError;
use crate::error::ExecutorError;

/// Basis-point denominator (10_000 bps = 100%)
pub const BPS_DENOMINATOR: u128 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeePolicy {
    /// Fee as a fraction of the amount, in basis points
    pub fee_fraction_bps: u64,
    pub min_fee: Amount,
    pub max_fee: Amount,
}

impl Default for FeePolicy {
    fn default() -> Self {
        FeePolicy {
            fee_fraction_bps: 10, // 0.1%
            min_fee: 1_000,
            max_fee: 1_000_000,
        }
    }
}

impl FeePolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_fee == 0 {
            return Err(ConfigError::InvalidFeePolicy(
                "min_fee must be > 0".to_string(),
            ));
        }
        if self.max_fee < self.min_fee {
            return Err(ConfigError::InvalidFeePolicy(format!(
                "max_fee {} is below min_fee {}",
                self.max_fee, self.min_fee
            )));
        }
        if self.fee_fraction_bps as u128 > BPS_DENOMINATOR {
            return Err(ConfigError::InvalidFeePolicy(
                "fee_fraction_bps cannot exceed 10000".to_string(),
            ));
        }
        Ok(())
    }

    /// Policy fee for moving `amount`
    pub fn calculate(&self, amount: Amount) -> Amount {
        let fee = (amount as u128) * (self.fee_fraction_bps as u128) / BPS_DENOMINATOR;
        // Unvalidated policies (bps > 100%) can exceed Amount
        Amount::try_from(fee)
            .unwrap_or(Amount::MAX)
            .max(self.min_fee)
            .min(self.max_fee)
    }

    pub fn check(&self, strict: bool, amount: Amount, fee: Amount) -> Result<(), ExecutorError> {
        if !strict {
            return Ok(());
        }
        let expected = self.calculate(amount);
        if fee != expected {
            return Err(ExecutorError::InvalidFee { expected, got: fee });
        }
        Ok(())
    }
}
