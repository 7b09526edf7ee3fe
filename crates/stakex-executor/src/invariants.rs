// COIN CONSERVATION
//
// No transaction creates or destroys coin; it only moves it between
// balances, stakes and the fee pool. Any drift is a consensus bug.

use thiserror::Error;

use stakex_state::SupplyView;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("Total coin mismatch: expected {expected}, found {actual}")]
    SupplyMismatch { expected: u128, actual: u128 },
}

/// Balances + stakes + collected fees must equal `expected`
pub fn check_total_coin(view: &dyn SupplyView, expected: u128) -> Result<(), InvariantError> {
    let actual = view.total_coin();
    if actual != expected {
        return Err(InvariantError::SupplyMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakex_state::{MockSandbox, Sandbox};

    #[test]
    fn test_detects_drift() {
        let mut sandbox = MockSandbox::new();
        let addr = sandbox.add_test_account(500);
        sandbox.add_test_validator(500);
        assert!(check_total_coin(&sandbox, 1000).is_ok());

        let mut acc = sandbox.account(&addr).unwrap();
        acc.add_to_balance(1).unwrap();
        sandbox.update_account(acc);
        assert_eq!(
            check_total_coin(&sandbox, 1000),
            Err(InvariantError::SupplyMismatch { expected: 1000, actual: 1001 })
        );
    }
}
