// SHARED VALIDATION
//
// Every executor goes through these checks instead of re-implementing them.
// Two transaction types validating the same field differently is how nodes
// end up disagreeing about a block.

use stakex_core::{Amount, AmountError, Stamp};
use stakex_state::Sandbox;

use crate::error::ExecutorError;

/// The stamp must belong to a block within the sandbox's TTL window.
/// Returns the height of that block.
pub fn check_stamp(sandbox: &dyn Sandbox, stamp: &Stamp) -> Result<u64, ExecutorError> {
    sandbox
        .recent_block_height(stamp)
        .ok_or(ExecutorError::InvalidStamp(*stamp))
}

/// Replay guard: `got` must be exactly one past `current`
pub fn check_sequence(current: u64, got: u64) -> Result<(), ExecutorError> {
    let expected = current.checked_add(1).ok_or(AmountError::Overflow {
        current,
        delta: 1,
    })?;
    if got != expected {
        return Err(ExecutorError::InvalidSequence { expected, got });
    }
    Ok(())
}

/// `available` must cover `amount + fee`. Returns the total to debit.
pub fn check_funds(available: Amount, amount: Amount, fee: Amount) -> Result<Amount, ExecutorError> {
    let required = amount.checked_add(fee).ok_or(AmountError::Overflow {
        current: amount,
        delta: fee,
    })?;
    if available < required {
        return Err(ExecutorError::InsufficientFunds {
            required,
            available,
        });
    }
    Ok(required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakex_core::Hash;
    use stakex_state::MockSandbox;

    #[test]
    fn test_check_sequence() {
        assert!(check_sequence(0, 1).is_ok());
        assert_eq!(
            check_sequence(4, 4),
            Err(ExecutorError::InvalidSequence { expected: 5, got: 4 })
        );
        assert_eq!(
            check_sequence(4, 6),
            Err(ExecutorError::InvalidSequence { expected: 5, got: 6 })
        );
        assert!(matches!(
            check_sequence(u64::MAX, 0),
            Err(ExecutorError::Arithmetic(_))
        ));
    }

    #[test]
    fn test_check_funds() {
        assert_eq!(check_funds(2000, 1000, 1000), Ok(2000));
        assert_eq!(
            check_funds(1999, 1000, 1000),
            Err(ExecutorError::InsufficientFunds { required: 2000, available: 1999 })
        );
        assert!(matches!(
            check_funds(u64::MAX, u64::MAX, 1),
            Err(ExecutorError::Arithmetic(_))
        ));
    }

    #[test]
    fn test_check_stamp() {
        let mut sandbox = MockSandbox::new();
        let hash = Hash::generate_test_hash();
        sandbox.append_new_block(100, hash);

        assert_eq!(check_stamp(&sandbox, &hash.stamp()), Ok(100));

        let unknown = Hash::generate_test_hash().stamp();
        assert_eq!(check_stamp(&sandbox, &unknown), Err(ExecutorError::InvalidStamp(unknown)));

        sandbox.transaction_to_live = 5;
        sandbox.append_new_block(106, Hash::generate_test_hash());
        assert_eq!(
            check_stamp(&sandbox, &hash.stamp()),
            Err(ExecutorError::InvalidStamp(hash.stamp()))
        );
    }
}
