//! StakeX: deterministic execution of validator stake lifecycle transactions.
//!
//! - `stakex_core`: identifiers, accounts, validators and transactions
//! - `stakex_state`: committed ledger, height-scoped sandboxes, genesis
//! - `stakex_executor`: bond/unbond/send executors, dispatch and block application

pub use stakex_core;
pub use stakex_executor;
pub use stakex_state;

pub use stakex_core::{Account, Address, Amount, Hash, PublicKey, Stamp, Transaction, Validator};
pub use stakex_executor::{
    Block, BlockApplier, BlockError, BlockReport, ErrorKind, ExecutorConfig, ExecutorError,
    TransactionExecutor,
};
pub use stakex_state::{Genesis, LedgerState, Sandbox, StateError};
