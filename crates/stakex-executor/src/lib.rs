//! StakeX transaction execution.
//!
//! Validates bond, unbond and send transactions against a height-scoped
//! sandbox and applies their effects. Execution is deterministic: the same
//! state and transaction always give the same outcome on every node.

// === Policy ===
pub mod config;
pub mod fee;

// === Errors & Checks ===
pub mod error;
pub mod invariants;
pub mod validation;

// === Executors ===
pub mod executor;
pub mod bond;
pub mod send;
pub mod unbond;

// === Pipeline ===
pub mod dispatch;
pub mod block;

// Re-export key types for easy access
pub use config::{ConfigError, ExecutorConfig, DEFAULT_TRANSACTION_TO_LIVE};
pub use fee::{FeePolicy, BPS_DENOMINATOR};

pub use error::{ErrorKind, ExecutorError};
pub use invariants::{check_total_coin, InvariantError};

pub use executor::Executor;
pub use bond::BondExecutor;
pub use send::SendExecutor;
pub use unbond::{UnbondExecutor, UNBONDING_DELAY};

pub use dispatch::TransactionExecutor;
pub use block::{Block, BlockApplier, BlockError, BlockReport, TxOutcome};
