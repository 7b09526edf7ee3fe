pub mod genesis;
pub mod ledger;
pub mod sandbox;
pub mod state_sandbox;
pub mod supply;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use genesis::{Genesis, GenesisAccount, GenesisBlock, GenesisValidator};
pub use ledger::{LedgerState, StateError};
pub use sandbox::Sandbox;
pub use state_sandbox::{ChangeSet, Checkpoint, StateSandbox};
pub use supply::SupplyView;

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockSandbox;
