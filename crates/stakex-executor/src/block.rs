// BLOCK APPLICATION
//
// Applies a block's transactions in order against one sandbox scoped to the
// current tip, then commits the surviving mutations and appends the block.
//
// SAFETY INVARIANTS:
// 1. Transactions run strictly one after another, in block order
// 2. A rejected transaction is rolled back to the checkpoint taken before it
// 3. Nothing reaches the ledger until every transaction has been tried
// 4. Total coin is identical before and after the block; a block that
//    breaks this is refused before the ledger is touched

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, info_span};

use stakex_core::{Amount, Hash, PayloadType, Transaction};
use stakex_state::{LedgerState, StateError, SupplyView};

use crate::config::ExecutorConfig;
use crate::dispatch::TransactionExecutor;
use crate::error::ExecutorError;
use crate::executor::Executor;
use crate::invariants::{check_total_coin, InvariantError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub height: u64,
    pub hash: Hash,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    pub id: Hash,
    pub payload_type: PayloadType,
    /// Fee charged on success
    pub result: Result<Amount, ExecutorError>,
}

impl TxOutcome {
    pub fn is_applied(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockReport {
    pub height: u64,
    pub outcomes: Vec<TxOutcome>,
    pub total_fee: Amount,
    pub state_hash: Hash,
}

impl BlockReport {
    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    pub fn rejected(&self) -> usize {
        self.outcomes.len() - self.applied()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlockError {
    #[error("Block height {got} does not extend the tip at {tip}")]
    InvalidHeight { tip: u64, got: u64 },
    #[error("State error: {0}")]
    State(#[from] StateError),
    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantError),
}

pub struct BlockApplier {
    executor: TransactionExecutor,
    transaction_to_live: u64,
    check_invariants: bool,
}

impl BlockApplier {
    pub fn new(config: &ExecutorConfig) -> Self {
        BlockApplier {
            executor: TransactionExecutor::new(config),
            transaction_to_live: config.transaction_to_live,
            check_invariants: config.check_invariants,
        }
    }

    /// Replace the executor for its payload type
    pub fn register(&mut self, executor: Box<dyn Executor>) {
        self.executor.register(executor);
    }

    pub fn apply(&mut self, ledger: &mut LedgerState, block: &Block) -> Result<BlockReport, BlockError> {
        let tip = ledger.last_height();
        if ledger.block_hash(tip).is_some() && block.height <= tip {
            return Err(BlockError::InvalidHeight { tip, got: block.height });
        }
        let span = info_span!("apply_block", height = block.height);
        let _enter = span.enter();

        let supply_before = ledger.total_coin();
        let mut outcomes = Vec::with_capacity(block.transactions.len());

        let (changes, total_fee) = {
            let mut sandbox = ledger.sandbox(self.transaction_to_live);
            for trx in &block.transactions {
                let checkpoint = sandbox.checkpoint();
                let result = self.executor.execute(trx, &mut sandbox);
                if result.is_err() {
                    sandbox.revert(checkpoint);
                }
                outcomes.push(TxOutcome {
                    id: trx.id(),
                    payload_type: trx.payload_type(),
                    result,
                });
            }
            let total_fee = self.executor.take_accumulated_fee();
            if self.check_invariants {
                check_total_coin(&sandbox, supply_before)?;
            }
            (sandbox.commit(), total_fee)
        };

        ledger.append_block(block.height, block.hash)?;
        ledger.apply(changes);

        let report = BlockReport {
            height: block.height,
            outcomes,
            total_fee,
            state_hash: ledger.state_hash()?,
        };
        info!(
            applied = report.applied(),
            rejected = report.rejected(),
            total_fee,
            state_hash = %report.state_hash,
            "block applied"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakex_core::{Address, Payload, PublicKey};
    use stakex_state::{Genesis, GenesisAccount, Sandbox};

    /// Credits the sender out of thin air
    struct MintingExecutor;

    impl Executor for MintingExecutor {
        fn payload_type(&self) -> PayloadType {
            PayloadType::Send
        }

        fn execute(&mut self, trx: &Transaction, sandbox: &mut dyn Sandbox) -> Result<(), ExecutorError> {
            if let Payload::Send(pld) = &trx.payload {
                let mut acc = sandbox.make_new_account(pld.receiver);
                acc.add_to_balance(pld.amount)?;
                sandbox.update_account(acc);
            }
            Ok(())
        }

        fn fee(&self) -> Amount {
            0
        }
    }

    fn ledger() -> (LedgerState, Address, Hash) {
        let addr = Address::generate_test_address();
        let genesis = Genesis {
            accounts: vec![GenesisAccount {
                address: addr,
                balance: 1_000_000,
            }],
            ..Default::default()
        };
        let mut ledger = LedgerState::from_genesis(&genesis).unwrap();
        let hash = Hash::generate_test_hash();
        ledger.append_block(1, hash).unwrap();
        (ledger, addr, hash)
    }

    #[test]
    fn test_failed_transaction_is_rolled_back() {
        let (mut ledger, bonder, hash) = ledger();
        let mut applier = BlockApplier::new(&ExecutorConfig::default());
        let key = PublicKey::generate_test_key();

        let block = Block {
            height: 2,
            hash: Hash::generate_test_hash(),
            transactions: vec![
                Transaction::new_bond_tx(hash.stamp(), 1, bonder, key, 1_000, 1_000, "ok"),
                Transaction::new_bond_tx(hash.stamp(), 1, bonder, key, 1_000, 1_000, "replay"),
                Transaction::new_bond_tx(hash.stamp(), 2, bonder, key, 2_000_000, 2_000, "too much"),
            ],
        };

        let report = applier.apply(&mut ledger, &block).unwrap();
        assert_eq!(report.applied(), 1);
        assert_eq!(report.rejected(), 2);
        assert_eq!(report.total_fee, 1_000);
        assert!(matches!(
            report.outcomes[1].result,
            Err(ExecutorError::InvalidSequence { expected: 2, got: 1 })
        ));

        assert_eq!(ledger.account(&bonder).unwrap().balance(), 998_000);
        assert_eq!(ledger.account(&bonder).unwrap().sequence(), 1);
        assert_eq!(ledger.validator(&key.address()).unwrap().stake(), 1_000);
        assert_eq!(ledger.collected_fees(), 1_000);
        assert_eq!(ledger.last_height(), 2);
    }

    #[test]
    fn test_block_must_extend_tip() {
        let (mut ledger, _, _) = ledger();
        let mut applier = BlockApplier::new(&ExecutorConfig::default());
        let block = Block {
            height: 1,
            hash: Hash::generate_test_hash(),
            transactions: vec![],
        };
        assert_eq!(
            applier.apply(&mut ledger, &block),
            Err(BlockError::InvalidHeight { tip: 1, got: 1 })
        );
    }

    #[test]
    fn test_supply_drift_refused_before_commit() {
        let (mut ledger, sender, hash) = ledger();
        let mut applier = BlockApplier::new(&ExecutorConfig::default());
        applier.register(Box::new(MintingExecutor));
        let before = ledger.clone();

        let block = Block {
            height: 2,
            hash: Hash::generate_test_hash(),
            transactions: vec![Transaction::new_send_tx(
                hash.stamp(),
                1,
                sender,
                Address::generate_test_address(),
                500,
                1_000,
                "",
            )],
        };
        assert_eq!(
            applier.apply(&mut ledger, &block),
            Err(BlockError::Invariant(InvariantError::SupplyMismatch {
                expected: 1_000_000,
                actual: 1_000_500
            }))
        );
        assert_eq!(ledger, before);
        assert_eq!(ledger.last_height(), 1);
    }
}
