//! Transactions handled by the stake executor.
//!
//! Transactions reach the executor already decoded and, where the network
//! requires it, signature-checked. Only structural checks that need no ledger
//! state live here; everything else belongs to the executors.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::account::Amount;
use crate::crypto::{Address, Hash, PublicKey, Stamp};

/// Default upper bound on memo size in bytes
pub const MAX_MEMO_LENGTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadType {
    Send,
    Bond,
    Unbond,
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadType::Send => write!(f, "send"),
            PayloadType::Bond => write!(f, "bond"),
            PayloadType::Unbond => write!(f, "unbond"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendPayload {
    pub sender: Address,
    pub receiver: Address,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondPayload {
    /// Account paying for the stake and the fee
    pub bonder: Address,
    /// Key of the validator receiving the stake; created when unknown
    pub validator: PublicKey,
    pub stake: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondPayload {
    pub validator: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Send(SendPayload),
    Bond(BondPayload),
    Unbond(UnbondPayload),
}

impl Payload {
    pub fn payload_type(&self) -> PayloadType {
        match self {
            Payload::Send(_) => PayloadType::Send,
            Payload::Bond(_) => PayloadType::Bond,
            Payload::Unbond(_) => PayloadType::Unbond,
        }
    }

    /// Actor whose sequence number guards this transaction
    pub fn signer(&self) -> Address {
        match self {
            Payload::Send(pld) => pld.sender,
            Payload::Bond(pld) => pld.bonder,
            Payload::Unbond(pld) => pld.validator,
        }
    }

    /// Coin moved by the payload, excluding the fee
    pub fn value(&self) -> Amount {
        match self {
            Payload::Send(pld) => pld.amount,
            Payload::Bond(pld) => pld.stake,
            Payload::Unbond(_) => 0,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Memo too long: {len} bytes, limit {max}")]
    MemoTooLong { len: usize, max: usize },
    #[error("{0} amount must be positive")]
    ZeroAmount(PayloadType),
    #[error("Sender and receiver are the same account")]
    SelfTransfer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Stamp of the recent block this transaction was built against
    pub stamp: Stamp,
    pub sequence: u64,
    pub fee: Amount,
    pub payload: Payload,
    #[serde(default)]
    pub memo: String,
}

impl Transaction {
    pub fn new_send_tx(
        stamp: Stamp,
        sequence: u64,
        sender: Address,
        receiver: Address,
        amount: Amount,
        fee: Amount,
        memo: &str,
    ) -> Self {
        Transaction {
            stamp,
            sequence,
            fee,
            payload: Payload::Send(SendPayload {
                sender,
                receiver,
                amount,
            }),
            memo: memo.to_string(),
        }
    }

    pub fn new_bond_tx(
        stamp: Stamp,
        sequence: u64,
        bonder: Address,
        validator: PublicKey,
        stake: Amount,
        fee: Amount,
        memo: &str,
    ) -> Self {
        Transaction {
            stamp,
            sequence,
            fee,
            payload: Payload::Bond(BondPayload {
                bonder,
                validator,
                stake,
            }),
            memo: memo.to_string(),
        }
    }

    /// Unbond carries no fee field; the fee is always zero
    pub fn new_unbond_tx(stamp: Stamp, sequence: u64, validator: Address, memo: &str) -> Self {
        Transaction {
            stamp,
            sequence,
            fee: 0,
            payload: Payload::Unbond(UnbondPayload { validator }),
            memo: memo.to_string(),
        }
    }

    pub fn payload_type(&self) -> PayloadType {
        self.payload.payload_type()
    }

    /// Canonical byte layout: stamp, sequence, fee, payload tag, payload
    /// fields, memo. Every field is fixed width except the trailing memo.
    pub fn sign_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(128 + self.memo.len());
        buf.extend_from_slice(self.stamp.as_bytes());
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        buf.extend_from_slice(&self.fee.to_le_bytes());
        match &self.payload {
            Payload::Send(pld) => {
                buf.push(1);
                buf.extend_from_slice(pld.sender.as_bytes());
                buf.extend_from_slice(pld.receiver.as_bytes());
                buf.extend_from_slice(&pld.amount.to_le_bytes());
            }
            Payload::Bond(pld) => {
                buf.push(2);
                buf.extend_from_slice(pld.bonder.as_bytes());
                buf.extend_from_slice(pld.validator.as_bytes());
                buf.extend_from_slice(&pld.stake.to_le_bytes());
            }
            Payload::Unbond(pld) => {
                buf.push(3);
                buf.extend_from_slice(pld.validator.as_bytes());
            }
        }
        buf.extend_from_slice(self.memo.as_bytes());
        buf
    }

    pub fn id(&self) -> Hash {
        Hash::calc(&self.sign_bytes())
    }

    /// Structural checks that need no ledger state
    pub fn sanity_check(&self, max_memo_length: usize) -> Result<(), TransactionError> {
        if self.memo.len() > max_memo_length {
            return Err(TransactionError::MemoTooLong {
                len: self.memo.len(),
                max: max_memo_length,
            });
        }

        match &self.payload {
            Payload::Send(pld) => {
                if pld.amount == 0 {
                    return Err(TransactionError::ZeroAmount(PayloadType::Send));
                }
                if pld.sender == pld.receiver {
                    return Err(TransactionError::SelfTransfer);
                }
            }
            Payload::Bond(pld) => {
                if pld.stake == 0 {
                    return Err(TransactionError::ZeroAmount(PayloadType::Bond));
                }
            }
            Payload::Unbond(_) => {}
        }

        Ok(())
    }
}
