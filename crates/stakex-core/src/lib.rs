// === Identifiers ===
pub mod crypto;

// === Ledger Entities ===
pub mod account;
pub mod validator;

// === Transactions ===
pub mod transaction;

// === Re-exports ===
pub use account::{Account, Amount, AmountError};
pub use crypto::{Address, Hash, IdentifierError, PublicKey, Stamp};
pub use transaction::{
    BondPayload, Payload, PayloadType, SendPayload, Transaction, TransactionError, UnbondPayload,
    MAX_MEMO_LENGTH,
};
pub use validator::{power_from_stake, Validator};
