use serde::{Deserialize, Serialize};
use std::path::Path;

use stakex_core::{Address, Amount, Hash, PublicKey};

use crate::ledger::StateError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
    pub address: Address,
    pub balance: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisValidator {
    pub public_key: PublicKey,
    pub stake: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBlock {
    pub height: u64,
    pub hash: Hash,
}

/// Initial ledger contents, as read from a genesis file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    #[serde(default)]
    pub accounts: Vec<GenesisAccount>,
    #[serde(default)]
    pub validators: Vec<GenesisValidator>,
    /// Addresses of validators in the active signing committee
    #[serde(default)]
    pub committee: Vec<Address>,
    /// Recent blocks transactions may stamp against
    #[serde(default)]
    pub blocks: Vec<GenesisBlock>,
}

impl Genesis {
    pub fn from_json(json: &str) -> Result<Self, StateError> {
        serde_json::from_str(json).map_err(|e| StateError::InvalidGenesis(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| StateError::InvalidGenesis(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Sum of all balances and stakes; the supply every later state must keep
    pub fn total_supply(&self) -> u128 {
        let balances: u128 = self.accounts.iter().map(|acc| acc.balance as u128).sum();
        let stakes: u128 = self.validators.iter().map(|val| val.stake as u128).sum();
        balances + stakes
    }
}
