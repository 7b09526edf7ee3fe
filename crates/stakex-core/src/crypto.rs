// IDENTIFIERS: hashes, block stamps, public keys and addresses
//
// Every identifier is a fixed-size byte array. The text form (Display/FromStr
// and serde) is lowercase hex so genesis and block files stay readable;
// signature verification lives outside this workspace, so keys are opaque.

use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const HASH_SIZE: usize = 32;
pub const STAMP_SIZE: usize = 4;
pub const ADDRESS_SIZE: usize = 21;
pub const PUBLIC_KEY_SIZE: usize = 48;

/// Type tag stored in the first byte of every key-derived address
pub const ADDRESS_TYPE_BLS: u8 = 1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], IdentifierError> {
    let bytes = hex::decode(s).map_err(|e| IdentifierError::InvalidHex(e.to_string()))?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| IdentifierError::InvalidLength { expected: N, actual })
}

macro_rules! hex_identifier {
    ($(#[$meta:meta])* $name:ident, $size:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub [u8; $size]);

        impl $name {
            pub fn from_bytes(bytes: [u8; $size]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                decode_fixed::<$size>(s).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&hex::encode(self.0))
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_identifier!(
    /// SHA-256 digest, used for block hashes and transaction ids
    Hash,
    HASH_SIZE
);

hex_identifier!(
    /// First four bytes of a block hash. Transactions carry a stamp to
    /// prove they were built against a recent block.
    Stamp,
    STAMP_SIZE
);

hex_identifier!(
    /// Opaque validator public key
    PublicKey,
    PUBLIC_KEY_SIZE
);

hex_identifier!(
    /// Account or validator address
    Address,
    ADDRESS_SIZE
);

impl Hash {
    /// Hash arbitrary bytes with SHA-256
    pub fn calc(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut out = [0u8; HASH_SIZE];
        out.copy_from_slice(&digest);
        Hash(out)
    }

    pub fn stamp(&self) -> Stamp {
        let mut out = [0u8; STAMP_SIZE];
        out.copy_from_slice(&self.0[..STAMP_SIZE]);
        Stamp(out)
    }

    /// Random hash for fixtures
    pub fn generate_test_hash() -> Self {
        let mut out = [0u8; HASH_SIZE];
        rand::thread_rng().fill_bytes(&mut out);
        Hash(out)
    }
}

impl PublicKey {
    /// Address = type tag || SHA-256(key)[1..21]
    pub fn address(&self) -> Address {
        let digest = Sha256::digest(self.0);
        let mut out = [0u8; ADDRESS_SIZE];
        out.copy_from_slice(&digest[..ADDRESS_SIZE]);
        out[0] = ADDRESS_TYPE_BLS;
        Address(out)
    }

    /// Random key for fixtures
    pub fn generate_test_key() -> Self {
        let mut out = [0u8; PUBLIC_KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut out);
        PublicKey(out)
    }
}

impl Address {
    pub fn generate_test_address() -> Self {
        PublicKey::generate_test_key().address()
    }
}
