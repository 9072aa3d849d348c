//! 20-byte ledger identities.

use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::ADDRESS_LEN;
use crate::error::CodecError;
use crate::hash::keccak256;

#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, BorshSerialize, BorshDeserialize,
)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);
    pub const LEN: usize = ADDRESS_LEN;

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        let raw: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| CodecError::InvalidLength {
            expected: ADDRESS_LEN,
            actual: bytes.len(),
        })?;
        Ok(Address(raw))
    }

    /// Reads an address from the first 20 bytes of `bytes`.
    pub fn from_prefix(bytes: &[u8]) -> Result<Self, CodecError> {
        match bytes.get(..ADDRESS_LEN) {
            Some(prefix) => Self::from_slice(prefix),
            None => Err(CodecError::TooShort {
                needed: ADDRESS_LEN,
                available: bytes.len(),
            }),
        }
    }

    /// Address of an uncompressed public key: last 20 bytes of its keccak256.
    pub fn from_public_key(public_key: &libsecp256k1::PublicKey) -> Self {
        let serialized = public_key.serialize();
        let digest = keccak256(&serialized[1..]);
        let mut raw = [0u8; ADDRESS_LEN];
        raw.copy_from_slice(&digest[12..]);
        Address(raw)
    }

    /// Deterministic address of code deployed by `deployer` under `salt`.
    pub fn derive(deployer: &Address, salt: &[u8; 32], code_hash: &[u8; 32]) -> Self {
        let mut preimage = Vec::with_capacity(1 + ADDRESS_LEN + 64);
        preimage.push(0xff);
        preimage.extend_from_slice(&deployer.0);
        preimage.extend_from_slice(salt);
        preimage.extend_from_slice(code_hash);
        let digest = keccak256(&preimage);
        let mut raw = [0u8; ADDRESS_LEN];
        raw.copy_from_slice(&digest[12..]);
        Address(raw)
    }

    /// Convenience constructor for fixtures and well-known addresses.
    pub fn from_label(label: &str) -> Self {
        let digest = keccak256(label.as_bytes());
        let mut raw = [0u8; ADDRESS_LEN];
        raw.copy_from_slice(&digest[12..]);
        Address(raw)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// Left-padded 32-byte word form.
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Address {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(trimmed).map_err(|e| CodecError::InvalidHex(e.to_string()))?;
        Address::from_slice(&bytes)
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(raw: [u8; ADDRESS_LEN]) -> Self {
        Address(raw)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as Deserialize>::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
