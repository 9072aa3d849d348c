//! Keccak256 hashing, signed-message digests and typed-data digests.

use sha3::{Digest, Keccak256};

use crate::abi::word_u64;
use crate::address::Address;
use crate::constants::EIP712_DOMAIN_TYPE;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Digest of `"\x19Ethereum Signed Message:\n32" ‖ hash`.
pub fn signed_message_hash(hash: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n32");
    hasher.update(hash);
    hasher.finalize().into()
}

/// First four bytes of the keccak256 of a function signature, e.g. `"count()"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = keccak256(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Typed-data signing domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedDomain {
    pub name: &'static str,
    pub version: &'static str,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl TypedDomain {
    pub fn new(
        name: &'static str,
        version: &'static str,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name,
            version,
            chain_id,
            verifying_contract,
        }
    }

    pub fn separator(&self) -> [u8; 32] {
        let mut encoded = Vec::with_capacity(32 * 5);
        encoded.extend_from_slice(&keccak256(EIP712_DOMAIN_TYPE.as_bytes()));
        encoded.extend_from_slice(&keccak256(self.name.as_bytes()));
        encoded.extend_from_slice(&keccak256(self.version.as_bytes()));
        encoded.extend_from_slice(&word_u64(self.chain_id));
        encoded.extend_from_slice(&self.verifying_contract.to_word());
        keccak256(&encoded)
    }

    /// `keccak256(0x19 0x01 ‖ separator ‖ struct_hash)`.
    pub fn digest(&self, struct_hash: &[u8; 32]) -> [u8; 32] {
        let mut hasher = Keccak256::new();
        hasher.update([0x19, 0x01]);
        hasher.update(self.separator());
        hasher.update(struct_hash);
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_of_empty_input() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_known_selectors() {
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector("Error(string)"), [0x08, 0xc3, 0x79, 0xa0]);
    }

    #[test]
    fn test_domain_separator_binds_contract_and_chain() {
        let a = TypedDomain::new("D", "1", 1, Address::from_label("a"));
        let b = TypedDomain::new("D", "1", 1, Address::from_label("b"));
        let c = TypedDomain::new("D", "1", 2, Address::from_label("a"));
        assert_ne!(a.separator(), b.separator());
        assert_ne!(a.separator(), c.separator());
        assert_eq!(a.digest(&[1u8; 32]), a.digest(&[1u8; 32]));
    }
}
