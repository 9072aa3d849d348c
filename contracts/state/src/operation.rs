//! The operation data model and its canonical, replay-safe hash.

use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::abi::{append_bytes, word_u128, word_u64};
use crate::address::Address;
use crate::error::CodecError;
use crate::hash::keccak256;

/// A pseudo-transaction submitted on behalf of `sender`.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct Operation {
    /// Account the operation acts for
    pub sender: Address,
    /// Anti-replay counter of the account
    pub nonce: u64,
    /// `[factory 20B][factory call data]`, empty once the account exists
    pub init_code: Vec<u8>,
    /// Payload executed by the account
    pub call_data: Vec<u8>,
    /// Gas available to the execution phase
    pub call_gas_limit: u64,
    /// Gas available to deployment and validation
    pub verification_gas_limit: u64,
    /// Fixed overhead charged on top of measured gas
    pub pre_verification_gas: u64,
    pub max_fee_per_unit: u128,
    pub max_priority_fee_per_unit: u128,
    /// Empty, or `[sponsor 20B][sponsor-specific data]`
    pub sponsor_and_data: Vec<u8>,
    /// Excluded from the hash
    pub signature: Vec<u8>,
}

/// Digest identifying an operation for one coordinator on one chain.
#[derive(
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct OperationHash(pub [u8; 32]);

impl OperationHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for OperationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for OperationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Operation {
    /// Canonical packing of every field except `signature`.
    pub fn pack(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 * 13 + self.init_code.len() + self.call_data.len());
        out.extend_from_slice(&self.sender.to_word());
        out.extend_from_slice(&word_u64(self.nonce));
        append_bytes(&mut out, &self.init_code);
        append_bytes(&mut out, &self.call_data);
        out.extend_from_slice(&word_u64(self.call_gas_limit));
        out.extend_from_slice(&word_u64(self.verification_gas_limit));
        out.extend_from_slice(&word_u64(self.pre_verification_gas));
        out.extend_from_slice(&word_u128(self.max_fee_per_unit));
        out.extend_from_slice(&word_u128(self.max_priority_fee_per_unit));
        append_bytes(&mut out, &self.sponsor_and_data);
        out
    }

    /// `keccak256(keccak256(pack) ‖ entry_point ‖ chain_id)`.
    pub fn hash(&self, entry_point: &Address, chain_id: u64) -> OperationHash {
        let mut outer = Vec::with_capacity(96);
        outer.extend_from_slice(&keccak256(&self.pack()));
        outer.extend_from_slice(&entry_point.to_word());
        outer.extend_from_slice(&word_u64(chain_id));
        OperationHash(keccak256(&outer))
    }

    /// Sponsor named in `sponsor_and_data`, if any.
    pub fn sponsor(&self) -> Result<Option<Address>, CodecError> {
        if self.sponsor_and_data.is_empty() {
            return Ok(None);
        }
        Address::from_prefix(&self.sponsor_and_data).map(Some)
    }

    /// Bytes following the sponsor address.
    pub fn sponsor_data(&self) -> &[u8] {
        self.sponsor_and_data.get(Address::LEN..).unwrap_or(&[])
    }

    /// Factory and its call data, when the operation deploys its sender.
    pub fn factory(&self) -> Result<Option<(Address, &[u8])>, CodecError> {
        if self.init_code.is_empty() {
            return Ok(None);
        }
        let factory = Address::from_prefix(&self.init_code)?;
        Ok(Some((factory, &self.init_code[Address::LEN..])))
    }

    /// Price per gas unit given the ledger's base fee.
    pub fn gas_price(&self, base_fee: u128) -> u128 {
        if self.max_fee_per_unit == self.max_priority_fee_per_unit {
            return self.max_fee_per_unit;
        }
        self.max_fee_per_unit
            .min(self.max_priority_fee_per_unit.saturating_add(base_fee))
    }

    /// Worst-case cost the payer must escrow before validation completes.
    pub fn required_prefund(&self, verification_multiplier: u64) -> u128 {
        let gas = u128::from(self.call_gas_limit)
            + u128::from(self.verification_gas_limit) * u128::from(verification_multiplier)
            + u128::from(self.pre_verification_gas);
        gas.saturating_mul(self.max_fee_per_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Operation {
        Operation {
            sender: Address::from_label("account"),
            nonce: 3,
            init_code: vec![],
            call_data: vec![1, 2, 3],
            call_gas_limit: 100_000,
            verification_gas_limit: 200_000,
            pre_verification_gas: 21_000,
            max_fee_per_unit: 10,
            max_priority_fee_per_unit: 2,
            sponsor_and_data: vec![],
            signature: vec![0; 65],
        }
    }

    #[test]
    fn test_signature_is_not_hashed() {
        let entry_point = Address::from_label("entry-point");
        let op = sample();
        let mut resigned = op.clone();
        resigned.signature = vec![9; 66];
        assert_eq!(op.hash(&entry_point, 1), resigned.hash(&entry_point, 1));
    }

    #[test]
    fn test_hash_binds_every_field_and_context() {
        let entry_point = Address::from_label("entry-point");
        let base = sample().hash(&entry_point, 1);

        let mut changed = sample();
        changed.call_data.push(4);
        assert_ne!(changed.hash(&entry_point, 1), base);

        let mut changed = sample();
        changed.max_priority_fee_per_unit += 1;
        assert_ne!(changed.hash(&entry_point, 1), base);

        assert_ne!(sample().hash(&entry_point, 2), base);
        assert_ne!(sample().hash(&Address::from_label("other"), 1), base);
    }

    #[test]
    fn test_dynamic_fields_do_not_alias() {
        let mut a = sample();
        a.init_code = vec![1];
        a.call_data = vec![];
        let mut b = sample();
        b.init_code = vec![];
        b.call_data = vec![1];
        assert_ne!(a.pack(), b.pack());
    }

    #[test]
    fn test_prefund_and_price() {
        let op = sample();
        assert_eq!(op.required_prefund(1), (100_000 + 200_000 + 21_000) * 10);
        assert_eq!(op.required_prefund(3), (100_000 + 600_000 + 21_000) * 10);
        assert_eq!(op.gas_price(5), 7);
        assert_eq!(op.gas_price(50), 10);
    }

    #[test]
    fn test_sponsor_parsing() {
        let mut op = sample();
        assert_eq!(op.sponsor(), Ok(None));
        op.sponsor_and_data = vec![7u8; 10];
        assert!(op.sponsor().is_err());
        op.sponsor_and_data = vec![7u8; 25];
        assert_eq!(op.sponsor(), Ok(Some(Address([7u8; 20]))));
        assert_eq!(op.sponsor_data(), &[7u8; 5]);
    }
}
