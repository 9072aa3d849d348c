//! Call-data layouts understood by accounts, factories and modules.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::address::Address;
use crate::error::CodecError;

/// One outgoing call made by an account.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub target: Address,
    pub value: u128,
    pub data: Vec<u8>,
}

impl Call {
    /// Function selector of the call, when the data carries one.
    pub fn selector(&self) -> Option<[u8; 4]> {
        let head = self.data.get(..4)?;
        Some([head[0], head[1], head[2], head[3]])
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum AccountInstruction {
    /// Perform a single call from the account
    Execute(Call),

    /// Perform several calls; all of them succeed or none do
    ExecuteBatch { calls: Vec<Call> },

    /// Add a plugin to the account's registry. Idempotent.
    RegisterPlugin { plugin: Address },

    /// Remove a plugin from the account's registry. Idempotent.
    DeregisterPlugin { plugin: Address },

    /// Replace (or clear) the delegated validation module
    SetModule { module: Option<Address> },
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum FactoryInstruction {
    /// Deploy an account for `owner` at its counterfactual address
    CreateAccount { owner: Address, salt: [u8; 32] },
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum ModuleInstruction {
    /// Authorize `owner` for the calling account
    AddOwner { owner: Address },
    /// Revoke `owner` for the calling account
    RemoveOwner { owner: Address },
}

macro_rules! impl_pack {
    ($($ty:ty),*) => {$(
        impl $ty {
            pub fn unpack(input: &[u8]) -> Result<Self, CodecError> {
                Self::try_from_slice(input).map_err(|e| CodecError::Borsh(e.to_string()))
            }

            pub fn pack(&self) -> Vec<u8> {
                let mut out = Vec::new();
                // serializing into a Vec cannot fail
                let _ = self.serialize(&mut out);
                out
            }
        }
    )*};
}

impl_pack!(AccountInstruction, FactoryInstruction, ModuleInstruction);
