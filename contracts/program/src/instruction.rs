//! EntryPoint Instruction Definitions

use aakit_state::{Address, Operation};
use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::EntryPointError;

/// Byte-level entry points of the coordinator. The value sent with the
/// instruction is passed next to it, see [`crate::processor::process_instruction`].
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum EntryPointInstruction {
    /// Validate, then execute, a batch of operations
    ///
    /// Fees collected from the batch are paid to `beneficiary`.
    HandleOps {
        ops: Vec<Operation>,
        beneficiary: Address,
    },

    /// Add the sent value to `account`'s deposit
    DepositTo { account: Address },

    /// Pay `amount` of the caller's deposit to `to`
    WithdrawTo { to: Address, amount: u128 },

    /// Lock the sent value as stake, with at least `unstake_delay`
    AddStake { unstake_delay: u64 },

    /// Start the unstake delay of the caller's stake
    UnlockStake,

    /// Pay the caller's unlocked stake to `to`
    WithdrawStake { to: Address },
}

impl EntryPointInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, EntryPointError> {
        Self::try_from_slice(input).map_err(|e| EntryPointError::InvalidInstruction(e.to_string()))
    }

    pub fn pack(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }
}
