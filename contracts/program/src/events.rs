//! Events emitted by the coordinator.

use aakit_state::{decode_revert, Address, DecodedRevert, OperationHash};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Event {
    AccountDeployed {
        op_hash: OperationHash,
        sender: Address,
        factory: Address,
        sponsor: Option<Address>,
    },
    OperationEvent {
        op_hash: OperationHash,
        sender: Address,
        sponsor: Option<Address>,
        nonce: u64,
        success: bool,
        actual_gas_cost: u128,
        actual_gas_used: u64,
    },
    OperationRevertReason {
        op_hash: OperationHash,
        sender: Address,
        nonce: u64,
        revert_payload: Vec<u8>,
    },
    Deposited {
        account: Address,
        total_deposit: u128,
    },
    Withdrawn {
        account: Address,
        to: Address,
        amount: u128,
    },
    StakeLocked {
        account: Address,
        total_staked: u128,
        unstake_delay: u64,
    },
    StakeUnlocked {
        account: Address,
        withdraw_time: u64,
    },
    StakeWithdrawn {
        account: Address,
        to: Address,
        amount: u128,
    },
}

impl Event {
    /// Decoded revert payload of an `OperationRevertReason`.
    pub fn revert_reason(&self) -> Option<DecodedRevert> {
        match self {
            Event::OperationRevertReason { revert_payload, .. } => {
                Some(decode_revert(revert_payload))
            },
            _ => None,
        }
    }
}
