//! EntryPoint Error Types

use aakit_interface::LedgerError;
use aakit_state::{Address, StakeError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryPointError {
    /// Validation of one operation failed; the whole batch was rolled back.
    #[error("FailedOp({op_index}, {sender}): {} {reason}", reason.code())]
    FailedOp {
        op_index: usize,
        sender: Address,
        reason: ValidationError,
    },

    #[error("Beneficiary cannot be the zero address or the EntryPoint")]
    InvalidBeneficiary,

    /// Funds paid out to the coordinator itself would be owned by nobody.
    #[error("Cannot withdraw to the EntryPoint")]
    WithdrawToEntryPoint,

    #[error(transparent)]
    Stake(#[from] StakeError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Invalid instruction: {0}")]
    InvalidInstruction(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl EntryPointError {
    /// Index and reason of a failed operation.
    pub fn failed_op(&self) -> Option<(usize, &ValidationError)> {
        match self {
            EntryPointError::FailedOp {
                op_index, reason, ..
            } => Some((*op_index, reason)),
            _ => None,
        }
    }
}
