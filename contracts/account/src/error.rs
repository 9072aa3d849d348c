//! Account Error Types

use aakit_interface::Revert;
use aakit_state::{Address, CodecError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("account: invalid instruction: {0}")]
    InvalidInstruction(#[from] CodecError),

    #[error("account: caller {0} is not the entry point, owner or account")]
    Unauthorized(Address),
}

impl From<AccountError> for Revert {
    fn from(e: AccountError) -> Self {
        Revert::message(&e.to_string())
    }
}
