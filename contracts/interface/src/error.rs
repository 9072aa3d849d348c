use aakit_state::{decode_revert, encode_error_message, Address, DecodedRevert, OutOfGas};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("No code at {0}")]
    NoCode(Address),

    #[error("Reentrant call into {0}")]
    Reentrant(Address),

    #[error("Address {0} already has code")]
    AddressOccupied(Address),

    #[error("Insufficient balance of {account}: have {balance}, need {required}")]
    InsufficientBalance {
        account: Address,
        balance: u128,
        required: u128,
    },

    #[error("Balance overflow")]
    Overflow,
}

/// A failed call. The payload is kept verbatim so callers can surface it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Execution reverted: {}", self.decoded())]
pub struct Revert {
    pub payload: Vec<u8>,
}

impl Revert {
    /// `Error(string)` revert.
    pub fn message(message: &str) -> Self {
        Self {
            payload: encode_error_message(message),
        }
    }

    pub fn from_payload(payload: Vec<u8>) -> Self {
        Self { payload }
    }

    pub fn decoded(&self) -> DecodedRevert {
        decode_revert(&self.payload)
    }
}

impl From<OutOfGas> for Revert {
    fn from(_: OutOfGas) -> Self {
        Revert::message("out of gas")
    }
}

impl From<LedgerError> for Revert {
    fn from(e: LedgerError) -> Self {
        Revert::message(&e.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("{0} is not a plugin")]
    NotAPlugin(Address),

    #[error("{0} is not an account")]
    NotAnAccount(Address),

    #[error("Plugin {0} is not registered")]
    NotRegistered(Address),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
