//! AAKit SDK
//!
//! Builds, signs and submits operations: owner and session-key signatures,
//! sponsor approvals, counterfactual accounts, and the deposit and stake
//! calls on the coordinator.

pub mod basic;
pub mod core;
pub mod error;
pub mod utils;

pub use crate::basic::account::AccountHandle;
pub use crate::basic::operation::{sign_as_owner, OperationBuilder};
pub use crate::basic::policy::PolicyBuilder;
pub use crate::basic::session::{SessionApproval, SessionBuilder};
pub use crate::basic::sponsor::SponsorService;
pub use crate::core::connection::AaConnection;
pub use crate::core::local::{LocalConnection, LocalNetwork};
pub use crate::core::signer::{LocalSigner, OperationSigner};
pub use crate::error::{Result, SdkError};
pub use crate::utils::{
    fetch_account_nonce, fetch_deposit_info, fetch_operation_hash, fetch_session_nonce,
    revert_reason, send_operations,
};

pub mod state {
    pub use aakit_state::{Address, Call, Operation, OperationHash, ValidationError};
}
