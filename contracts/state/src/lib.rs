//! AAKit State Module
//!
//! Core data model shared by the coordinator, accounts, plugins and the SDK:
//! operations and their replay-safe hash, signature layouts, session grants,
//! stake records, revert payloads and the validation error taxonomy.

pub mod abi;
pub mod account_signature;
pub mod address;
pub mod call;
pub mod constants;
pub mod error;
pub mod hash;
pub mod operation;
pub mod revert;
pub mod session;
pub mod signature;
pub mod stake;
pub mod validation;

pub use account_signature::{AccountSignature, SignatureMode};
pub use address::Address;
pub use call::{AccountInstruction, Call, FactoryInstruction, ModuleInstruction};
pub use error::{
    CodecError, InsufficientFundsError, NonceScope, OutOfGas, PolicyViolation, ReplayError,
    SignatureError, ValidationError,
};
pub use hash::{keccak256, selector, TypedDomain};
pub use operation::{Operation, OperationHash};
pub use revert::{decode_revert, encode_error_message, DecodedRevert};
pub use session::{PluginSignature, SessionData, SessionGrant, SessionSignature};
pub use stake::{DepositInfo, Stake, StakeError};
pub use validation::ValidationData;
