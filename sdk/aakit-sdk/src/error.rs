use aakit_interface::QueryError;
use aakit_program::EntryPointError;
use aakit_state::{Address, CodecError, ValidationError};
use thiserror::Error;

/// SDK-specific error types for aakit operations
#[derive(Debug, Error)]
pub enum SdkError {
    /// Connection or transport error
    #[error("Connection error: {0}")]
    Connection(String),

    /// The coordinator rejected the batch during validation
    #[error("Operation {op_index} from {sender} rejected: {} {reason}", reason.code())]
    Rejected {
        op_index: usize,
        sender: Address,
        reason: ValidationError,
    },

    /// Any other coordinator failure
    #[error("EntryPoint error: {0}")]
    EntryPoint(EntryPointError),

    /// No account deployed at the address
    #[error("Account not found: {0}")]
    AccountNotFound(Address),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Query failed: {0}")]
    Query(#[from] QueryError),

    #[error("Encoding error: {0}")]
    Codec(#[from] CodecError),

    /// Builder was missing a required field
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl From<EntryPointError> for SdkError {
    fn from(e: EntryPointError) -> Self {
        match e {
            EntryPointError::FailedOp {
                op_index,
                sender,
                reason,
            } => SdkError::Rejected {
                op_index,
                sender,
                reason,
            },
            other => SdkError::EntryPoint(other),
        }
    }
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
