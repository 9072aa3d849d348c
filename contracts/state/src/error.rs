use thiserror::Error;

use crate::address::Address;

fn fmt_selector(selector: &Option<[u8; 4]>) -> String {
    match selector {
        Some(raw) => format!("0x{}", hex::encode(raw)),
        None => "<none>".to_string(),
    }
}

/// Failures while decoding wire layouts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Input too short: need {needed} bytes, have {available}")]
    TooShort { needed: usize, available: usize },

    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid offset {0}")]
    InvalidOffset(usize),

    #[error("Value does not fit")]
    ValueOverflow,

    #[error("Invalid utf-8 string")]
    InvalidUtf8,

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid instruction data: {0}")]
    Borsh(String),
}

/// Failures while recovering a secp256k1 signer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Invalid signature length {0}")]
    InvalidLength(usize),

    #[error("Invalid recovery id {0}")]
    InvalidRecoveryId(u8),

    #[error("Malformed signature")]
    Malformed,

    #[error("Signature s value is not in the lower half order")]
    HighS,

    #[error("Public key recovery failed")]
    RecoveryFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceScope {
    Account,
    Session,
}

impl std::fmt::Display for NonceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonceScope::Account => f.write_str("account"),
            NonceScope::Session => f.write_str("session"),
        }
    }
}

/// A nonce did not match the expected next value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid {scope} nonce: expected {expected}, got {actual}")]
pub struct ReplayError {
    pub scope: NonceScope,
    pub expected: u64,
    pub actual: u64,
}

/// A call inside `call_data` is outside the session policy's allow-list.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Call to {target} with selector {} is not allowed by policy", fmt_selector(.selector))]
pub struct PolicyViolation {
    pub target: Address,
    pub selector: Option<[u8; 4]>,
}

/// The payer's deposit does not cover the operation's prefund.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Deposit of {payer} too low: required {required}, available {available}")]
pub struct InsufficientFundsError {
    pub payer: Address,
    pub required: u128,
    pub available: u128,
    pub sponsored: bool,
}

/// The active gas meter ran past its limit.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Out of gas: limit {limit}, used {used}")]
pub struct OutOfGas {
    pub limit: u64,
    pub used: u64,
}

/// Why an operation was refused during validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Sender already constructed")]
    SenderAlreadyConstructed,

    #[error("Init code failed: {0}")]
    InitCodeFailed(String),

    #[error("Init code returned {returned}, expected sender {expected}")]
    InitCodeSenderMismatch { expected: Address, returned: Address },

    #[error("Init code did not deploy the sender")]
    InitCodeDidNotDeploy,

    #[error("Account not deployed")]
    AccountNotDeployed,

    #[error("Address {0} is not an account")]
    NotAnAccount(Address),

    #[error("{0} cannot validate operations")]
    InvalidValidator(Address),

    #[error("Validation request from {caller}, account is bound to {expected}")]
    WrongEntryPoint { expected: Address, caller: Address },

    #[error(transparent)]
    InsufficientFunds(#[from] InsufficientFundsError),

    #[error("Expired or not due: valid after {valid_after}, until {valid_until}, now {now}")]
    ExpiredOrNotDue {
        valid_after: u64,
        valid_until: u64,
        now: u64,
    },

    #[error("Session not yet valid: valid after {valid_after}, now {now}")]
    SessionNotYetValid { valid_after: u64, now: u64 },

    #[error("Session expired: valid until {valid_until}, now {now}")]
    SessionExpired { valid_until: u64, now: u64 },

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("Signature error: recovered {recovered}, expected {expected}")]
    SignerMismatch { expected: Address, recovered: Address },

    #[error("Signer {0} is not authorized")]
    UnauthorizedSigner(Address),

    #[error("Unknown signature mode {0}")]
    UnknownSignatureMode(u8),

    #[error("Malformed signature: {0}")]
    MalformedSignature(#[from] CodecError),

    #[error("Plugin {0} is not registered")]
    PluginNotRegistered(Address),

    #[error("No validation module configured")]
    ModuleNotSet,

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    PolicyViolation(#[from] PolicyViolation),

    #[error("Over verification gas limit: limit {limit}, used {used}")]
    OverVerificationGasLimit { limit: u64, used: u64 },

    #[error("Invalid sponsor data")]
    InvalidSponsorData,

    #[error("Sponsor {0} is not staked")]
    SponsorNotStaked(Address),

    #[error("Sponsor expired or not due: valid after {valid_after}, until {valid_until}, now {now}")]
    SponsorExpiredOrNotDue {
        valid_after: u64,
        valid_until: u64,
        now: u64,
    },

    #[error("Sponsor rejected operation: {0}")]
    SponsorRejected(String),
}

impl ValidationError {
    /// Stable short code for the failure, in the `AAxx` family.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::SenderAlreadyConstructed => "AA10",
            ValidationError::InitCodeFailed(_) => "AA13",
            ValidationError::InitCodeSenderMismatch { .. } => "AA14",
            ValidationError::InitCodeDidNotDeploy => "AA15",
            ValidationError::AccountNotDeployed => "AA20",
            ValidationError::InsufficientFunds(e) if e.sponsored => "AA31",
            ValidationError::InsufficientFunds(_) => "AA21",
            ValidationError::ExpiredOrNotDue { .. }
            | ValidationError::SessionNotYetValid { .. }
            | ValidationError::SessionExpired { .. } => "AA22",
            ValidationError::NotAnAccount(_)
            | ValidationError::InvalidValidator(_)
            | ValidationError::WrongEntryPoint { .. } => "AA23",
            ValidationError::Signature(_)
            | ValidationError::SignerMismatch { .. }
            | ValidationError::UnauthorizedSigner(_)
            | ValidationError::UnknownSignatureMode(_)
            | ValidationError::MalformedSignature(_)
            | ValidationError::PluginNotRegistered(_)
            | ValidationError::ModuleNotSet
            | ValidationError::PolicyViolation(_) => "AA24",
            ValidationError::Replay(_) => "AA25",
            ValidationError::SponsorNotStaked(_) => "AA31",
            ValidationError::SponsorExpiredOrNotDue { .. } => "AA32",
            ValidationError::SponsorRejected(_) => "AA34",
            ValidationError::OverVerificationGasLimit { .. } => "AA40",
            ValidationError::InvalidSponsorData => "AA93",
        }
    }
}

impl From<OutOfGas> for ValidationError {
    fn from(e: OutOfGas) -> Self {
        ValidationError::OverVerificationGasLimit {
            limit: e.limit,
            used: e.used,
        }
    }
}
