use aakit_state::account_signature::{encode_with_mode, SignatureMode};
use aakit_state::hash::signed_message_hash;
use aakit_state::{AccountInstruction, Address, Call, Operation};
use tracing::debug;

use crate::core::connection::AaConnection;
use crate::core::constants::{
    DEFAULT_CALL_GAS_LIMIT, DEFAULT_MAX_FEE_PER_UNIT, DEFAULT_MAX_PRIORITY_FEE_PER_UNIT,
    DEFAULT_PRE_VERIFICATION_GAS, DEFAULT_VERIFICATION_GAS_LIMIT,
};
use crate::core::signer::OperationSigner;
use crate::error::{Result, SdkError};
use crate::utils::{fetch_operation_hash, map_connection_error};

/// Fluent builder for an unsigned [`Operation`].
#[derive(Debug, Clone)]
pub struct OperationBuilder {
    sender: Option<Address>,
    nonce: Option<u64>,
    init_code: Vec<u8>,
    call_data: Vec<u8>,
    call_gas_limit: u64,
    verification_gas_limit: u64,
    pre_verification_gas: u64,
    max_fee_per_unit: u128,
    max_priority_fee_per_unit: u128,
    sponsor_and_data: Vec<u8>,
}

impl Default for OperationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationBuilder {
    pub fn new() -> Self {
        Self {
            sender: None,
            nonce: None,
            init_code: Vec::new(),
            call_data: Vec::new(),
            call_gas_limit: DEFAULT_CALL_GAS_LIMIT,
            verification_gas_limit: DEFAULT_VERIFICATION_GAS_LIMIT,
            pre_verification_gas: DEFAULT_PRE_VERIFICATION_GAS,
            max_fee_per_unit: DEFAULT_MAX_FEE_PER_UNIT,
            max_priority_fee_per_unit: DEFAULT_MAX_PRIORITY_FEE_PER_UNIT,
            sponsor_and_data: Vec::new(),
        }
    }

    pub fn with_sender(mut self, sender: Address) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// `factory ‖ factory data`; the sender is deployed before validation.
    pub fn with_init_code(mut self, init_code: Vec<u8>) -> Self {
        self.init_code = init_code;
        self
    }

    pub fn with_call_data(mut self, call_data: Vec<u8>) -> Self {
        self.call_data = call_data;
        self
    }

    /// Has the account execute a single call.
    pub fn with_call(mut self, call: Call) -> Self {
        self.call_data = AccountInstruction::Execute(call).pack();
        self
    }

    /// Has the account execute `calls` in order, all or nothing.
    pub fn with_calls(mut self, calls: Vec<Call>) -> Self {
        self.call_data = AccountInstruction::ExecuteBatch { calls }.pack();
        self
    }

    pub fn with_gas_limits(mut self, call: u64, verification: u64, pre_verification: u64) -> Self {
        self.call_gas_limit = call;
        self.verification_gas_limit = verification;
        self.pre_verification_gas = pre_verification;
        self
    }

    pub fn with_fees(mut self, max_fee_per_unit: u128, max_priority_fee_per_unit: u128) -> Self {
        self.max_fee_per_unit = max_fee_per_unit;
        self.max_priority_fee_per_unit = max_priority_fee_per_unit;
        self
    }

    pub fn with_sponsor_and_data(mut self, sponsor_and_data: Vec<u8>) -> Self {
        self.sponsor_and_data = sponsor_and_data;
        self
    }

    /// Builds with the nonce given, or zero.
    pub fn build(&self) -> Result<Operation> {
        let sender = self
            .sender
            .ok_or_else(|| SdkError::InvalidOperation("sender required".to_string()))?;
        Ok(Operation {
            sender,
            nonce: self.nonce.unwrap_or(0),
            init_code: self.init_code.clone(),
            call_data: self.call_data.clone(),
            call_gas_limit: self.call_gas_limit,
            verification_gas_limit: self.verification_gas_limit,
            pre_verification_gas: self.pre_verification_gas,
            max_fee_per_unit: self.max_fee_per_unit,
            max_priority_fee_per_unit: self.max_priority_fee_per_unit,
            sponsor_and_data: self.sponsor_and_data.clone(),
            signature: Vec::new(),
        })
    }

    /// Builds, fetching the account's current nonce unless one was set.
    /// An account that is not deployed yet starts at zero if `init_code`
    /// will create it.
    pub async fn build_with_nonce(&self, connection: &impl AaConnection) -> Result<Operation> {
        let mut op = self.build()?;
        if self.nonce.is_none() {
            let nonce = connection
                .account_nonce(&op.sender)
                .await
                .map_err(map_connection_error)?;
            op.nonce = match nonce {
                Some(nonce) => nonce,
                None if !op.init_code.is_empty() => 0,
                None => return Err(SdkError::AccountNotFound(op.sender)),
            };
        }
        Ok(op)
    }
}

/// Signs `op` with the account owner's key (mode `0x00`).
///
/// Sponsor data is covered by the operation hash, so it must be attached
/// before signing.
pub async fn sign_as_owner(
    connection: &impl AaConnection,
    mut op: Operation,
    owner: &dyn OperationSigner,
) -> Result<Operation> {
    let hash = fetch_operation_hash(connection, &op).await?;
    let signature = owner
        .sign_digest(&signed_message_hash(hash.as_bytes()))
        .await
        .map_err(SdkError::Signing)?;
    op.signature = encode_with_mode(SignatureMode::Owner, &signature);
    debug!("Owner {} signed operation {}", owner.address(), hash);
    Ok(op)
}
