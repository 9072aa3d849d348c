//! Session Key Plugin for AAKit
//!
//! Verifies the session layer of plugin-mode signatures. The account has
//! already checked the owner's grant and its time window; this plugin checks
//! that the session key named in the grant signed the operation hash together
//! with its current session nonce, that every call in `call_data` passes the
//! attached policy (if any), and then consumes the nonce.
//!
//! Nonces are keyed by `(account, session key)` and only move when
//! validation succeeds, whatever later happens to execution.

use std::collections::HashMap;

use aakit_interface::{
    CallContext, CallResult, Contract, Ledger, PluginQuery, PluginRequest, QueryError,
    QueryResult, Revert, ValidationPlugin,
};
use aakit_state::constants::{ECRECOVER_GAS, STORAGE_READ_GAS, STORAGE_WRITE_GAS};
use aakit_state::session::session_digest;
use aakit_state::signature::recover_signer;
use aakit_state::{
    Address, NonceScope, OperationHash, ReplayError, SessionData, ValidationError,
};
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct SessionKeyPlugin {
    /// Next expected nonce per (account, session key)
    nonces: HashMap<(Address, Address), u64>,
}

impl SessionKeyPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nonce of `session_key` on `account`. Side-effect free.
    pub fn session_nonce(&self, account: &Address, session_key: &Address) -> u64 {
        self.nonces
            .get(&(*account, *session_key))
            .copied()
            .unwrap_or(0)
    }

    /// Verifies the session signature against the current nonce. A
    /// signature over the previous nonce is reported as a replay.
    fn verify_session_signature(
        &self,
        ledger: &mut Ledger,
        account: &Address,
        op_hash: &OperationHash,
        session_key: &Address,
        signature: &[u8],
    ) -> Result<(), ValidationError> {
        ledger.charge_gas(STORAGE_READ_GAS + ECRECOVER_GAS)?;
        let nonce = self.session_nonce(account, session_key);
        let chain_id = ledger.chain_id();

        let signer = recover_signer(&session_digest(account, chain_id, op_hash, nonce), signature)?;
        if signer == *session_key {
            return Ok(());
        }

        if let Some(previous) = nonce.checked_sub(1) {
            ledger.charge_gas(ECRECOVER_GAS)?;
            let stale = recover_signer(&session_digest(account, chain_id, op_hash, previous), signature);
            if matches!(stale, Ok(signer) if signer == *session_key) {
                return Err(ReplayError {
                    scope: NonceScope::Session,
                    expected: nonce,
                    actual: previous,
                }
                .into());
            }
        }

        debug!(
            "Session signature for {} recovered {} instead of {}",
            account, signer, session_key
        );
        Err(ValidationError::SignerMismatch {
            expected: *session_key,
            recovered: signer,
        })
    }
}

impl ValidationPlugin for SessionKeyPlugin {
    fn validate_plugin_data(
        &mut self,
        ledger: &mut Ledger,
        request: &PluginRequest<'_>,
    ) -> Result<(), ValidationError> {
        request.grant.check_window(request.now)?;
        let session = SessionData::parse(&request.grant.data)?;

        self.verify_session_signature(
            ledger,
            &request.account,
            &request.op_hash,
            &session.session_key,
            &request.session.signature,
        )?;

        if let Some(policy) = session.policy {
            ledger
                .view(&policy, |code| {
                    code.as_policy()
                        .map(|checker| checker.check_call_data(&request.op.call_data))
                })
                .ok()
                .flatten()
                .ok_or(ValidationError::InvalidValidator(policy))??;
        }

        ledger.charge_gas(STORAGE_WRITE_GAS)?;
        let nonce = self
            .nonces
            .entry((request.account, session.session_key))
            .or_insert(0);
        *nonce += 1;
        info!(
            "Session {} on {} validated, next nonce {}",
            session.session_key, request.account, nonce
        );
        Ok(())
    }

    fn query(&self, account: &Address, query: &PluginQuery) -> Result<QueryResult, QueryError> {
        match query {
            PluginQuery::SessionNonce { session_key } => {
                Ok(QueryResult::Nonce(self.session_nonce(account, session_key)))
            },
        }
    }
}

impl Contract for SessionKeyPlugin {
    fn call(&mut self, _ledger: &mut Ledger, _ctx: &CallContext, _data: &[u8]) -> CallResult {
        Err(Revert::message("session key plugin: not callable"))
    }

    fn as_plugin(&mut self) -> Option<&mut dyn ValidationPlugin> {
        Some(self)
    }

    fn as_plugin_ref(&self) -> Option<&dyn ValidationPlugin> {
        Some(self)
    }
}
