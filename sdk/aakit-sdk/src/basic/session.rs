//! Session keys: the owner grants a plugin for a window, the session key
//! then signs each operation over its current session nonce.

use aakit_state::constants::SIGNATURE_LEN;
use aakit_state::session::session_digest;
use aakit_state::{Address, Operation, PluginSignature, SessionData, SessionGrant, SessionSignature};
use tracing::info;

use crate::core::connection::AaConnection;
use crate::core::signer::OperationSigner;
use crate::error::{Result, SdkError};
use crate::utils::{fetch_operation_hash, fetch_session_nonce, map_connection_error};

pub struct SessionBuilder {
    plugin: Address,
    session_key: Address,
    policy: Option<Address>,
    valid_after: u64,
    valid_until: u64,
}

impl SessionBuilder {
    pub fn new(plugin: Address, session_key: Address) -> Self {
        Self {
            plugin,
            session_key,
            policy: None,
            valid_after: 0,
            valid_until: 0,
        }
    }

    /// Restricts the session to what `policy` allows.
    pub fn with_policy(mut self, policy: Address) -> Self {
        self.policy = Some(policy);
        self
    }

    /// `[valid_after, valid_until)` in ledger seconds.
    pub fn with_window(mut self, valid_after: u64, valid_until: u64) -> Self {
        self.valid_after = valid_after;
        self.valid_until = valid_until;
        self
    }

    /// Open from now for `seconds`.
    pub async fn with_duration(
        self,
        connection: &impl AaConnection,
        seconds: u64,
    ) -> Result<Self> {
        let now = connection.timestamp().await.map_err(map_connection_error)?;
        Ok(self.with_window(now, now.saturating_add(seconds)))
    }

    fn session_data(&self) -> Vec<u8> {
        SessionData {
            session_key: self.session_key,
            policy: self.policy,
        }
        .encode()
    }

    pub fn grant(&self, account: Address) -> SessionGrant {
        SessionGrant {
            sender: account,
            valid_until: self.valid_until,
            valid_after: self.valid_after,
            plugin: self.plugin,
            data: self.session_data(),
        }
    }

    /// Has `owner` sign the grant for `account`.
    pub async fn approve(
        &self,
        connection: &impl AaConnection,
        account: Address,
        owner: &dyn OperationSigner,
    ) -> Result<SessionApproval> {
        if self.valid_until == 0 {
            return Err(SdkError::InvalidOperation(
                "session window has no end".to_string(),
            ));
        }
        let chain_id = connection.chain_id().await.map_err(map_connection_error)?;
        let grant = self.grant(account);
        let grant_signature = owner
            .sign_digest(&grant.digest(chain_id))
            .await
            .map_err(SdkError::Signing)?;
        info!(
            "Session key {} granted on {} until {}",
            self.session_key, account, self.valid_until
        );
        Ok(SessionApproval {
            grant,
            session_key: self.session_key,
            grant_signature,
        })
    }
}

/// An owner-signed grant, reusable for every operation of the session.
#[derive(Debug, Clone)]
pub struct SessionApproval {
    pub grant: SessionGrant,
    pub session_key: Address,
    pub grant_signature: [u8; SIGNATURE_LEN],
}

impl SessionApproval {
    /// Signs `op` with the session key (mode `0x02`) over the session nonce
    /// the plugin currently expects.
    pub async fn sign(
        &self,
        connection: &impl AaConnection,
        mut op: Operation,
        session_signer: &dyn OperationSigner,
    ) -> Result<Operation> {
        if session_signer.address() != self.session_key {
            return Err(SdkError::Signing(format!(
                "{} is not the session key {}",
                session_signer.address(),
                self.session_key
            )));
        }
        if op.sender != self.grant.sender {
            return Err(SdkError::InvalidOperation(format!(
                "grant is for {}, operation is from {}",
                self.grant.sender, op.sender
            )));
        }
        let chain_id = connection.chain_id().await.map_err(map_connection_error)?;
        let hash = fetch_operation_hash(connection, &op).await?;
        let nonce =
            fetch_session_nonce(connection, &op.sender, &self.grant.plugin, &self.session_key)
                .await?;

        let signature = session_signer
            .sign_digest(&session_digest(&op.sender, chain_id, &hash, nonce))
            .await
            .map_err(SdkError::Signing)?;
        let inner = SessionSignature {
            data: self.grant.data.clone(),
            signature: signature.to_vec(),
        };
        op.signature = PluginSignature {
            plugin: self.grant.plugin,
            valid_until: self.grant.valid_until,
            valid_after: self.grant.valid_after,
            grant_signature: self.grant_signature,
            inner: inner.encode(),
        }
        .encode()?;
        Ok(op)
    }
}
