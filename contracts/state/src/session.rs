//! Session-key delegation layouts.
//!
//! A plugin signature is `[mode 0x02][plugin 20B][valid_until 6B]
//! [valid_after 6B][grant signature 65B][inner...]`. The grant signature is
//! the owner's typed-data approval of the plugin for a time window and a
//! `data` blob; the inner layer is `abi.encode(bytes data, bytes signature)`
//! where `signature` is the session key's signature over the operation hash
//! and its current session nonce.

use aakit_assertions::check_min_len;

use crate::abi::{decode_bytes_pair, encode_bytes_pair, read_uint48, word_u64, write_uint48};
use crate::account_signature::SignatureMode;
use crate::address::Address;
use crate::constants::{
    ACCOUNT_DOMAIN_NAME, ACCOUNT_DOMAIN_VERSION, PLUGIN_GRANT_TYPE, SESSION_DOMAIN_NAME,
    SESSION_DOMAIN_VERSION, SESSION_TYPE, SIGNATURE_LEN, UINT48_LEN,
};
use crate::error::{CodecError, ValidationError};
use crate::hash::{keccak256, TypedDomain};
use crate::operation::OperationHash;

/// Owner approval of a plugin for a window of time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGrant {
    pub sender: Address,
    pub valid_until: u64,
    pub valid_after: u64,
    pub plugin: Address,
    pub data: Vec<u8>,
}

impl SessionGrant {
    pub fn struct_hash(&self) -> [u8; 32] {
        let mut encoded = Vec::with_capacity(32 * 6);
        encoded.extend_from_slice(&keccak256(PLUGIN_GRANT_TYPE.as_bytes()));
        encoded.extend_from_slice(&self.sender.to_word());
        encoded.extend_from_slice(&word_u64(self.valid_until));
        encoded.extend_from_slice(&word_u64(self.valid_after));
        encoded.extend_from_slice(&self.plugin.to_word());
        encoded.extend_from_slice(&keccak256(&self.data));
        keccak256(&encoded)
    }

    /// Digest the owner signs. The domain is bound to the account itself.
    pub fn digest(&self, chain_id: u64) -> [u8; 32] {
        TypedDomain::new(
            ACCOUNT_DOMAIN_NAME,
            ACCOUNT_DOMAIN_VERSION,
            chain_id,
            self.sender,
        )
        .digest(&self.struct_hash())
    }

    /// `valid_after ≤ now < valid_until`.
    pub fn check_window(&self, now: u64) -> Result<(), ValidationError> {
        if now < self.valid_after {
            return Err(ValidationError::SessionNotYetValid {
                valid_after: self.valid_after,
                now,
            });
        }
        if now >= self.valid_until {
            return Err(ValidationError::SessionExpired {
                valid_until: self.valid_until,
                now,
            });
        }
        Ok(())
    }
}

/// Grant `data` understood by the session-key plugin: the session key,
/// optionally followed by a policy contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionData {
    pub session_key: Address,
    pub policy: Option<Address>,
}

impl SessionData {
    pub fn parse(data: &[u8]) -> Result<Self, CodecError> {
        match data.len() {
            20 => Ok(Self {
                session_key: Address::from_slice(data)?,
                policy: None,
            }),
            40 => Ok(Self {
                session_key: Address::from_slice(&data[..20])?,
                policy: Some(Address::from_slice(&data[20..])?),
            }),
            // a key alone is 20 bytes, a key and policy 40
            actual => Err(CodecError::InvalidLength {
                expected: if actual < Address::LEN {
                    Address::LEN
                } else {
                    2 * Address::LEN
                },
                actual,
            }),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.session_key.0.to_vec();
        if let Some(policy) = self.policy {
            out.extend_from_slice(&policy.0);
        }
        out
    }
}

/// Digest a session key signs for one operation.
pub fn session_digest(
    account: &Address,
    chain_id: u64,
    op_hash: &OperationHash,
    session_nonce: u64,
) -> [u8; 32] {
    let mut encoded = Vec::with_capacity(32 * 3);
    encoded.extend_from_slice(&keccak256(SESSION_TYPE.as_bytes()));
    encoded.extend_from_slice(op_hash.as_bytes());
    encoded.extend_from_slice(&word_u64(session_nonce));
    TypedDomain::new(
        SESSION_DOMAIN_NAME,
        SESSION_DOMAIN_VERSION,
        chain_id,
        *account,
    )
    .digest(&keccak256(&encoded))
}

/// Inner layer of a plugin signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSignature {
    pub data: Vec<u8>,
    pub signature: Vec<u8>,
}

impl SessionSignature {
    pub fn parse(inner: &[u8]) -> Result<Self, CodecError> {
        let (data, signature) = decode_bytes_pair(inner)?;
        Ok(Self { data, signature })
    }

    pub fn encode(&self) -> Vec<u8> {
        encode_bytes_pair(&self.data, &self.signature)
    }
}

/// Decoded plugin-mode signature (without the mode byte).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginSignature {
    pub plugin: Address,
    pub valid_until: u64,
    pub valid_after: u64,
    pub grant_signature: [u8; SIGNATURE_LEN],
    pub inner: Vec<u8>,
}

impl PluginSignature {
    pub const HEADER_LEN: usize = Address::LEN + 2 * UINT48_LEN + SIGNATURE_LEN;

    pub fn parse(body: &[u8]) -> Result<Self, CodecError> {
        check_min_len(
            body,
            Self::HEADER_LEN,
            CodecError::TooShort {
                needed: Self::HEADER_LEN,
                available: body.len(),
            },
        )?;
        let plugin = Address::from_slice(&body[..20])?;
        let valid_until = read_uint48(&body[20..26]);
        let valid_after = read_uint48(&body[26..32]);
        let mut grant_signature = [0u8; SIGNATURE_LEN];
        grant_signature.copy_from_slice(&body[32..Self::HEADER_LEN]);
        Ok(Self {
            plugin,
            valid_until,
            valid_after,
            grant_signature,
            inner: body[Self::HEADER_LEN..].to_vec(),
        })
    }

    /// Full signature bytes, mode byte included.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(1 + Self::HEADER_LEN + self.inner.len());
        out.push(SignatureMode::Plugin as u8);
        out.extend_from_slice(&self.plugin.0);
        write_uint48(&mut out, self.valid_until)?;
        write_uint48(&mut out, self.valid_after)?;
        out.extend_from_slice(&self.grant_signature);
        out.extend_from_slice(&self.inner);
        Ok(out)
    }

    /// The grant this signature claims the owner approved for `sender`.
    pub fn grant(&self, sender: Address, data: Vec<u8>) -> SessionGrant {
        SessionGrant {
            sender,
            valid_until: self.valid_until,
            valid_after: self.valid_after,
            plugin: self.plugin,
            data,
        }
    }
}
