//! Account signature dispatch.
//!
//! The first byte of `Operation::signature` selects how the account
//! validates the operation.

use crate::constants::SIGNATURE_LEN;
use crate::error::{CodecError, ValidationError};
use crate::session::PluginSignature;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SignatureMode {
    /// The stored owner signs the operation hash
    Owner = 0,
    /// The account's validation module decides
    Module = 1,
    /// A registered plugin decides, under an owner grant
    Plugin = 2,
}

impl TryFrom<u8> for SignatureMode {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SignatureMode::Owner),
            1 => Ok(SignatureMode::Module),
            2 => Ok(SignatureMode::Plugin),
            other => Err(ValidationError::UnknownSignatureMode(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountSignature<'a> {
    Owner(&'a [u8]),
    Module(&'a [u8]),
    Plugin(PluginSignature),
}

impl<'a> AccountSignature<'a> {
    pub fn parse(signature: &'a [u8]) -> Result<Self, ValidationError> {
        let (mode, body) = signature.split_first().ok_or(CodecError::TooShort {
            needed: 1,
            available: 0,
        })?;
        match SignatureMode::try_from(*mode)? {
            SignatureMode::Owner => {
                if body.len() != SIGNATURE_LEN {
                    return Err(CodecError::InvalidLength {
                        expected: SIGNATURE_LEN,
                        actual: body.len(),
                    }
                    .into());
                }
                Ok(AccountSignature::Owner(body))
            },
            SignatureMode::Module => Ok(AccountSignature::Module(body)),
            SignatureMode::Plugin => Ok(AccountSignature::Plugin(PluginSignature::parse(body)?)),
        }
    }

    pub fn mode(&self) -> SignatureMode {
        match self {
            AccountSignature::Owner(_) => SignatureMode::Owner,
            AccountSignature::Module(_) => SignatureMode::Module,
            AccountSignature::Plugin(_) => SignatureMode::Plugin,
        }
    }
}

/// Prefixes `body` with the mode byte.
pub fn encode_with_mode(mode: SignatureMode, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + body.len());
    out.push(mode as u8);
    out.extend_from_slice(body);
    out
}
