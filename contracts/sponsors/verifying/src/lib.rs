//! Verifying Sponsor for AAKit
//!
//! Pays for operations that an off-ledger signer approved. Sponsor data
//! following the sponsor address is `[valid_until 6B][valid_after 6B]
//! [signature 65B]`; the signature is a signed-message signature over
//! [`VerifyingSponsor::sponsor_hash`]. The approved window is returned to
//! the coordinator, which enforces it.

use aakit_assertions::check_exact_len;
use aakit_interface::{CallContext, CallResult, Contract, Ledger, Revert, Sponsor, SponsorRequest};
use aakit_state::abi::{read_uint48, word_u64, write_uint48};
use aakit_state::constants::{ECRECOVER_GAS, SIGNATURE_LEN, UINT48_LEN};
use aakit_state::hash::signed_message_hash;
use aakit_state::signature::recover_signer;
use aakit_state::{keccak256, Address, CodecError, Operation, ValidationData, ValidationError};
use tracing::debug;

/// Length of the data following the sponsor address.
pub const SPONSOR_DATA_LEN: usize = 2 * UINT48_LEN + SIGNATURE_LEN;

/// Decoded sponsor data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SponsorApproval {
    pub valid_until: u64,
    pub valid_after: u64,
    pub signature: [u8; SIGNATURE_LEN],
}

impl SponsorApproval {
    pub fn parse(data: &[u8]) -> Result<Self, CodecError> {
        check_exact_len(
            data,
            SPONSOR_DATA_LEN,
            CodecError::InvalidLength {
                expected: SPONSOR_DATA_LEN,
                actual: data.len(),
            },
        )?;
        let mut signature = [0u8; SIGNATURE_LEN];
        signature.copy_from_slice(&data[2 * UINT48_LEN..]);
        Ok(Self {
            valid_until: read_uint48(&data[..UINT48_LEN]),
            valid_after: read_uint48(&data[UINT48_LEN..2 * UINT48_LEN]),
            signature,
        })
    }

    /// `sponsor_and_data` for `sponsor` carrying this approval.
    pub fn encode(&self, sponsor: &Address) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(Address::LEN + SPONSOR_DATA_LEN);
        out.extend_from_slice(&sponsor.0);
        write_uint48(&mut out, self.valid_until)?;
        write_uint48(&mut out, self.valid_after)?;
        out.extend_from_slice(&self.signature);
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub struct VerifyingSponsor {
    signer: Address,
}

impl VerifyingSponsor {
    pub fn new(signer: Address) -> Self {
        Self { signer }
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    /// Hash the signer approves. Covers every operation field except the
    /// signature and the sponsor data itself.
    pub fn sponsor_hash(
        op: &Operation,
        chain_id: u64,
        sponsor: &Address,
        valid_until: u64,
        valid_after: u64,
    ) -> [u8; 32] {
        let unsponsored = Operation {
            sponsor_and_data: Vec::new(),
            signature: Vec::new(),
            ..op.clone()
        };
        let mut encoded = unsponsored.pack();
        encoded.extend_from_slice(&word_u64(chain_id));
        encoded.extend_from_slice(&sponsor.to_word());
        encoded.extend_from_slice(&word_u64(valid_until));
        encoded.extend_from_slice(&word_u64(valid_after));
        keccak256(&encoded)
    }
}

impl Sponsor for VerifyingSponsor {
    fn validate_sponsored_operation(
        &mut self,
        ledger: &mut Ledger,
        request: &SponsorRequest<'_>,
    ) -> Result<ValidationData, ValidationError> {
        let sponsor = request
            .op
            .sponsor()
            .ok()
            .flatten()
            .ok_or(ValidationError::InvalidSponsorData)?;
        let approval = SponsorApproval::parse(request.op.sponsor_data())
            .map_err(|_| ValidationError::InvalidSponsorData)?;

        ledger.charge_gas(ECRECOVER_GAS)?;
        let hash = Self::sponsor_hash(
            request.op,
            ledger.chain_id(),
            &sponsor,
            approval.valid_until,
            approval.valid_after,
        );
        let recovered = recover_signer(&signed_message_hash(&hash), &approval.signature)
            .map_err(|e| ValidationError::SponsorRejected(e.to_string()))?;
        if recovered != self.signer {
            debug!(
                "Sponsor {} approval signed by {}, expected {}",
                sponsor, recovered, self.signer
            );
            return Err(ValidationError::SponsorRejected(format!(
                "approval signed by {recovered}"
            )));
        }
        Ok(ValidationData::new(approval.valid_after, approval.valid_until))
    }
}

impl Contract for VerifyingSponsor {
    /// Accepts plain transfers only.
    fn call(&mut self, _ledger: &mut Ledger, _ctx: &CallContext, data: &[u8]) -> CallResult {
        if data.is_empty() {
            Ok(Vec::new())
        } else {
            Err(Revert::message("sponsor: unknown instruction"))
        }
    }

    fn as_sponsor(&mut self) -> Option<&mut dyn Sponsor> {
        Some(self)
    }
}
