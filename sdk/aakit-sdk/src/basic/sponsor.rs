use aakit_state::hash::signed_message_hash;
use aakit_state::{Address, Operation};
use aakit_verifying_sponsor::{SponsorApproval, VerifyingSponsor};
use tracing::debug;

use crate::core::connection::AaConnection;
use crate::core::signer::OperationSigner;
use crate::error::{Result, SdkError};
use crate::utils::map_connection_error;

/// Off-ledger approval service for a [`VerifyingSponsor`].
pub struct SponsorService<'a> {
    sponsor: Address,
    signer: &'a dyn OperationSigner,
    valid_after: u64,
    valid_until: u64,
}

impl<'a> SponsorService<'a> {
    pub fn new(sponsor: Address, signer: &'a dyn OperationSigner) -> Self {
        Self {
            sponsor,
            signer,
            valid_after: 0,
            valid_until: 0,
        }
    }

    pub fn with_window(mut self, valid_after: u64, valid_until: u64) -> Self {
        self.valid_after = valid_after;
        self.valid_until = valid_until;
        self
    }

    /// Attaches the sponsor's approval to `op`. The sender signs afterwards,
    /// since the operation hash covers the sponsor data.
    pub async fn sponsor(&self, connection: &impl AaConnection, mut op: Operation) -> Result<Operation> {
        let chain_id = connection.chain_id().await.map_err(map_connection_error)?;
        let hash = VerifyingSponsor::sponsor_hash(
            &op,
            chain_id,
            &self.sponsor,
            self.valid_until,
            self.valid_after,
        );
        let signature = self
            .signer
            .sign_digest(&signed_message_hash(&hash))
            .await
            .map_err(SdkError::Signing)?;
        op.sponsor_and_data = SponsorApproval {
            valid_until: self.valid_until,
            valid_after: self.valid_after,
            signature,
        }
        .encode(&self.sponsor)?;
        debug!("Sponsor {} approved operation from {}", self.sponsor, op.sender);
        Ok(op)
    }
}
