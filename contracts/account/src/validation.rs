//! Signature-mode handlers of `PluginAccount`.

use aakit_interface::{Ledger, PluginRequest};
use aakit_state::constants::ECRECOVER_GAS;
use aakit_state::hash::signed_message_hash;
use aakit_state::signature::recover_signer;
use aakit_state::{
    Operation, OperationHash, PluginSignature, SessionSignature, ValidationData, ValidationError,
};
use tracing::debug;

use crate::account::PluginAccount;

impl PluginAccount {
    /// Owner signature over the signed-message digest of the operation hash.
    pub(crate) fn validate_owner(
        &self,
        ledger: &mut Ledger,
        op_hash: &OperationHash,
        signature: &[u8],
    ) -> Result<ValidationData, ValidationError> {
        ledger.charge_gas(ECRECOVER_GAS)?;
        let recovered = recover_signer(&signed_message_hash(op_hash.as_bytes()), signature)?;
        if recovered != self.owner {
            debug!(
                "Owner signature mismatch for {}: recovered {}",
                self.address, recovered
            );
            return Err(ValidationError::SignerMismatch {
                expected: self.owner,
                recovered,
            });
        }
        Ok(ValidationData::UNBOUNDED)
    }

    /// Hands the signature to the configured validation module.
    pub(crate) fn validate_module(
        &self,
        ledger: &mut Ledger,
        op_hash: &OperationHash,
        signature: &[u8],
    ) -> Result<ValidationData, ValidationError> {
        let module = self.module.ok_or(ValidationError::ModuleNotSet)?;
        let account = self.address;
        ledger
            .with_contract_mut(&module, |code, ledger| match code.as_module() {
                Some(validator) => validator.validate_for(ledger, &account, op_hash, signature),
                None => Err(ValidationError::InvalidValidator(module)),
            })
            .map_err(|_| ValidationError::InvalidValidator(module))?
    }

    /// Checks the owner's grant for the plugin, then lets the plugin verify
    /// the session layer.
    pub(crate) fn validate_plugin(
        &self,
        ledger: &mut Ledger,
        op: &Operation,
        op_hash: &OperationHash,
        signature: PluginSignature,
    ) -> Result<ValidationData, ValidationError> {
        let plugin = signature.plugin;
        if !self.plugins.contains(&plugin) {
            return Err(ValidationError::PluginNotRegistered(plugin));
        }

        let session = SessionSignature::parse(&signature.inner)?;
        let grant = signature.grant(self.address, session.data.clone());

        let now = ledger.timestamp();
        grant.check_window(now)?;

        ledger.charge_gas(ECRECOVER_GAS)?;
        let approver = recover_signer(
            &grant.digest(ledger.chain_id()),
            &signature.grant_signature,
        )?;
        if approver != self.owner {
            debug!(
                "Plugin grant for {} on {} not signed by owner",
                plugin, self.address
            );
            return Err(ValidationError::SignerMismatch {
                expected: self.owner,
                recovered: approver,
            });
        }

        let request = PluginRequest {
            account: self.address,
            op,
            op_hash: *op_hash,
            grant: &grant,
            session: &session,
            now,
        };
        ledger
            .with_contract_mut(&plugin, |code, ledger| match code.as_plugin() {
                Some(validator) => validator.validate_plugin_data(ledger, &request),
                None => Err(ValidationError::InvalidValidator(plugin)),
            })
            .map_err(|_| ValidationError::InvalidValidator(plugin))??;

        Ok(ValidationData::new(grant.valid_after, grant.valid_until))
    }
}
