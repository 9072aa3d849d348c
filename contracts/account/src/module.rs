//! Multi-owner validation module.
//!
//! Each account that calls `AddOwner` gets its own owner set; any of those
//! owners may sign operations sent in `Module` signature mode.

use std::collections::{BTreeSet, HashMap};

use aakit_interface::{CallContext, CallResult, Contract, Ledger, ValidationModule};
use aakit_state::constants::{ECRECOVER_GAS, STORAGE_WRITE_GAS};
use aakit_state::hash::signed_message_hash;
use aakit_state::signature::recover_signer;
use aakit_state::{Address, ModuleInstruction, OperationHash, ValidationData, ValidationError};
use tracing::info;

use crate::error::AccountError;

#[derive(Debug, Clone, Default)]
pub struct OwnerSetModule {
    owners: HashMap<Address, BTreeSet<Address>>,
}

impl OwnerSetModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_owner(&self, account: &Address, owner: &Address) -> bool {
        self.owners
            .get(account)
            .is_some_and(|owners| owners.contains(owner))
    }

    pub fn owners_of(&self, account: &Address) -> Vec<Address> {
        self.owners
            .get(account)
            .map(|owners| owners.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl Contract for OwnerSetModule {
    fn call(&mut self, ledger: &mut Ledger, ctx: &CallContext, data: &[u8]) -> CallResult {
        ledger.charge_gas(STORAGE_WRITE_GAS)?;
        match ModuleInstruction::unpack(data).map_err(AccountError::from)? {
            ModuleInstruction::AddOwner { owner } => {
                self.owners.entry(ctx.caller).or_default().insert(owner);
                info!("Module owner {} added for {}", owner, ctx.caller);
            },
            ModuleInstruction::RemoveOwner { owner } => {
                if let Some(owners) = self.owners.get_mut(&ctx.caller) {
                    owners.remove(&owner);
                }
            },
        }
        Ok(Vec::new())
    }

    fn as_module(&mut self) -> Option<&mut dyn ValidationModule> {
        Some(self)
    }
}

impl ValidationModule for OwnerSetModule {
    fn validate_for(
        &mut self,
        ledger: &mut Ledger,
        account: &Address,
        op_hash: &OperationHash,
        signature: &[u8],
    ) -> Result<ValidationData, ValidationError> {
        ledger.charge_gas(ECRECOVER_GAS)?;
        let signer = recover_signer(&signed_message_hash(op_hash.as_bytes()), signature)?;
        if !self.is_owner(account, &signer) {
            return Err(ValidationError::UnauthorizedSigner(signer));
        }
        Ok(ValidationData::UNBOUNDED)
    }
}
