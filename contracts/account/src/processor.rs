//! Account instruction processor.
//!
//! Routes `AccountInstruction`s to their handlers. Empty call data is a plain
//! deposit and is accepted from anyone.

use aakit_interface::{CallContext, CallResult, Contract, Ledger, SmartAccount};
use aakit_state::constants::STORAGE_WRITE_GAS;
use aakit_state::{AccountInstruction, Address, Call};
use tracing::debug;

use crate::account::PluginAccount;
use crate::error::AccountError;

impl PluginAccount {
    fn require_authorized(&self, caller: &Address) -> Result<(), AccountError> {
        if *caller == self.entry_point || *caller == self.owner || *caller == self.address {
            Ok(())
        } else {
            Err(AccountError::Unauthorized(*caller))
        }
    }

    fn execute(&self, ledger: &mut Ledger, call: &Call) -> CallResult {
        debug!(
            "Account {} calling {} with {} bytes",
            self.address,
            call.target,
            call.data.len()
        );
        ledger.call(self.address, call.target, call.value, &call.data)
    }
}

impl Contract for PluginAccount {
    fn call(&mut self, ledger: &mut Ledger, ctx: &CallContext, data: &[u8]) -> CallResult {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let instruction = AccountInstruction::unpack(data).map_err(AccountError::from)?;
        self.require_authorized(&ctx.caller)?;

        match instruction {
            AccountInstruction::Execute(call) => self.execute(ledger, &call),
            AccountInstruction::ExecuteBatch { calls } => {
                for call in &calls {
                    self.execute(ledger, call)?;
                }
                Ok(Vec::new())
            },
            AccountInstruction::RegisterPlugin { plugin } => {
                ledger.charge_gas(STORAGE_WRITE_GAS)?;
                self.register_plugin(plugin);
                Ok(Vec::new())
            },
            AccountInstruction::DeregisterPlugin { plugin } => {
                ledger.charge_gas(STORAGE_WRITE_GAS)?;
                self.deregister_plugin(&plugin);
                Ok(Vec::new())
            },
            AccountInstruction::SetModule { module } => {
                ledger.charge_gas(STORAGE_WRITE_GAS)?;
                self.module = module;
                Ok(Vec::new())
            },
        }
    }

    fn as_account(&mut self) -> Option<&mut dyn SmartAccount> {
        Some(self)
    }

    fn as_account_ref(&self) -> Option<&dyn SmartAccount> {
        Some(self)
    }
}
