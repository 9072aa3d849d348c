//! Counterfactual account deployment.

use aakit_interface::{CallContext, CallResult, Contract, Ledger};
use aakit_state::constants::DEPLOY_GAS;
use aakit_state::{keccak256, Address, FactoryInstruction};
use tracing::info;

use crate::account::PluginAccount;
use crate::error::AccountError;

/// Deploys `PluginAccount`s bound to one coordinator.
#[derive(Debug, Clone)]
pub struct AccountFactory {
    entry_point: Address,
}

impl AccountFactory {
    pub fn new(entry_point: Address) -> Self {
        Self { entry_point }
    }

    pub fn entry_point(&self) -> Address {
        self.entry_point
    }

    fn code_hash() -> [u8; 32] {
        keccak256(b"aakit.PluginAccount")
    }

    /// Address the factory at `factory` deploys `owner`'s account to.
    pub fn account_address(factory: &Address, owner: &Address, salt: &[u8; 32]) -> Address {
        let mut seed = Vec::with_capacity(64);
        seed.extend_from_slice(&owner.to_word());
        seed.extend_from_slice(salt);
        Address::derive(factory, &keccak256(&seed), &Self::code_hash())
    }

    /// `init_code` that deploys `owner`'s account through `factory`.
    pub fn init_code(factory: &Address, owner: &Address, salt: &[u8; 32]) -> Vec<u8> {
        let mut init_code = factory.0.to_vec();
        init_code.extend_from_slice(&FactoryInstruction::CreateAccount { owner: *owner, salt: *salt }.pack());
        init_code
    }
}

impl Contract for AccountFactory {
    /// Returns the 20-byte account address. Deploying an existing account
    /// returns it unchanged.
    fn call(&mut self, ledger: &mut Ledger, ctx: &CallContext, data: &[u8]) -> CallResult {
        let FactoryInstruction::CreateAccount { owner, salt } =
            FactoryInstruction::unpack(data).map_err(AccountError::from)?;
        let address = Self::account_address(&ctx.address, &owner, &salt);
        if !ledger.has_code(&address) {
            ledger.charge_gas(DEPLOY_GAS)?;
            ledger.deploy(
                address,
                Box::new(PluginAccount::new(address, self.entry_point, owner)),
            )?;
            info!("Deployed account {} for owner {}", address, owner);
        }
        Ok(address.0.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aakit_interface::{LedgerConfig, SmartAccount};

    #[test]
    fn test_deploys_at_counterfactual_address() {
        let mut ledger = Ledger::new(LedgerConfig::default());
        let entry_point = Address::from_label("entry-point");
        let factory = Address::from_label("factory");
        ledger
            .deploy(factory, Box::new(AccountFactory::new(entry_point)))
            .unwrap();

        let owner = Address::from_label("owner");
        let expected = AccountFactory::account_address(&factory, &owner, &[0u8; 32]);
        assert!(!ledger.has_code(&expected));

        let init_code = AccountFactory::init_code(&factory, &owner, &[0u8; 32]);
        let returned = ledger
            .call(entry_point, factory, 0, &init_code[20..])
            .unwrap();
        assert_eq!(returned, expected.0.to_vec());

        let account = ledger.contract::<PluginAccount>(&expected).unwrap();
        assert_eq!(account.owner(), owner);
        assert_eq!(account.entry_point(), entry_point);

        // second deployment is a no-op returning the same address
        let again = ledger
            .call(entry_point, factory, 0, &init_code[20..])
            .unwrap();
        assert_eq!(again, returned);
    }

    #[test]
    fn test_salt_and_owner_change_address() {
        let factory = Address::from_label("factory");
        let owner = Address::from_label("owner");
        let base = AccountFactory::account_address(&factory, &owner, &[0u8; 32]);
        assert_ne!(base, AccountFactory::account_address(&factory, &owner, &[1u8; 32]));
        assert_ne!(
            base,
            AccountFactory::account_address(&factory, &Address::from_label("other"), &[0u8; 32])
        );
    }
}
