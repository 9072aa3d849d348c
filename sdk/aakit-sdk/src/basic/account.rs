use aakit_account::AccountFactory;
use aakit_state::{AccountInstruction, Address, Call};
use serde::{Deserialize, Serialize};

use crate::core::connection::AaConnection;
use crate::core::constants::DEFAULT_SALT;
use crate::error::Result;
use crate::utils::map_connection_error;

/// Client-side view of one account: where it lives and how to create it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountHandle {
    pub address: Address,
    pub factory: Address,
    pub owner: Address,
    pub salt: [u8; 32],
}

impl AccountHandle {
    /// The account `factory` deploys for `owner`, whether or not it exists yet.
    pub fn counterfactual(factory: Address, owner: Address) -> Self {
        Self::with_salt(factory, owner, DEFAULT_SALT)
    }

    pub fn with_salt(factory: Address, owner: Address, salt: [u8; 32]) -> Self {
        Self {
            address: AccountFactory::account_address(&factory, &owner, &salt),
            factory,
            owner,
            salt,
        }
    }

    /// `init_code` for the first operation of an undeployed account.
    pub fn init_code(&self) -> Vec<u8> {
        AccountFactory::init_code(&self.factory, &self.owner, &self.salt)
    }

    pub async fn is_deployed(&self, connection: &impl AaConnection) -> Result<bool> {
        let nonce = connection
            .account_nonce(&self.address)
            .await
            .map_err(map_connection_error)?;
        Ok(nonce.is_some())
    }

    pub fn execute(call: Call) -> Vec<u8> {
        AccountInstruction::Execute(call).pack()
    }

    pub fn register_plugin(plugin: Address) -> Vec<u8> {
        AccountInstruction::RegisterPlugin { plugin }.pack()
    }

    pub fn deregister_plugin(plugin: Address) -> Vec<u8> {
        AccountInstruction::DeregisterPlugin { plugin }.pack()
    }

    pub fn set_module(module: Option<Address>) -> Vec<u8> {
        AccountInstruction::SetModule { module }.pack()
    }
}
