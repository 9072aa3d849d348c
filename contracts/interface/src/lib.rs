//! AAKit Contract Interface
//!
//! Defines the ledger black box every contract runs against and the traits a
//! contract implements to take part in operation validation: accounts,
//! plugins, validation modules, sponsors and call policies.

pub mod error;
pub mod ledger;

use std::any::Any;

use aakit_state::{
    Address, Operation, OperationHash, PolicyViolation, SessionGrant, SessionSignature,
    ValidationData, ValidationError,
};

pub use error::{LedgerError, QueryError, Revert};
pub use ledger::{CallContext, Checkpoint, Ledger, LedgerConfig};

pub type CallResult = Result<Vec<u8>, Revert>;

/// Code living at a ledger address.
pub trait Contract: ContractBase + Send + Sync {
    /// Handles a call. `ctx.address` is the contract's own address.
    fn call(&mut self, ledger: &mut Ledger, ctx: &CallContext, data: &[u8]) -> CallResult;

    fn as_account(&mut self) -> Option<&mut dyn SmartAccount> {
        None
    }

    fn as_account_ref(&self) -> Option<&dyn SmartAccount> {
        None
    }

    fn as_plugin(&mut self) -> Option<&mut dyn ValidationPlugin> {
        None
    }

    fn as_plugin_ref(&self) -> Option<&dyn ValidationPlugin> {
        None
    }

    fn as_module(&mut self) -> Option<&mut dyn ValidationModule> {
        None
    }

    fn as_sponsor(&mut self) -> Option<&mut dyn Sponsor> {
        None
    }

    fn as_policy(&self) -> Option<&dyn CallPolicy> {
        None
    }
}

/// Object-safe plumbing implemented for every `Contract + Clone`.
pub trait ContractBase {
    fn clone_box(&self) -> Box<dyn Contract>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Contract + Clone + 'static> ContractBase for T {
    fn clone_box(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Clone for Box<dyn Contract> {
    fn clone(&self) -> Self {
        self.as_ref().clone_box()
    }
}

/// Input to account validation.
#[derive(Debug, Clone, Copy)]
pub struct ValidationRequest<'a> {
    pub op: &'a Operation,
    pub op_hash: OperationHash,
    /// Amount the account should send to the coordinator to cover its prefund
    pub missing_funds: u128,
}

/// A smart account, as seen by the coordinator and by clients.
pub trait SmartAccount {
    /// Decides whether the operation is authorized. `ctx.caller` is the
    /// coordinator asking.
    fn validate_operation(
        &mut self,
        ledger: &mut Ledger,
        ctx: &CallContext,
        request: &ValidationRequest<'_>,
    ) -> Result<ValidationData, ValidationError>;

    fn nonce(&self) -> u64;

    fn owner(&self) -> Address;

    fn entry_point(&self) -> Address;

    fn is_plugin_registered(&self, plugin: &Address) -> bool;

    /// Owner check over an arbitrary 32-byte hash.
    fn is_valid_signature(&self, hash: &[u8; 32], signature: &[u8]) -> bool;

    /// Read-only query against a registered plugin.
    fn query_plugin(
        &self,
        ledger: &Ledger,
        plugin: &Address,
        query: &PluginQuery,
    ) -> Result<QueryResult, QueryError>;
}

/// What an account hands a plugin once the owner grant is verified.
#[derive(Debug, Clone, Copy)]
pub struct PluginRequest<'a> {
    pub account: Address,
    pub op: &'a Operation,
    pub op_hash: OperationHash,
    pub grant: &'a SessionGrant,
    pub session: &'a SessionSignature,
    /// Ledger time the request is evaluated at
    pub now: u64,
}

pub trait ValidationPlugin {
    fn validate_plugin_data(
        &mut self,
        ledger: &mut Ledger,
        request: &PluginRequest<'_>,
    ) -> Result<(), ValidationError>;

    fn query(&self, account: &Address, query: &PluginQuery) -> Result<QueryResult, QueryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginQuery {
    SessionNonce { session_key: Address },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryResult {
    Nonce(u64),
}

/// Validation delegated from an account's `Module` signature mode.
pub trait ValidationModule {
    fn validate_for(
        &mut self,
        ledger: &mut Ledger,
        account: &Address,
        op_hash: &OperationHash,
        signature: &[u8],
    ) -> Result<ValidationData, ValidationError>;
}

#[derive(Debug, Clone, Copy)]
pub struct SponsorRequest<'a> {
    pub entry_point: Address,
    pub op: &'a Operation,
    pub op_hash: OperationHash,
    /// Most the sponsor can be charged for this operation
    pub max_cost: u128,
}

/// A fee payer that agrees to cover operations it approves.
pub trait Sponsor {
    fn validate_sponsored_operation(
        &mut self,
        ledger: &mut Ledger,
        request: &SponsorRequest<'_>,
    ) -> Result<ValidationData, ValidationError>;
}

/// Restricts what a session may execute.
pub trait CallPolicy {
    fn check_call_data(&self, call_data: &[u8]) -> Result<(), PolicyViolation>;
}
