use std::error::Error;

use aakit_interface::{PluginQuery, QueryResult};
use aakit_program::OperationOutcome;
use async_trait::async_trait;
use aakit_state::{Address, DepositInfo, Operation};

/// Transport to a ledger running an EntryPoint.
#[async_trait]
pub trait AaConnection: Send + Sync {
    async fn entry_point(&self) -> Result<Address, Box<dyn Error + Send + Sync>>;

    async fn chain_id(&self) -> Result<u64, Box<dyn Error + Send + Sync>>;

    /// Current ledger time, in seconds.
    async fn timestamp(&self) -> Result<u64, Box<dyn Error + Send + Sync>>;

    /// Submits one batch. Validation failures come back as the
    /// coordinator's `EntryPointError`.
    async fn send_operations(
        &self,
        ops: &[Operation],
        beneficiary: Address,
    ) -> Result<Vec<OperationOutcome>, Box<dyn Error + Send + Sync>>;

    /// Sends a raw coordinator instruction (deposits, stakes) as `caller`.
    async fn send_instruction(
        &self,
        caller: Address,
        value: u128,
        data: &[u8],
    ) -> Result<Vec<OperationOutcome>, Box<dyn Error + Send + Sync>>;

    /// `None` when no account is deployed at `account`.
    async fn account_nonce(
        &self,
        account: &Address,
    ) -> Result<Option<u64>, Box<dyn Error + Send + Sync>>;

    async fn query_plugin(
        &self,
        account: &Address,
        plugin: &Address,
        query: PluginQuery,
    ) -> Result<QueryResult, Box<dyn Error + Send + Sync>>;

    async fn deposit_info(
        &self,
        account: &Address,
    ) -> Result<DepositInfo, Box<dyn Error + Send + Sync>>;
}
