use std::error::Error;

use aakit_interface::{PluginQuery, QueryError, QueryResult};
use aakit_program::{EntryPointError, OperationOutcome};
use aakit_state::{Address, DepositInfo, Operation, OperationHash};

use crate::core::connection::AaConnection;
use crate::error::{Result, SdkError};

/// Recovers the coordinator's own error types from a transport error.
pub(crate) fn map_connection_error(e: Box<dyn Error + Send + Sync>) -> SdkError {
    let e = match e.downcast::<EntryPointError>() {
        Ok(rejected) => return SdkError::from(*rejected),
        Err(e) => e,
    };
    match e.downcast::<QueryError>() {
        Ok(query) => SdkError::Query(*query),
        Err(e) => SdkError::Connection(e.to_string()),
    }
}

//=============================================================================
// Queries
//=============================================================================

/// Hash the sender (and any session key) signs for `op`.
pub async fn fetch_operation_hash(
    connection: &impl AaConnection,
    op: &Operation,
) -> Result<OperationHash> {
    let entry_point = connection
        .entry_point()
        .await
        .map_err(map_connection_error)?;
    let chain_id = connection.chain_id().await.map_err(map_connection_error)?;
    Ok(op.hash(&entry_point, chain_id))
}

/// Next operation nonce of a deployed account.
pub async fn fetch_account_nonce(connection: &impl AaConnection, account: &Address) -> Result<u64> {
    connection
        .account_nonce(account)
        .await
        .map_err(map_connection_error)?
        .ok_or(SdkError::AccountNotFound(*account))
}

/// Session nonce the next signature of `session_key` must cover.
pub async fn fetch_session_nonce(
    connection: &impl AaConnection,
    account: &Address,
    plugin: &Address,
    session_key: &Address,
) -> Result<u64> {
    let result = connection
        .query_plugin(
            account,
            plugin,
            PluginQuery::SessionNonce {
                session_key: *session_key,
            },
        )
        .await
        .map_err(map_connection_error)?;
    match result {
        QueryResult::Nonce(nonce) => Ok(nonce),
    }
}

pub async fn fetch_deposit_info(
    connection: &impl AaConnection,
    account: &Address,
) -> Result<DepositInfo> {
    connection
        .deposit_info(account)
        .await
        .map_err(map_connection_error)
}

//=============================================================================
// Submission
//=============================================================================

/// Submits `ops` as one batch. A validation failure comes back as
/// [`SdkError::Rejected`] naming the offending operation.
pub async fn send_operations(
    connection: &impl AaConnection,
    ops: &[Operation],
    beneficiary: Address,
) -> Result<Vec<OperationOutcome>> {
    connection
        .send_operations(ops, beneficiary)
        .await
        .map_err(map_connection_error)
}

/// Human-readable reason of a reverted operation, if it reverted.
pub fn revert_reason(outcome: &OperationOutcome) -> Option<String> {
    outcome
        .revert
        .as_ref()
        .map(|revert| revert.decoded().to_string())
}
