//! In-process connection backed by a ledger the caller owns.

use std::error::Error;
use std::sync::Arc;

use aakit_interface::{Ledger, PluginQuery, QueryError, QueryResult, SmartAccount};
use aakit_program::{process_instruction, EntryPoint, OperationOutcome};
use aakit_state::{Address, DepositInfo, Operation};
use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::core::connection::AaConnection;

/// Ledger and coordinator behind one lock; each batch holds it to completion.
pub struct LocalNetwork {
    pub ledger: Ledger,
    pub entry_point: EntryPoint,
}

#[derive(Clone)]
pub struct LocalConnection {
    state: Arc<Mutex<LocalNetwork>>,
}

impl LocalConnection {
    pub fn new(ledger: Ledger, entry_point: EntryPoint) -> Self {
        Self {
            state: Arc::new(Mutex::new(LocalNetwork {
                ledger,
                entry_point,
            })),
        }
    }

    /// Direct access for setup: deploying contracts, minting, moving time.
    pub async fn lock(&self) -> MutexGuard<'_, LocalNetwork> {
        self.state.lock().await
    }
}

#[async_trait]
impl AaConnection for LocalConnection {
    async fn entry_point(&self) -> Result<Address, Box<dyn Error + Send + Sync>> {
        Ok(self.state.lock().await.entry_point.address())
    }

    async fn chain_id(&self) -> Result<u64, Box<dyn Error + Send + Sync>> {
        Ok(self.state.lock().await.ledger.chain_id())
    }

    async fn timestamp(&self) -> Result<u64, Box<dyn Error + Send + Sync>> {
        Ok(self.state.lock().await.ledger.timestamp())
    }

    async fn send_operations(
        &self,
        ops: &[Operation],
        beneficiary: Address,
    ) -> Result<Vec<OperationOutcome>, Box<dyn Error + Send + Sync>> {
        let mut guard = self.state.lock().await;
        let LocalNetwork {
            ledger,
            entry_point,
        } = &mut *guard;
        debug!("Submitting {} operations", ops.len());
        Ok(entry_point.handle_ops(ledger, ops, beneficiary)?)
    }

    async fn send_instruction(
        &self,
        caller: Address,
        value: u128,
        data: &[u8],
    ) -> Result<Vec<OperationOutcome>, Box<dyn Error + Send + Sync>> {
        let mut guard = self.state.lock().await;
        let LocalNetwork {
            ledger,
            entry_point,
        } = &mut *guard;
        Ok(process_instruction(entry_point, ledger, caller, value, data)?)
    }

    async fn account_nonce(
        &self,
        account: &Address,
    ) -> Result<Option<u64>, Box<dyn Error + Send + Sync>> {
        let guard = self.state.lock().await;
        if !guard.ledger.has_code(account) {
            return Ok(None);
        }
        let nonce = guard
            .ledger
            .view(account, |code| code.as_account_ref().map(|a| a.nonce()))?;
        Ok(nonce)
    }

    async fn query_plugin(
        &self,
        account: &Address,
        plugin: &Address,
        query: PluginQuery,
    ) -> Result<QueryResult, Box<dyn Error + Send + Sync>> {
        let guard = self.state.lock().await;
        let ledger = &guard.ledger;
        let result = ledger
            .view(account, |code| {
                code.as_account_ref()
                    .map(|a| a.query_plugin(ledger, plugin, &query))
            })
            .map_err(QueryError::from)?
            .ok_or(QueryError::NotAnAccount(*account))??;
        Ok(result)
    }

    async fn deposit_info(
        &self,
        account: &Address,
    ) -> Result<DepositInfo, Box<dyn Error + Send + Sync>> {
        Ok(self.state.lock().await.entry_point.deposit_info(account))
    }
}
