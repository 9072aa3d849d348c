//! The coordinator's state.

use aakit_interface::Ledger;
use aakit_state::{Address, DepositInfo, Operation, OperationHash};

use crate::config::EntryPointConfig;
use crate::events::Event;
use crate::stake_manager::StakeManager;

/// Singleton coordinator. Its funds live in the ledger balance of `address`;
/// deposits and stakes record who owns them.
///
/// Every state-changing entry point takes `&mut self` and `&mut Ledger`, so
/// batches never interleave.
#[derive(Debug, Clone)]
pub struct EntryPoint {
    pub(crate) address: Address,
    pub(crate) config: EntryPointConfig,
    pub(crate) stakes: StakeManager,
    pub(crate) events: Vec<Event>,
}

impl EntryPoint {
    pub fn new(address: Address) -> Self {
        Self::with_config(address, EntryPointConfig::default())
    }

    pub fn with_config(address: Address, config: EntryPointConfig) -> Self {
        Self {
            address,
            config,
            stakes: StakeManager::default(),
            events: Vec::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn config(&self) -> &EntryPointConfig {
        &self.config
    }

    /// Hash accounts and session keys sign for `op` on this coordinator.
    pub fn operation_hash(&self, ledger: &Ledger, op: &Operation) -> OperationHash {
        op.hash(&self.address, ledger.chain_id())
    }

    pub fn deposit_info(&self, account: &Address) -> DepositInfo {
        self.stakes.deposit_info(account)
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.stakes.balance_of(account)
    }

    pub fn is_staked(&self, account: &Address) -> bool {
        self.stakes.is_staked(account, &self.config)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
