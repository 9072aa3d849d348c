//! Deposit and stake bookkeeping of the coordinator.
//!
//! The funds themselves sit in the coordinator's ledger balance; this map
//! records who owns how much of it.

use std::collections::HashMap;

use aakit_state::{Address, DepositInfo, StakeError};
use serde::Serialize;

use crate::config::EntryPointConfig;

#[derive(Debug, Clone, Default, Serialize)]
pub struct StakeManager {
    deposits: HashMap<Address, DepositInfo>,
}

impl StakeManager {
    pub fn deposit_info(&self, account: &Address) -> DepositInfo {
        self.deposits.get(account).copied().unwrap_or_default()
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.deposit_info(account).deposit
    }

    /// Whether `account` may back sponsored operations under `config`.
    pub fn is_staked(&self, account: &Address, config: &EntryPointConfig) -> bool {
        let stake = self.deposit_info(account).stake;
        stake.is_locked()
            && stake.amount >= config.min_sponsor_stake
            && stake.unstake_delay >= config.min_unstake_delay
    }

    /// Returns the new deposit.
    pub fn credit(&mut self, account: Address, amount: u128) -> Result<u128, StakeError> {
        self.deposits.entry(account).or_default().credit(amount)
    }

    /// Returns the new deposit. Leaves the record untouched on error.
    pub fn debit(&mut self, account: Address, amount: u128) -> Result<u128, StakeError> {
        let mut info = self.deposit_info(&account);
        let remaining = info.debit(amount)?;
        self.deposits.insert(account, info);
        Ok(remaining)
    }

    pub(crate) fn info_mut(&mut self, account: Address) -> &mut DepositInfo {
        self.deposits.entry(account).or_default()
    }

    #[cfg(test)]
    pub(crate) fn is_tracked(&self, account: &Address) -> bool {
        self.deposits.contains_key(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aakit_state::Stake;

    #[test]
    fn test_debit_past_deposit_fails_cleanly() {
        let mut manager = StakeManager::default();
        let sponsor = Address::from_label("sponsor");
        manager.credit(sponsor, 10).unwrap();
        assert_eq!(
            manager.debit(sponsor, 11),
            Err(StakeError::InsufficientDeposit {
                available: 10,
                requested: 11
            })
        );
        assert_eq!(manager.balance_of(&sponsor), 10);
        assert_eq!(manager.debit(sponsor, 10), Ok(0));
    }

    #[test]
    fn test_staked_requires_config_minimums() {
        let mut manager = StakeManager::default();
        let sponsor = Address::from_label("sponsor");
        let config = EntryPointConfig::default()
            .with_min_sponsor_stake(100)
            .with_min_unstake_delay(10);
        assert!(!manager.is_staked(&sponsor, &config));

        manager.info_mut(sponsor).stake = Stake {
            amount: 100,
            unstake_delay: 9,
            withdraw_requested_at: None,
        };
        assert!(!manager.is_staked(&sponsor, &config));

        manager.info_mut(sponsor).stake.unstake_delay = 10;
        assert!(manager.is_staked(&sponsor, &config));

        manager.info_mut(sponsor).stake.withdraw_requested_at = Some(5);
        assert!(!manager.is_staked(&sponsor, &config));
    }
}
