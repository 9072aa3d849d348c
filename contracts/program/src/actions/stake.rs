//! Stake instruction handlers
//!
//! A stake only grows while locked. Withdrawal takes an explicit unlock and
//! the full unstake delay.

use aakit_assertions::check_condition;
use aakit_interface::Ledger;
use aakit_state::Address;
use tracing::info;

use crate::entry_point::EntryPoint;
use crate::error::EntryPointError;
use crate::events::Event;

impl EntryPoint {
    /// Locks `amount` from `caller`'s ledger balance as stake, raising the
    /// unstake delay to `unstake_delay`. Cancels a pending unlock.
    pub fn add_stake(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        amount: u128,
        unstake_delay: u64,
    ) -> Result<(), EntryPointError> {
        let mut stake = self.stakes.deposit_info(&caller).stake;
        stake.add(amount, unstake_delay)?;
        ledger.transfer(caller, self.address, amount)?;
        self.stakes.info_mut(caller).stake = stake;

        info!(
            "{} staked {} (total {}), unstake delay {}",
            caller, amount, stake.amount, stake.unstake_delay
        );
        self.events.push(Event::StakeLocked {
            account: caller,
            total_staked: stake.amount,
            unstake_delay: stake.unstake_delay,
        });
        Ok(())
    }

    /// Starts the unstake delay. Returns the time the stake can be withdrawn.
    pub fn unlock_stake(&mut self, ledger: &Ledger, caller: Address) -> Result<u64, EntryPointError> {
        let mut stake = self.stakes.deposit_info(&caller).stake;
        let withdraw_time = stake.unlock(ledger.timestamp())?;
        self.stakes.info_mut(caller).stake = stake;

        info!("{} unlocked stake, withdrawable at {}", caller, withdraw_time);
        self.events.push(Event::StakeUnlocked {
            account: caller,
            withdraw_time,
        });
        Ok(withdraw_time)
    }

    /// Pays `caller`'s whole unlocked stake to `to`.
    pub fn withdraw_stake(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        to: Address,
    ) -> Result<u128, EntryPointError> {
        check_condition(to != self.address, EntryPointError::WithdrawToEntryPoint)?;
        let mut stake = self.stakes.deposit_info(&caller).stake;
        let amount = stake.withdraw(ledger.timestamp())?;
        ledger.transfer(self.address, to, amount)?;
        self.stakes.info_mut(caller).stake = stake;

        info!("{} withdrew stake of {} to {}", caller, amount, to);
        self.events.push(Event::StakeWithdrawn {
            account: caller,
            to,
            amount,
        });
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aakit_interface::LedgerConfig;
    use aakit_state::StakeError;

    #[test]
    fn test_failed_unlock_leaves_no_record() {
        let ledger = Ledger::new(LedgerConfig::default());
        let mut entry_point = EntryPoint::new(Address::from_label("aakit.EntryPoint"));
        let stranger = Address::from_label("stranger");

        assert_eq!(
            entry_point.unlock_stake(&ledger, stranger),
            Err(EntryPointError::Stake(StakeError::NoStake))
        );
        assert!(!entry_point.stakes.is_tracked(&stranger));
        assert!(entry_point.events().is_empty());
    }
}
