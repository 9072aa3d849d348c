//! Deposit instruction handlers

use aakit_assertions::check_condition;
use aakit_interface::Ledger;
use aakit_state::Address;
use tracing::info;

use crate::entry_point::EntryPoint;
use crate::error::EntryPointError;
use crate::events::Event;

impl EntryPoint {
    /// Moves `amount` from `caller`'s ledger balance into `account`'s
    /// deposit. Returns the new deposit.
    pub fn deposit_to(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        account: Address,
        amount: u128,
    ) -> Result<u128, EntryPointError> {
        let mut stakes = self.stakes.clone();
        let total_deposit = stakes.credit(account, amount)?;
        ledger.transfer(caller, self.address, amount)?;
        self.stakes = stakes;

        info!("Deposited {} for {}, total {}", amount, account, total_deposit);
        self.events.push(Event::Deposited {
            account,
            total_deposit,
        });
        Ok(total_deposit)
    }

    /// Pays `amount` of `caller`'s deposit to `to`.
    pub fn withdraw_to(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), EntryPointError> {
        check_condition(to != self.address, EntryPointError::WithdrawToEntryPoint)?;
        let mut stakes = self.stakes.clone();
        stakes.debit(caller, amount)?;
        ledger.transfer(self.address, to, amount)?;
        self.stakes = stakes;

        info!("{} withdrew {} to {}", caller, amount, to);
        self.events.push(Event::Withdrawn {
            account: caller,
            to,
            amount,
        });
        Ok(())
    }
}
