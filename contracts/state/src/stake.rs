//! Stake and deposit records of the fee-sponsor ledger.

use aakit_assertions::{check_nonzero, check_some};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakeError {
    #[error("Unstake delay must be greater than zero")]
    ZeroUnstakeDelay,

    #[error("Cannot decrease unstake delay from {current} to {requested}")]
    UnstakeDelayDecrease { current: u64, requested: u64 },

    #[error("No stake specified")]
    NoStake,

    #[error("Stake is already unlocking")]
    AlreadyUnlocking,

    #[error("Stake must be unlocked first")]
    NotUnlocking,

    #[error("Stake withdrawal is not due: available at {available_at}, now {now}")]
    WithdrawalNotDue { available_at: u64, now: u64 },

    #[error("Withdraw amount {requested} exceeds deposit {available}")]
    InsufficientDeposit { available: u128, requested: u128 },

    #[error("Balance overflow")]
    Overflow,
}

/// Locked collateral of a sponsor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    pub amount: u128,
    pub unstake_delay: u64,
    /// Ledger time of the unlock request, if one is pending
    pub withdraw_requested_at: Option<u64>,
}

impl Stake {
    /// Staked, and not on its way out.
    pub fn is_locked(&self) -> bool {
        self.amount > 0 && self.withdraw_requested_at.is_none()
    }

    /// Time at which an unlocking stake may be withdrawn.
    pub fn withdraw_time(&self) -> Option<u64> {
        self.withdraw_requested_at
            .map(|at| at.saturating_add(self.unstake_delay))
    }

    /// Adds collateral and (optionally) lengthens the lock. Cancels a pending
    /// unlock.
    pub fn add(&mut self, amount: u128, unstake_delay: u64) -> Result<(), StakeError> {
        if unstake_delay == 0 {
            return Err(StakeError::ZeroUnstakeDelay);
        }
        if unstake_delay < self.unstake_delay {
            return Err(StakeError::UnstakeDelayDecrease {
                current: self.unstake_delay,
                requested: unstake_delay,
            });
        }
        let total = check_some(self.amount.checked_add(amount), StakeError::Overflow)?;
        check_nonzero(total, StakeError::NoStake)?;
        self.amount = total;
        self.unstake_delay = unstake_delay;
        self.withdraw_requested_at = None;
        Ok(())
    }

    /// Starts the unstake delay; returns the withdraw time.
    pub fn unlock(&mut self, now: u64) -> Result<u64, StakeError> {
        check_nonzero(self.amount, StakeError::NoStake)?;
        if self.withdraw_requested_at.is_some() {
            return Err(StakeError::AlreadyUnlocking);
        }
        self.withdraw_requested_at = Some(now);
        Ok(now.saturating_add(self.unstake_delay))
    }

    /// Releases the whole stake once the delay has elapsed.
    pub fn withdraw(&mut self, now: u64) -> Result<u128, StakeError> {
        let available_at = check_some(self.withdraw_time(), StakeError::NotUnlocking)?;
        check_nonzero(self.amount, StakeError::NoStake)?;
        if now < available_at {
            return Err(StakeError::WithdrawalNotDue { available_at, now });
        }
        let amount = self.amount;
        *self = Stake::default();
        Ok(amount)
    }
}

/// Everything the fee-sponsor ledger tracks for one address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositInfo {
    pub deposit: u128,
    pub stake: Stake,
}

impl DepositInfo {
    pub fn credit(&mut self, amount: u128) -> Result<u128, StakeError> {
        self.deposit = self
            .deposit
            .checked_add(amount)
            .ok_or(StakeError::Overflow)?;
        Ok(self.deposit)
    }

    pub fn debit(&mut self, amount: u128) -> Result<u128, StakeError> {
        self.deposit = self
            .deposit
            .checked_sub(amount)
            .ok_or(StakeError::InsufficientDeposit {
                available: self.deposit,
                requested: amount,
            })?;
        Ok(self.deposit)
    }
}
