//! In-memory ledger.
//!
//! Holds balances, contract code, the clock and the active gas meter. A call
//! either completes or leaves no trace: the ledger snapshots itself before
//! running the callee and restores the snapshot when the callee reverts.
//! A contract is checked out of the code map while it runs, so it can take
//! `&mut Ledger` for nested calls; calling back into a contract that is
//! already running reverts.

use std::collections::{HashMap, HashSet};

use aakit_state::constants::{CALLDATA_BYTE_GAS, CALL_BASE_GAS, CALL_VALUE_GAS};
use aakit_state::{Address, OutOfGas};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::{LedgerError, Revert};
use crate::{CallResult, Contract};

/// Context of the call a contract is handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Immediate caller
    pub caller: Address,
    /// Address of the contract handling the call
    pub address: Address,
    /// Value transferred with the call
    pub value: u128,
}

/// Genesis parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub chain_id: u64,
    pub timestamp: u64,
    pub base_fee: u128,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            timestamp: 0,
            base_fee: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct GasMeter {
    limit: u64,
    used: u64,
}

#[derive(Clone)]
pub struct Ledger {
    chain_id: u64,
    timestamp: u64,
    base_fee: u128,
    balances: HashMap<Address, u128>,
    code: HashMap<Address, Box<dyn Contract>>,
    /// Contracts currently executing (checked out of `code`)
    active: HashSet<Address>,
    meter: Option<GasMeter>,
}

/// Saved ledger state; see [`Ledger::checkpoint`].
pub struct Checkpoint {
    snapshot: Ledger,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            chain_id: config.chain_id,
            timestamp: config.timestamp,
            base_fee: config.base_fee,
            balances: HashMap::new(),
            code: HashMap::new(),
            active: HashSet::new(),
            meter: None,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    pub fn advance_time(&mut self, seconds: u64) {
        self.timestamp = self.timestamp.saturating_add(seconds);
    }

    pub fn base_fee(&self) -> u128 {
        self.base_fee
    }

    pub fn set_base_fee(&mut self, base_fee: u128) {
        self.base_fee = base_fee;
    }

    pub fn balance(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Creates `amount` out of thin air for `account`.
    pub fn mint(&mut self, account: Address, amount: u128) -> Result<(), LedgerError> {
        let balance = self.balances.entry(account).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: u128) -> Result<(), LedgerError> {
        if amount == 0 || from == to {
            return Ok(());
        }
        let balance = self.balance(&from);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                account: from,
                balance,
                required: amount,
            });
        }
        let credited = self
            .balance(&to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.balances.insert(from, balance - amount);
        self.balances.insert(to, credited);
        Ok(())
    }

    pub fn has_code(&self, address: &Address) -> bool {
        self.code.contains_key(address) || self.active.contains(address)
    }

    pub fn deploy(&mut self, address: Address, contract: Box<dyn Contract>) -> Result<(), LedgerError> {
        if self.has_code(&address) {
            return Err(LedgerError::AddressOccupied(address));
        }
        debug!("Deploying contract at {}", address);
        self.code.insert(address, contract);
        Ok(())
    }

    /// Calls `to` from `caller`, moving `value` along. A call to an address
    /// without code is a plain transfer.
    pub fn call(&mut self, caller: Address, to: Address, value: u128, data: &[u8]) -> CallResult {
        let mut cost = CALL_BASE_GAS.saturating_add(CALLDATA_BYTE_GAS.saturating_mul(data.len() as u64));
        if value > 0 {
            cost = cost.saturating_add(CALL_VALUE_GAS);
        }
        self.charge_gas(cost)?;

        if self.active.contains(&to) {
            return Err(LedgerError::Reentrant(to).into());
        }

        let checkpoint = self.checkpoint();
        self.transfer(caller, to, value)?;

        let Some(mut code) = self.code.remove(&to) else {
            return Ok(Vec::new());
        };
        self.active.insert(to);
        let ctx = CallContext {
            caller,
            address: to,
            value,
        };
        let result = code.call(self, &ctx, data);
        self.active.remove(&to);
        self.code.insert(to, code);

        if let Err(revert) = &result {
            debug!("Call {} -> {} reverted: {}", caller, to, revert);
            self.restore(checkpoint);
        }
        result
    }

    /// Runs `f` against the contract at `address` with the rest of the ledger
    /// available for nested calls. State changes are not rolled back on
    /// error; callers that need atomicity take a checkpoint.
    pub fn with_contract_mut<R>(
        &mut self,
        address: &Address,
        f: impl FnOnce(&mut dyn Contract, &mut Ledger) -> R,
    ) -> Result<R, LedgerError> {
        if self.active.contains(address) {
            return Err(LedgerError::Reentrant(*address));
        }
        let mut code = self
            .code
            .remove(address)
            .ok_or(LedgerError::NoCode(*address))?;
        self.active.insert(*address);
        let result = f(code.as_mut(), self);
        self.active.remove(address);
        self.code.insert(*address, code);
        Ok(result)
    }

    /// Read-only access to the contract at `address`.
    pub fn view<R>(&self, address: &Address, f: impl FnOnce(&dyn Contract) -> R) -> Result<R, LedgerError> {
        if self.active.contains(address) {
            return Err(LedgerError::Reentrant(*address));
        }
        let code = self.code.get(address).ok_or(LedgerError::NoCode(*address))?;
        Ok(f(code.as_ref()))
    }

    /// Typed read-only access, for clients and tests.
    pub fn contract<T: 'static>(&self, address: &Address) -> Option<&T> {
        self.code
            .get(address)
            .and_then(|code| code.as_ref().as_any().downcast_ref::<T>())
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            snapshot: self.clone(),
        }
    }

    /// Returns to `checkpoint`. Gas already charged stays charged.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        let meter = self.meter;
        *self = checkpoint.snapshot;
        self.meter = meter;
    }

    /// Starts charging gas against `limit`, replacing any active meter.
    pub fn start_metering(&mut self, limit: u64) {
        self.meter = Some(GasMeter { limit, used: 0 });
    }

    /// Stops the active meter and returns the gas it recorded.
    pub fn stop_metering(&mut self) -> u64 {
        self.meter.take().map(|meter| meter.used).unwrap_or(0)
    }

    pub fn gas_used(&self) -> u64 {
        self.meter.map(|meter| meter.used).unwrap_or(0)
    }

    /// Charges `amount` to the active meter. Without a meter nothing is
    /// charged.
    pub fn charge_gas(&mut self, amount: u64) -> Result<(), OutOfGas> {
        let Some(meter) = self.meter.as_mut() else {
            return Ok(());
        };
        meter.used = meter.used.saturating_add(amount);
        trace!("Charged {} gas ({}/{})", amount, meter.used, meter.limit);
        if meter.used > meter.limit {
            return Err(OutOfGas {
                limit: meter.limit,
                used: meter.used,
            });
        }
        Ok(())
    }
}
