#![allow(dead_code)]

use std::collections::HashMap;

use aakit_account::AccountFactory;
use aakit_interface::{CallContext, CallResult, Contract, Ledger, LedgerConfig, Revert};
use aakit_program::EntryPoint;
use aakit_sdk::{AccountHandle, LocalConnection, LocalSigner, OperationSigner};
use aakit_session_key_plugin::SessionKeyPlugin;
use aakit_state::{selector, Address, Call};

pub const CHAIN_ID: u64 = 1337;
pub const GENESIS_TIME: u64 = 1_700_000_000;

/// Counts `count()` calls per caller; `countFail()` always reverts.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    pub counts: HashMap<Address, u64>,
}

impl Contract for Counter {
    fn call(&mut self, ledger: &mut Ledger, ctx: &CallContext, data: &[u8]) -> CallResult {
        let head = data.get(..4).unwrap_or_default();
        if head == selector("count()") {
            ledger.charge_gas(5_000)?;
            *self.counts.entry(ctx.caller).or_insert(0) += 1;
            Ok(Vec::new())
        } else if head == selector("countFail()") {
            Err(Revert::message("count failed"))
        } else {
            Err(Revert::from_payload(Vec::new()))
        }
    }
}

pub struct TestContext {
    pub connection: LocalConnection,
    pub factory: Address,
    pub plugin: Address,
    pub counter: Address,
    pub beneficiary: Address,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

impl TestContext {
    pub fn new() -> anyhow::Result<Self> {
        init_tracing();
        let mut ledger = Ledger::new(LedgerConfig {
            chain_id: CHAIN_ID,
            timestamp: GENESIS_TIME,
            base_fee: 0,
        });
        let entry_point = EntryPoint::new(Address::from_label("aakit.EntryPoint"));
        let factory = Address::from_label("aakit.AccountFactory");
        let plugin = Address::from_label("aakit.SessionKeyPlugin");
        let counter = Address::from_label("test.Counter");
        ledger.deploy(factory, Box::new(AccountFactory::new(entry_point.address())))?;
        ledger.deploy(plugin, Box::new(SessionKeyPlugin::new()))?;
        ledger.deploy(counter, Box::new(Counter::default()))?;
        Ok(Self {
            connection: LocalConnection::new(ledger, entry_point),
            factory,
            plugin,
            counter,
            beneficiary: Address::from_label("beneficiary"),
        })
    }

    pub fn count(&self, function: &str) -> Call {
        Call {
            target: self.counter,
            value: 0,
            data: selector(function).to_vec(),
        }
    }

    pub async fn count_of(&self, account: &Address) -> u64 {
        let network = self.connection.lock().await;
        network
            .ledger
            .contract::<Counter>(&self.counter)
            .and_then(|counter| counter.counts.get(account).copied())
            .unwrap_or(0)
    }

    pub async fn mint(&self, account: Address, amount: u128) -> anyhow::Result<()> {
        self.connection.lock().await.ledger.mint(account, amount)?;
        Ok(())
    }

    /// Deploys `owner`'s account directly through the factory and funds it.
    pub async fn create_account(&self, owner: &LocalSigner, balance: u128) -> anyhow::Result<AccountHandle> {
        let handle = AccountHandle::counterfactual(self.factory, owner.address());
        let init_code = handle.init_code();
        let mut network = self.connection.lock().await;
        network.ledger.call(
            Address::from_label("deployer"),
            self.factory,
            0,
            &init_code[Address::LEN..],
        )?;
        network.ledger.mint(handle.address, balance)?;
        Ok(handle)
    }

    /// Sends `data` to `account` as `owner`.
    pub async fn owner_call(&self, owner: &LocalSigner, account: Address, data: &[u8]) -> anyhow::Result<()> {
        self.connection
            .lock()
            .await
            .ledger
            .call(owner.address(), account, 0, data)?;
        Ok(())
    }
}
