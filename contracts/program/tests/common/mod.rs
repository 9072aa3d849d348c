//! Common test utilities for the EntryPoint tests

#![allow(dead_code)]

use std::collections::HashMap;

use aakit_account::AccountFactory;
use aakit_interface::{
    CallContext, CallResult, Contract, Ledger, LedgerConfig, PluginQuery, QueryResult, Revert,
    ValidationPlugin,
};
use aakit_program::{EntryPoint, EntryPointConfig};
use aakit_session_key_plugin::SessionKeyPlugin;
use aakit_state::account_signature::{encode_with_mode, SignatureMode};
use aakit_state::hash::signed_message_hash;
use aakit_state::session::session_digest;
use aakit_state::signature::{address_of, sign_digest};
use aakit_state::{
    keccak256, selector, AccountInstruction, Address, Call, Operation, PluginSignature,
    SessionData, SessionGrant, SessionSignature,
};
use libsecp256k1::SecretKey;

pub const CHAIN_ID: u64 = 1337;
pub const GENESIS_TIME: u64 = 1_700_000_000;
pub const SESSION_VALID_UNTIL: u64 = 1_777_068_462;

/// Counts `count()` calls per caller; `countFail()` always reverts.
#[derive(Debug, Clone, Default)]
pub struct TestCounter {
    pub counts: HashMap<Address, u64>,
}

impl Contract for TestCounter {
    fn call(&mut self, ledger: &mut Ledger, ctx: &CallContext, data: &[u8]) -> CallResult {
        let head = data.get(..4).unwrap_or_default();
        if head == selector("count()") {
            ledger.charge_gas(5_000)?;
            *self.counts.entry(ctx.caller).or_insert(0) += 1;
            Ok(Vec::new())
        } else if head == selector("countFail()") {
            Err(Revert::message("count failed"))
        } else if head == selector("burn()") {
            // runs until the meter gives out
            loop {
                ledger.charge_gas(10_000)?;
            }
        } else {
            Err(Revert::from_payload(Vec::new()))
        }
    }
}

pub struct TestContext {
    pub ledger: Ledger,
    pub entry_point: EntryPoint,
    pub factory: Address,
    pub counter: Address,
    pub plugin: Address,
    pub beneficiary: Address,
}

pub fn key(label: &str) -> SecretKey {
    SecretKey::parse(&keccak256(label.as_bytes())).unwrap()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(EntryPointConfig::default())
    }

    pub fn with_config(config: EntryPointConfig) -> Self {
        init_tracing();
        let mut ledger = Ledger::new(LedgerConfig {
            chain_id: CHAIN_ID,
            timestamp: GENESIS_TIME,
            base_fee: 0,
        });
        let entry_point = EntryPoint::with_config(Address::from_label("aakit.EntryPoint"), config);
        let factory = Address::from_label("aakit.AccountFactory");
        let counter = Address::from_label("test.Counter");
        let plugin = Address::from_label("aakit.SessionKeyPlugin");
        ledger
            .deploy(factory, Box::new(AccountFactory::new(entry_point.address())))
            .unwrap();
        ledger.deploy(counter, Box::new(TestCounter::default())).unwrap();
        ledger.deploy(plugin, Box::new(SessionKeyPlugin::new())).unwrap();
        Self {
            ledger,
            entry_point,
            factory,
            counter,
            plugin,
            beneficiary: Address::from_label("beneficiary"),
        }
    }

    pub fn account_address(&self, owner: &SecretKey) -> Address {
        AccountFactory::account_address(&self.factory, &address_of(owner), &[0u8; 32])
    }

    /// Deploys `owner`'s account and gives it `balance` to pay fees from.
    pub fn create_account(&mut self, owner: &SecretKey, balance: u128) -> Address {
        let init_code = AccountFactory::init_code(&self.factory, &address_of(owner), &[0u8; 32]);
        let deployer = Address::from_label("deployer");
        let returned = self
            .ledger
            .call(deployer, self.factory, 0, &init_code[Address::LEN..])
            .unwrap();
        let account = Address::from_slice(&returned).unwrap();
        self.ledger.mint(account, balance).unwrap();
        account
    }

    /// Sends `data` to `account` as its owner.
    pub fn owner_call(&mut self, owner: &SecretKey, account: Address, data: &[u8]) -> CallResult {
        self.ledger.call(address_of(owner), account, 0, data)
    }

    pub fn register_plugin(&mut self, owner: &SecretKey, account: Address) {
        let data = AccountInstruction::RegisterPlugin {
            plugin: self.plugin,
        }
        .pack();
        self.owner_call(owner, account, &data).unwrap();
    }

    pub fn op(&self, sender: Address, nonce: u64, call_data: Vec<u8>) -> Operation {
        Operation {
            sender,
            nonce,
            init_code: Vec::new(),
            call_data,
            call_gas_limit: 200_000,
            verification_gas_limit: 300_000,
            pre_verification_gas: 21_000,
            max_fee_per_unit: 1,
            max_priority_fee_per_unit: 1,
            sponsor_and_data: Vec::new(),
            signature: Vec::new(),
        }
    }

    pub fn count_call(&self, function: &str) -> Vec<u8> {
        AccountInstruction::Execute(Call {
            target: self.counter,
            value: 0,
            data: selector(function).to_vec(),
        })
        .pack()
    }

    pub fn count_of(&self, account: &Address) -> u64 {
        self.ledger
            .contract::<TestCounter>(&self.counter)
            .unwrap()
            .counts
            .get(account)
            .copied()
            .unwrap_or(0)
    }

    pub fn sign_owner(&self, mut op: Operation, owner: &SecretKey) -> Operation {
        let hash = self.entry_point.operation_hash(&self.ledger, &op);
        let signature = sign_digest(owner, &signed_message_hash(hash.as_bytes()));
        op.signature = encode_with_mode(SignatureMode::Owner, &signature);
        op
    }

    pub fn session_nonce(&self, account: &Address, session_key: &SecretKey) -> u64 {
        let plugin = self
            .ledger
            .contract::<SessionKeyPlugin>(&self.plugin)
            .unwrap();
        match plugin.query(
            account,
            &PluginQuery::SessionNonce {
                session_key: address_of(session_key),
            },
        ) {
            Ok(QueryResult::Nonce(nonce)) => nonce,
            Err(e) => panic!("session nonce query failed: {e}"),
        }
    }

    /// Plugin-mode signature: owner grant for `[0, SESSION_VALID_UNTIL)`
    /// and the session key's signature over the current session nonce.
    pub fn sign_session(
        &self,
        op: Operation,
        owner: &SecretKey,
        session_key: &SecretKey,
        policy: Option<Address>,
    ) -> Operation {
        self.sign_session_window(op, owner, session_key, policy, 0, SESSION_VALID_UNTIL)
    }

    pub fn sign_session_window(
        &self,
        mut op: Operation,
        owner: &SecretKey,
        session_key: &SecretKey,
        policy: Option<Address>,
        valid_after: u64,
        valid_until: u64,
    ) -> Operation {
        let data = SessionData {
            session_key: address_of(session_key),
            policy,
        }
        .encode();
        let grant = SessionGrant {
            sender: op.sender,
            valid_until,
            valid_after,
            plugin: self.plugin,
            data: data.clone(),
        };
        let grant_signature = sign_digest(owner, &grant.digest(CHAIN_ID));

        let hash = self.entry_point.operation_hash(&self.ledger, &op);
        let nonce = self.session_nonce(&op.sender, session_key);
        let session = SessionSignature {
            data,
            signature: sign_digest(
                session_key,
                &session_digest(&op.sender, CHAIN_ID, &hash, nonce),
            )
            .to_vec(),
        };
        op.signature = PluginSignature {
            plugin: self.plugin,
            valid_until,
            valid_after,
            grant_signature,
            inner: session.encode(),
        }
        .encode()
        .unwrap();
        op
    }

    pub fn handle(
        &mut self,
        ops: &[Operation],
    ) -> Result<Vec<aakit_program::OperationOutcome>, aakit_program::EntryPointError> {
        let beneficiary = self.beneficiary;
        self.entry_point
            .handle_ops(&mut self.ledger, ops, beneficiary)
    }
}
