//! The plugin account state and its `SmartAccount` surface.

use std::collections::BTreeSet;

use aakit_interface::{
    CallContext, Ledger, PluginQuery, QueryError, QueryResult, SmartAccount, ValidationRequest,
};
use aakit_state::hash::signed_message_hash;
use aakit_state::signature::recover_signer;
use aakit_state::{
    AccountSignature, Address, NonceScope, ReplayError, ValidationData, ValidationError,
};
use tracing::{debug, info, warn};

/// A smart account bound to exactly one coordinator.
#[derive(Debug, Clone)]
pub struct PluginAccount {
    /// Own ledger address
    pub(crate) address: Address,
    /// The only coordinator allowed to request validation
    pub(crate) entry_point: Address,
    pub(crate) owner: Address,
    /// Next expected operation nonce
    pub(crate) nonce: u64,
    /// Delegated validation module for `Module` signatures
    pub(crate) module: Option<Address>,
    /// Plugins the owner has registered
    pub(crate) plugins: BTreeSet<Address>,
}

impl PluginAccount {
    pub fn new(address: Address, entry_point: Address, owner: Address) -> Self {
        Self {
            address,
            entry_point,
            owner,
            nonce: 0,
            module: None,
            plugins: BTreeSet::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn module(&self) -> Option<Address> {
        self.module
    }

    pub fn plugins(&self) -> impl Iterator<Item = &Address> {
        self.plugins.iter()
    }

    /// Returns whether the registry changed.
    pub(crate) fn register_plugin(&mut self, plugin: Address) -> bool {
        let added = self.plugins.insert(plugin);
        if added {
            info!("Account {} registered plugin {}", self.address, plugin);
        }
        added
    }

    /// Returns whether the registry changed. Removing an unknown plugin is a
    /// no-op.
    pub(crate) fn deregister_plugin(&mut self, plugin: &Address) -> bool {
        let removed = self.plugins.remove(plugin);
        if removed {
            info!("Account {} deregistered plugin {}", self.address, plugin);
        }
        removed
    }

    fn pay_prefund(&self, ledger: &mut Ledger, missing_funds: u128) {
        if missing_funds == 0 {
            return;
        }
        // The coordinator reports the shortfall if this does not go through.
        if let Err(e) = ledger.transfer(self.address, self.entry_point, missing_funds) {
            debug!("Account {} could not pay prefund: {}", self.address, e);
        }
    }
}

impl SmartAccount for PluginAccount {
    fn validate_operation(
        &mut self,
        ledger: &mut Ledger,
        ctx: &CallContext,
        request: &ValidationRequest<'_>,
    ) -> Result<ValidationData, ValidationError> {
        if ctx.caller != self.entry_point {
            warn!(
                "Account {} rejected validation request from {}",
                self.address, ctx.caller
            );
            return Err(ValidationError::WrongEntryPoint {
                expected: self.entry_point,
                caller: ctx.caller,
            });
        }

        let validation = match AccountSignature::parse(&request.op.signature)? {
            AccountSignature::Owner(signature) => {
                self.validate_owner(ledger, &request.op_hash, signature)?
            },
            AccountSignature::Module(signature) => {
                self.validate_module(ledger, &request.op_hash, signature)?
            },
            AccountSignature::Plugin(signature) => {
                self.validate_plugin(ledger, request.op, &request.op_hash, signature)?
            },
        };

        if request.op.nonce != self.nonce {
            return Err(ReplayError {
                scope: NonceScope::Account,
                expected: self.nonce,
                actual: request.op.nonce,
            }
            .into());
        }
        self.nonce += 1;

        self.pay_prefund(ledger, request.missing_funds);
        Ok(validation)
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn owner(&self) -> Address {
        self.owner
    }

    fn entry_point(&self) -> Address {
        self.entry_point
    }

    fn is_plugin_registered(&self, plugin: &Address) -> bool {
        self.plugins.contains(plugin)
    }

    fn is_valid_signature(&self, hash: &[u8; 32], signature: &[u8]) -> bool {
        matches!(
            recover_signer(&signed_message_hash(hash), signature),
            Ok(signer) if signer == self.owner
        )
    }

    fn query_plugin(
        &self,
        ledger: &Ledger,
        plugin: &Address,
        query: &PluginQuery,
    ) -> Result<QueryResult, QueryError> {
        if !self.plugins.contains(plugin) {
            return Err(QueryError::NotRegistered(*plugin));
        }
        ledger.view(plugin, |code| match code.as_plugin_ref() {
            Some(plugin_code) => plugin_code.query(&self.address, query),
            None => Err(QueryError::NotAPlugin(*plugin)),
        })?
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use aakit_interface::LedgerConfig;
    use aakit_state::account_signature::{encode_with_mode, SignatureMode};
    use aakit_state::signature::{address_of, sign_digest};
    use aakit_state::{keccak256, Operation, OperationHash};
    use assert_matches::assert_matches;
    use libsecp256k1::SecretKey;

    pub(crate) fn key(label: &str) -> SecretKey {
        SecretKey::parse(&keccak256(label.as_bytes())).unwrap()
    }

    pub(crate) struct Fixture {
        pub ledger: Ledger,
        pub entry_point: Address,
        pub owner: SecretKey,
        pub account: PluginAccount,
    }

    pub(crate) fn fixture() -> Fixture {
        let ledger = Ledger::new(LedgerConfig {
            chain_id: 1337,
            timestamp: 1_700_000_000,
            base_fee: 0,
        });
        let entry_point = Address::from_label("entry-point");
        let owner = key("owner");
        let account = PluginAccount::new(
            Address::from_label("account"),
            entry_point,
            address_of(&owner),
        );
        Fixture {
            ledger,
            entry_point,
            owner,
            account,
        }
    }

    pub(crate) fn owner_signed(fixture: &Fixture, mut op: Operation) -> (Operation, OperationHash) {
        let hash = op.hash(&fixture.entry_point, fixture.ledger.chain_id());
        let signature = sign_digest(&fixture.owner, &signed_message_hash(hash.as_bytes()));
        op.signature = encode_with_mode(SignatureMode::Owner, &signature);
        (op, hash)
    }

    fn validate(fixture: &mut Fixture, op: &Operation, hash: OperationHash) -> Result<ValidationData, ValidationError> {
        let ctx = CallContext {
            caller: fixture.entry_point,
            address: fixture.account.address,
            value: 0,
        };
        let request = ValidationRequest {
            op,
            op_hash: hash,
            missing_funds: 0,
        };
        fixture
            .account
            .validate_operation(&mut fixture.ledger, &ctx, &request)
    }

    fn op(fixture: &Fixture) -> Operation {
        Operation {
            sender: fixture.account.address,
            nonce: fixture.account.nonce,
            call_gas_limit: 100_000,
            verification_gas_limit: 100_000,
            ..Operation::default()
        }
    }

    #[test]
    fn test_owner_signature_validates_and_bumps_nonce() {
        let mut fixture = fixture();
        let (op, hash) = owner_signed(&fixture, op(&fixture));
        assert_eq!(
            validate(&mut fixture, &op, hash),
            Ok(ValidationData::UNBOUNDED)
        );
        assert_eq!(fixture.account.nonce(), 1);
    }

    #[test]
    fn test_replayed_nonce_is_rejected() {
        let mut fixture = fixture();
        let (op, hash) = owner_signed(&fixture, op(&fixture));
        validate(&mut fixture, &op, hash).unwrap();
        assert_matches!(
            validate(&mut fixture, &op, hash),
            Err(ValidationError::Replay(ReplayError {
                scope: NonceScope::Account,
                expected: 1,
                actual: 0
            }))
        );
    }

    #[test]
    fn test_foreign_signer_is_rejected() {
        let mut fixture = fixture();
        let op = op(&fixture);
        let hash = op.hash(&fixture.entry_point, 1337);
        let signature = sign_digest(&key("mallory"), &signed_message_hash(hash.as_bytes()));
        let op = Operation {
            signature: encode_with_mode(SignatureMode::Owner, &signature),
            ..op
        };
        assert_matches!(
            validate(&mut fixture, &op, hash),
            Err(ValidationError::SignerMismatch { .. })
        );
        assert_eq!(fixture.account.nonce(), 0);
    }

    #[test]
    fn test_rejects_other_coordinator() {
        let mut fixture = fixture();
        let (op, hash) = owner_signed(&fixture, op(&fixture));
        let ctx = CallContext {
            caller: Address::from_label("rogue-entry-point"),
            address: fixture.account.address,
            value: 0,
        };
        let request = ValidationRequest {
            op: &op,
            op_hash: hash,
            missing_funds: 0,
        };
        assert_matches!(
            fixture
                .account
                .validate_operation(&mut fixture.ledger, &ctx, &request),
            Err(ValidationError::WrongEntryPoint { .. })
        );
    }

    #[test]
    fn test_prefund_is_paid_when_affordable() {
        let mut fixture = fixture();
        fixture.ledger.mint(fixture.account.address, 50).unwrap();
        let (op, hash) = owner_signed(&fixture, op(&fixture));
        let ctx = CallContext {
            caller: fixture.entry_point,
            address: fixture.account.address,
            value: 0,
        };
        let request = ValidationRequest {
            op: &op,
            op_hash: hash,
            missing_funds: 30,
        };
        fixture
            .account
            .validate_operation(&mut fixture.ledger, &ctx, &request)
            .unwrap();
        assert_eq!(fixture.ledger.balance(&fixture.entry_point), 30);
        assert_eq!(fixture.ledger.balance(&fixture.account.address), 20);
    }

    #[test]
    fn test_is_valid_signature_checks_owner() {
        let fixture = fixture();
        let hash = keccak256(b"message");
        let good = sign_digest(&fixture.owner, &signed_message_hash(&hash));
        let bad = sign_digest(&key("mallory"), &signed_message_hash(&hash));
        assert!(fixture.account.is_valid_signature(&hash, &good));
        assert!(!fixture.account.is_valid_signature(&hash, &bad));
        assert!(!fixture.account.is_valid_signature(&hash, &good[..64]));
    }

    #[test]
    fn test_registry_is_idempotent() {
        let mut fixture = fixture();
        let plugin = Address::from_label("plugin");
        assert!(fixture.account.register_plugin(plugin));
        assert!(!fixture.account.register_plugin(plugin));
        assert!(fixture.account.is_plugin_registered(&plugin));
        assert!(fixture.account.deregister_plugin(&plugin));
        assert!(!fixture.account.deregister_plugin(&plugin));
        assert!(!fixture.account.is_plugin_registered(&plugin));
    }

    #[test]
    fn test_query_requires_registration() {
        let fixture = fixture();
        let plugin = Address::from_label("plugin");
        assert_eq!(
            fixture.account.query_plugin(
                &fixture.ledger,
                &plugin,
                &PluginQuery::SessionNonce {
                    session_key: Address::ZERO
                }
            ),
            Err(QueryError::NotRegistered(plugin))
        );
    }
}
