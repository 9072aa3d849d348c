//! Function Signature Policy for AAKit
//!
//! An allow-list of `(target, selector)` pairs. A session bound to this
//! policy may only submit operations whose call data executes calls that
//! appear in the list. Account administration (plugin registration, module
//! changes) is never allowed through a session.

use std::collections::BTreeSet;

use aakit_interface::{CallContext, CallPolicy, CallResult, Contract, Ledger, Revert};
use aakit_state::constants::STORAGE_WRITE_GAS;
use aakit_state::{selector, AccountInstruction, Address, Call, PolicyViolation};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One allowed call shape.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct Permission {
    pub target: Address,
    pub selector: [u8; 4],
}

impl Permission {
    pub fn new(target: Address, selector: [u8; 4]) -> Self {
        Self { target, selector }
    }

    /// Permission for `signature` text such as `"count()"`.
    pub fn for_function(target: Address, signature: &str) -> Self {
        Self::new(target, selector(signature))
    }
}

/// Updates to the allow-list; only the policy admin may send them.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum PolicyInstruction {
    Allow(Permission),
    Revoke(Permission),
}

impl PolicyInstruction {
    pub fn pack(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSignaturePolicy {
    admin: Address,
    permissions: BTreeSet<Permission>,
}

impl FunctionSignaturePolicy {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            permissions: BTreeSet::new(),
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission);
        self
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions.extend(permissions);
        self
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn is_allowed(&self, target: &Address, selector: &[u8; 4]) -> bool {
        self.permissions.contains(&Permission::new(*target, *selector))
    }

    pub fn permissions(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }

    fn check_call(&self, call: &Call) -> Result<(), PolicyViolation> {
        match call.selector() {
            Some(selector) if self.is_allowed(&call.target, &selector) => Ok(()),
            selector => {
                debug!("Policy rejected call to {}", call.target);
                Err(PolicyViolation {
                    target: call.target,
                    selector,
                })
            },
        }
    }
}

impl CallPolicy for FunctionSignaturePolicy {
    fn check_call_data(&self, call_data: &[u8]) -> Result<(), PolicyViolation> {
        let not_a_call = PolicyViolation {
            target: Address::ZERO,
            selector: None,
        };
        match AccountInstruction::unpack(call_data).map_err(|_| not_a_call)? {
            AccountInstruction::Execute(call) => self.check_call(&call),
            AccountInstruction::ExecuteBatch { calls } => {
                calls.iter().try_for_each(|call| self.check_call(call))
            },
            _ => Err(not_a_call),
        }
    }
}

impl Contract for FunctionSignaturePolicy {
    fn call(&mut self, ledger: &mut Ledger, ctx: &CallContext, data: &[u8]) -> CallResult {
        if ctx.caller != self.admin {
            return Err(Revert::message("policy: caller is not the admin"));
        }
        let instruction = PolicyInstruction::try_from_slice(data)
            .map_err(|_| Revert::message("policy: invalid instruction"))?;
        ledger.charge_gas(STORAGE_WRITE_GAS)?;
        match instruction {
            PolicyInstruction::Allow(permission) => {
                info!(
                    "Policy {} allows 0x{} on {}",
                    ctx.address,
                    hex_selector(&permission.selector),
                    permission.target
                );
                self.permissions.insert(permission);
            },
            PolicyInstruction::Revoke(permission) => {
                self.permissions.remove(&permission);
            },
        }
        Ok(Vec::new())
    }

    fn as_policy(&self) -> Option<&dyn CallPolicy> {
        Some(self)
    }
}

fn hex_selector(selector: &[u8; 4]) -> String {
    selector.iter().map(|b| format!("{b:02x}")).collect()
}
