use aakit_function_signature_policy::{FunctionSignaturePolicy, Permission, PolicyInstruction};
use aakit_state::Address;

/// Builds a function-signature policy to deploy, and the admin
/// instructions that change it later.
pub struct PolicyBuilder {
    admin: Address,
    permissions: Vec<Permission>,
}

impl PolicyBuilder {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            permissions: Vec::new(),
        }
    }

    /// Allows calls of `signature` (e.g. `"transfer(address,uint256)"`) on
    /// `target`.
    pub fn allow_function(mut self, target: Address, signature: &str) -> Self {
        self.permissions
            .push(Permission::for_function(target, signature));
        self
    }

    pub fn allow_selector(mut self, target: Address, selector: [u8; 4]) -> Self {
        self.permissions.push(Permission::new(target, selector));
        self
    }

    pub fn build(self) -> FunctionSignaturePolicy {
        FunctionSignaturePolicy::new(self.admin).with_permissions(self.permissions)
    }
}

/// Call data the admin sends to a deployed policy to allow `permission`.
pub fn allow_instruction(permission: Permission) -> Vec<u8> {
    PolicyInstruction::Allow(permission).pack()
}

pub fn revoke_instruction(permission: Permission) -> Vec<u8> {
    PolicyInstruction::Revoke(permission).pack()
}
