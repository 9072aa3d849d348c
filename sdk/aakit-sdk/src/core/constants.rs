use aakit_state::Address;

// Defaults for operations built without explicit gas settings
pub const DEFAULT_CALL_GAS_LIMIT: u64 = 200_000;
pub const DEFAULT_VERIFICATION_GAS_LIMIT: u64 = 300_000;
pub const DEFAULT_PRE_VERIFICATION_GAS: u64 = 21_000;
pub const DEFAULT_MAX_FEE_PER_UNIT: u128 = 1;
pub const DEFAULT_MAX_PRIORITY_FEE_PER_UNIT: u128 = 1;

/// Salt used when an account is created without one.
pub const DEFAULT_SALT: [u8; 32] = [0u8; 32];

pub fn default_entry_point() -> Address {
    Address::from_label("aakit.EntryPoint")
}
