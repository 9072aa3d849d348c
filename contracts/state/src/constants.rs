//! Protocol constants.

/// Length of an account address.
pub const ADDRESS_LEN: usize = 20;

/// Length of a recoverable secp256k1 signature (`r ‖ s ‖ v`).
pub const SIGNATURE_LEN: usize = 65;

/// Largest value representable in the 48-bit timestamp fields.
pub const MAX_UINT48: u64 = (1 << 48) - 1;

/// Width of the timestamp fields in the plugin signature header.
pub const UINT48_LEN: usize = 6;

/// Domain used by accounts when the owner approves a plugin.
pub const ACCOUNT_DOMAIN_NAME: &str = "PluginAccount";
pub const ACCOUNT_DOMAIN_VERSION: &str = "1.0.0";

/// Domain used by the session-key plugin for session signatures.
pub const SESSION_DOMAIN_NAME: &str = "SessionKeyPlugin";
pub const SESSION_DOMAIN_VERSION: &str = "1.0.0";

pub const EIP712_DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";
pub const PLUGIN_GRANT_TYPE: &str = "ValidateUserOpPlugin(address sender,uint48 validUntil,uint48 validAfter,address plugin,bytes data)";
pub const SESSION_TYPE: &str = "Session(bytes32 userOpHash,uint256 nonce)";

// Gas schedule of the simulated ledger.
pub const CALL_BASE_GAS: u64 = 700;
pub const CALL_VALUE_GAS: u64 = 9_000;
pub const CALLDATA_BYTE_GAS: u64 = 16;
pub const ECRECOVER_GAS: u64 = 3_000;
pub const STORAGE_READ_GAS: u64 = 800;
pub const STORAGE_WRITE_GAS: u64 = 5_000;
pub const DEPLOY_GAS: u64 = 32_000;

/// Multiplier applied to `verification_gas_limit` when an operation is sponsored.
pub const SPONSORED_VERIFICATION_MULTIPLIER: u64 = 3;
