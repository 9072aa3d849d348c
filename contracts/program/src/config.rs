//! EntryPoint configuration.

use aakit_state::constants::SPONSORED_VERIFICATION_MULTIPLIER;
use serde::{Deserialize, Serialize};

use crate::error::EntryPointError;

/// Tunables of one coordinator deployment. Loadable from TOML:
///
/// ```toml
/// min_sponsor_stake = 1000
/// min_unstake_delay = 86400
/// sponsored_verification_multiplier = 3
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryPointConfig {
    /// Smallest stake a sponsor must lock to pay for operations
    pub min_sponsor_stake: u128,
    /// Smallest unstake delay a sponsor's stake must carry
    pub min_unstake_delay: u64,
    /// Weight of `verification_gas_limit` in the prefund of sponsored operations
    pub sponsored_verification_multiplier: u64,
}

impl Default for EntryPointConfig {
    fn default() -> Self {
        Self {
            min_sponsor_stake: 1,
            min_unstake_delay: 1,
            sponsored_verification_multiplier: SPONSORED_VERIFICATION_MULTIPLIER,
        }
    }
}

impl EntryPointConfig {
    pub fn from_toml(source: &str) -> Result<Self, EntryPointError> {
        toml::from_str(source).map_err(|e| EntryPointError::InvalidConfig(e.to_string()))
    }

    pub fn with_min_sponsor_stake(mut self, amount: u128) -> Self {
        self.min_sponsor_stake = amount;
        self
    }

    pub fn with_min_unstake_delay(mut self, delay: u64) -> Self {
        self.min_unstake_delay = delay;
        self
    }

    pub fn with_sponsored_verification_multiplier(mut self, multiplier: u64) -> Self {
        self.sponsored_verification_multiplier = multiplier;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EntryPointConfig::from_toml("min_unstake_delay = 86400").unwrap();
        assert_eq!(config.min_unstake_delay, 86_400);
        assert_eq!(config.min_sponsor_stake, 1);
        assert_eq!(config.sponsored_verification_multiplier, 3);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        assert!(matches!(
            EntryPointConfig::from_toml("min_sponsor_stake = \"lots\""),
            Err(EntryPointError::InvalidConfig(_))
        ));
    }
}
