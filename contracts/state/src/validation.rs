use serde::{Deserialize, Serialize};

/// Validity window reported by account and sponsor validation.
///
/// `valid_after` is inclusive, `valid_until` exclusive; `valid_until == 0`
/// leaves the window open-ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationData {
    pub valid_after: u64,
    pub valid_until: u64,
}

impl ValidationData {
    pub const UNBOUNDED: ValidationData = ValidationData {
        valid_after: 0,
        valid_until: 0,
    };

    pub fn new(valid_after: u64, valid_until: u64) -> Self {
        Self {
            valid_after,
            valid_until,
        }
    }

    pub fn effective_until(&self) -> u64 {
        if self.valid_until == 0 {
            u64::MAX
        } else {
            self.valid_until
        }
    }

    pub fn contains(&self, now: u64) -> bool {
        aakit_assertions::check_window(now, self.valid_after, self.effective_until(), ()).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_until_is_open_ended() {
        assert!(ValidationData::UNBOUNDED.contains(u64::MAX - 1));
        assert!(ValidationData::new(5, 0).contains(5));
        assert!(!ValidationData::new(5, 0).contains(4));
    }
}
