//! Check helpers shared by the aakit contracts.
//!
//! Every helper takes the error to return on failure, so callers keep their
//! own error types and can use `?` directly.

macro_rules! check {
  ($func_name:ident, $($param:ident: $type:ty),* $(,)? | $check:expr) => {
      #[inline(always)]
      pub fn $func_name<E>($($param: $type,)* error: E) -> Result<(), E> {
          if $check {
              Ok(())
          } else {
              Err(error)
          }
      }
  };
}

check!(check_condition, condition: bool |
  condition
);

check!(check_min_len, data: &[u8], len: usize |
  data.len() >= len
);

check!(check_exact_len, data: &[u8], len: usize |
  data.len() == len
);

check!(check_nonzero, value: u128 |
  value != 0
);

check!(check_covers, available: u128, required: u128 |
  available >= required
);

// `valid_after` is inclusive, `valid_until` exclusive.
check!(check_window, now: u64, valid_after: u64, valid_until: u64 |
  valid_after <= now && now < valid_until
);

/// Unwraps `value` or returns `error`.
#[inline(always)]
pub fn check_some<T, E>(value: Option<T>, error: E) -> Result<T, E> {
    match value {
        Some(inner) => Ok(inner),
        None => Err(error),
    }
}
