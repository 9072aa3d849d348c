//! Revert payload encoding and decoding.

use std::fmt;

use serde::Serialize;

use crate::abi::{decode_string, encode_bytes, AbiReader};

/// Selector of `Error(string)`.
pub const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];
/// Selector of `Panic(uint256)`.
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// `Error(string)` payload carrying `message`.
pub fn encode_error_message(message: &str) -> Vec<u8> {
    let mut out = ERROR_SELECTOR.to_vec();
    out.extend_from_slice(&encode_bytes(message.as_bytes()));
    out
}

/// Human-facing view of a revert payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DecodedRevert {
    Empty,
    Message(String),
    Panic(u128),
    Custom { selector: [u8; 4], data: Vec<u8> },
    Raw(Vec<u8>),
}

impl DecodedRevert {
    pub fn message(&self) -> Option<&str> {
        match self {
            DecodedRevert::Message(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for DecodedRevert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedRevert::Empty => f.write_str("reverted without data"),
            DecodedRevert::Message(message) => f.write_str(message),
            DecodedRevert::Panic(code) => write!(f, "panic 0x{code:02x}"),
            DecodedRevert::Custom { selector, data } => write!(
                f,
                "custom error 0x{} (0x{})",
                hex::encode(selector),
                hex::encode(data)
            ),
            DecodedRevert::Raw(data) => write!(f, "0x{}", hex::encode(data)),
        }
    }
}

/// Never fails: anything that is not a well-formed `Error(string)` or
/// `Panic(uint256)` comes back as `Custom` or `Raw`.
pub fn decode_revert(payload: &[u8]) -> DecodedRevert {
    if payload.is_empty() {
        return DecodedRevert::Empty;
    }
    let Some(head) = payload.get(..4) else {
        return DecodedRevert::Raw(payload.to_vec());
    };
    let selector = [head[0], head[1], head[2], head[3]];
    let body = &payload[4..];

    match selector {
        ERROR_SELECTOR => match decode_string(body) {
            Ok(message) => DecodedRevert::Message(message),
            Err(_) => DecodedRevert::Raw(payload.to_vec()),
        },
        PANIC_SELECTOR if body.len() == 32 => match AbiReader::new(body).u128_at(0) {
            Ok(code) => DecodedRevert::Panic(code),
            Err(_) => DecodedRevert::Raw(payload.to_vec()),
        },
        _ => DecodedRevert::Custom {
            selector,
            data: body.to_vec(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::word_u64;

    #[test]
    fn test_error_string_decodes_exactly() {
        let payload = encode_error_message("count failed");
        assert_eq!(&payload[..4], &ERROR_SELECTOR);
        assert_eq!(
            decode_revert(&payload),
            DecodedRevert::Message("count failed".to_string())
        );
        assert_eq!(decode_revert(&payload).to_string(), "count failed");
    }

    #[test]
    fn test_panic_code() {
        let mut payload = PANIC_SELECTOR.to_vec();
        payload.extend_from_slice(&word_u64(0x11));
        assert_eq!(decode_revert(&payload), DecodedRevert::Panic(0x11));
    }

    #[test]
    fn test_garbage_falls_back() {
        assert_eq!(decode_revert(&[]), DecodedRevert::Empty);
        assert_eq!(decode_revert(&[1, 2]), DecodedRevert::Raw(vec![1, 2]));

        let mut truncated = encode_error_message("count failed");
        truncated.truncate(40);
        assert_eq!(decode_revert(&truncated), DecodedRevert::Raw(truncated.clone()));

        assert_eq!(
            decode_revert(&[9, 9, 9, 9, 1]),
            DecodedRevert::Custom {
                selector: [9, 9, 9, 9],
                data: vec![1]
            }
        );
    }
}
