//! Minimal 32-byte-word codec.
//!
//! Encoders are infallible. Decoders are length-checked at every step and
//! never index past the input.

use crate::constants::{MAX_UINT48, UINT48_LEN};
use crate::error::CodecError;

pub const WORD: usize = 32;

pub fn word_u64(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

pub fn word_u128(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Big-endian `uint48` from the first six bytes of `bytes`.
pub fn read_uint48(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .take(UINT48_LEN)
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

pub fn write_uint48(out: &mut Vec<u8>, value: u64) -> Result<(), CodecError> {
    if value > MAX_UINT48 {
        return Err(CodecError::ValueOverflow);
    }
    out.extend_from_slice(&value.to_be_bytes()[8 - UINT48_LEN..]);
    Ok(())
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

/// Appends `len ‖ bytes ‖ zero padding` to `out`.
pub fn append_bytes(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(&word_u64(data.len() as u64));
    out.extend_from_slice(data);
    out.resize(out.len() + padded_len(data.len()) - data.len(), 0);
}

/// Standard encoding of a single dynamic `string`/`bytes` value.
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(WORD * 2 + padded_len(data.len()));
    out.extend_from_slice(&word_u64(WORD as u64));
    append_bytes(&mut out, data);
    out
}

/// Standard encoding of the tuple `(bytes, bytes)`.
pub fn encode_bytes_pair(first: &[u8], second: &[u8]) -> Vec<u8> {
    let first_offset = 2 * WORD;
    let second_offset = first_offset + WORD + padded_len(first.len());
    let mut out = Vec::with_capacity(second_offset + WORD + padded_len(second.len()));
    out.extend_from_slice(&word_u64(first_offset as u64));
    out.extend_from_slice(&word_u64(second_offset as u64));
    append_bytes(&mut out, first);
    append_bytes(&mut out, second);
    out
}

/// Bounds-checked reader over word-encoded data.
pub struct AbiReader<'a> {
    data: &'a [u8],
}

impl<'a> AbiReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn slice(&self, start: usize, len: usize) -> Result<&'a [u8], CodecError> {
        let end = start.checked_add(len).ok_or(CodecError::ValueOverflow)?;
        self.data.get(start..end).ok_or(CodecError::TooShort {
            needed: end,
            available: self.data.len(),
        })
    }

    /// Reads the word at byte `offset` as a `usize`, rejecting values that do
    /// not fit.
    pub fn usize_at(&self, offset: usize) -> Result<usize, CodecError> {
        let word = self.slice(offset, WORD)?;
        if word[..24].iter().any(|b| *b != 0) {
            return Err(CodecError::ValueOverflow);
        }
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&word[24..]);
        usize::try_from(u64::from_be_bytes(raw)).map_err(|_| CodecError::ValueOverflow)
    }

    pub fn u128_at(&self, offset: usize) -> Result<u128, CodecError> {
        let word = self.slice(offset, WORD)?;
        if word[..16].iter().any(|b| *b != 0) {
            return Err(CodecError::ValueOverflow);
        }
        let mut raw = [0u8; 16];
        raw.copy_from_slice(&word[16..]);
        Ok(u128::from_be_bytes(raw))
    }

    /// Follows the head word at `head_index` to a dynamic `bytes` value.
    pub fn bytes(&self, head_index: usize) -> Result<&'a [u8], CodecError> {
        let offset = self.usize_at(head_index * WORD)?;
        if offset % WORD != 0 {
            return Err(CodecError::InvalidOffset(offset));
        }
        let len = self.usize_at(offset)?;
        self.slice(offset + WORD, len)
    }
}

pub fn decode_bytes_pair(data: &[u8]) -> Result<(Vec<u8>, Vec<u8>), CodecError> {
    let reader = AbiReader::new(data);
    Ok((reader.bytes(0)?.to_vec(), reader.bytes(1)?.to_vec()))
}

pub fn decode_string(data: &[u8]) -> Result<String, CodecError> {
    let raw = AbiReader::new(data).bytes(0)?;
    String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidUtf8)
}
