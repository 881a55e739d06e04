//! Order-preserving integer key encoding.
//!
//! redb compares raw `&[u8]` keys byte-wise. Native integer layouts do not
//! sort correctly that way (`-1` in two's complement has every bit set), so
//! numeric keys are written as fixed 8-byte big-endian values. Signed values
//! additionally have their sign bit flipped, which maps `i64::MIN..=i64::MAX`
//! onto `0..=u64::MAX` without changing their order.

use crate::error::EncodingError;

/// Width in bytes of every ordered integer key.
pub const ORDERED_KEY_LEN: usize = 8;

const SIGN_BIT: u64 = 1 << 63;

/// Encodes a `u64` so that byte-wise order equals numeric order.
pub fn encode_u64(value: u64) -> [u8; ORDERED_KEY_LEN] {
    value.to_be_bytes()
}

/// Encodes an `i64` so that byte-wise order equals numeric order.
///
/// `i64::MIN` encodes to all zero bytes, `0` to `0x80 00 .. 00` and
/// `i64::MAX` to all `0xff` bytes.
pub fn encode_i64(value: i64) -> [u8; ORDERED_KEY_LEN] {
    ((value as u64) ^ SIGN_BIT).to_be_bytes()
}

/// Decodes bytes produced by [`encode_u64`].
pub fn decode_u64(bytes: &[u8]) -> Result<u64, EncodingError> {
    Ok(u64::from_be_bytes(fixed_width(bytes)?))
}

/// Decodes bytes produced by [`encode_i64`].
pub fn decode_i64(bytes: &[u8]) -> Result<i64, EncodingError> {
    Ok((u64::from_be_bytes(fixed_width(bytes)?) ^ SIGN_BIT) as i64)
}

pub(crate) fn fixed_width(bytes: &[u8]) -> Result<[u8; ORDERED_KEY_LEN], EncodingError> {
    bytes
        .try_into()
        .map_err(|_| EncodingError::InvalidLength {
            expected: ORDERED_KEY_LEN,
            actual: bytes.len(),
        })
}
