//! Value encodings used by the typed accessors.
//!
//! Fixed-width integers are stored big-endian. Unlike keys, signed values
//! keep their two's-complement bit pattern; only keys need to sort.
//! Variable-length integers use LEB128, with zig-zag mapping for signed
//! values, and are at most [`MAX_VARINT_LEN`] bytes.

use crate::encoding::ordered::fixed_width;
use crate::error::EncodingError;

/// Maximum encoded length of a 64-bit varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Encodes a `u64` value as 8 big-endian bytes.
pub fn encode_u64_value(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decodes a value written by [`encode_u64_value`]. The value must be 8 bytes.
pub fn decode_u64_value(bytes: &[u8]) -> Result<u64, EncodingError> {
    Ok(u64::from_be_bytes(fixed_width(bytes)?))
}

/// Encodes an `i64` value as its two's-complement bits, big-endian.
pub fn encode_i64_value(value: i64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decodes a value written by [`encode_i64_value`]. The value must be 8 bytes.
pub fn decode_i64_value(bytes: &[u8]) -> Result<i64, EncodingError> {
    Ok(i64::from_be_bytes(fixed_width(bytes)?))
}

/// Encode a u64 as an unsigned variable-length integer.
pub fn encode_uvarint(mut value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAX_VARINT_LEN);
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
    buf
}

/// Decode an unsigned variable-length integer from the start of `data`.
///
/// Bytes after the terminating byte are ignored.
pub fn decode_uvarint(data: &[u8]) -> Result<u64, EncodingError> {
    let mut value: u64 = 0;
    let mut shift = 0;
    for (i, &byte) in data.iter().enumerate() {
        if i == MAX_VARINT_LEN {
            break;
        }
        if byte & 0x80 == 0 {
            // The tenth byte may only carry the top bit of the value.
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(EncodingError::InvalidVarint(
                    "value overflows 64 bits".to_string(),
                ));
            }
            return Ok(value | ((byte as u64) << shift));
        }
        value |= ((byte & 0x7F) as u64) << shift;
        shift += 7;
    }

    if data.len() >= MAX_VARINT_LEN {
        Err(EncodingError::InvalidVarint(
            "value overflows 64 bits".to_string(),
        ))
    } else {
        Err(EncodingError::InvalidVarint("truncated input".to_string()))
    }
}

/// Encode an i64 as a zig-zag variable-length integer.
pub fn encode_varint(value: i64) -> Vec<u8> {
    let mut zigzag = (value as u64) << 1;
    if value < 0 {
        zigzag = !zigzag;
    }
    encode_uvarint(zigzag)
}

/// Decode a zig-zag variable-length integer from the start of `data`.
pub fn decode_varint(data: &[u8]) -> Result<i64, EncodingError> {
    let zigzag = decode_uvarint(data)?;
    let mut value = (zigzag >> 1) as i64;
    if zigzag & 1 != 0 {
        value = !value;
    }
    Ok(value)
}

/// Interprets a stored value as UTF-8.
pub fn decode_string(bytes: &[u8]) -> Result<String, EncodingError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| EncodingError::InvalidUtf8)
}
