//! Key types.
//!
//! Every key type resolves to the raw bytes stored in redb. Integer keys use
//! the order-preserving encoding so that a range scan over a bucket visits
//! them in numeric order.

use crate::encoding::object::{marshal_binary, marshal_json, marshal_text};
use crate::encoding::ordered::{decode_i64, decode_u64, encode_i64, encode_u64};
use crate::error::Result;
use serde::Serialize;
use std::fmt::Display;

/// Anything that can address a value inside a bucket.
pub trait KeyBytes {
    /// Resolves the key into the bytes stored in the database.
    fn key_bytes(&self) -> Result<Vec<u8>>;
}

/// A raw byte key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteKey(pub Vec<u8>);

impl KeyBytes for ByteKey {
    fn key_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.0.clone())
    }
}

/// A UTF-8 string key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringKey(pub String);

impl KeyBytes for StringKey {
    fn key_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.0.as_bytes().to_vec())
    }
}

/// An unsigned integer key that sorts numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct U64Key(pub u64);

impl U64Key {
    /// Decodes a key read back from a bucket.
    pub fn from_key_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self(decode_u64(bytes)?))
    }
}

impl KeyBytes for U64Key {
    fn key_bytes(&self) -> Result<Vec<u8>> {
        Ok(encode_u64(self.0).to_vec())
    }
}

/// A signed integer key that sorts numerically, negatives first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct I64Key(pub i64);

impl I64Key {
    /// Decodes a key read back from a bucket.
    pub fn from_key_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self(decode_i64(bytes)?))
    }
}

impl KeyBytes for I64Key {
    fn key_bytes(&self) -> Result<Vec<u8>> {
        Ok(encode_i64(self.0).to_vec())
    }
}

/// A key made of the textual (`Display`) form of an object.
#[derive(Debug, Clone)]
pub struct TextKey<T>(pub T);

impl<T: Display> KeyBytes for TextKey<T> {
    fn key_bytes(&self) -> Result<Vec<u8>> {
        Ok(marshal_text(&self.0))
    }
}

/// A key made of the bincode form of an object.
#[derive(Debug, Clone)]
pub struct BinaryKey<T>(pub T);

impl<T: Serialize> KeyBytes for BinaryKey<T> {
    fn key_bytes(&self) -> Result<Vec<u8>> {
        marshal_binary(&self.0)
    }
}

/// A key made of the JSON form of an object.
#[derive(Debug, Clone)]
pub struct JsonKey<T>(pub T);

impl<T: Serialize> KeyBytes for JsonKey<T> {
    fn key_bytes(&self) -> Result<Vec<u8>> {
        marshal_json(&self.0)
    }
}

impl KeyBytes for [u8] {
    fn key_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.to_vec())
    }
}

impl KeyBytes for Vec<u8> {
    fn key_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.clone())
    }
}

impl KeyBytes for str {
    fn key_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.as_bytes().to_vec())
    }
}

impl KeyBytes for String {
    fn key_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.as_bytes().to_vec())
    }
}
