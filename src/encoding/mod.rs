//! Byte encodings for keys, values and the on-disk bucket layout.
//!
//! `ordered` holds the order-preserving integer key encoding, `value` the
//! value codecs used by the typed accessors, `object` the text, binary and
//! JSON marshaling adapters, and `key` the storage layout
//! that flattens bucket paths into redb keys.

pub mod key;
pub mod object;
pub mod ordered;
pub mod value;

pub use ordered::{decode_i64, decode_u64, encode_i64, encode_u64, ORDERED_KEY_LEN};
