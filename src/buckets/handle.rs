//! Transaction-scoped bucket handles.
//!
//! A handle is a resolved bucket inside one open redb transaction. Every
//! read goes through [`BucketView`], which works over any readable values
//! table; [`BucketMut`] adds writes and nested bucket creation inside a write
//! transaction.

use crate::buckets::Path;
use crate::encoding::key::{
    decode_entry_key, encode_child, encode_entry_key, entry_prefix, split_segment,
};
use crate::encoding::object::{
    marshal_binary, marshal_json, marshal_text, unmarshal_binary, unmarshal_json, unmarshal_text,
};
use crate::encoding::value::{
    decode_i64_value, decode_string, decode_u64_value, decode_uvarint, decode_varint,
    encode_i64_value, encode_u64_value, encode_uvarint, encode_varint,
};
use crate::error::{Error, Result};
use redb::{ReadableTable, Table, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::ops::Deref;
use std::str::FromStr;
use tracing::{debug, trace};

/// Table of stored values, keyed by entry key.
pub type ValuesTable<'txn> = Table<'txn, &'static [u8], &'static [u8]>;

/// Read-only view of the values table.
pub type ReadValuesTable = redb::ReadOnlyTable<&'static [u8], &'static [u8]>;

/// Table with one row per existing bucket, keyed by encoded path.
pub type BucketsTable<'txn> = Table<'txn, &'static [u8], ()>;

/// A bucket resolved inside an open transaction.
pub struct BucketView<T> {
    table: T,
    path: Path,
    prefix: Vec<u8>,
}

impl<T> BucketView<T>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    pub(crate) fn new(table: T, path: Path) -> Result<Self> {
        let prefix = entry_prefix(&path)?;
        Ok(Self {
            table,
            path,
            prefix,
        })
    }

    /// The path this bucket was resolved from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Passes the key's value to `f`. The slice is only valid inside `f`.
    pub fn view<R, F>(&self, key: &[u8], f: F) -> Result<Option<R>>
    where
        F: FnOnce(&[u8]) -> Result<R>,
    {
        let raw = encode_entry_key(&self.prefix, key);
        match self.table.get(raw.as_slice())? {
            Some(guard) => f(guard.value()).map(Some),
            None => Ok(None),
        }
    }

    /// Returns an owned copy of the key's value.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.view(key, |value| Ok(value.to_vec()))
    }

    pub fn contains_key(&self, key: &[u8]) -> Result<bool> {
        Ok(self.view(key, |_| Ok(()))?.is_some())
    }

    pub fn get_string(&self, key: &[u8]) -> Result<Option<String>> {
        self.view(key, |value| Ok(decode_string(value)?))
    }

    /// Reads an 8-byte big-endian `u64` value.
    pub fn get_u64(&self, key: &[u8]) -> Result<Option<u64>> {
        self.view(key, |value| Ok(decode_u64_value(value)?))
    }

    /// Reads an 8-byte big-endian `i64` value.
    pub fn get_i64(&self, key: &[u8]) -> Result<Option<i64>> {
        self.view(key, |value| Ok(decode_i64_value(value)?))
    }

    pub fn get_varint(&self, key: &[u8]) -> Result<Option<i64>> {
        self.view(key, |value| Ok(decode_varint(value)?))
    }

    pub fn get_uvarint(&self, key: &[u8]) -> Result<Option<u64>> {
        self.view(key, |value| Ok(decode_uvarint(value)?))
    }

    /// Parses the key's value from its textual form.
    pub fn get_text<V>(&self, key: &[u8]) -> Result<Option<V>>
    where
        V: FromStr,
        V::Err: Display,
    {
        self.view(key, unmarshal_text::<V>)
    }

    pub fn get_binary<V: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<V>> {
        self.view(key, unmarshal_binary::<V>)
    }

    pub fn get_json<V: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<V>> {
        self.view(key, unmarshal_json::<V>)
    }

    /// Returns every `(key, value)` pair of this bucket in ascending key
    /// order. Nested buckets are not included.
    pub fn entries(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        self.scan(&[], None)
    }

    /// Returns the pairs whose key lies in `start..end`, in ascending order.
    pub fn entries_between(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        self.scan(start, Some(end))
    }

    pub fn keys(&self) -> Result<Vec<Vec<u8>>> {
        Ok(self.entries()?.into_iter().map(|(key, _)| key).collect())
    }

    /// Number of values stored directly in this bucket.
    pub fn len(&self) -> Result<usize> {
        let mut count = 0;
        for entry in self.table.range(self.prefix.as_slice()..)? {
            let (key, _) = entry?;
            if !key.value().starts_with(&self.prefix) {
                break;
            }
            count += 1;
        }
        Ok(count)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn scan(&self, start: &[u8], end: Option<&[u8]>) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let lower = encode_entry_key(&self.prefix, start);
        let upper = end.map(|end| encode_entry_key(&self.prefix, end));

        let mut entries = Vec::new();
        for entry in self.table.range(lower.as_slice()..)? {
            let (key, value) = entry?;
            let raw = key.value();
            if !raw.starts_with(&self.prefix) {
                break;
            }
            if let Some(upper) = &upper {
                if raw >= upper.as_slice() {
                    break;
                }
            }
            entries.push((
                decode_entry_key(&self.prefix, raw)?.to_vec(),
                value.value().to_vec(),
            ));
        }
        Ok(entries)
    }
}

/// A bucket resolved inside a write transaction.
///
/// Dereferences to a [`BucketView`] for reads, so values written earlier in
/// the same transaction are visible.
pub struct BucketMut<'txn> {
    view: BucketView<ValuesTable<'txn>>,
    buckets: BucketsTable<'txn>,
    encoded_path: Vec<u8>,
}

impl<'txn> BucketMut<'txn> {
    pub(crate) fn new(
        values: ValuesTable<'txn>,
        buckets: BucketsTable<'txn>,
        path: Path,
        encoded_path: Vec<u8>,
    ) -> Result<Self> {
        Ok(Self {
            view: BucketView::new(values, path)?,
            buckets,
            encoded_path,
        })
    }

    /// Sets the value for the key.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(Error::KeyRequired);
        }
        let raw = encode_entry_key(&self.view.prefix, key);
        self.view.table.insert(raw.as_slice(), value)?;
        trace!(path = %self.view.path, key_len = key.len(), value_len = value.len(), "put value");
        Ok(())
    }

    /// Removes the key. Returns whether a value was present.
    pub fn delete(&mut self, key: &[u8]) -> Result<bool> {
        let raw = encode_entry_key(&self.view.prefix, key);
        let removed = self.view.table.remove(raw.as_slice())?.is_some();
        trace!(path = %self.view.path, removed, "delete key");
        Ok(removed)
    }

    pub fn put_string(&mut self, key: &[u8], value: &str) -> Result<()> {
        self.put(key, value.as_bytes())
    }

    pub fn put_u64(&mut self, key: &[u8], value: u64) -> Result<()> {
        self.put(key, &encode_u64_value(value))
    }

    pub fn put_i64(&mut self, key: &[u8], value: i64) -> Result<()> {
        self.put(key, &encode_i64_value(value))
    }

    /// Stores a zig-zag varint. Read it back with `get_varint`.
    pub fn put_varint(&mut self, key: &[u8], value: i64) -> Result<()> {
        self.put(key, &encode_varint(value))
    }

    /// Stores an unsigned varint. Read it back with `get_uvarint`.
    pub fn put_uvarint(&mut self, key: &[u8], value: u64) -> Result<()> {
        self.put(key, &encode_uvarint(value))
    }

    pub fn put_text<V: Display + ?Sized>(&mut self, key: &[u8], value: &V) -> Result<()> {
        self.put(key, &marshal_text(value))
    }

    pub fn put_binary<V: Serialize + ?Sized>(&mut self, key: &[u8], value: &V) -> Result<()> {
        let bytes = marshal_binary(value)?;
        self.put(key, &bytes)
    }

    pub fn put_json<V: Serialize + ?Sized>(&mut self, key: &[u8], value: &V) -> Result<()> {
        let bytes = marshal_json(value)?;
        self.put(key, &bytes)
    }

    /// Adds `delta` to the key's `u64` value and returns the new value. A
    /// missing value counts as zero.
    pub fn increment_u64(&mut self, key: &[u8], delta: u64) -> Result<u64> {
        let current = self.view.get_u64(key)?.unwrap_or(0);
        let updated = current.checked_add(delta).ok_or(Error::Overflow)?;
        self.put_u64(key, updated)?;
        Ok(updated)
    }

    /// Adds `delta` to the key's `i64` value and returns the new value. A
    /// missing value counts as zero.
    pub fn increment_i64(&mut self, key: &[u8], delta: i64) -> Result<i64> {
        let current = self.view.get_i64(key)?.unwrap_or(0);
        let updated = current.checked_add(delta).ok_or(Error::Overflow)?;
        self.put_i64(key, updated)?;
        Ok(updated)
    }

    /// Creates a bucket nested in this one if it does not exist.
    pub fn ensure_nested_bucket(&mut self, name: &[u8]) -> Result<()> {
        if name.is_empty() {
            return Err(Error::BucketNameRequired);
        }
        let child = encode_child(&self.encoded_path, name)?;
        if self.buckets.insert(child.as_slice(), ())?.is_none() {
            debug!(path = %self.view.path, bucket = %String::from_utf8_lossy(name), "created nested bucket");
        }
        Ok(())
    }

    /// Names of the buckets nested directly in this one, in byte order.
    pub fn nested_buckets(&self) -> Result<Vec<Vec<u8>>> {
        nested_bucket_names(&self.buckets, &self.encoded_path)
    }
}

impl<'txn> Deref for BucketMut<'txn> {
    type Target = BucketView<ValuesTable<'txn>>;

    fn deref(&self) -> &Self::Target {
        &self.view
    }
}

/// Lists the direct children of the bucket stored under `encoded_path`.
pub(crate) fn nested_bucket_names<T>(buckets: &T, encoded_path: &[u8]) -> Result<Vec<Vec<u8>>>
where
    T: ReadableTable<&'static [u8], ()>,
{
    let mut names = Vec::new();
    for entry in buckets.range(encoded_path..)? {
        let (key, _) = entry?;
        let raw = key.value();
        let Some(rest) = raw.strip_prefix(encoded_path) else {
            break;
        };
        if rest.is_empty() {
            continue;
        }
        let (name, tail) = split_segment(rest)?;
        if tail.is_empty() {
            names.push(name.to_vec());
        }
    }
    Ok(names)
}

/// Collects every key of `table` starting with `prefix`.
pub(crate) fn keys_with_prefix<T, V>(table: &T, prefix: &[u8]) -> Result<Vec<Vec<u8>>>
where
    T: ReadableTable<&'static [u8], V>,
    V: Value + 'static,
{
    let mut keys = Vec::new();
    for entry in table.range(prefix..)? {
        let (key, _) = entry?;
        let raw = key.value();
        if !raw.starts_with(prefix) {
            break;
        }
        keys.push(raw.to_vec());
    }
    Ok(keys)
}
