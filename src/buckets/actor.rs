//! Path and key actors.
//!
//! A [`PathActor`] pairs a store with a bucket path; a [`KeyActor`] further
//! pins a key inside that bucket. Each call on an actor is one transaction.

use crate::buckets::handle::{BucketMut, BucketView, ReadValuesTable};
use crate::buckets::key::KeyBytes;
use crate::buckets::Path;
use crate::encoding::object::{
    marshal_binary, marshal_json, marshal_text, unmarshal_binary, unmarshal_json, unmarshal_text,
};
use crate::encoding::ordered::{encode_i64, encode_u64};
use crate::encoding::value::{
    decode_i64_value, decode_string, decode_u64_value, decode_uvarint, decode_varint,
    encode_i64_value, encode_u64_value, encode_uvarint, encode_varint,
};
use crate::error::Result;
use crate::store::Store;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

/// A store plus the path of one bucket.
#[derive(Clone)]
pub struct PathActor<'s> {
    store: &'s Store,
    path: Path,
}

impl<'s> PathActor<'s> {
    pub fn new(store: &'s Store, path: Path) -> Self {
        Self { store, path }
    }

    pub fn store(&self) -> &'s Store {
        self.store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates any buckets along this path that do not exist.
    pub fn ensure_path_buckets(&self) -> Result<()> {
        self.store.ensure_path_buckets(&self.path)
    }

    /// Creates a nested bucket if it does not exist. This bucket must exist.
    pub fn ensure_nested_bucket(&self, bucket: impl AsRef<[u8]>) -> Result<()> {
        self.store.ensure_nested_bucket(&self.path, bucket.as_ref())
    }

    /// Creates an actor for a nested bucket. Nothing is created on disk.
    pub fn in_nested_bucket(&self, bucket: impl AsRef<[u8]>) -> PathActor<'s> {
        PathActor::new(self.store, self.path.nest(bucket))
    }

    /// Deletes a nested bucket and everything below it.
    pub fn delete_nested_bucket(&self, bucket: impl AsRef<[u8]>) -> Result<()> {
        self.store.delete_nested_bucket(&self.path, bucket.as_ref())
    }

    pub fn exists(&self) -> Result<bool> {
        self.store.bucket_exists(&self.path)
    }

    pub fn nested_buckets(&self) -> Result<Vec<Vec<u8>>> {
        self.store.nested_buckets(&self.path)
    }

    /// Every `(key, value)` pair of the bucket in ascending key order. Empty
    /// when the bucket does not exist.
    pub fn entries(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(self
            .store
            .read(&self.path, |bucket| bucket.entries())?
            .unwrap_or_default())
    }

    /// See [`Store::read`].
    pub fn read<R, F>(&self, f: F) -> Result<Option<R>>
    where
        F: FnOnce(&BucketView<ReadValuesTable>) -> Result<R>,
    {
        self.store.read(&self.path, f)
    }

    /// See [`Store::update`].
    pub fn update<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut BucketMut<'_>) -> Result<R>,
    {
        self.store.update(&self.path, f)
    }

    pub fn for_byte_key(&self, key: impl Into<Vec<u8>>) -> KeyActor<'s> {
        KeyActor::new(self.clone(), key.into())
    }

    pub fn for_string_key(&self, key: impl AsRef<str>) -> KeyActor<'s> {
        KeyActor::new(self.clone(), key.as_ref().as_bytes().to_vec())
    }

    /// Creates a key actor for an order-preserving `u64` key.
    pub fn for_u64_key(&self, key: u64) -> KeyActor<'s> {
        KeyActor::new(self.clone(), encode_u64(key).to_vec())
    }

    /// Creates a key actor for an order-preserving `i64` key.
    pub fn for_i64_key(&self, key: i64) -> KeyActor<'s> {
        KeyActor::new(self.clone(), encode_i64(key).to_vec())
    }

    /// Creates a key actor for the textual form of `key`.
    pub fn for_text_key<T: Display + ?Sized>(&self, key: &T) -> KeyActor<'s> {
        KeyActor::new(self.clone(), marshal_text(key))
    }

    /// Creates a key actor for the binary form of `key`.
    pub fn for_binary_key<T: Serialize + ?Sized>(&self, key: &T) -> Result<KeyActor<'s>> {
        Ok(KeyActor::new(self.clone(), marshal_binary(key)?))
    }

    /// Creates a key actor for the JSON form of `key`.
    pub fn for_json_key<T: Serialize + ?Sized>(&self, key: &T) -> Result<KeyActor<'s>> {
        Ok(KeyActor::new(self.clone(), marshal_json(key)?))
    }

    pub fn for_key<K: KeyBytes + ?Sized>(&self, key: &K) -> Result<KeyActor<'s>> {
        Ok(KeyActor::new(self.clone(), key.key_bytes()?))
    }
}

/// A bucket path plus a resolved key, with typed accessors for its value.
///
/// Getters return `Ok(None)` when the bucket or the key does not exist.
#[derive(Clone)]
pub struct KeyActor<'s> {
    actor: PathActor<'s>,
    key: Vec<u8>,
}

impl<'s> KeyActor<'s> {
    pub fn new(actor: PathActor<'s>, key: Vec<u8>) -> Self {
        Self { actor, key }
    }

    pub fn path(&self) -> &Path {
        &self.actor.path
    }

    /// The raw key bytes stored in the database.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    fn put(&self, value: &[u8]) -> Result<()> {
        self.actor.store.put_bytes(&self.actor.path, &self.key, value)
    }

    /// Passes the value to `f` inside the read transaction. The slice is only
    /// valid inside `f`.
    pub fn view_value<R, F>(&self, f: F) -> Result<Option<R>>
    where
        F: FnOnce(&[u8]) -> Result<R>,
    {
        self.actor.store.view_value(&self.actor.path, &self.key, f)
    }

    pub fn put_bytes(&self, value: &[u8]) -> Result<()> {
        self.put(value)
    }

    pub fn put_string(&self, value: &str) -> Result<()> {
        self.put(value.as_bytes())
    }

    /// Stores an 8-byte big-endian value.
    pub fn put_u64(&self, value: u64) -> Result<()> {
        self.put(&encode_u64_value(value))
    }

    /// Stores an 8-byte big-endian value.
    pub fn put_i64(&self, value: i64) -> Result<()> {
        self.put(&encode_i64_value(value))
    }

    /// Stores a zig-zag varint. Must be read back with [`Self::get_varint`].
    pub fn put_varint(&self, value: i64) -> Result<()> {
        self.put(&encode_varint(value))
    }

    /// Stores an unsigned varint. Must be read back with [`Self::get_uvarint`].
    pub fn put_uvarint(&self, value: u64) -> Result<()> {
        self.put(&encode_uvarint(value))
    }

    /// Marshals the object into its textual form and stores it.
    pub fn put_text<T: Display + ?Sized>(&self, value: &T) -> Result<()> {
        self.put(&marshal_text(value))
    }

    /// Marshals the object into its binary form and stores it.
    pub fn put_binary<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        self.put(&marshal_binary(value)?)
    }

    /// Marshals the object into JSON and stores it.
    pub fn put_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        self.put(&marshal_json(value)?)
    }

    pub fn get_bytes(&self) -> Result<Option<Vec<u8>>> {
        self.view_value(|value| Ok(value.to_vec()))
    }

    pub fn get_string(&self) -> Result<Option<String>> {
        self.view_value(|value| Ok(decode_string(value)?))
    }

    /// Reads an 8-byte big-endian value. Any other length is an error.
    pub fn get_u64(&self) -> Result<Option<u64>> {
        self.view_value(|value| Ok(decode_u64_value(value)?))
    }

    /// Reads an 8-byte big-endian value. Any other length is an error.
    pub fn get_i64(&self) -> Result<Option<i64>> {
        self.view_value(|value| Ok(decode_i64_value(value)?))
    }

    pub fn get_varint(&self) -> Result<Option<i64>> {
        self.view_value(|value| Ok(decode_varint(value)?))
    }

    pub fn get_uvarint(&self) -> Result<Option<u64>> {
        self.view_value(|value| Ok(decode_uvarint(value)?))
    }

    pub fn get_text<T>(&self) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.view_value(unmarshal_text::<T>)
    }

    pub fn get_binary<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.view_value(unmarshal_binary::<T>)
    }

    pub fn get_json<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.view_value(unmarshal_json::<T>)
    }

    /// Atomically adds `delta` and returns the new value.
    pub fn increment_u64(&self, delta: u64) -> Result<u64> {
        let key = self.key.as_slice();
        self.actor.update(|bucket| bucket.increment_u64(key, delta))
    }

    /// Atomically adds `delta` and returns the new value.
    pub fn increment_i64(&self, delta: i64) -> Result<i64> {
        let key = self.key.as_slice();
        self.actor.update(|bucket| bucket.increment_i64(key, delta))
    }

    pub fn exists(&self) -> Result<bool> {
        Ok(self.view_value(|_| Ok(()))?.is_some())
    }

    /// Removes the key. Missing buckets and keys are not an error.
    pub fn delete(&self) -> Result<()> {
        self.actor.store.delete_key(&self.actor.path, &self.key)
    }
}

/// A bucket path specialised for storing JSON objects.
#[derive(Clone)]
pub struct JsonBucket<'s> {
    actor: PathActor<'s>,
}

impl<'s> JsonBucket<'s> {
    pub fn new(actor: PathActor<'s>) -> Self {
        Self { actor }
    }

    pub fn path(&self) -> &Path {
        self.actor.path()
    }

    pub fn ensure_path_buckets(&self) -> Result<()> {
        self.actor.ensure_path_buckets()
    }

    pub fn ensure_nested_bucket(&self, bucket: impl AsRef<[u8]>) -> Result<()> {
        self.actor.ensure_nested_bucket(bucket)
    }

    pub fn put<T: Serialize + ?Sized>(&self, key: &[u8], obj: &T) -> Result<()> {
        self.actor.for_byte_key(key).put_json(obj)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>> {
        self.actor.for_byte_key(key).get_json()
    }

    pub fn put_nested<T: Serialize + ?Sized>(
        &self,
        bucket: impl AsRef<[u8]>,
        key: &[u8],
        obj: &T,
    ) -> Result<()> {
        self.actor
            .in_nested_bucket(bucket)
            .for_byte_key(key)
            .put_json(obj)
    }

    pub fn get_nested<T: DeserializeOwned>(
        &self,
        bucket: impl AsRef<[u8]>,
        key: &[u8],
    ) -> Result<Option<T>> {
        self.actor
            .in_nested_bucket(bucket)
            .for_byte_key(key)
            .get_json()
    }
}
