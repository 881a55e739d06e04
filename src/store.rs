//! Bucket store on top of a redb database.
//!
//! Every operation here runs in exactly one redb transaction. Reads use a
//! read transaction; writes use a write transaction that is committed only
//! when the whole operation succeeded and aborted otherwise.

use crate::buckets::handle::{
    keys_with_prefix, nested_bucket_names, BucketMut, BucketView, ReadValuesTable,
};
use crate::buckets::{JsonBucket, Path, PathActor};
use crate::config::StoreConfig;
use crate::encoding::key::{encode_child, encode_path};
use crate::error::{Error, Result};
use redb::{
    Database, ReadOnlyTable, ReadTransaction, ReadableDatabase, ReadableTable, TableDefinition,
    TableError, WriteTransaction,
};
use tracing::{debug, warn};

/// A redb database holding a tree of buckets.
pub struct Store {
    db: Database,
    config: StoreConfig,
}

impl Store {
    /// Opens or creates the database file at `path` with the default config.
    pub fn create(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let db = Database::create(path.as_ref())?;
        debug!(file = %path.as_ref().display(), "opened bucket store");
        Ok(Self::new(db))
    }

    /// Opens an existing database file with the default config.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let db = Database::open(path.as_ref())?;
        debug!(file = %path.as_ref().display(), "opened existing bucket store");
        Ok(Self::new(db))
    }

    /// Wraps an already open database.
    pub fn new(db: Database) -> Self {
        Self::with_config(db, StoreConfig::default())
    }

    pub fn with_config(db: Database, config: StoreConfig) -> Self {
        Self { db, config }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Creates an actor for a top-level bucket.
    pub fn root(&self, bucket: impl AsRef<[u8]>) -> PathActor<'_> {
        PathActor::new(self, Path::root(bucket))
    }

    /// Creates an actor for an arbitrary bucket path.
    pub fn at(&self, path: Path) -> PathActor<'_> {
        PathActor::new(self, path)
    }

    /// Creates a JSON-object accessor for a bucket path.
    pub fn json(&self, path: Path) -> JsonBucket<'_> {
        JsonBucket::new(self.at(path))
    }

    fn values_def(&self) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
        TableDefinition::new(self.config.values_table.as_str())
    }

    fn buckets_def(&self) -> TableDefinition<'_, &'static [u8], ()> {
        TableDefinition::new(self.config.buckets_table.as_str())
    }

    /// Creates any buckets along the path that do not exist.
    pub fn ensure_path_buckets(&self, path: &Path) -> Result<()> {
        if path.is_empty() {
            return Err(Error::EmptyPath);
        }
        if path.iter().any(<[u8]>::is_empty) {
            return Err(Error::BucketNameRequired);
        }

        let txn = self.db.begin_write()?;
        let result = self.create_path_in(&txn, path);
        finish(txn, result)
    }

    /// Creates `path/bucket` if it does not exist. The full parent path must
    /// already exist.
    pub fn ensure_nested_bucket(&self, path: &Path, bucket: &[u8]) -> Result<()> {
        self.update(path, |parent| parent.ensure_nested_bucket(bucket))
    }

    /// Deletes `path/bucket` together with every bucket and value below it.
    pub fn delete_nested_bucket(&self, path: &Path, bucket: &[u8]) -> Result<()> {
        if path.is_empty() {
            return Err(Error::EmptyPath);
        }
        let target = path.nest(bucket);

        let txn = self.db.begin_write()?;
        let result = self.delete_subtree_in(&txn, &target);
        finish(txn, result)
    }

    /// Returns whether every bucket along the path exists.
    pub fn bucket_exists(&self, path: &Path) -> Result<bool> {
        if path.is_empty() {
            return Err(Error::EmptyPath);
        }
        let txn = self.db.begin_read()?;
        let Some(buckets) = open_read(&txn, self.buckets_def())? else {
            return Ok(false);
        };
        let exists = buckets.get(encode_path(path)?.as_slice())?.is_some();
        Ok(exists)
    }

    /// Names of the buckets nested directly under `path`, in byte order.
    pub fn nested_buckets(&self, path: &Path) -> Result<Vec<Vec<u8>>> {
        if path.is_empty() {
            return Err(Error::EmptyPath);
        }
        let txn = self.db.begin_read()?;
        let Some(buckets) = open_read(&txn, self.buckets_def())? else {
            return Err(Error::BucketNotFound(path.clone()));
        };
        let encoded = encode_path(path)?;
        if buckets.get(encoded.as_slice())?.is_none() {
            return Err(Error::BucketNotFound(path.clone()));
        }
        nested_bucket_names(&buckets, &encoded)
    }

    /// Runs `f` against the bucket in a single read transaction.
    ///
    /// Returns `Ok(None)` without calling `f` when the bucket does not exist.
    pub fn read<R, F>(&self, path: &Path, f: F) -> Result<Option<R>>
    where
        F: FnOnce(&BucketView<ReadValuesTable>) -> Result<R>,
    {
        let txn = self.db.begin_read()?;
        match self.read_bucket(&txn, path)? {
            Some(bucket) => f(&bucket).map(Some),
            None => Ok(None),
        }
    }

    /// Runs `f` against the bucket in a single write transaction, committed
    /// only if `f` succeeds.
    pub fn update<R, F>(&self, path: &Path, f: F) -> Result<R>
    where
        F: FnOnce(&mut BucketMut<'_>) -> Result<R>,
    {
        let txn = self.db.begin_write()?;
        let result = self
            .write_bucket(&txn, path)
            .and_then(|mut bucket| f(&mut bucket));
        finish(txn, result)
    }

    /// Sets the value for the key. The bucket must exist.
    pub fn put_bytes(&self, path: &Path, key: &[u8], value: &[u8]) -> Result<()> {
        self.update(path, |bucket| bucket.put(key, value))
    }

    /// Returns a copy of the key's value, or `None` when the bucket or the key
    /// does not exist.
    pub fn get_bytes(&self, path: &Path, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.read(path, |bucket| bucket.get(key))?.flatten())
    }

    /// Passes the key's value to `f` inside the read transaction. The slice is
    /// only valid inside `f`.
    pub fn view_value<R, F>(&self, path: &Path, key: &[u8], f: F) -> Result<Option<R>>
    where
        F: FnOnce(&[u8]) -> Result<R>,
    {
        Ok(self.read(path, |bucket| bucket.view(key, f))?.flatten())
    }

    /// Removes the key. Missing buckets and keys are not an error.
    pub fn delete_key(&self, path: &Path, key: &[u8]) -> Result<()> {
        match self.update(path, |bucket| bucket.delete(key)) {
            Ok(_) | Err(Error::BucketNotFound(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn create_path_in(&self, txn: &WriteTransaction, path: &Path) -> Result<()> {
        // Created up front so read transactions always find both tables.
        txn.open_table(self.values_def())?;
        let mut buckets = txn.open_table(self.buckets_def())?;

        let mut encoded = Vec::new();
        for name in path.iter() {
            encoded = encode_child(&encoded, name)?;
            if buckets.insert(encoded.as_slice(), ())?.is_none() {
                debug!(bucket = %String::from_utf8_lossy(name), path = %path, "created bucket");
            }
        }
        Ok(())
    }

    fn delete_subtree_in(&self, txn: &WriteTransaction, target: &Path) -> Result<()> {
        let encoded = encode_path(target)?;
        let mut buckets = txn.open_table(self.buckets_def())?;
        if buckets.get(encoded.as_slice())?.is_none() {
            return Err(Error::BucketNotFound(target.clone()));
        }

        let bucket_keys = keys_with_prefix(&buckets, &encoded)?;
        for key in &bucket_keys {
            buckets.remove(key.as_slice())?;
        }

        let mut values = txn.open_table(self.values_def())?;
        let value_keys = keys_with_prefix(&values, &encoded)?;
        for key in &value_keys {
            values.remove(key.as_slice())?;
        }

        debug!(
            path = %target,
            buckets = bucket_keys.len(),
            values = value_keys.len(),
            "deleted bucket"
        );
        Ok(())
    }

    fn read_bucket(
        &self,
        txn: &ReadTransaction,
        path: &Path,
    ) -> Result<Option<BucketView<ReadValuesTable>>> {
        if path.is_empty() {
            return Err(Error::EmptyPath);
        }
        let Some(buckets) = open_read(txn, self.buckets_def())? else {
            return Ok(None);
        };
        if buckets.get(encode_path(path)?.as_slice())?.is_none() {
            return Ok(None);
        }
        let Some(values) = open_read(txn, self.values_def())? else {
            return Ok(None);
        };
        Ok(Some(BucketView::new(values, path.clone())?))
    }

    fn write_bucket<'txn>(
        &self,
        txn: &'txn WriteTransaction,
        path: &Path,
    ) -> Result<BucketMut<'txn>> {
        if path.is_empty() {
            return Err(Error::EmptyPath);
        }
        let encoded = encode_path(path)?;
        let buckets = txn.open_table(self.buckets_def())?;
        if buckets.get(encoded.as_slice())?.is_none() {
            return Err(Error::BucketNotFound(path.clone()));
        }
        let values = txn.open_table(self.values_def())?;
        BucketMut::new(values, buckets, path.clone(), encoded)
    }
}

/// Opens a table for reading, mapping a table that was never created to `None`.
fn open_read<K, V>(
    txn: &ReadTransaction,
    definition: TableDefinition<'_, K, V>,
) -> Result<Option<ReadOnlyTable<K, V>>>
where
    K: redb::Key + 'static,
    V: redb::Value + 'static,
{
    match txn.open_table(definition) {
        Ok(table) => Ok(Some(table)),
        Err(TableError::TableDoesNotExist(_)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Commits `txn` when `result` is a success and aborts it otherwise.
///
/// A failed abort is logged; the error that caused it is the one returned.
fn finish<T>(txn: WriteTransaction, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            txn.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(abort_err) = txn.abort() {
                warn!(error = %abort_err, cause = %err, "failed to abort write transaction");
            }
            Err(err)
        }
    }
}
