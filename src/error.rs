//! Crate-scoped error handling for redb-bucketeer.
//!
//! Public operations return [`Error`]. The pure codec functions in
//! [`crate::encoding`] return the narrower [`EncodingError`], which converts
//! into [`Error`] with `?`.

use crate::buckets::Path;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when bytes do not have the shape an encoding expects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// A fixed-width value or key had the wrong number of bytes.
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A variable-length integer was truncated or overflowed 64 bits.
    #[error("invalid varint: {0}")]
    InvalidVarint(String),

    /// A string value was not valid UTF-8.
    #[error("value is not valid UTF-8")]
    InvalidUtf8,

    /// A stored key does not follow the bucket layout.
    #[error("invalid key layout: {0}")]
    InvalidKeyLayout(String),
}

/// Main error type exposed to users of the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A path with no buckets was passed to an operation that resolves one.
    #[error("path must have at least one bucket")]
    EmptyPath,

    /// A bucket name was empty.
    #[error("bucket name required")]
    BucketNameRequired,

    /// A value was written under an empty key.
    #[error("key required")]
    KeyRequired,

    /// One or more buckets along the path do not exist.
    #[error("did not find one or more path buckets: {0}")]
    BucketNotFound(Path),

    /// Invalid store configuration
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// An object could not be turned into bytes.
    #[error("marshal failed: {0}")]
    Marshal(String),

    /// Stored bytes could not be turned back into an object.
    #[error("unmarshal failed: {0}")]
    Unmarshal(String),

    /// An increment would overflow the stored integer.
    #[error("integer overflow")]
    Overflow,

    /// Errors raised by redb itself.
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),
}

impl From<redb::DatabaseError> for Error {
    fn from(err: redb::DatabaseError) -> Self {
        Error::Storage(err.into())
    }
}

impl From<redb::TransactionError> for Error {
    fn from(err: redb::TransactionError) -> Self {
        Error::Storage(err.into())
    }
}

impl From<redb::TableError> for Error {
    fn from(err: redb::TableError) -> Self {
        Error::Storage(err.into())
    }
}

impl From<redb::StorageError> for Error {
    fn from(err: redb::StorageError) -> Self {
        Error::Storage(err.into())
    }
}

impl From<redb::CommitError> for Error {
    fn from(err: redb::CommitError) -> Self {
        Error::Storage(err.into())
    }
}
