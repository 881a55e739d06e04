//! Nested bucket access.
//!
//! Buckets are named, nestable namespaces addressed by a [`Path`]. This
//! module provides the path type, the key types, transaction-scoped bucket
//! handles and the actors that wrap one transaction per call.

pub mod actor;
pub mod handle;
pub mod key;
pub mod path;

// Re-export main types for public API
pub use actor::{JsonBucket, KeyActor, PathActor};
pub use handle::{BucketMut, BucketView};
pub use key::{BinaryKey, ByteKey, I64Key, JsonKey, KeyBytes, StringKey, TextKey, U64Key};
pub use path::Path;
