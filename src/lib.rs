//! Typed accessors for nested buckets stored in a redb database.
//!
//! ```no_run
//! use redb_bucketeer::Store;
//!
//! # fn main() -> redb_bucketeer::Result<()> {
//! let store = Store::create("app.redb")?;
//! let users = store.root("users");
//! users.ensure_path_buckets()?;
//!
//! users.for_string_key("alice").put_json(&vec![1, 2, 3])?;
//! let scores: Option<Vec<u32>> = users.for_string_key("alice").get_json()?;
//! assert_eq!(scores, Some(vec![1, 2, 3]));
//! # Ok(())
//! # }
//! ```

pub mod buckets;
pub mod config;
pub mod encoding;
pub mod error;
pub mod store;

// Re-export common types for convenience
pub use buckets::{JsonBucket, KeyActor, KeyBytes, Path, PathActor};
pub use config::StoreConfig;
pub use error::{EncodingError, Error, Result};
pub use store::Store;
