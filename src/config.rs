//! Configuration for bucket stores.
//!
//! Names the two redb tables that hold the bucket tree.

use crate::error::{Error, Result};

/// Configuration for a [`crate::Store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Table holding every stored value, keyed by bucket path and key.
    pub values_table: String,

    /// Table holding one row per existing bucket.
    pub buckets_table: String,
}

impl StoreConfig {
    /// Creates a validated configuration.
    ///
    /// # Arguments
    /// * `values_table` - Name of the redb table for values
    /// * `buckets_table` - Name of the redb table for bucket rows
    pub fn new(values_table: impl Into<String>, buckets_table: impl Into<String>) -> Result<Self> {
        let values_table = values_table.into();
        let buckets_table = buckets_table.into();

        if values_table.is_empty() || buckets_table.is_empty() {
            return Err(Error::InvalidConfig(
                "table names must not be empty".to_string(),
            ));
        }

        if values_table == buckets_table {
            return Err(Error::InvalidConfig(format!(
                "values and buckets tables must differ, both are {:?}",
                values_table
            )));
        }

        Ok(Self {
            values_table,
            buckets_table,
        })
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            values_table: "bucketeer_values".to_string(),
            buckets_table: "bucketeer_buckets".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = StoreConfig::new("vals", "bkts").unwrap();
        assert_eq!(config.values_table, "vals");
        assert_eq!(config.buckets_table, "bkts");
    }

    #[test]
    fn test_empty_table_name() {
        assert!(matches!(
            StoreConfig::new("", "bkts"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(StoreConfig::new("vals", "").is_err());
    }

    #[test]
    fn test_same_table_names() {
        assert!(matches!(
            StoreConfig::new("data", "data"),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.values_table, "bucketeer_values");
        assert_eq!(config.buckets_table, "bucketeer_buckets");
    }
}
