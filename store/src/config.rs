//! Application configuration loaded from environment variables
//!
//! Every setting has a default, so an empty environment yields a usable configuration. Values that
//! are present but invalid are reported instead of being silently replaced.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

pub const PRODUCTS_FILE_VAR: &str = "STORE_PRODUCTS_FILE";
pub const SUPPLIERS_FILE_VAR: &str = "STORE_SUPPLIERS_FILE";
pub const BUCKETS_VAR: &str = "STORE_BUCKETS";
pub const ORDERS_VAR: &str = "STORE_ORDERS";
pub const SEED_VAR: &str = "STORE_SEED";
pub const REPORT_DIR_VAR: &str = "STORE_REPORT_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Product data file
    pub products_file: PathBuf,
    /// Supplier data file
    pub suppliers_file: PathBuf,
    /// Bucket count for the per-product indexes. When unset, it is derived from the catalog size.
    pub buckets: Option<usize>,
    /// Number of orders to simulate at startup
    pub orders: usize,
    /// Seed for the order and supplier simulations
    pub seed: u64,
    /// Directory that reports are written to
    pub report_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            products_file: PathBuf::from("products.txt"),
            suppliers_file: PathBuf::from("suppliers.txt"),
            buckets: None,
            orders: 25_000,
            seed: 42,
            report_dir: PathBuf::from("."),
        }
    }
}

impl StoreConfig {
    /// Loads the configuration from the process environment, after adding the variables of a
    /// `.env` file in the current directory or one of its parents, if there is one
    ///
    /// # Environment Variables
    ///
    /// - `STORE_PRODUCTS_FILE`: product file (default: `products.txt`)
    /// - `STORE_SUPPLIERS_FILE`: supplier file (default: `suppliers.txt`)
    /// - `STORE_BUCKETS`: bucket count for the indexes, at least 1 (default: derived)
    /// - `STORE_ORDERS`: number of simulated orders (default: 25000)
    /// - `STORE_SEED`: simulation seed (default: 42)
    /// - `STORE_REPORT_DIR`: report directory (default: `.`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the variable whose value is invalid.
    pub fn from_env() -> Result<Self> {
        // Missing file is fine; variables already set are not overridden
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration from the `.env`-style file at `path`, without modifying the process
    /// environment. Variables set in the process environment take precedence over the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EnvFile`] if the file cannot be read or parsed, and [`Error::Config`] as
    /// [`StoreConfig::from_env`] does.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        let file = dotenvy::from_path_iter(path)?
            .collect::<std::result::Result<HashMap<String, String>, _>>()?;

        Self::from_lookup(|key| env::var(key).ok().or_else(|| file.get(key).cloned()))
    }

    /// Loads the configuration from any key-value source. See [`StoreConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
        where F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let buckets = get_optional_parsed(&lookup, BUCKETS_VAR)?;
        if buckets == Some(0) {
            return Err(Error::Config {key: BUCKETS_VAR, reason: "must be at least 1".to_string()});
        }

        Ok(Self {
            products_file: lookup(PRODUCTS_FILE_VAR).map(PathBuf::from).unwrap_or(defaults.products_file),
            suppliers_file: lookup(SUPPLIERS_FILE_VAR).map(PathBuf::from).unwrap_or(defaults.suppliers_file),
            buckets,
            orders: get_optional_parsed(&lookup, ORDERS_VAR)?.unwrap_or(defaults.orders),
            seed: get_optional_parsed(&lookup, SEED_VAR)?.unwrap_or(defaults.seed),
            report_dir: lookup(REPORT_DIR_VAR).map(PathBuf::from).unwrap_or(defaults.report_dir),
        })
    }

    /// Bucket count for the orders-per-product index of a catalog with `products` entries
    pub fn order_buckets(&self, products: usize) -> usize {
        self.buckets.unwrap_or_else(|| (products + products / 4).max(1))
    }

    /// Bucket count for the suppliers-per-product index of a catalog with `products` entries
    pub fn supplier_buckets(&self, products: usize) -> usize {
        self.buckets.unwrap_or_else(|| (products + products / 2).max(1))
    }
}

fn get_optional_parsed<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>>
    where F: Fn(&str) -> Option<String>,
          T: FromStr,
          T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value.trim().parse().map(Some).map_err(|err: T::Err| Error::Config {
            key,
            reason: format!("{:?}: {}", value, err),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StoreConfig> {
        let vars: HashMap<String, String> = vars.iter()
            .map(|&(key, value)| (key.to_string(), value.to_string()))
            .collect();
        StoreConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.orders, 25_000);
        assert_eq!(config.seed, 42);
        assert_eq!(config.buckets, None);
    }

    #[test]
    fn overrides() {
        let config = load(&[
            (PRODUCTS_FILE_VAR, "data/p.txt"),
            (SUPPLIERS_FILE_VAR, "data/s.txt"),
            (BUCKETS_VAR, "64"),
            (ORDERS_VAR, " 100 "),
            (SEED_VAR, "7"),
            (REPORT_DIR_VAR, "out"),
        ]).unwrap();

        assert_eq!(config.products_file, PathBuf::from("data/p.txt"));
        assert_eq!(config.suppliers_file, PathBuf::from("data/s.txt"));
        assert_eq!(config.buckets, Some(64));
        assert_eq!(config.orders, 100);
        assert_eq!(config.seed, 7);
        assert_eq!(config.report_dir, PathBuf::from("out"));
    }

    #[test]
    fn invalid_values_name_their_variable() {
        for &(key, value) in &[(BUCKETS_VAR, "0"), (BUCKETS_VAR, "-3"), (ORDERS_VAR, "lots"), (SEED_VAR, "1.5")] {
            match load(&[(key, value)]) {
                Err(Error::Config {key: bad, ..}) => assert_eq!(bad, key),
                other => panic!("expected a config error for {}={:?}, got {:?}", key, value, other),
            }
        }
    }

    #[test]
    fn env_file_feeds_settings() {
        let dir = env::temp_dir().join(format!("store-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(".env");
        std::fs::write(&path, "# simulation\nSTORE_ORDERS=250\nSTORE_SEED=9\nSTORE_REPORT_DIR=\"out dir\"\n").unwrap();

        let config = StoreConfig::from_env_file(&path).unwrap();
        assert_eq!(config.orders, 250);
        assert_eq!(config.seed, 9);
        assert_eq!(config.report_dir, PathBuf::from("out dir"));
        assert_eq!(config.products_file, PathBuf::from("products.txt"));

        std::fs::write(&path, "STORE_BUCKETS=0\n").unwrap();
        match StoreConfig::from_env_file(&path) {
            Err(Error::Config {key, ..}) => assert_eq!(key, BUCKETS_VAR),
            other => panic!("expected a config error, got {:?}", other),
        }

        assert!(matches!(StoreConfig::from_env_file(&dir.join("missing.env")), Err(Error::EnvFile(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn derived_bucket_counts() {
        let config = StoreConfig::default();
        assert_eq!(config.order_buckets(100), 125);
        assert_eq!(config.supplier_buckets(100), 150);
        assert_eq!(config.order_buckets(0), 1);

        let config = StoreConfig {buckets: Some(10), ..StoreConfig::default()};
        assert_eq!(config.order_buckets(100), 10);
        assert_eq!(config.supplier_buckets(100), 10);
    }
}
