//! Test fixtures and store helpers.
//!
//! Provides a string-keyed store wrapper so tests can use `&str` literals,
//! plus a one-call tracing setup.

use simpledb_core::{Config, CoreResult, TransactionManager};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Transaction manager with string keys, values and transaction ids.
pub type StringManager = TransactionManager<String, String, String>;

static TRACING: Once = Once::new();

/// Installs a fmt subscriber filtered by `RUST_LOG` (default `warn`).
///
/// Safe to call from every test; only the first call has an effect.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// A string-keyed store for tests.
pub struct TestStore {
    /// The transaction manager.
    pub tm: StringManager,
}

impl TestStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty store with the given configuration.
    pub fn with_config(config: Config) -> Self {
        init_tracing();
        Self {
            tm: TransactionManager::with_config(config),
        }
    }

    /// Creates a store with committed key-value pairs.
    pub fn seeded(pairs: &[(&str, &str)]) -> Self {
        let store = Self::new();
        for (key, value) in pairs {
            store
                .put(key, value, None)
                .expect("Direct put cannot fail");
        }
        store
    }

    /// Opens a transaction.
    pub fn begin(&self, txn: &str) -> CoreResult<()> {
        self.tm.create_transaction(txn.to_string())
    }

    /// Writes a value.
    pub fn put(&self, key: &str, value: &str, txn: Option<&str>) -> CoreResult<()> {
        let txn = txn.map(str::to_string);
        self.tm
            .put(key.to_string(), value.to_string(), txn.as_ref())
    }

    /// Reads a value.
    pub fn get(&self, key: &str, txn: Option<&str>) -> CoreResult<Option<String>> {
        let txn = txn.map(str::to_string);
        self.tm.get(&key.to_string(), txn.as_ref())
    }

    /// Deletes a key.
    pub fn delete(&self, key: &str, txn: Option<&str>) -> CoreResult<()> {
        let txn = txn.map(str::to_string);
        self.tm.delete(&key.to_string(), txn.as_ref())
    }

    /// Commits a transaction.
    pub fn commit(&self, txn: &str) -> CoreResult<()> {
        self.tm.commit_transaction(&txn.to_string())
    }

    /// Rolls back a transaction.
    pub fn rollback(&self, txn: &str) -> CoreResult<()> {
        self.tm.rollback_transaction(&txn.to_string())
    }

    /// Reads a committed value, panicking on error.
    pub fn committed(&self, key: &str) -> Option<String> {
        self.get(key, None).expect("Direct get cannot fail")
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestStore {
    type Target = StringManager;

    fn deref(&self) -> &Self::Target {
        &self.tm
    }
}
