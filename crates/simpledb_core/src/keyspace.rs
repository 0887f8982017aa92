//! Committed key-value state with per-key version counters.

use crate::error::{CoreError, CoreResult};
use crate::types::Version;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// The committed values and versions, always updated together.
///
/// Every key in `values` has an entry in `versions` and vice versa.
#[derive(Debug)]
pub(crate) struct Entries<K, V> {
    values: HashMap<K, V>,
    versions: HashMap<K, Version>,
}

impl<K, V> Entries<K, V>
where
    K: Eq + Hash + Clone,
{
    fn with_capacity(capacity: usize) -> Self {
        Self {
            values: HashMap::with_capacity(capacity),
            versions: HashMap::with_capacity(capacity),
        }
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        self.values.get(key)
    }

    pub(crate) fn version_of(&self, key: &K) -> Version {
        self.versions.get(key).copied().unwrap_or(Version::ZERO)
    }

    pub(crate) fn put(&mut self, key: K, value: V) -> Version {
        let version = self.version_of(&key).next();
        self.versions.insert(key.clone(), version);
        self.values.insert(key, value);
        version
    }

    /// Removes the key, returning its value if it was present.
    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        self.versions.remove(key);
        self.values.remove(key)
    }

    pub(crate) fn versions(&self) -> HashMap<K, Version> {
        self.versions.clone()
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

/// The single committed key-value store.
///
/// Values and their versions live behind one lock so readers never observe
/// a value without its version or the reverse. Direct operations are
/// individually atomic; the transaction manager takes the write guard for
/// the whole validate-and-apply step of a commit.
///
/// Mutation is crate-internal; callers write through
/// [`TransactionManager`](crate::TransactionManager) with no transaction id.
///
/// # Example
///
/// ```rust
/// use simpledb_core::{Config, Keyspace, TransactionManager, Version};
///
/// let ks: Keyspace<&str, u32> = Keyspace::with_capacity(16);
/// assert!(ks.is_empty());
///
/// let tm: TransactionManager<&str, u32, u8> =
///     TransactionManager::with_keyspace(ks, Config::default());
/// tm.put("a", 1, None).unwrap();
/// tm.put("a", 2, None).unwrap();
/// assert_eq!(tm.get(&"a", None).unwrap(), Some(2));
/// assert_eq!(tm.version_of(&"a"), Version::new(2));
/// ```
#[derive(Debug)]
pub struct Keyspace<K, V> {
    entries: RwLock<Entries<K, V>>,
}

impl<K, V> Default for Keyspace<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Keyspace<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// Creates an empty keyspace.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty keyspace with room for `capacity` keys.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(Entries::with_capacity(capacity)),
        }
    }

    /// Writes a value and bumps the key's version by one.
    ///
    /// Returns the new version.
    pub(crate) fn direct_put(&self, key: K, value: V) -> Version {
        tracing::trace!(key = ?key, "direct put");
        self.entries.write().put(key, value)
    }

    /// Returns the committed value for a key.
    #[must_use]
    pub fn direct_get(&self, key: &K) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    /// Removes a key together with its version.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the key is absent.
    pub(crate) fn direct_delete(&self, key: &K) -> CoreResult<()> {
        match self.entries.write().remove(key) {
            Some(_) => {
                tracing::trace!(key = ?key, "direct delete");
                Ok(())
            }
            None => Err(CoreError::not_found(key)),
        }
    }

    /// Returns the committed version of a key, zero if absent.
    #[must_use]
    pub fn version_of(&self, key: &K) -> Version {
        self.entries.read().version_of(key)
    }

    /// Returns true if the key has a committed value.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.read().get(key).is_some()
    }

    /// Returns the number of committed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if no key is committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Entries<K, V>> {
        self.entries.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Entries<K, V>> {
        self.entries.write()
    }
}
