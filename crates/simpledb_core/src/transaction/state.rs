//! Transaction state.

use crate::error::{CoreError, CoreResult};
use crate::keyspace::Entries;
use crate::types::Version;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Represents a pending write in a transaction.
///
/// A key maps to a single pending write, so a key can never be both
/// written and deleted by the same transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingWrite<V> {
    /// Insert or update a value.
    Put(V),
    /// Delete the key.
    Delete,
}

impl<V> PendingWrite<V> {
    /// Returns true if this is a pending delete.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete)
    }
}

/// An open transaction.
///
/// Holds the version snapshot taken when the transaction was created and
/// the writes buffered since. Nothing here is visible to other callers
/// until the transaction manager commits it.
#[derive(Debug)]
pub struct Transaction<K, V, I> {
    id: I,
    /// Committed versions of every key that existed at creation.
    snapshot: HashMap<K, Version>,
    writes: HashMap<K, PendingWrite<V>>,
}

impl<K, V, I> Transaction<K, V, I>
where
    K: Eq + Hash + Clone + Debug,
{
    pub(crate) fn new(id: I, snapshot: HashMap<K, Version>) -> Self {
        Self {
            id,
            snapshot,
            writes: HashMap::new(),
        }
    }

    /// Returns the transaction ID.
    #[must_use]
    pub fn id(&self) -> &I {
        &self.id
    }

    /// Returns the version of a key as seen by this transaction's snapshot.
    ///
    /// Keys absent from the snapshot are at [`Version::ZERO`].
    #[must_use]
    pub fn snapshot_version(&self, key: &K) -> Version {
        self.snapshot.get(key).copied().unwrap_or(Version::ZERO)
    }

    /// Gets the pending write for a key.
    #[must_use]
    pub fn pending(&self, key: &K) -> Option<&PendingWrite<V>> {
        self.writes.get(key)
    }

    /// Returns true if this transaction holds the key's logical lock.
    #[must_use]
    pub fn touches(&self, key: &K) -> bool {
        self.writes.contains_key(key)
    }

    /// Returns the number of pending writes and deletes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// Returns the number of pending deletes.
    #[must_use]
    pub fn delete_count(&self) -> usize {
        self.writes.values().filter(|w| w.is_delete()).count()
    }

    /// Records a put, replacing any earlier put or delete of the key.
    pub(crate) fn put(&mut self, key: K, value: V) {
        self.writes.insert(key, PendingWrite::Put(value));
    }

    /// Records a delete, replacing any earlier put of the key.
    pub(crate) fn delete(&mut self, key: K) {
        self.writes.insert(key, PendingWrite::Delete);
    }

    /// Checks every touched key against the committed versions.
    ///
    /// Puts are checked before deletes; the first mismatch is returned.
    pub(crate) fn validate(&self, entries: &Entries<K, V>) -> CoreResult<()> {
        let puts = self.writes.iter().filter(|(_, w)| !w.is_delete());
        let deletes = self.writes.iter().filter(|(_, w)| w.is_delete());

        for (key, _) in puts.chain(deletes) {
            let expected = self.snapshot_version(key);
            let actual = entries.version_of(key);
            if expected != actual {
                return Err(CoreError::conflict(key, expected, actual));
            }
        }
        Ok(())
    }

    /// Applies every pending write to the committed entries.
    ///
    /// Must only be called after [`validate`](Self::validate) succeeded
    /// under the same guard.
    pub(crate) fn apply(self, entries: &mut Entries<K, V>) {
        for (key, write) in self.writes {
            match write {
                PendingWrite::Put(value) => {
                    entries.put(key, value);
                }
                PendingWrite::Delete => {
                    entries.remove(&key);
                }
            }
        }
    }
}
