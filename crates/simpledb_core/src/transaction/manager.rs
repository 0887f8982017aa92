//! Transaction manager.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::keyspace::Keyspace;
use crate::stats::ManagerStats;
use crate::transaction::state::{PendingWrite, Transaction};
use crate::types::Version;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

type Table<K, V, I> = HashMap<I, Transaction<K, V, I>>;

/// Arbitrates every read and write against one [`Keyspace`].
///
/// Operations take an optional transaction id. Without one they apply to
/// the keyspace immediately; with one they are buffered in that open
/// transaction until it commits or rolls back.
///
/// ## Locking
///
/// A key with a pending write or delete in one open transaction is locked
/// against every other open transaction. A conflicting `put`/`delete` fails
/// at once with [`CoreError::LockConflict`]; nothing ever waits.
///
/// Internally the transaction table is always locked before the keyspace,
/// which makes the lock check and registration one atomic step and keeps
/// commit validation and application atomic with respect to direct writes.
///
/// # Example
///
/// ```rust
/// use simpledb_core::TransactionManager;
///
/// let tm: TransactionManager<&str, &str, &str> = TransactionManager::new();
/// tm.create_transaction("xyz").unwrap();
/// tm.put("a", "bar", Some(&"xyz")).unwrap();
/// assert_eq!(tm.get(&"a", None).unwrap(), None);
///
/// tm.commit_transaction(&"xyz").unwrap();
/// assert_eq!(tm.get(&"a", None).unwrap(), Some("bar"));
/// ```
pub struct TransactionManager<K, V, I> {
    keyspace: Keyspace<K, V>,
    transactions: RwLock<Table<K, V, I>>,
    config: Config,
    stats: ManagerStats,
}

impl<K, V, I> Default for TransactionManager<K, V, I>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
    I: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, I> TransactionManager<K, V, I>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
    I: Eq + Hash + Clone + Debug,
{
    /// Creates a transaction manager over an empty keyspace.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a transaction manager with the given configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let keyspace = Keyspace::with_capacity(config.initial_capacity);
        Self::with_keyspace(keyspace, config)
    }

    /// Creates a transaction manager that takes ownership of an existing
    /// keyspace.
    #[must_use]
    pub fn with_keyspace(keyspace: Keyspace<K, V>, config: Config) -> Self {
        Self {
            keyspace,
            transactions: RwLock::new(HashMap::new()),
            config,
            stats: ManagerStats::new(),
        }
    }

    /// Opens a new transaction.
    ///
    /// The transaction snapshots the committed version of every key in the
    /// keyspace at this instant.
    ///
    /// # Errors
    ///
    /// - [`CoreError::TransactionAlreadyOpen`] if `id` is already open.
    /// - [`CoreError::TooManyTransactions`] if the configured limit is reached.
    pub fn create_transaction(&self, id: I) -> CoreResult<()> {
        let result = self.create_inner(id);
        self.track(result)
    }

    fn create_inner(&self, id: I) -> CoreResult<()> {
        let mut table = self.transactions.write();
        if table.contains_key(&id) {
            return Err(CoreError::already_open(&id));
        }
        if let Some(limit) = self.config.transaction_limit() {
            if table.len() >= limit {
                return Err(CoreError::TooManyTransactions { limit });
            }
        }

        let snapshot = self.keyspace.read().versions();
        tracing::debug!(txn = ?id, snapshot_keys = snapshot.len(), "transaction created");
        table.insert(id.clone(), Transaction::new(id, snapshot));
        self.stats.record_transaction_start();
        Ok(())
    }

    /// Writes a value, directly or inside a transaction.
    ///
    /// # Errors
    ///
    /// With a transaction id:
    /// - [`CoreError::InvalidTransaction`] if the transaction is not open.
    /// - [`CoreError::LockConflict`] if another open transaction holds `key`.
    pub fn put(&self, key: K, value: V, txn: Option<&I>) -> CoreResult<()> {
        let result = match txn {
            None => {
                self.keyspace.direct_put(key, value);
                Ok(())
            }
            Some(id) => self.stage(id, key, PendingWrite::Put(value)),
        };
        if result.is_ok() {
            self.stats.record_write();
        }
        self.track(result)
    }

    /// Reads a value, directly or inside a transaction.
    ///
    /// Inside a transaction, the transaction's own pending writes and
    /// deletes win; keys it has not touched read the latest committed value.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidTransaction`] if `txn` names a transaction that is
    /// not open.
    pub fn get(&self, key: &K, txn: Option<&I>) -> CoreResult<Option<V>> {
        let result = match txn {
            None => Ok(self.keyspace.direct_get(key)),
            Some(id) => {
                let table = self.transactions.read();
                match table.get(id) {
                    None => Err(CoreError::invalid_transaction(id)),
                    Some(txn) => Ok(match txn.pending(key) {
                        Some(PendingWrite::Put(value)) => Some(value.clone()),
                        Some(PendingWrite::Delete) => None,
                        None => self.keyspace.direct_get(key),
                    }),
                }
            }
        };
        if result.is_ok() {
            self.stats.record_read();
        }
        self.track(result)
    }

    /// Deletes a key, directly or inside a transaction.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] for a direct delete of an absent key.
    /// - [`CoreError::InvalidTransaction`] if the transaction is not open.
    /// - [`CoreError::LockConflict`] if another open transaction holds `key`.
    pub fn delete(&self, key: &K, txn: Option<&I>) -> CoreResult<()> {
        let result = match txn {
            None => self.keyspace.direct_delete(key),
            Some(id) => self.stage(id, key.clone(), PendingWrite::Delete),
        };
        if result.is_ok() {
            self.stats.record_delete();
        }
        self.track(result)
    }

    /// Commits a transaction.
    ///
    /// Every touched key's committed version must still equal the version in
    /// the transaction's snapshot. If so, all pending writes and deletes are
    /// applied at once; otherwise nothing is applied. The transaction is
    /// closed either way.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidTransaction`] if the transaction is not open.
    /// - [`CoreError::Conflict`] if a touched key changed since the snapshot.
    ///   The transaction has been rolled back.
    pub fn commit_transaction(&self, id: &I) -> CoreResult<()> {
        let result = self.commit_inner(id);
        self.track(result)
    }

    fn commit_inner(&self, id: &I) -> CoreResult<()> {
        let mut table = self.transactions.write();
        let txn = table
            .remove(id)
            .ok_or_else(|| CoreError::invalid_transaction(id))?;

        let mut entries = self.keyspace.write();
        if let Err(err) = txn.validate(&entries) {
            self.stats.record_commit_conflict();
            self.stats.record_transaction_rollback();
            tracing::warn!(txn = ?id, error = %err, "commit rejected, transaction rolled back");
            return Err(err);
        }

        let writes = txn.write_count();
        let deletes = txn.delete_count();
        txn.apply(&mut entries);

        self.stats.record_transaction_commit();
        tracing::debug!(txn = ?id, writes, deletes, "transaction committed");
        Ok(())
    }

    /// Rolls back a transaction, discarding all of its pending changes.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidTransaction`] if the transaction is not open.
    pub fn rollback_transaction(&self, id: &I) -> CoreResult<()> {
        let result = match self.transactions.write().remove(id) {
            None => Err(CoreError::invalid_transaction(id)),
            Some(txn) => {
                self.stats.record_transaction_rollback();
                tracing::debug!(txn = ?id, discarded = txn.write_count(), "transaction rolled back");
                Ok(())
            }
        };
        self.track(result)
    }

    /// Buffers a write after checking the key is not held by another
    /// transaction. Check and registration happen under one table lock.
    fn stage(&self, id: &I, key: K, write: PendingWrite<V>) -> CoreResult<()> {
        let mut table = self.transactions.write();
        if !table.contains_key(id) {
            return Err(CoreError::invalid_transaction(id));
        }
        if let Some(holder) = holder_of(&table, &key, Some(id)) {
            self.stats.record_lock_conflict();
            tracing::debug!(txn = ?id, key = ?key, holder = ?holder, "lock conflict");
            return Err(CoreError::lock_conflict(&key, holder));
        }

        let txn = table
            .get_mut(id)
            .ok_or_else(|| CoreError::invalid_transaction(id))?;
        match write {
            PendingWrite::Put(value) => txn.put(key, value),
            PendingWrite::Delete => txn.delete(key),
        }
        Ok(())
    }

    fn track<T>(&self, result: CoreResult<T>) -> CoreResult<T> {
        if result.is_err() {
            self.stats.record_error();
        }
        result
    }

    /// Returns true if a transaction with this id is open.
    #[must_use]
    pub fn is_open(&self, id: &I) -> bool {
        self.transactions.read().contains_key(id)
    }

    /// Returns the number of open transactions.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.transactions.read().len()
    }

    /// Returns the open transaction holding the key's lock, if any.
    #[must_use]
    pub fn lock_holder(&self, key: &K) -> Option<I> {
        holder_of(&self.transactions.read(), key, None).cloned()
    }

    /// Runs `f` against an open transaction's state.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidTransaction`] if the transaction is not open.
    pub fn inspect<R>(&self, id: &I, f: impl FnOnce(&Transaction<K, V, I>) -> R) -> CoreResult<R> {
        let table = self.transactions.read();
        table
            .get(id)
            .map(f)
            .ok_or_else(|| CoreError::invalid_transaction(id))
    }

    /// Returns the committed version of a key.
    #[must_use]
    pub fn version_of(&self, key: &K) -> Version {
        self.keyspace.version_of(key)
    }

    /// Returns the number of committed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keyspace.len()
    }

    /// Returns true if no key is committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keyspace.is_empty()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the operation counters.
    #[must_use]
    pub fn stats(&self) -> &ManagerStats {
        &self.stats
    }
}

/// Finds an open transaction other than `caller` whose pending set holds `key`.
fn holder_of<'a, K, V, I>(table: &'a Table<K, V, I>, key: &K, caller: Option<&I>) -> Option<&'a I>
where
    K: Eq + Hash + Clone + Debug,
    I: Eq + Hash,
{
    table
        .iter()
        .find(|(id, txn)| Some(*id) != caller && txn.touches(key))
        .map(|(id, _)| id)
}

impl<K, V, I> std::fmt::Debug for TransactionManager<K, V, I>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
    I: Eq + Hash + Clone + Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("keys", &self.len())
            .field("open_count", &self.open_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Manager = TransactionManager<&'static str, &'static str, &'static str>;

    fn create_manager() -> Manager {
        TransactionManager::new()
    }

    #[test]
    fn never_written_key_is_absent() {
        let tm = create_manager();
        assert_eq!(tm.get(&"example", None).unwrap(), None);
    }

    #[test]
    fn direct_put_get() {
        let tm = create_manager();
        tm.put("example", "foo", None).unwrap();
        assert_eq!(tm.get(&"example", None).unwrap(), Some("foo"));
    }

    #[test]
    fn direct_put_delete() {
        let tm = create_manager();
        tm.put("example", "foo", None).unwrap();
        tm.delete(&"example", None).unwrap();
        assert_eq!(tm.get(&"example", None).unwrap(), None);
        assert_eq!(tm.version_of(&"example"), Version::ZERO);
        assert!(tm.is_empty());
    }

    #[test]
    fn direct_delete_missing_key() {
        let tm = create_manager();
        let err = tm.delete(&"inexistent", None).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn create_transaction_twice_fails() {
        let tm = create_manager();
        tm.create_transaction("abc").unwrap();
        let err = tm.create_transaction("abc").unwrap_err();
        assert!(matches!(err, CoreError::TransactionAlreadyOpen { .. }));
        assert_eq!(tm.open_count(), 1);
    }

    #[test]
    fn transactional_write_invisible_outside() {
        let tm = create_manager();
        tm.create_transaction("abc").unwrap();
        tm.put("a", "foo", Some(&"abc")).unwrap();

        assert_eq!(tm.get(&"a", Some(&"abc")).unwrap(), Some("foo"));
        assert_eq!(tm.get(&"a", None).unwrap(), None);
    }

    #[test]
    fn commit_makes_writes_visible() {
        let tm = create_manager();
        tm.create_transaction("xyz").unwrap();
        tm.put("a", "bar", Some(&"xyz")).unwrap();
        assert_eq!(tm.get(&"a", Some(&"xyz")).unwrap(), Some("bar"));

        tm.commit_transaction(&"xyz").unwrap();

        assert_eq!(tm.get(&"a", None).unwrap(), Some("bar"));
        assert_eq!(tm.version_of(&"a"), Version::new(1));
        assert!(!tm.is_open(&"xyz"));
    }

    #[test]
    fn commit_applies_deletes() {
        let tm = create_manager();
        tm.put("a", "foo", None).unwrap();
        tm.put("b", "bar", None).unwrap();

        tm.create_transaction("t").unwrap();
        tm.delete(&"a", Some(&"t")).unwrap();
        tm.put("b", "baz", Some(&"t")).unwrap();
        assert_eq!(tm.get(&"a", Some(&"t")).unwrap(), None);
        assert_eq!(tm.get(&"a", None).unwrap(), Some("foo"));

        tm.commit_transaction(&"t").unwrap();

        assert_eq!(tm.get(&"a", None).unwrap(), None);
        assert_eq!(tm.version_of(&"a"), Version::ZERO);
        assert_eq!(tm.get(&"b", None).unwrap(), Some("baz"));
        assert_eq!(tm.version_of(&"b"), Version::new(2));
    }

    #[test]
    fn transactional_delete_of_absent_key_commits() {
        let tm = create_manager();
        tm.create_transaction("t").unwrap();
        tm.delete(&"ghost", Some(&"t")).unwrap();
        tm.commit_transaction(&"t").unwrap();
        assert_eq!(tm.get(&"ghost", None).unwrap(), None);
    }

    #[test]
    fn put_on_locked_key_fails() {
        let tm = create_manager();
        tm.create_transaction("xyz").unwrap();
        tm.put("a", "bar", Some(&"xyz")).unwrap();
        tm.create_transaction("ggg").unwrap();

        let err = tm.put("a", "ooo", Some(&"ggg")).unwrap_err();
        assert!(matches!(err, CoreError::LockConflict { .. }));
        assert_eq!(tm.lock_holder(&"a"), Some("xyz"));

        // The holder's pending value is untouched.
        assert_eq!(tm.get(&"a", Some(&"xyz")).unwrap(), Some("bar"));
        assert_eq!(tm.get(&"a", Some(&"ggg")).unwrap(), None);
    }

    #[test]
    fn delete_on_locked_key_fails() {
        let tm = create_manager();
        tm.put("a", "foo", None).unwrap();
        tm.create_transaction("t1").unwrap();
        tm.delete(&"a", Some(&"t1")).unwrap();
        tm.create_transaction("t2").unwrap();

        assert!(matches!(
            tm.delete(&"a", Some(&"t2")),
            Err(CoreError::LockConflict { .. })
        ));
        assert!(matches!(
            tm.put("a", "bar", Some(&"t2")),
            Err(CoreError::LockConflict { .. })
        ));
    }

    #[test]
    fn lock_released_after_commit_and_rollback() {
        let tm = create_manager();
        tm.create_transaction("t1").unwrap();
        tm.put("a", "one", Some(&"t1")).unwrap();
        tm.rollback_transaction(&"t1").unwrap();
        assert_eq!(tm.lock_holder(&"a"), None);

        tm.create_transaction("t2").unwrap();
        tm.put("a", "two", Some(&"t2")).unwrap();
        tm.commit_transaction(&"t2").unwrap();
        assert_eq!(tm.lock_holder(&"a"), None);

        tm.create_transaction("t3").unwrap();
        tm.put("a", "three", Some(&"t3")).unwrap();
        tm.commit_transaction(&"t3").unwrap();
        assert_eq!(tm.get(&"a", None).unwrap(), Some("three"));
    }

    #[test]
    fn transaction_may_overwrite_its_own_key() {
        let tm = create_manager();
        tm.create_transaction("t").unwrap();
        tm.put("a", "first", Some(&"t")).unwrap();
        tm.put("a", "second", Some(&"t")).unwrap();
        tm.delete(&"a", Some(&"t")).unwrap();
        tm.put("a", "third", Some(&"t")).unwrap();

        tm.commit_transaction(&"t").unwrap();
        assert_eq!(tm.get(&"a", None).unwrap(), Some("third"));
        assert_eq!(tm.version_of(&"a"), Version::new(1));
    }

    #[test]
    fn direct_write_after_snapshot_conflicts() {
        let tm = create_manager();
        tm.put("k", "v0", None).unwrap();
        tm.create_transaction("t").unwrap();
        tm.put("k", "v1", None).unwrap();
        tm.put("k", "v2", Some(&"t")).unwrap();

        let err = tm.commit_transaction(&"t").unwrap_err();
        assert_eq!(
            err,
            CoreError::Conflict {
                key: "\"k\"".to_string(),
                expected: Version::new(1),
                actual: Version::new(2),
            }
        );
        assert_eq!(tm.get(&"k", None).unwrap(), Some("v1"));
        assert!(!tm.is_open(&"t"));
    }

    #[test]
    fn failed_commit_applies_nothing() {
        let tm = create_manager();
        tm.put("k", "v0", None).unwrap();
        tm.create_transaction("t").unwrap();
        tm.put("fresh", "x", Some(&"t")).unwrap();
        tm.put("k", "v2", Some(&"t")).unwrap();
        tm.delete(&"k", None).unwrap();

        assert!(tm.commit_transaction(&"t").is_err());
        assert_eq!(tm.get(&"fresh", None).unwrap(), None);
        assert_eq!(tm.get(&"k", None).unwrap(), None);
        assert_eq!(tm.lock_holder(&"fresh"), None);
    }

    #[test]
    fn commit_after_failed_commit_is_invalid() {
        let tm = create_manager();
        tm.put("k", "v0", None).unwrap();
        tm.create_transaction("t").unwrap();
        tm.put("k", "v1", None).unwrap();
        tm.delete(&"k", Some(&"t")).unwrap();

        assert!(matches!(
            tm.commit_transaction(&"t"),
            Err(CoreError::Conflict { .. })
        ));
        assert!(matches!(
            tm.commit_transaction(&"t"),
            Err(CoreError::InvalidTransaction { .. })
        ));
    }

    #[test]
    fn key_created_after_snapshot_conflicts() {
        let tm = create_manager();
        tm.create_transaction("t").unwrap();
        tm.put("a", "direct", None).unwrap();
        tm.put("a", "txn", Some(&"t")).unwrap();

        assert!(matches!(
            tm.commit_transaction(&"t"),
            Err(CoreError::Conflict { .. })
        ));
        assert_eq!(tm.get(&"a", None).unwrap(), Some("direct"));
    }

    #[test]
    fn deleted_and_recreated_key_conflicts() {
        let tm = create_manager();
        tm.put("a", "v", None).unwrap();
        tm.put("a", "v", None).unwrap();
        tm.create_transaction("t").unwrap();
        tm.delete(&"a", None).unwrap();
        tm.put("a", "again", None).unwrap();
        tm.put("a", "mine", Some(&"t")).unwrap();

        // Snapshot at v:2, committed at v:1: any divergence conflicts.
        assert!(matches!(
            tm.commit_transaction(&"t"),
            Err(CoreError::Conflict { .. })
        ));
    }

    #[test]
    fn untouched_key_changes_do_not_conflict() {
        let tm = create_manager();
        tm.put("a", "v0", None).unwrap();
        tm.create_transaction("t").unwrap();
        tm.put("a", "v1", None).unwrap();
        tm.put("b", "mine", Some(&"t")).unwrap();

        // Reads see the latest committed value of untouched keys.
        assert_eq!(tm.get(&"a", Some(&"t")).unwrap(), Some("v1"));
        tm.commit_transaction(&"t").unwrap();
    }

    #[test]
    fn rollback_discards_pending_writes() {
        let tm = create_manager();
        tm.put("a", "bar", None).unwrap();
        tm.create_transaction("def").unwrap();
        tm.put("b", "foo", Some(&"def")).unwrap();
        assert_eq!(tm.get(&"a", Some(&"def")).unwrap(), Some("bar"));
        assert_eq!(tm.get(&"b", Some(&"def")).unwrap(), Some("foo"));

        tm.rollback_transaction(&"def").unwrap();

        assert_eq!(tm.get(&"b", None).unwrap(), None);
        assert_eq!(tm.get(&"a", None).unwrap(), Some("bar"));
        assert_eq!(tm.version_of(&"a"), Version::new(1));
    }

    #[test]
    fn closed_transaction_is_invalid() {
        let tm = create_manager();
        tm.put("a", "bar", None).unwrap();
        tm.create_transaction("abc").unwrap();
        tm.put("a", "foo", Some(&"abc")).unwrap();
        assert_eq!(tm.get(&"a", None).unwrap(), Some("bar"));
        tm.rollback_transaction(&"abc").unwrap();

        assert!(matches!(
            tm.put("a", "foo", Some(&"abc")),
            Err(CoreError::InvalidTransaction { .. })
        ));
        assert_eq!(tm.get(&"a", None).unwrap(), Some("bar"));
    }

    #[test]
    fn unknown_transaction_is_invalid_everywhere() {
        let tm = create_manager();
        let id = "never";

        let invalid = |r: CoreResult<()>| matches!(r, Err(CoreError::InvalidTransaction { .. }));
        assert!(invalid(tm.put("a", "x", Some(&id))));
        assert!(invalid(tm.delete(&"a", Some(&id))));
        assert!(invalid(tm.commit_transaction(&id)));
        assert!(invalid(tm.rollback_transaction(&id)));
        assert!(matches!(
            tm.get(&"a", Some(&id)),
            Err(CoreError::InvalidTransaction { .. })
        ));
    }

    #[test]
    fn invalid_transaction_reported_before_lock_conflict() {
        let tm = create_manager();
        tm.create_transaction("t1").unwrap();
        tm.put("a", "x", Some(&"t1")).unwrap();

        assert!(matches!(
            tm.put("a", "y", Some(&"missing")),
            Err(CoreError::InvalidTransaction { .. })
        ));
    }

    #[test]
    fn transaction_limit_enforced() {
        let tm: Manager = TransactionManager::with_config(Config::new().max_open_transactions(1));
        tm.create_transaction("t1").unwrap();
        assert_eq!(
            tm.create_transaction("t2"),
            Err(CoreError::TooManyTransactions { limit: 1 })
        );

        tm.rollback_transaction(&"t1").unwrap();
        tm.create_transaction("t2").unwrap();
    }

    #[test]
    fn with_keyspace_adopts_existing_state() {
        let keyspace = Keyspace::new();
        keyspace.direct_put("a", "seeded");
        let tm: Manager = TransactionManager::with_keyspace(keyspace, Config::default());

        assert_eq!(tm.get(&"a", None).unwrap(), Some("seeded"));
        assert_eq!(tm.len(), 1);
    }

    #[test]
    fn inspect_exposes_snapshot_and_pending() {
        let tm = create_manager();
        tm.put("a", "v", None).unwrap();
        tm.create_transaction("t").unwrap();
        tm.put("b", "w", Some(&"t")).unwrap();

        let (snap_a, snap_b, writes) = tm
            .inspect(&"t", |txn| {
                (
                    txn.snapshot_version(&"a"),
                    txn.snapshot_version(&"b"),
                    txn.write_count(),
                )
            })
            .unwrap();
        assert_eq!(snap_a, Version::new(1));
        assert_eq!(snap_b, Version::ZERO);
        assert_eq!(writes, 1);
    }

    #[test]
    fn stats_track_outcomes() {
        let tm = create_manager();
        tm.put("k", "v0", None).unwrap();
        tm.create_transaction("t1").unwrap();
        tm.create_transaction("t2").unwrap();
        tm.put("k", "v1", Some(&"t1")).unwrap();
        let _ = tm.put("k", "v2", Some(&"t2"));
        tm.put("k", "v3", None).unwrap();
        let _ = tm.commit_transaction(&"t1");
        tm.rollback_transaction(&"t2").unwrap();
        let _ = tm.get(&"k", None);

        let stats = tm.stats().snapshot();
        assert_eq!(stats.writes, 3);
        assert_eq!(stats.reads, 1);
        assert_eq!(stats.transactions_started, 2);
        assert_eq!(stats.transactions_committed, 0);
        assert_eq!(stats.transactions_rolled_back, 2);
        assert_eq!(stats.lock_conflicts, 1);
        assert_eq!(stats.commit_conflicts, 1);
        assert_eq!(stats.errors, 2);
    }

    #[test]
    fn manager_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TransactionManager<String, Vec<u8>, u64>>();
    }
}
