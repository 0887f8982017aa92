//! Transaction manager statistics.
//!
//! # Usage
//!
//! ```rust
//! use simpledb_core::TransactionManager;
//!
//! let tm: TransactionManager<&str, u32, &str> = TransactionManager::new();
//! tm.put("a", 1, None).unwrap();
//!
//! let stats = tm.stats().snapshot();
//! assert_eq!(stats.writes, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Operation counters for a transaction manager.
///
/// All counters are atomic and can be read while operations are in progress.
#[derive(Debug, Default)]
pub struct ManagerStats {
    /// Accepted get operations.
    reads: AtomicU64,
    /// Accepted put operations.
    writes: AtomicU64,
    /// Accepted delete operations.
    deletes: AtomicU64,

    transactions_started: AtomicU64,
    transactions_committed: AtomicU64,
    /// Explicit rollbacks plus commits rejected for a conflict.
    transactions_rolled_back: AtomicU64,

    /// Commits rejected by version validation.
    commit_conflicts: AtomicU64,
    /// Transactional writes refused because another transaction holds the key.
    lock_conflicts: AtomicU64,

    /// Operations that returned an error of any kind.
    errors: AtomicU64,
}

impl ManagerStats {
    /// Creates a new stats instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transaction_start(&self) {
        self.transactions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transaction_commit(&self) {
        self.transactions_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transaction_rollback(&self) {
        self.transactions_rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit_conflict(&self) {
        self.commit_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lock_conflict(&self) {
        self.lock_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of accepted reads.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns the number of accepted writes.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Returns the number of accepted deletes.
    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    /// Returns the number of transactions started.
    pub fn transactions_started(&self) -> u64 {
        self.transactions_started.load(Ordering::Relaxed)
    }

    /// Returns the number of transactions committed.
    pub fn transactions_committed(&self) -> u64 {
        self.transactions_committed.load(Ordering::Relaxed)
    }

    /// Returns the number of transactions rolled back.
    pub fn transactions_rolled_back(&self) -> u64 {
        self.transactions_rolled_back.load(Ordering::Relaxed)
    }

    /// Returns the number of commits rejected for a version conflict.
    pub fn commit_conflicts(&self) -> u64 {
        self.commit_conflicts.load(Ordering::Relaxed)
    }

    /// Returns the number of writes refused for a lock conflict.
    pub fn lock_conflicts(&self) -> u64 {
        self.lock_conflicts.load(Ordering::Relaxed)
    }

    /// Returns the number of failed operations.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all stats.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            reads: self.reads(),
            writes: self.writes(),
            deletes: self.deletes(),
            transactions_started: self.transactions_started(),
            transactions_committed: self.transactions_committed(),
            transactions_rolled_back: self.transactions_rolled_back(),
            commit_conflicts: self.commit_conflicts(),
            lock_conflicts: self.lock_conflicts(),
            errors: self.errors(),
        }
    }
}

/// A point-in-time copy of [`ManagerStats`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Accepted get operations.
    pub reads: u64,
    /// Accepted put operations.
    pub writes: u64,
    /// Accepted delete operations.
    pub deletes: u64,
    /// Transactions started.
    pub transactions_started: u64,
    /// Transactions committed.
    pub transactions_committed: u64,
    /// Transactions rolled back, explicitly or by a failed commit.
    pub transactions_rolled_back: u64,
    /// Commits rejected by version validation.
    pub commit_conflicts: u64,
    /// Writes refused by the cross-transaction lock check.
    pub lock_conflicts: u64,
    /// Failed operations.
    pub errors: u64,
}
