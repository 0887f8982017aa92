//! Error types for SimpleDB core.

use crate::types::Version;
use std::fmt::Debug;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in SimpleDB core operations.
///
/// Keys and transaction ids are generic in the API, so errors carry their
/// `Debug` rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The transaction id does not name an open transaction.
    #[error("invalid transaction: {txn} is not open")]
    InvalidTransaction {
        /// The offending transaction id.
        txn: String,
    },

    /// A transaction with this id is already open.
    #[error("transaction already open: {txn}")]
    TransactionAlreadyOpen {
        /// The duplicate transaction id.
        txn: String,
    },

    /// The key is locked by the pending writes of another open transaction.
    #[error("lock conflict on key {key}: held by transaction {holder}")]
    LockConflict {
        /// The contended key.
        key: String,
        /// The transaction currently holding the key.
        holder: String,
    },

    /// The key was modified by someone else since the transaction's snapshot.
    #[error("write conflict on key {key}: snapshot at {expected}, committed at {actual}")]
    Conflict {
        /// The conflicting key.
        key: String,
        /// Version recorded in the transaction snapshot.
        expected: Version,
        /// Version found in the keyspace at commit time.
        actual: Version,
    },

    /// The key does not exist.
    #[error("key not found: {key}")]
    NotFound {
        /// The missing key.
        key: String,
    },

    /// The configured limit on open transactions has been reached.
    #[error("too many open transactions: limit is {limit}")]
    TooManyTransactions {
        /// The configured limit.
        limit: usize,
    },
}

impl CoreError {
    /// Creates an invalid transaction error.
    pub fn invalid_transaction(txn: &impl Debug) -> Self {
        Self::InvalidTransaction {
            txn: format!("{txn:?}"),
        }
    }

    /// Creates a transaction already open error.
    pub fn already_open(txn: &impl Debug) -> Self {
        Self::TransactionAlreadyOpen {
            txn: format!("{txn:?}"),
        }
    }

    /// Creates a lock conflict error.
    pub fn lock_conflict(key: &impl Debug, holder: &impl Debug) -> Self {
        Self::LockConflict {
            key: format!("{key:?}"),
            holder: format!("{holder:?}"),
        }
    }

    /// Creates a commit conflict error.
    pub fn conflict(key: &impl Debug, expected: Version, actual: Version) -> Self {
        Self::Conflict {
            key: format!("{key:?}"),
            expected,
            actual,
        }
    }

    /// Creates a not found error.
    pub fn not_found(key: &impl Debug) -> Self {
        Self::NotFound {
            key: format!("{key:?}"),
        }
    }

    /// Returns true if this error came from conflict detection, either the
    /// eager lock check or commit-time version validation.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::LockConflict { .. } | Self::Conflict { .. })
    }
}
