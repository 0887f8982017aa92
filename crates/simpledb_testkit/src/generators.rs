//! Property-based test generators using proptest.
//!
//! Keys and transaction ids are drawn from small alphabets so that random
//! sequences actually collide on keys and reuse transaction ids.

use proptest::prelude::*;

/// Strategy for generating keys from a small alphabet.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d", "e"]).prop_map(String::from)
}

/// Strategy for generating values.
pub fn value_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,8}").expect("Invalid regex")
}

/// Strategy for generating transaction ids.
pub fn txn_id_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["abc", "def", "xyz"]).prop_map(String::from)
}

/// Strategy for an optional transaction id, biased towards transactional use.
pub fn maybe_txn_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        1 => Just(None),
        3 => txn_id_strategy().prop_map(Some),
    ]
}

/// A single operation against a transaction manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Open a transaction.
    Create {
        /// Transaction id.
        txn: String,
    },
    /// Write a value.
    Put {
        /// Key to write.
        key: String,
        /// Value to write.
        value: String,
        /// Transaction, or `None` for a direct write.
        txn: Option<String>,
    },
    /// Read a value.
    Get {
        /// Key to read.
        key: String,
        /// Transaction, or `None` for a direct read.
        txn: Option<String>,
    },
    /// Delete a key.
    Delete {
        /// Key to delete.
        key: String,
        /// Transaction, or `None` for a direct delete.
        txn: Option<String>,
    },
    /// Commit a transaction.
    Commit {
        /// Transaction id.
        txn: String,
    },
    /// Roll back a transaction.
    Rollback {
        /// Transaction id.
        txn: String,
    },
}

/// Strategy for generating operations.
pub fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        2 => txn_id_strategy().prop_map(|txn| Operation::Create { txn }),
        4 => (key_strategy(), value_strategy(), maybe_txn_strategy())
            .prop_map(|(key, value, txn)| Operation::Put { key, value, txn }),
        3 => (key_strategy(), maybe_txn_strategy())
            .prop_map(|(key, txn)| Operation::Get { key, txn }),
        2 => (key_strategy(), maybe_txn_strategy())
            .prop_map(|(key, txn)| Operation::Delete { key, txn }),
        2 => txn_id_strategy().prop_map(|txn| Operation::Commit { txn }),
        1 => txn_id_strategy().prop_map(|txn| Operation::Rollback { txn }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
