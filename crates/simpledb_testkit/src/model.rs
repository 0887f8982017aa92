//! Reference model and differential test harness.
//!
//! [`ReferenceModel`] is a deliberately naive, single-threaded rendition of
//! the transaction semantics, keeping pending writes and pending deletes in
//! separate collections. [`ModelHarness`] replays operations against both the
//! model and a real [`TestStore`] and asserts they agree on every outcome.

use crate::fixtures::TestStore;
use crate::generators::Operation;
use simpledb_core::{CoreError, Version};
use std::collections::{HashMap, HashSet};

/// Kind of failure, ignoring the error payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transaction id not open.
    InvalidTransaction,
    /// Transaction id already open.
    TransactionAlreadyOpen,
    /// Key held by another transaction.
    LockConflict,
    /// Version mismatch at commit.
    Conflict,
    /// Direct delete of an absent key.
    NotFound,
    /// Open-transaction limit reached.
    TooManyTransactions,
}

impl From<&CoreError> for ErrorKind {
    fn from(err: &CoreError) -> Self {
        match err {
            CoreError::InvalidTransaction { .. } => Self::InvalidTransaction,
            CoreError::TransactionAlreadyOpen { .. } => Self::TransactionAlreadyOpen,
            CoreError::LockConflict { .. } => Self::LockConflict,
            CoreError::Conflict { .. } => Self::Conflict,
            CoreError::NotFound { .. } => Self::NotFound,
            CoreError::TooManyTransactions { .. } => Self::TooManyTransactions,
        }
    }
}

/// Observable result of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A write-like operation succeeded.
    Done,
    /// A read returned this value.
    Read(Option<String>),
    /// The operation failed.
    Failed(ErrorKind),
}

impl Outcome {
    fn of_unit(result: Result<(), CoreError>) -> Self {
        match result {
            Ok(()) => Self::Done,
            Err(err) => Self::Failed(ErrorKind::from(&err)),
        }
    }

    fn of_read(result: Result<Option<String>, CoreError>) -> Self {
        match result {
            Ok(value) => Self::Read(value),
            Err(err) => Self::Failed(ErrorKind::from(&err)),
        }
    }
}

#[derive(Debug, Default)]
struct ModelTxn {
    snapshot: HashMap<String, u64>,
    writes: HashMap<String, String>,
    deletes: HashSet<String>,
}

impl ModelTxn {
    fn holds(&self, key: &str) -> bool {
        self.writes.contains_key(key) || self.deletes.contains(key)
    }
}

/// Naive model of the keyspace and its transactions.
#[derive(Debug, Default)]
pub struct ReferenceModel {
    values: HashMap<String, String>,
    versions: HashMap<String, u64>,
    open: HashMap<String, ModelTxn>,
}

impl ReferenceModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an operation and returns its expected outcome.
    pub fn apply(&mut self, op: &Operation) -> Outcome {
        match op {
            Operation::Create { txn } => {
                if self.open.contains_key(txn) {
                    return Outcome::Failed(ErrorKind::TransactionAlreadyOpen);
                }
                let snapshot = self.versions.clone();
                self.open.insert(
                    txn.clone(),
                    ModelTxn {
                        snapshot,
                        ..ModelTxn::default()
                    },
                );
                Outcome::Done
            }
            Operation::Put { key, value, txn: None } => {
                *self.versions.entry(key.clone()).or_insert(0) += 1;
                self.values.insert(key.clone(), value.clone());
                Outcome::Done
            }
            Operation::Put { key, value, txn: Some(id) } => match self.check_lock(key, id) {
                Some(kind) => Outcome::Failed(kind),
                None => {
                    let txn = self.open.get_mut(id).expect("checked above");
                    txn.deletes.remove(key);
                    txn.writes.insert(key.clone(), value.clone());
                    Outcome::Done
                }
            },
            Operation::Get { key, txn: None } => Outcome::Read(self.values.get(key).cloned()),
            Operation::Get { key, txn: Some(id) } => match self.open.get(id) {
                None => Outcome::Failed(ErrorKind::InvalidTransaction),
                Some(txn) if txn.deletes.contains(key) => Outcome::Read(None),
                Some(txn) => Outcome::Read(
                    txn.writes
                        .get(key)
                        .or_else(|| self.values.get(key))
                        .cloned(),
                ),
            },
            Operation::Delete { key, txn: None } => {
                if self.values.remove(key).is_none() {
                    return Outcome::Failed(ErrorKind::NotFound);
                }
                self.versions.remove(key);
                Outcome::Done
            }
            Operation::Delete { key, txn: Some(id) } => match self.check_lock(key, id) {
                Some(kind) => Outcome::Failed(kind),
                None => {
                    let txn = self.open.get_mut(id).expect("checked above");
                    txn.writes.remove(key);
                    txn.deletes.insert(key.clone());
                    Outcome::Done
                }
            },
            Operation::Commit { txn } => {
                let Some(state) = self.open.remove(txn) else {
                    return Outcome::Failed(ErrorKind::InvalidTransaction);
                };
                let stale = state
                    .writes
                    .keys()
                    .chain(state.deletes.iter())
                    .any(|key| {
                        self.versions.get(key).copied().unwrap_or(0)
                            != state.snapshot.get(key).copied().unwrap_or(0)
                    });
                if stale {
                    return Outcome::Failed(ErrorKind::Conflict);
                }
                for (key, value) in state.writes {
                    *self.versions.entry(key.clone()).or_insert(0) += 1;
                    self.values.insert(key, value);
                }
                for key in state.deletes {
                    self.values.remove(&key);
                    self.versions.remove(&key);
                }
                Outcome::Done
            }
            Operation::Rollback { txn } => match self.open.remove(txn) {
                Some(_) => Outcome::Done,
                None => Outcome::Failed(ErrorKind::InvalidTransaction),
            },
        }
    }

    fn check_lock(&self, key: &str, id: &str) -> Option<ErrorKind> {
        if !self.open.contains_key(id) {
            return Some(ErrorKind::InvalidTransaction);
        }
        let locked = self
            .open
            .iter()
            .any(|(other, txn)| other != id && txn.holds(key));
        locked.then_some(ErrorKind::LockConflict)
    }

    /// Returns the committed key-value pairs.
    pub fn committed(&self) -> &HashMap<String, String> {
        &self.values
    }

    /// Returns the committed version of a key.
    pub fn version_of(&self, key: &str) -> u64 {
        self.versions.get(key).copied().unwrap_or(0)
    }
}

/// Replays operations against a store and the reference model in lockstep.
pub struct ModelHarness {
    /// The store under test.
    pub store: TestStore,
    model: ReferenceModel,
    steps: usize,
}

impl ModelHarness {
    /// Creates a harness over an empty store.
    pub fn new() -> Self {
        Self {
            store: TestStore::new(),
            model: ReferenceModel::new(),
            steps: 0,
        }
    }

    /// Runs one operation on both sides and asserts identical outcomes.
    pub fn apply(&mut self, op: &Operation) -> Outcome {
        let expected = self.model.apply(op);
        let actual = self.run_on_store(op);
        assert_eq!(
            actual, expected,
            "Outcome mismatch at step {} for {:?}",
            self.steps, op
        );
        self.steps += 1;
        actual
    }

    /// Runs a sequence of operations, then checks the committed state.
    pub fn run(&mut self, ops: &[Operation]) {
        for op in ops {
            self.apply(op);
        }
        self.verify_committed();
    }

    /// Asserts the store's committed state equals the model's.
    pub fn verify_committed(&self) {
        let expected = self.model.committed();
        assert_eq!(self.store.len(), expected.len(), "Committed key count mismatch");
        for (key, value) in expected {
            assert_eq!(
                self.store.committed(key).as_ref(),
                Some(value),
                "Committed value mismatch for {key:?}"
            );
            assert_eq!(
                self.store.version_of(key),
                Version::new(self.model.version_of(key)),
                "Version mismatch for {key:?}"
            );
        }
    }

    /// Returns the number of operations applied.
    pub fn steps(&self) -> usize {
        self.steps
    }

    fn run_on_store(&self, op: &Operation) -> Outcome {
        let store = &self.store;
        match op {
            Operation::Create { txn } => Outcome::of_unit(store.begin(txn)),
            Operation::Put { key, value, txn } => {
                Outcome::of_unit(store.put(key, value, txn.as_deref()))
            }
            Operation::Get { key, txn } => Outcome::of_read(store.get(key, txn.as_deref())),
            Operation::Delete { key, txn } => Outcome::of_unit(store.delete(key, txn.as_deref())),
            Operation::Commit { txn } => Outcome::of_unit(store.commit(txn)),
            Operation::Rollback { txn } => Outcome::of_unit(store.rollback(txn)),
        }
    }
}

impl Default for ModelHarness {
    fn default() -> Self {
        Self::new()
    }
}
