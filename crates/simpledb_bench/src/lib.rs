//! Benchmark utilities.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use rand::Rng;
use simpledb_core::{Config, TransactionManager};

/// Transaction manager shape used by the benchmarks.
pub type BenchManager = TransactionManager<u64, Vec<u8>, u64>;

/// Generate random value bytes of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Creates a manager with `count` committed keys `0..count`.
pub fn populated_manager(count: u64, value_size: usize) -> BenchManager {
    let tm = TransactionManager::with_config(Config::new().initial_capacity(count as usize));
    for key in 0..count {
        tm.put(key, random_data(value_size), None)
            .expect("Direct put cannot fail");
    }
    tm
}

/// Opens `count` transactions with ids `1..=count`, each holding one key
/// offset past the populated range.
pub fn hold_open_transactions(tm: &BenchManager, count: u64) {
    for id in 1..=count {
        tm.create_transaction(id).expect("Ids are unique");
        tm.put(u64::MAX - id, Vec::new(), Some(&id))
            .expect("Held keys are distinct");
    }
}
