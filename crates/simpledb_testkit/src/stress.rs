//! Stress tests for SimpleDB.
//!
//! These tests verify behavior under concurrent access: no lost updates,
//! at most one transaction holding a key at a time, and commits that
//! other threads only ever see whole.

use simpledb_core::{CoreError, TransactionManager};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

/// Transaction manager used by the counter scenarios.
pub type CounterManager = TransactionManager<String, u64, String>;

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations attempted.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Operations rejected by conflict detection.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Logs a summary of the run.
    pub fn log_summary(&self, name: &str) {
        tracing::info!(
            name,
            total = self.total_ops,
            successful = self.successful_ops,
            failed = self.failed_ops,
            duration = ?self.duration,
            ops_per_second = self.ops_per_second,
            "stress run finished"
        );
    }
}

/// Result of a scenario that checks commits are seen all at once.
#[derive(Debug, Clone)]
pub struct VisibilityResult {
    /// Commits applied (successful) and rejected (failed).
    pub commits: StressTestResult,
    /// Observations of a partially applied commit.
    pub torn_reads: usize,
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Successful operations each thread must complete.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Number of distinct keys.
    pub key_count: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 200,
            threads: 4,
            key_count: 8,
        }
    }
}

fn counter_key(i: usize) -> String {
    format!("counter-{i}")
}

fn increment_in(tm: &CounterManager, txn: &String, key: &String) -> Result<(), CoreError> {
    let current = tm.get(key, Some(txn))?.unwrap_or(0);
    tm.put(key.clone(), current + 1, Some(txn))
}

/// Runs one read-increment-commit transaction.
fn try_increment(tm: &CounterManager, txn: &String, key: &String) -> Result<(), CoreError> {
    tm.create_transaction(txn.clone())?;
    match increment_in(tm, txn, key) {
        Ok(()) => tm.commit_transaction(txn),
        Err(err) => {
            tm.rollback_transaction(txn)?;
            Err(err)
        }
    }
}

/// Concurrently increments counters inside transactions, retrying on
/// conflicts.
///
/// Every thread completes `operations` increments spread over `key_count`
/// counters. Returns the number of retries as failed operations. With no
/// lost updates the counters sum to `threads * operations`.
pub fn stress_concurrent_increments(
    tm: Arc<CounterManager>,
    config: &StressConfig,
) -> StressTestResult {
    for i in 0..config.key_count {
        tm.put(counter_key(i), 0, None)
            .expect("Direct put cannot fail");
    }

    let retries = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let tm = Arc::clone(&tm);
            let retries = Arc::clone(&retries);
            let config = config.clone();

            thread::spawn(move || {
                let txn = format!("worker-{t}");
                for i in 0..config.operations {
                    let key = counter_key((t + i) % config.key_count);
                    loop {
                        match try_increment(&tm, &txn, &key) {
                            Ok(()) => break,
                            Err(err) if err.is_conflict() => {
                                retries.fetch_add(1, Ordering::Relaxed);
                                thread::yield_now();
                            }
                            Err(err) => panic!("Unexpected error: {err}"),
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        config.threads * config.operations,
        retries.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Sums every counter written by [`stress_concurrent_increments`].
pub fn counter_total(tm: &CounterManager, config: &StressConfig) -> u64 {
    (0..config.key_count)
        .map(|i| {
            tm.get(&counter_key(i), None)
                .expect("Direct get cannot fail")
                .unwrap_or(0)
        })
        .sum()
}

/// Races `threads` open transactions to write the same key.
///
/// Each round, all transactions are opened, then released together to
/// write the key, then resolved. Returns the number of writers that won
/// the key's lock in each round.
pub fn stress_lock_race(tm: Arc<CounterManager>, config: &StressConfig) -> Vec<usize> {
    let rounds = config.operations;
    let key = "contended".to_string();
    let opened = Arc::new(Barrier::new(config.threads));
    let written = Arc::new(Barrier::new(config.threads));
    let resolved = Arc::new(Barrier::new(config.threads));
    let winners: Arc<Vec<AtomicUsize>> = Arc::new((0..rounds).map(|_| AtomicUsize::new(0)).collect());

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let tm = Arc::clone(&tm);
            let key = key.clone();
            let (opened, written, resolved) =
                (Arc::clone(&opened), Arc::clone(&written), Arc::clone(&resolved));
            let winners = Arc::clone(&winners);

            thread::spawn(move || {
                let txn = format!("racer-{t}");
                for round in 0..rounds {
                    tm.create_transaction(txn.clone())
                        .expect("Racer ids are unique");
                    opened.wait();

                    let won = match tm.put(key.clone(), round as u64, Some(&txn)) {
                        Ok(()) => true,
                        Err(CoreError::LockConflict { .. }) => false,
                        Err(err) => panic!("Unexpected error: {err}"),
                    };
                    if won {
                        winners[round].fetch_add(1, Ordering::Relaxed);
                    }
                    written.wait();

                    if won {
                        tm.commit_transaction(&txn).expect("Winner commits cleanly");
                    } else {
                        tm.rollback_transaction(&txn).expect("Loser rolls back");
                    }
                    resolved.wait();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    winners.iter().map(|w| w.load(Ordering::Relaxed)).collect()
}

/// Mixes direct writes with transactional writes to the same keys.
///
/// Half the threads write directly, half transactionally. Returns the
/// transactional commits as successes and rejected transactions as failures.
pub fn stress_mixed_direct_and_transactional(
    tm: Arc<CounterManager>,
    config: &StressConfig,
) -> StressTestResult {
    let committed = Arc::new(AtomicUsize::new(0));
    let rejected = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let tm = Arc::clone(&tm);
            let committed = Arc::clone(&committed);
            let rejected = Arc::clone(&rejected);
            let config = config.clone();

            thread::spawn(move || {
                let txn = format!("mixed-{t}");
                for i in 0..config.operations {
                    let key = counter_key(i % config.key_count);
                    if t % 2 == 0 {
                        tm.put(key, i as u64, None).expect("Direct put cannot fail");
                        continue;
                    }
                    match try_increment(&tm, &txn, &key) {
                        Ok(()) => {
                            committed.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(err) if err.is_conflict() => {
                            rejected.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(err) => panic!("Unexpected error: {err}"),
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        committed.load(Ordering::Relaxed),
        rejected.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Commits two-key transactions while other threads read both keys directly.
///
/// One writer commits `round` to `pair-0` and `pair-1` in a single
/// transaction for every round. `threads - 1` readers (at least one) load
/// `pair-0` and then `pair-1`; since both keys change in one commit, the
/// second read can never be older than the first.
pub fn stress_pair_visibility(tm: Arc<CounterManager>, config: &StressConfig) -> VisibilityResult {
    let (first, second) = ("pair-0".to_string(), "pair-1".to_string());
    let done = Arc::new(AtomicBool::new(false));
    let torn = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let readers: Vec<_> = (0..config.threads.saturating_sub(1).max(1))
        .map(|_| {
            let tm = Arc::clone(&tm);
            let (first, second) = (first.clone(), second.clone());
            let (done, torn) = (Arc::clone(&done), Arc::clone(&torn));

            thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    let a = tm.get(&first, None).expect("Direct get cannot fail");
                    let b = tm.get(&second, None).expect("Direct get cannot fail");
                    if b.unwrap_or(0) < a.unwrap_or(0) {
                        torn.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    let txn = "pair-writer".to_string();
    let mut committed = 0;
    for round in 1..=config.operations as u64 {
        let outcome = tm.create_transaction(txn.clone()).and_then(|()| {
            tm.put(first.clone(), round, Some(&txn))?;
            tm.put(second.clone(), round, Some(&txn))?;
            tm.commit_transaction(&txn)
        });
        if outcome.is_ok() {
            committed += 1;
        }
    }
    done.store(true, Ordering::Release);

    for handle in readers {
        handle.join().expect("Thread panicked");
    }

    VisibilityResult {
        commits: StressTestResult::new(committed, config.operations - committed, start.elapsed()),
        torn_reads: torn.load(Ordering::Relaxed),
    }
}

/// Races direct deletes of a key against commits that write it.
///
/// Each round one transaction writes `round` to `victim` and `witness` and
/// commits, while `threads - 1` deleters (at least one) keep deleting
/// `victim` directly. A delete landing between snapshot and commit must
/// reject the whole commit. After every commit attempt, `witness` must hold
/// the last applied round and a rejected round must not be visible in
/// `victim`; any violation counts as a torn read.
pub fn stress_delete_races_commit(
    tm: Arc<CounterManager>,
    config: &StressConfig,
) -> VisibilityResult {
    let (victim, witness) = ("victim".to_string(), "witness".to_string());
    let done = Arc::new(AtomicBool::new(false));
    let start = Instant::now();

    let deleters: Vec<_> = (0..config.threads.saturating_sub(1).max(1))
        .map(|_| {
            let tm = Arc::clone(&tm);
            let victim = victim.clone();
            let done = Arc::clone(&done);

            thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    match tm.delete(&victim, None) {
                        Ok(()) | Err(CoreError::NotFound { .. }) => thread::yield_now(),
                        Err(err) => panic!("Unexpected error: {err}"),
                    }
                }
            })
        })
        .collect();

    let txn = "victim-writer".to_string();
    let (mut committed, mut rejected, mut torn) = (0, 0, 0);
    let mut last_applied: Option<u64> = None;
    let mut failure = None;

    for round in 1..=config.operations as u64 {
        tm.create_transaction(txn.clone())
            .expect("Writer id is never left open");
        let staged = tm
            .put(victim.clone(), round, Some(&txn))
            .and_then(|()| tm.put(witness.clone(), round, Some(&txn)));
        if let Err(err) = staged {
            failure = Some(err);
            break;
        }

        match tm.commit_transaction(&txn) {
            Ok(()) => {
                committed += 1;
                last_applied = Some(round);
            }
            Err(CoreError::Conflict { .. }) => {
                rejected += 1;
                if tm.get(&victim, None).ok().flatten() == Some(round) {
                    torn += 1;
                }
            }
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
        if tm.get(&witness, None).ok().flatten() != last_applied {
            torn += 1;
        }
    }
    done.store(true, Ordering::Release);

    for handle in deleters {
        handle.join().expect("Thread panicked");
    }
    if let Some(err) = failure {
        panic!("Unexpected error: {err}");
    }

    VisibilityResult {
        commits: StressTestResult::new(committed, rejected, start.elapsed()),
        torn_reads: torn,
    }
}
