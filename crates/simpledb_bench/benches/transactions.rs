//! Transaction manager benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use simpledb_bench::{hold_open_transactions, populated_manager, random_data, BenchManager};

/// Benchmark direct writes.
fn bench_direct_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct_put");

    for size in [64, 256, 1024].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let tm = BenchManager::new();
            let data = random_data(size);
            let mut key = 0u64;

            b.iter(|| {
                key = (key + 1) % 10_000;
                tm.put(black_box(key), data.clone(), None).unwrap();
            });
        });
    }
    group.finish();
}

/// Benchmark direct reads from a populated keyspace.
fn bench_direct_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct_get");

    for count in [100u64, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let tm = populated_manager(count, 256);
            let mut rng = rand::thread_rng();

            b.iter(|| {
                let key = rng.gen_range(0..count);
                black_box(tm.get(&key, None).unwrap());
            });
        });
    }
    group.finish();
}

/// Benchmark create, write batch, commit.
///
/// Creation snapshots every committed version, so cost grows with the
/// keyspace as well as the batch.
fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit");

    for (keyspace, batch) in [(100u64, 1u64), (100, 100), (10_000, 1), (10_000, 100)] {
        group.throughput(Throughput::Elements(batch));
        group.bench_function(format!("keys_{keyspace}/batch_{batch}"), |b| {
            let tm = populated_manager(keyspace, 64);
            let data = random_data(64);

            b.iter(|| {
                tm.create_transaction(0).unwrap();
                for key in 0..batch {
                    tm.put(key, data.clone(), Some(&0)).unwrap();
                }
                tm.commit_transaction(&0).unwrap();
            });
        });
    }
    group.finish();
}

/// Benchmark rollback of a buffered batch.
fn bench_rollback(c: &mut Criterion) {
    c.bench_function("rollback_100", |b| {
        let tm = BenchManager::new();
        let data = random_data(64);

        b.iter(|| {
            tm.create_transaction(0).unwrap();
            for key in 0..100 {
                tm.put(key, data.clone(), Some(&0)).unwrap();
            }
            tm.rollback_transaction(&0).unwrap();
        });
    });
}

/// Benchmark the cross-transaction lock check with many open transactions.
fn bench_lock_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("lock_check");

    for open in [1u64, 16, 256].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(open), open, |b, &open| {
            let tm = BenchManager::new();
            hold_open_transactions(&tm, open);
            tm.create_transaction(0).unwrap();

            b.iter(|| {
                // Conflicting write against the first holder's key.
                let result = tm.put(black_box(u64::MAX - 1), Vec::new(), Some(&0));
                black_box(result.is_err());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_direct_put,
    bench_direct_get,
    bench_commit,
    bench_rollback,
    bench_lock_check,
);

criterion_main!(benches);
