use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shardcount::adapters::{MemoryStore, NoCache};
use shardcount::CounterService;

const NUM_THREADS: usize = 8;
const ITERATIONS_PER_THREAD: usize = 1_000;

fn run_increments(shards: usize) -> i64 {
    let store = Arc::new(MemoryStore::new().with_max_attempts(u32::MAX));
    let counters = CounterService::new(store, Arc::new(NoCache)).with_default_shards(shards);
    let mut handles = vec![];

    for _ in 0..NUM_THREADS {
        let counters = counters.clone();
        let handle = thread::spawn(move || {
            for _ in 0..ITERATIONS_PER_THREAD {
                counters.increment("requests", 1).unwrap();
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    counters.count("requests").unwrap()
}

fn bench_increment(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_increment");
    group.sample_size(20);

    for shards in [1, 20] {
        group.bench_function(
            BenchmarkId::new(
                format!("{shards} shard(s)"),
                format!("{}threads x {}iter", NUM_THREADS, ITERATIONS_PER_THREAD),
            ),
            |b| b.iter(|| black_box(run_increments(shards))),
        );
    }

    group.finish();
}

fn bench_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_count");

    for shards in [1, 20, 200] {
        let store = Arc::new(MemoryStore::new());
        let counters = CounterService::new(store, Arc::new(NoCache)).with_default_shards(shards);
        for _ in 0..shards * 10 {
            counters.increment("requests", 1).unwrap();
        }

        group.bench_function(BenchmarkId::new("uncached sum", shards), |b| {
            b.iter(|| black_box(counters.count("requests").unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_increment, bench_count);
criterion_main!(benches);
