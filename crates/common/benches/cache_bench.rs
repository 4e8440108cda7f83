//! Cache benchmarks
//!
//! Insert and lookup costs for the per-entry TTL cache used by warm-up
//! stores.
//!
//! Run with: `cargo bench --bench cache_bench -p cachestorm-common --features
//! runtime`

use std::sync::Arc;
use std::time::Duration;

use cachestorm_common::cache::{Cache, CacheConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

type SnapshotCache = Cache<String, Arc<Vec<u64>>>;

fn bench_insert_with_ttl(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_insert_with_ttl");

    for rows in [10usize, 1_000, 100_000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("rows", rows), &rows, |b, &rows| {
            let cache: SnapshotCache = Cache::new(CacheConfig::per_entry_ttl());
            let payload = Arc::new((0..rows as u64).collect::<Vec<_>>());
            let mut counter = 0u64;
            b.iter(|| {
                cache.insert_with_ttl(
                    black_box(format!("key-{}", counter % 64)),
                    Arc::clone(&payload),
                    Duration::from_secs(1800),
                );
                counter = counter.wrapping_add(1);
            });
        });
    }

    group.finish();
}

fn bench_contains_key(c: &mut Criterion) {
    let cache: SnapshotCache = Cache::new(CacheConfig::per_entry_ttl());
    for i in 0..64 {
        cache.insert_with_ttl(format!("key-{i}"), Arc::new(vec![i]), Duration::from_secs(1800));
    }

    c.bench_function("cache_contains_key", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            let key = format!("key-{}", counter % 128);
            black_box(cache.contains_key(&key));
            counter = counter.wrapping_add(1);
        });
    });
}

criterion_group!(benches, bench_insert_with_ttl, bench_contains_key);
criterion_main!(benches);
