use std::sync::Arc;

use cachestorm_core::testing::fixtures::{Order, Product, Store};
use cachestorm_core::testing::{FakeDataContext, RecordingCacheStore, StaticResolver};
use cachestorm_core::{MetadataRegistry, Warmup};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

fn store(rows: u32) -> Store {
    Store::new(
        FakeDataContext::new()
            .with_rows((0..rows).map(|id| Product::new(id, "product")).collect())
            .with_rows((0..rows).map(|id| Order::new(id, id % 17)).collect()),
    )
}

fn populate_benchmark(c: &mut Criterion) {
    let registry = MetadataRegistry::new().with::<Store>();

    let mut group = c.benchmark_group("populate");
    group.sample_size(50);

    for rows in [100_u32, 10_000] {
        group.bench_function(format!("cold_{rows}_rows"), |b| {
            let instance = store(rows);
            b.iter_batched(
                || {
                    StaticResolver::new()
                        .with_cache(Arc::new(RecordingCacheStore::new()))
                        .with_instance(instance.clone())
                },
                |resolver| {
                    black_box(Warmup::new(&registry).try_at_resolution(&resolver).unwrap());
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.bench_function("warm_all_skipped", |b| {
        let resolver = StaticResolver::new()
            .with_cache(Arc::new(RecordingCacheStore::new()))
            .with_instance(store(1_000));
        let warmup = Warmup::new(&registry);
        warmup.try_at_resolution(&resolver).unwrap();

        b.iter(|| black_box(warmup.try_at_resolution(&resolver).unwrap()));
    });

    group.finish();
}

criterion_group!(core_benchmarks, populate_benchmark);
criterion_main!(core_benchmarks);
