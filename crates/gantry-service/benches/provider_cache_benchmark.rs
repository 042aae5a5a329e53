//! Provider cache benchmark.
//!
//! Measures the in-process cost of the cache layer (key building, JSON
//! encoding and indirection) over the in-memory backend.
//!
//! ```bash
//! cargo bench --package gantry-service
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gantry_config::CacheConfig;
use gantry_core::{PageWindow, Provider};
use gantry_service::{InMemoryCacheBackend, ProviderCache, ProviderCacheImpl};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn cache() -> ProviderCacheImpl {
    ProviderCacheImpl::new(Arc::new(InMemoryCacheBackend::new()), &CacheConfig::default())
}

fn sample_page(count: usize) -> Vec<Provider> {
    (0..count)
        .map(|i| Provider::new(format!("provider-{i}"), format!("Provider number {i}")))
        .collect()
}

fn benchmark_entity_lookups(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let cache = cache();
    let provider = Provider::new("aws", "Amazon Web Services");
    rt.block_on(cache.set_all(&provider)).unwrap();

    let mut group = c.benchmark_group("entity");

    group.bench_function("get_by_id", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(cache.get_by_id(provider.id).await.unwrap()) });
    });

    group.bench_function("get_by_short_name", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(cache.get_by_short_name("aws").await.unwrap()) });
    });

    group.bench_function("set_all", |b| {
        b.to_async(&rt).iter(|| async { cache.set_all(black_box(&provider)).await.unwrap() });
    });

    group.finish();
}

fn benchmark_paged_lookups(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let cache = cache();

    let mut group = c.benchmark_group("paged");

    for size in [10_usize, 50, 100] {
        let window = PageWindow::new(0, i64::try_from(size).unwrap());
        rt.block_on(cache.set_paged(window, &sample_page(size))).unwrap();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("get_paged", size), &window, |b, window| {
            b.to_async(&rt)
                .iter(|| async { black_box(cache.get_paged(*window).await.unwrap()) });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_entity_lookups, benchmark_paged_lookups);
criterion_main!(benches);
