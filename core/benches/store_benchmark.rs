/// ArtifactStore Benchmarks using Criterion
///
/// Run with: cargo bench --bench store_benchmark
///
/// Benchmarks cover:
/// - put throughput (includes the per-access sweep)
/// - get on a populated store
/// - sweep cost as the store grows
use bytes::Bytes;
use chrono::Duration;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use murmur_core::{ArtifactId, ArtifactStore, ManualClock};
use std::sync::Arc;

fn payload() -> Bytes {
    Bytes::from(vec![0u8; 4 * 1024])
}

fn populated(count: usize) -> (ArtifactStore, Vec<ArtifactId>) {
    let store = ArtifactStore::with_clock(Duration::seconds(3_600), Arc::new(ManualClock::new()));
    let ids = (0..count).map(|_| store.put(payload())).collect();
    (store, ids)
}

fn bench_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_put");
    // every put sweeps, so filling a store is quadratic in its size
    for count in [10usize, 100, 1_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let (store, _) = populated(count);
                black_box(store.len())
            });
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_get");
    for count in [100usize, 1_000, 10_000].iter() {
        let (store, ids) = populated(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &ids, |b, ids| {
            let mut i = 0usize;
            b.iter(|| {
                let id = &ids[i % ids.len()];
                i += 1;
                black_box(store.get(id).ok())
            });
        });
    }
    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_sweep_nothing_expired");
    for count in [100usize, 1_000, 10_000].iter() {
        let (store, _) = populated(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &store, |b, store| {
            b.iter(|| black_box(store.evict_expired()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_put, bench_get, bench_sweep);
criterion_main!(benches);
