/*!
 * Synchronized Map Benchmarks
 *
 * Uncontended operation cost, snapshot cost and contended throughput
 */

use annotation_map::{Annotation, AnnotationModel, LockDomain, MapConfig, Position, SyncMap};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::thread;

fn bench_uncontended_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("uncontended");

    for track_stats in [false, true] {
        let config = MapConfig {
            track_stats,
            ..MapConfig::default()
        };
        let map = SyncMap::with_config(&config);
        for i in 0..1024u64 {
            map.insert(i, i);
        }

        group.bench_with_input(
            BenchmarkId::new("get", format!("stats={}", track_stats)),
            &map,
            |b, map| {
                let mut i = 0u64;
                b.iter(|| {
                    i = (i + 1) & 1023;
                    black_box(map.get(&i))
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("insert", format!("stats={}", track_stats)),
            &map,
            |b, map| {
                let mut i = 0u64;
                b.iter(|| {
                    i = (i + 1) & 1023;
                    black_box(map.insert(i, i))
                });
            },
        );
    }

    group.finish();
}

fn bench_shared_domain(c: &mut Criterion) {
    let map: SyncMap<u64, u64> = SyncMap::new(1024);
    let domain = LockDomain::named("bench");
    map.set_lock_domain(Some(domain.clone()));

    c.bench_function("compound_check_then_insert", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i = (i + 1) & 1023;
            let _held = domain.lock();
            if !map.contains_key(&i) {
                map.insert(i, i);
            }
        });
    });
}

fn bench_snapshots(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for size in [16usize, 256, 4096] {
        let map = SyncMap::new(size);
        for i in 0..size {
            map.insert(i, i);
        }

        group.bench_with_input(BenchmarkId::from_parameter(size), &map, |b, map| {
            b.iter(|| black_box(map.key_snapshot().count()));
        });
    }

    group.finish();
}

fn bench_contended_inserts(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_inserts");
    group.sample_size(20);

    for threads in [2usize, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter(|| {
                let map = Arc::new(SyncMap::new(threads * 256));
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let map = Arc::clone(&map);
                        thread::spawn(move || {
                            for j in 0..256 {
                                map.insert(t * 256 + j, j);
                            }
                        })
                    })
                    .collect();

                for handle in handles {
                    handle.join().unwrap();
                }
                black_box(map.len())
            });
        });
    }

    group.finish();
}

fn bench_model_range_query(c: &mut Criterion) {
    let model = AnnotationModel::new(100_000);
    for i in 0..2_000 {
        let key = Annotation::new("warning").into_key();
        model.add_annotation(key, Position::new(i * 50, 20)).unwrap();
    }

    c.bench_function("model_range_query", |b| {
        b.iter(|| black_box(model.annotations_in_range(40_000, 1_000, true, true).len()));
    });
}

criterion_group!(
    benches,
    bench_uncontended_ops,
    bench_shared_domain,
    bench_snapshots,
    bench_contended_inserts,
    bench_model_range_query
);
criterion_main!(benches);
