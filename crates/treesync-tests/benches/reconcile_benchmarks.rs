//! Reconciliation benchmarks
//!
//! Measures a run over an already synchronized tree, where every file is
//! skipped, in fast and verify mode, and a full initial copy.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use treesync_engine::{SyncEngine, SyncOptions, SyncRequest};
use treesync_tests::test_utils::TestTrees;
use treesync_types::NullSink;

const FILE_SIZE: usize = 16 * 1024;

fn synced_trees(count: usize) -> TestTrees {
    let trees = TestTrees::new();
    trees.populate_source(count, FILE_SIZE);
    let request = SyncRequest::new(&trees.source, &trees.destination);
    SyncEngine::new().run(request, &mut NullSink);
    trees
}

/// Benchmark a no-op run with metadata-only and digest-confirmed comparison
fn benchmark_up_to_date_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("up_to_date_tree");
    let engine = SyncEngine::new();

    for count in [50usize, 200] {
        let trees = synced_trees(count);
        group.throughput(Throughput::Elements(count as u64));

        for (name, options) in [
            ("fast", SyncOptions::default()),
            ("verify", SyncOptions::default().verify()),
        ] {
            group.bench_with_input(BenchmarkId::new(name, count), &count, |b, _| {
                b.iter(|| {
                    let request = SyncRequest::new(&trees.source, &trees.destination)
                        .with_options(options);
                    black_box(engine.run(request, &mut NullSink))
                });
            });
        }
    }

    group.finish();
}

/// Benchmark copying a tree into an empty destination
fn benchmark_initial_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("initial_copy");
    let count = 100usize;
    group.throughput(Throughput::Bytes((count * FILE_SIZE) as u64));

    group.bench_function("copy_100_files", |b| {
        b.iter_batched(
            || {
                let trees = TestTrees::new();
                trees.populate_source(count, FILE_SIZE);
                trees
            },
            |trees| {
                let request = SyncRequest::new(&trees.source, &trees.destination);
                black_box(SyncEngine::new().run(request, &mut NullSink))
            },
            BatchSize::PerIteration,
        );
    });

    group.finish();
}

criterion_group!(benches, benchmark_up_to_date_tree, benchmark_initial_copy);
criterion_main!(benches);
