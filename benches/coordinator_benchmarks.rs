//! Performance benchmarks for the iterative coordinator
//! Measures fan-out of ready and pending work, reducer-driven graph walks and
//! end-hook cycles.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use iterative_mapreduce::prelude::*;
use iterative_mapreduce::testing::{yielding_value, GraphBuilder};
use std::hint::black_box;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn bench_ready_fan_out(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("ready_fan_out");

    for size in &[100u32, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("sum", size), size, |b, &num_keys| {
            b.to_async(&rt).iter(|| async move {
                let coordinator: Coordinator<u32, u64, u64, String> =
                    Coordinator::with_keys(0..num_keys);
                coordinator
                    .reduce(|acc, value, _ctx| acc + value)
                    .map(|key: &u32| Work::value(u64::from(*key)));
                black_box(coordinator.wait().await.unwrap());
            });
        });
    }

    group.finish();
}

fn bench_pending_fan_out(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("pending_fan_out");

    for size in &[100u32, 1_000] {
        group.bench_with_input(BenchmarkId::new("yielding", size), size, |b, &num_keys| {
            b.to_async(&rt).iter(|| async move {
                let coordinator: Coordinator<u32, u32, usize, String> =
                    Coordinator::with_keys(0..num_keys);
                coordinator
                    .reduce(|acc, _value, _ctx| acc + 1)
                    .map(|key: &u32| yielding_value(*key));
                black_box(coordinator.wait().await.unwrap());
            });
        });
    }

    group.finish();
}

fn bench_graph_walk(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("graph_walk");

    for depth in &[4u32, 6, 8] {
        group.bench_with_input(BenchmarkId::new("binary_tree", depth), depth, |b, &depth| {
            b.to_async(&rt).iter_batched(
                || Arc::new(GraphBuilder::new().tree(2, depth).build()),
                |graph| async move {
                    let coordinator: Coordinator<u32, u32, usize, String> =
                        Coordinator::with_keys([0]);
                    coordinator
                        .reduce(move |visited, node, ctx| {
                            for &next in graph.neighbours(node) {
                                ctx.remap(next);
                            }
                            visited + 1
                        })
                        .map(|node: &u32| Work::value(*node));
                    black_box(coordinator.wait().await.unwrap());
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_end_hook_cycles(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("end_hook_cycles");

    for cycles in &[10u32, 100] {
        group.bench_with_input(BenchmarkId::new("chain", cycles), cycles, |b, &cycles| {
            b.to_async(&rt).iter(|| async move {
                let coordinator: Coordinator<u32, u32, u32, String> = Coordinator::with_keys([0]);
                coordinator
                    .reduce(|_acc, value, _ctx| value)
                    .end(move |last, ctx| {
                        if *last + 1 < cycles {
                            ctx.remap(*last + 1);
                        }
                    })
                    .map(|key: &u32| Work::value(*key));
                black_box(coordinator.wait().await.unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_ready_fan_out,
    bench_pending_fan_out,
    bench_graph_walk,
    bench_end_hook_cycles
);

criterion_main!(benches);
