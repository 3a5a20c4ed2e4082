use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use halo_life::algs::update::update_interior;
use halo_life::prelude::*;

fn random_partition(rows: usize, cols: usize, threads: Option<usize>) -> Partition<NoComm> {
    let mut cfg = LifeConfig::new(rows, cols, 1).with_seed(42);
    cfg.threads = threads;
    Partition::new(cfg.clone(), NoComm, &InitialState::random(&cfg)).unwrap()
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_interior");

    for &n in &[128usize, 512, 2048] {
        let p = random_partition(n, n, None);
        let current = p.current().clone();
        let mut next = LocalGrid::new(n, n);
        group.bench_with_input(BenchmarkId::new("square", n), &n, |b, _| {
            b.iter(|| update_interior(&current, &mut next).unwrap());
        });
    }

    group.finish();
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition_step");

    for threads in [None, Some(1), Some(4)] {
        let mut p = random_partition(1024, 1024, threads);
        let label = threads.map_or("global".to_string(), |t| format!("pool{t}"));
        group.bench_function(BenchmarkId::new("1024", label), |b| {
            b.iter(|| p.step().unwrap());
        });
    }

    group.finish();
}

fn bench_ring(c: &mut Criterion) {
    let mut group = c.benchmark_group("local_ring");
    group.sample_size(10);

    for workers in [1usize, 2, 4, 8] {
        let cfg = LifeConfig::new(512, 512, 20).with_workers(workers);
        let init = InitialState::RandomRows { probability: 0.25 };
        group.bench_with_input(BenchmarkId::new("512x512x20", workers), &cfg, |b, cfg| {
            b.iter(|| run_local_ring(cfg, &init, &StepDriver::new(cfg), |_| {}).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_update, bench_step, bench_ring);
criterion_main!(benches);
