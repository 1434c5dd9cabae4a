//! Performance benchmarks for the QRE and CFR solvers.
//!
//! Run with: cargo bench
//!
//! The residual and Jacobian benchmarks track the dominant costs of a Newton
//! iteration; the CFR benchmarks give the comparison baseline.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use nalgebra::DVector;

use quantal::poker::{KuhnPoker, LeducPoker, QreResidual};
use quantal::solver::{jacobian, CfrSolver, CfrVariant};

/// Benchmark one residual evaluation on Kuhn.
fn bench_kuhn_residual(c: &mut Criterion) {
    let game = KuhnPoker::new();
    let qre = QreResidual::new(&game, 2.0);
    let w = DVector::zeros(qre.dim());

    c.bench_function("kuhn_residual", |b| {
        b.iter(|| qre.residual(black_box(&w)));
    });
}

/// Benchmark the parallel central-difference Jacobian on Kuhn.
fn bench_kuhn_jacobian(c: &mut Criterion) {
    let game = KuhnPoker::new();
    let qre = QreResidual::new(&game, 2.0);
    let w = DVector::zeros(qre.dim());
    let f = |x: &DVector<f64>| qre.residual(x);

    let mut group = c.benchmark_group("kuhn_jacobian");
    group.throughput(Throughput::Elements(2 * qre.dim() as u64));
    group.bench_function("central", |b| {
        b.iter(|| jacobian(&f, black_box(&w), 1e-6, true));
    });
    group.finish();
}

/// Benchmark one residual evaluation on the much larger Leduc system.
fn bench_leduc_residual(c: &mut Criterion) {
    let game = LeducPoker::new();
    let qre = QreResidual::new(&game, 2.0);
    let w = DVector::zeros(qre.dim());

    c.bench_function("leduc_residual", |b| {
        b.iter(|| qre.residual(black_box(&w)));
    });
}

/// Benchmark CFR iteration throughput on Kuhn.
fn bench_cfr_iterations(c: &mut Criterion) {
    let game = KuhnPoker::new();
    let iters = 100u64;

    let mut group = c.benchmark_group("cfr");
    group.throughput(Throughput::Elements(iters));
    group.bench_function("kuhn_100_iters", |b| {
        b.iter(|| {
            let mut solver = CfrSolver::new(&game, CfrVariant::Plus);
            solver.solve(black_box(iters as usize));
        });
    });
    group.finish();
}

/// Benchmark exploitability evaluation after training.
fn bench_exploitability(c: &mut Criterion) {
    let game = KuhnPoker::new();
    let mut solver = CfrSolver::new(&game, CfrVariant::Plus);
    solver.solve(500);

    c.bench_function("kuhn_exploitability", |b| {
        b.iter(|| solver.exploitability());
    });
}

criterion_group!(
    benches,
    bench_kuhn_residual,
    bench_kuhn_jacobian,
    bench_leduc_residual,
    bench_cfr_iterations,
    bench_exploitability,
);

criterion_main!(benches);
