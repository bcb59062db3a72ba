use CompMath::numerical::linear_systems::gauss::gauss_solve;
use CompMath::numerical::quadrature::quadrature_rules::{QuadratureMethod, QuadratureSolver};
use CompMath::numerical::root_finding::root_solver::{RootMethod, RootSolver};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nalgebra::{DMatrix, DVector};
use std::hint::black_box;

fn dominant_system(n: usize) -> (DMatrix<f64>, DVector<f64>) {
    let a = DMatrix::from_fn(n, n, |i, j| if i == j { 2.0 * n as f64 } else { 1.0 / (1.0 + (i + j) as f64) });
    let b = DVector::from_fn(n, |i, _| i as f64 + 1.0);
    (a, b)
}

fn bench_gauss(c: &mut Criterion) {
    let mut group = c.benchmark_group("Gauss elimination");
    for n in [10, 50, 100] {
        let (a, b) = dominant_system(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| gauss_solve(black_box(&a), black_box(&b)))
        });
    }
    group.finish();
}

fn bench_bisection(c: &mut Criterion) {
    c.bench_function("bisection x^3 - 2x - 5", |b| {
        b.iter(|| {
            let mut solver = RootSolver::new(RootMethod::Bisection, "x**3 - 2*x - 5", 2.0, 3.0);
            let _ = solver.set_params(1e-10, 200);
            solver.solve()
        })
    });
}

fn bench_simpson(c: &mut Criterion) {
    c.bench_function("Simpson sin(x^2), n = 1000", |b| {
        b.iter(|| {
            let mut solver = QuadratureSolver::new(QuadratureMethod::Simpson, "sin(x^2)", 0.0, 1.0, black_box(1000));
            solver.set_compare(false);
            solver.solve()
        })
    });
}

criterion_group!(benches, bench_gauss, bench_bisection, bench_simpson);
criterion_main!(benches);
