//! Criterion benchmarks comparing the sequential and parallel solvers.
//!
//! Run with:
//!   cargo bench -p mouse-maze-system-solver
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mouse_maze_core::{CellCoord, RewardGrid};
use mouse_maze_system_solver::{solve_parallel, solve_sequential, SolverConfig, StopRule};

fn make_grid(size: u32) -> RewardGrid {
    let mut overrides = vec![
        (CellCoord::new(0, size - 1), 1.0),
        (CellCoord::new(size / 2, size / 2), -3.0),
    ];
    for row in (2..size).step_by(4) {
        for column in 1..size / 2 {
            overrides.push((CellCoord::new(row, column), -0.1));
        }
    }
    RewardGrid::with_overrides(size, &overrides).expect("benchmark grid is square")
}

/// Benchmark a fixed number of sweeps so both solvers do identical work.
fn bench_fixed_sweeps(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_sweeps");
    let config = SolverConfig::new(0.9)
        .and_then(|config| config.with_stop(StopRule::FixedSweeps(20)))
        .expect("valid benchmark configuration");

    for size in [20u32, 64, 128, 256].iter() {
        let grid = make_grid(*size);
        group.throughput(Throughput::Elements(u64::from(*size) * u64::from(*size)));

        group.bench_with_input(BenchmarkId::new("sequential", size), &grid, |b, grid| {
            b.iter(|| black_box(solve_sequential(grid, &config).map(|solution| solution.sweeps())));
        });

        group.bench_with_input(BenchmarkId::new("parallel", size), &grid, |b, grid| {
            b.iter(|| black_box(solve_parallel(grid, &config).map(|solution| solution.sweeps())));
        });
    }

    group.finish();
}

/// Benchmark a full solve to convergence on the default board size.
fn bench_converge(c: &mut Criterion) {
    let grid = make_grid(20);
    let config = SolverConfig::default();

    c.bench_function("converge_sequential_20", |b| {
        b.iter(|| black_box(solve_sequential(&grid, &config).map(|solution| solution.sweeps())));
    });
    c.bench_function("converge_parallel_20", |b| {
        b.iter(|| black_box(solve_parallel(&grid, &config).map(|solution| solution.sweeps())));
    });
}

criterion_group!(benches, bench_fixed_sweeps, bench_converge);
criterion_main!(benches);
