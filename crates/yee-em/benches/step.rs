//! Criterion benchmarks for coefficient construction and leapfrog iterations.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use yee_em::{
    MIN_WORKERS, MaterialLibrary, NullProfiler, RankDomain, SimulationMode, SourceInjector,
    StepperOptions, TimeStepper, Verbosity, YeeGrid, build_update_coefficients,
    compute_stable_time_step,
};

const SPACING: [f64; 3] = [1e-3; 3];

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn air_grid(n: usize) -> (YeeGrid, MaterialLibrary) {
    let lib = MaterialLibrary::with_air();
    let grid = YeeGrid::build(
        RankDomain::single_rank([n; 3]),
        SPACING,
        &SimulationMode::AirEverywhere,
        &lib,
    )
    .unwrap();
    (grid, lib)
}

fn dipole_stepper(n: usize) -> TimeStepper {
    let (grid, lib) = air_grid(n);
    let centre = (n / 2) as f64 * SPACING[0];
    let mut sources = SourceInjector::new().with_verbosity(Verbosity::Quiet);
    sources.set_region_count(1).unwrap();
    sources.set_center(0, [centre; 3]).unwrap();
    sources.set_lengths(0, [0.0, 0.0, 4.0 * SPACING[2]]).unwrap();
    sources.set_frequencies(&[10e9]).unwrap();
    sources.finalize_region(0, SPACING).unwrap();

    // Far enough that the benchmark never reaches the stop state
    let options = StepperOptions::new(1.0)
        .with_workers(MIN_WORKERS)
        .with_verbosity(Verbosity::Quiet);
    TimeStepper::new(grid, sources, &lib, options, &mut NullProfiler).unwrap()
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_coefficients(c: &mut Criterion) {
    let mut group = c.benchmark_group("coefficients");
    for n in [16, 32, 64] {
        let (grid, lib) = air_grid(n);
        let dt = compute_stable_time_step(&lib, SPACING).unwrap();
        group.bench_with_input(BenchmarkId::new("build", n), &n, |b, _| {
            b.iter(|| build_update_coefficients(&grid, dt).unwrap());
        });
    }
    group.finish();
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("leapfrog_step");
    group.sample_size(20);
    for n in [16, 32, 64] {
        let mut stepper = dipole_stepper(n);
        group.bench_with_input(BenchmarkId::new("step", n), &n, |b, _| {
            b.iter(|| stepper.step().unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_coefficients, bench_step);
criterion_main!(benches);
