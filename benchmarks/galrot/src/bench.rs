//! Rotation-curve pipeline benchmarks using Criterion.
//!
//! Benchmarks cover:
//! - The χ → L_eff profile pass (50 to 5K radii)
//! - Adaptive interpolation over the 8-scale basis
//! - The FFT baseline model at small grid sizes, cold and with warm caches

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use galrot::prelude::*;
use galrot_cli::config::ModelConfig;
use galrot_cli::io::{GalaxyRecord, ObservedCurve};
use galrot_cli::model::{GalaxyModel, KernelCache, KernelShape};
use rand::prelude::*;
use rand_distr::Normal;
use std::hint::black_box;

// ============================================================================
// Data Generation with Reproducible RNG
// ============================================================================

/// Exponential-disk-like baryonic curve with Gaussian noise.
fn generate_curve(size: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.5).unwrap();

    let r: Vec<f64> = (1..=size).map(|i| i as f64 * 20.0 / size as f64).collect();
    let v: Vec<f64> = r
        .iter()
        .map(|&x| (120.0 * x / (x + 2.5) + noise.sample(&mut rng)).max(1.0))
        .collect();
    (r, v)
}

/// Basis curves that rise as the scale shrinks.
fn generate_basis(r: &[f64], v_baseline: &[f64], l0: f64) -> BasisSet<f64> {
    let members = basis_scales(l0, &DEFAULT_MULTIPLIERS)
        .into_iter()
        .map(|l| {
            let v = v_baseline.iter().map(|&v| v + 0.4 * (l0 - l)).collect();
            (l, v)
        })
        .collect();
    BasisSet::new(r.to_vec(), members).unwrap()
}

fn galaxy() -> GalaxyRecord {
    GalaxyRecord {
        name: "BENCH".to_string(),
        rd_star: 2.5,
        mstar: 3e10,
        hz_star: 0.3,
        rd_gas: 4.5,
        mgas: 8e9,
        hz_gas: 0.15,
    }
}

fn observed() -> ObservedCurve {
    let (r, v) = generate_curve(30, 7);
    let v_err = vec![3.0; r.len()];
    ObservedCurve { r, v, v_err }
}

// ============================================================================
// Benchmark Functions
// ============================================================================

fn bench_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("profile");
    group.sample_size(50);

    let model = Adaptive::new().alpha(1.0).taper(0.70, 80.0).build().unwrap();
    for size in [50, 500, 5_000] {
        group.throughput(Throughput::Elements(size as u64));
        let (r, v) = generate_curve(size, 42);
        group.bench_with_input(BenchmarkId::new("chi_leff", size), &size, |b, _| {
            b.iter(|| {
                model
                    .profile(black_box(&r), black_box(&v), 2.5, 30.0)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_adapt(c: &mut Criterion) {
    let mut group = c.benchmark_group("adapt");
    group.sample_size(50);

    let model = Adaptive::new().alpha(2.0).build().unwrap();
    for size in [50, 500, 5_000] {
        group.throughput(Throughput::Elements(size as u64));
        let (r, vb) = generate_curve(size, 42);
        let v_baseline: Vec<f64> = vb.iter().map(|v| v * 1.2).collect();
        let profile = model.profile(&r, &vb, 2.5, 30.0).unwrap();
        let basis = generate_basis(&r, &v_baseline, 30.0);
        group.bench_with_input(BenchmarkId::new("basis8", size), &size, |b, _| {
            b.iter(|| {
                model
                    .adapt(black_box(&profile), black_box(&basis), &v_baseline)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_baseline_model(c: &mut Criterion) {
    let mut group = c.benchmark_group("baseline_model");
    group.sample_size(10);

    for max_n in [64, 96] {
        let config = ModelConfig {
            dx: None,
            max_n,
            ..ModelConfig::default()
        };

        group.bench_with_input(BenchmarkId::new("cold", max_n), &max_n, |b, _| {
            b.iter(|| {
                let cache = KernelCache::new();
                let model = GalaxyModel::new(&galaxy(), observed(), config);
                model
                    .predict(10.0, 50.0, KernelShape::AnantaHybrid, 1.15, &cache)
                    .unwrap()
            })
        });

        let cache = KernelCache::new();
        let model = GalaxyModel::new(&galaxy(), observed(), config);
        model
            .predict(10.0, 50.0, KernelShape::AnantaHybrid, 1.15, &cache)
            .unwrap();
        group.bench_with_input(BenchmarkId::new("warm", max_n), &max_n, |b, _| {
            b.iter(|| {
                model
                    .predict(black_box(10.0), 50.0, KernelShape::AnantaHybrid, 1.15, &cache)
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_profile, bench_adapt, bench_baseline_model);
criterion_main!(benches);
