//! Benchmarks for lintner-model fitting and diagnostics.
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lintner_model::{AugmentedDickeyFuller, DiagnosticsConfig, FactorModel, diagnose};
use lintner_primitives::{Date, ReturnSeries};
use lintner_traits::UnitRootTest;
use ndarray::Array1;
use rand::Rng;

fn random_returns(name: &str, n: usize) -> ReturnSeries {
    let mut rng = rand::thread_rng();
    let dates = Date::from_ymd_opt(2010, 1, 4).unwrap().iter_days().take(n).collect();
    let values = Array1::from_iter((0..n).map(|_| rng.r#gen::<f64>() * 0.04 - 0.02));
    ReturnSeries::new(name, dates, values).unwrap()
}

fn factor_data(n_obs: usize, n_factors: usize) -> (ReturnSeries, Vec<ReturnSeries>) {
    let factors: Vec<ReturnSeries> =
        (0..n_factors).map(|i| random_returns(&format!("f{i}"), n_obs)).collect();
    let noise = random_returns("asset", n_obs);
    let values = factors.iter().fold(noise.values.clone(), |acc, f| acc + &f.values * 0.8);
    (ReturnSeries::new("asset", noise.dates.clone(), values).unwrap(), factors)
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("factor_model_fit");
    group.sample_size(50);

    // One, five and thirteen years of daily returns
    for (n_obs, n_factors) in [(252, 1), (1260, 1), (3276, 1), (3276, 3)] {
        group.throughput(Throughput::Elements(n_obs as u64));
        group.bench_with_input(
            BenchmarkId::new("obs_factors", format!("{n_obs}x{n_factors}")),
            &(n_obs, n_factors),
            |b, &(n_obs, n_factors)| {
                let (asset, factors) = factor_data(n_obs, n_factors);
                let regressors: Vec<&ReturnSeries> = factors.iter().collect();
                b.iter(|| FactorModel::fit(black_box(&asset), black_box(&regressors)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_diagnose(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnose");
    group.sample_size(30);
    let config = DiagnosticsConfig::default();

    for (n_obs, n_factors) in [(252, 1), (3276, 1), (3276, 3)] {
        group.bench_with_input(
            BenchmarkId::new("obs_factors", format!("{n_obs}x{n_factors}")),
            &(n_obs, n_factors),
            |b, &(n_obs, n_factors)| {
                let (asset, factors) = factor_data(n_obs, n_factors);
                let regressors: Vec<&ReturnSeries> = factors.iter().collect();
                let model = FactorModel::fit(&asset, &regressors).unwrap();
                b.iter(|| diagnose(black_box(&model), black_box(&config)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_adf(c: &mut Criterion) {
    let mut group = c.benchmark_group("adf");
    let adf = AugmentedDickeyFuller::default();

    for n_obs in [252, 1260, 3276] {
        group.bench_with_input(BenchmarkId::from_parameter(n_obs), &n_obs, |b, &n_obs| {
            let series = random_returns("r", n_obs).values.to_vec();
            b.iter(|| adf.test(black_box(&series)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fit, bench_diagnose, bench_adf);

criterion_main!(benches);
