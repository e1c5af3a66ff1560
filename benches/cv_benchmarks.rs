use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use treecv::{CrossValidator, DataFrame, DecisionTree, HyperparameterSet, LabelColumn, Task, TreeConfig};

// Uniform features, the label is decided by a noisy linear score.
fn create_data(n_samples: usize, n_features: usize) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(1903);
    let weights: Vec<f64> = (0..n_features).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let rows: Vec<Vec<f64>> = (0..n_samples)
        .map(|_| {
            let mut row: Vec<f64> = (0..n_features).map(|_| rng.gen::<f64>()).collect();
            let score: f64 = row.iter().zip(weights.iter()).map(|(x, w)| x * w).sum();
            let noise: f64 = rng.gen_range(-0.25..0.25);
            row.push(if score + noise > 0.0 { 1.0 } else { 0.0 });
            row
        })
        .collect();
    DataFrame::from_rows(&rows, LabelColumn::Last).unwrap()
}

pub fn tree_benchmarks(c: &mut Criterion) {
    let data = create_data(5_000, 10);
    let mut group = c.benchmark_group("fit_tree");
    group.sample_size(20);
    for depth in [2, 5, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| {
                let cfg = TreeConfig::new(Task::Classification).set_max_height(Some(depth));
                DecisionTree::fit(black_box(&data), cfg).unwrap()
            })
        });
    }
    group.finish();
}

pub fn cv_benchmarks(c: &mut Criterion) {
    let data = create_data(5_000, 10);
    let serial = CrossValidator::new(&data, 8, 42, Task::Classification)
        .unwrap()
        .set_num_threads(Some(1));
    let parallel = CrossValidator::new(&data, 8, 42, Task::Classification).unwrap();

    let mut group = c.benchmark_group("cross_validation");
    group.warm_up_time(Duration::from_secs(5));
    group.measurement_time(Duration::from_secs(20));
    group.sample_size(10);
    for depth in [2, 5, 8] {
        let params = HyperparameterSet::default().set_max_depth(Some(depth));
        group.bench_with_input(BenchmarkId::new("serial", depth), &params, |b, params| {
            b.iter(|| serial.validate_single_hyperparameter(black_box(params)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("parallel", depth), &params, |b, params| {
            b.iter(|| parallel.validate_single_hyperparameter(black_box(params)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, tree_benchmarks, cv_benchmarks);
criterion_main!(benches);
