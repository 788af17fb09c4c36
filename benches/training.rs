use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use outcome_screener::training::{
    GradientBoostingClassifier, GradientBoostingConfig, RandomForest,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_classification_data(n_rows: usize, n_features: usize) -> (Array2<f64>, Array1<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let x = Array2::from_shape_fn((n_rows, n_features), |_| rng.gen::<f64>() * 10.0);

    // Label depends on the first two features plus noise
    let y = Array1::from_shape_fn(n_rows, |i| {
        let score = x[[i, 0]] + x[[i, 1]] + rng.gen::<f64>() * 2.0;
        if score > 11.0 { 1.0 } else { 0.0 }
    });
    (x, y)
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10);

    for n_rows in [500, 2000, 5000].iter() {
        let data = create_classification_data(*n_rows, 20);

        group.bench_with_input(
            BenchmarkId::new("random_forest", n_rows),
            &data,
            |b, (x, y)| {
                b.iter(|| {
                    let mut forest = RandomForest::new(50).with_random_state(42);
                    forest.fit(black_box(x), black_box(y)).unwrap();
                    forest
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("gradient_boosting", n_rows),
            &data,
            |b, (x, y)| {
                b.iter(|| {
                    let config = GradientBoostingConfig {
                        n_estimators: 50,
                        ..Default::default()
                    };
                    let mut model = GradientBoostingClassifier::new(config);
                    model.fit(black_box(x), black_box(y)).unwrap();
                    model
                })
            },
        );
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    let (x_train, y_train) = create_classification_data(5000, 20);
    let mut forest = RandomForest::new(100).with_random_state(42);
    forest.fit(&x_train, &y_train).unwrap();

    for n_rows in [1, 100, 1000].iter() {
        let (x, _) = create_classification_data(*n_rows, 20);

        group.bench_with_input(BenchmarkId::new("predict_proba", n_rows), &x, |b, x| {
            b.iter(|| forest.predict_proba(black_box(x)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction);
criterion_main!(benches);
