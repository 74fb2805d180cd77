//! Benchmarks for model fitting and prediction
//!
//! Run with: cargo bench --package recommender
//!
//! Uses a synthetic table so it runs without the dataset on disk.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::RatingTable;
use recommender::KnnBasic;

fn synthetic_table() -> RatingTable {
    RatingTable::from_triples((0..20_000u64).map(|n| {
        let user = format!("user{}", (n * 7919) % 1_500);
        let product = format!("product{}", (n * 104_729) % 1_200);
        let rating = 1.0 + ((n * 31) % 5) as f64;
        (user, product, rating)
    }))
}

fn bench_fit(c: &mut Criterion) {
    let table = synthetic_table();

    c.bench_function("knn_fit", |b| {
        b.iter(|| {
            let model = KnnBasic::fit(black_box(&table));
            black_box(model)
        })
    });
}

fn bench_predict(c: &mut Criterion) {
    let table = synthetic_table();
    let model = KnnBasic::fit(&table);

    c.bench_function("knn_predict", |b| {
        b.iter(|| {
            let prediction = model.predict(black_box("user42"), black_box("product17"));
            black_box(prediction)
        })
    });
}

criterion_group!(benches, bench_fit, bench_predict);
criterion_main!(benches);
