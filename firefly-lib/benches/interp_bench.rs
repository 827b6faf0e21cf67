use criterion::{Criterion, black_box, criterion_group, criterion_main};
use firefly::allan::allan_variance;
use firefly::{AllanConfig, Interp1D};

fn table() -> Interp1D {
    let x: Vec<f64> = (0..1000).map(|i| i as f64 * 0.1).collect();
    let y: Vec<f64> = x.iter().map(|v| v.sin() + 2.0).collect();
    Interp1D::new(x, y).unwrap()
}

fn bench_get_value(c: &mut Criterion) {
    let t = table();
    let queries: Vec<f64> = (0..200).map(|i| i as f64 * 0.47 - 3.0).collect();

    c.bench_function("get_value_scalar", |b| {
        b.iter(|| {
            for &q in &queries {
                black_box(t.get_value(black_box(q), true).unwrap());
            }
        });
    });

    c.bench_function("get_values_vector", |b| {
        b.iter(|| {
            black_box(t.get_values(black_box(&queries), true).unwrap());
        });
    });
}

fn bench_integrate(c: &mut Criterion) {
    let t = table();

    c.bench_function("integrate_all", |b| {
        b.iter(|| {
            black_box(t.integrate_all());
        });
    });

    c.bench_function("integrate_sub_range", |b| {
        b.iter(|| {
            black_box(t.integrate(black_box(12.34), black_box(87.65)).unwrap());
        });
    });

    c.bench_function("cumulative_integral", |b| {
        b.iter(|| {
            black_box(t.cumulative_integral(black_box(55.55)).unwrap());
        });
    });
}

fn bench_allan_variance(c: &mut Criterion) {
    let x: Vec<f64> = (0..10_000)
        .map(|i| ((i as f64) * 12.9898).sin() * 437.585)
        .map(|v| v - v.floor())
        .collect();
    let config = AllanConfig::new().dt(0.01).n_clusters(50);

    c.bench_function("allan_variance_10k", |b| {
        b.iter(|| {
            black_box(allan_variance(black_box(&x), &config).unwrap());
        });
    });
}

criterion_group!(benches, bench_get_value, bench_integrate, bench_allan_variance);
criterion_main!(benches);
