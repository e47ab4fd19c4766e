use criterion::{criterion_group, criterion_main, Criterion};
use geomag::{
    grid, par_grid, CoordinateSystem, EvaluationOptions, GeoPoint, InMemorySource, ModelCatalog,
    ModelLocator, ModelRecord, ModelSegment, PreparedModel,
};

/// Degree 13 model with smoothly decaying synthetic coefficients
fn model() -> (ModelCatalog, InMemorySource) {
    let records = (1..=13)
        .flat_map(|n| (0..=n).map(move |m| (n, m)))
        .map(|(n, m)| {
            let scale = 30000.0 / (n * n) as f64;
            ModelRecord {
                n,
                m,
                g: scale * (1.0 - 0.1 * m as f64),
                h: if m == 0 { 0.0 } else { 0.5 * scale },
                g_sv: 0.01 * scale,
                h_sv: if m == 0 { 0.0 } else { -0.01 * scale },
            }
        })
        .collect();
    let mut source = InMemorySource::new();
    source.insert(ModelLocator(0), records);
    let segment = ModelSegment {
        name: "BENCH".to_string(),
        epoch: 2020.0,
        n_main: 13,
        n_sv: 13,
        year_min: 2020.0,
        year_max: 2025.0,
        alt_min: -1.0,
        alt_max: 600.0,
        locator: ModelLocator(0),
    };
    let catalog = ModelCatalog::new(vec![segment]).expect("Could not build catalog");
    (catalog, source)
}

fn criterion_benchmark(c: &mut Criterion) {
    let (catalog, source) = model();
    let opts = EvaluationOptions::default();
    let prepared =
        PreparedModel::new(&catalog, &source, 2022.5, &opts).expect("Could not prepare model");
    let point = GeoPoint::geodetic(45.0, -75.0, 100.0);

    c.bench_function("Single point", |b| {
        b.iter(|| prepared.evaluate(&point).expect("Could not evaluate"))
    });
    c.bench_function("World grid", |b| {
        b.iter(|| {
            grid(&catalog, &source, 2022.5, 0.0, CoordinateSystem::Geodetic, 5.0, 5.0, &opts)
                .expect("Could not evaluate grid")
        })
    });
    c.bench_function("Parallel world grid", |b| {
        b.iter(|| {
            par_grid(&catalog, &source, 2022.5, 0.0, CoordinateSystem::Geodetic, 5.0, 5.0, &opts)
                .expect("Could not evaluate grid")
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
