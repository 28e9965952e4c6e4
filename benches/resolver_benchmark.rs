use catchment_locator::models::{
    CatchmentFeature, CatchmentGeometry, CatchmentProperties, FeatureCollection, Point,
};
use catchment_locator::services::resolve;
use criterion::{criterion_group, criterion_main, Criterion};
use geo::{Coord, LineString, Polygon};
use std::hint::black_box;

/// A grid of `n x n` square catchment areas, each with a 64-vertex ring.
fn grid_collection(n: usize) -> FeatureCollection {
    let mut features = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let (x0, y0) = (i as f64, j as f64);
            let ring: Vec<Coord<f64>> = (0..64)
                .map(|k| {
                    let t = k as f64 / 16.0;
                    match k / 16 {
                        0 => Coord { x: x0 + t, y: y0 },
                        1 => Coord { x: x0 + 1.0, y: y0 + t - 1.0 },
                        2 => Coord { x: x0 + 3.0 - t, y: y0 + 1.0 },
                        _ => Coord { x: x0, y: y0 + 4.0 - t },
                    }
                })
                .collect();

            features.push(CatchmentFeature {
                geometry: CatchmentGeometry::Polygon(Polygon::new(LineString::from(ring), vec![])),
                properties: CatchmentProperties {
                    name: format!("Area {}-{}", i, j),
                    ..Default::default()
                },
            });
        }
    }
    FeatureCollection::new(features)
}

fn benchmark_resolve(c: &mut Criterion) {
    let collection = grid_collection(20);

    let mut group = c.benchmark_group("resolve");

    group.bench_function("first_area", |b| {
        b.iter(|| resolve(black_box(&Point::new(0.5, 0.5)), &collection))
    });

    group.bench_function("last_area", |b| {
        b.iter(|| resolve(black_box(&Point::new(19.5, 19.5)), &collection))
    });

    group.bench_function("no_match", |b| {
        b.iter(|| resolve(black_box(&Point::new(-5.0, -5.0)), &collection))
    });

    group.finish();
}

criterion_group!(benches, benchmark_resolve);
criterion_main!(benches);
