// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use corral_mesh::{MeshParams, Polygon, PolygonMesh, RecordId, contains_point, polygon_sides};
use corral_query::{ContainConfig, PolygonIndex, QueryPoint, containing_polygons};
use kurbo::Point;

struct Rng(u64);

impl Rng {
    fn next_f64(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        ((x >> 11) as f64) / ((1u64 << 53) as f64)
    }
}

// Wobbly star with `arms` spikes; concave, so meshes need several levels.
fn star(id: i64, cx: f64, cy: f64, r: f64, arms: usize) -> Polygon {
    let n = arms * 2;
    let ring = (0..n)
        .map(|i| {
            let t = i as f64 / n as f64 * std::f64::consts::TAU;
            let rr = if i % 2 == 0 { r } else { r * 0.45 };
            Point::new(cx + rr * t.cos(), cy + rr * t.sin())
        })
        .collect();
    Polygon::new(RecordId::int(id), ring).unwrap()
}

fn star_field(per_side: usize, spacing: f64) -> Vec<Polygon> {
    let mut out = Vec::with_capacity(per_side * per_side);
    for y in 0..per_side {
        for x in 0..per_side {
            let id = (y * per_side + x) as i64;
            // Radius above half the spacing, so neighbouring rectangles overlap.
            out.push(star(
                id,
                x as f64 * spacing,
                y as f64 * spacing,
                spacing * 0.7,
                5 + id as usize % 4,
            ));
        }
    }
    out
}

fn gen_points(count: usize, extent: f64, seed: u64) -> Vec<QueryPoint> {
    let mut rng = Rng(seed);
    (0..count)
        .map(|i| {
            QueryPoint::new(
                RecordId::int(i as i64),
                Point::new(rng.next_f64() * extent, rng.next_f64() * extent),
            )
        })
        .collect()
}

fn bench_mesh_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_build");
    let polygon = star(0, 0.0, 0.0, 100.0, 7);
    for (split, level) in [(2, 4), (2, 6), (3, 3), (4, 3)] {
        for earned_prop in [0.7, 0.9, 1.0] {
            let params = MeshParams {
                split,
                level,
                earned_prop,
            };
            group.bench_function(format!("split{split}_level{level}_prop{earned_prop}"), |b| {
                b.iter(|| black_box(PolygonMesh::build(&polygon, &params).unwrap()))
            });
        }
    }
    group.finish();
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    let polygons = star_field(16, 50.0);
    group.throughput(Throughput::Elements(polygons.len() as u64));
    group.bench_function("star_field_16x16", |b| {
        b.iter_batched(
            || polygons.clone(),
            |p| black_box(PolygonIndex::build(p, &ContainConfig::default()).unwrap()),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_staged_vs_brute_force(c: &mut Criterion) {
    let mut group = c.benchmark_group("containment");
    let polygons = star_field(16, 50.0);
    let points = gen_points(20_000, 16.0 * 50.0, 0x9E37_79B9_7F4A_7C15);
    group.throughput(Throughput::Elements(points.len() as u64));

    for earned_prop in [0.7, 1.0] {
        let config = ContainConfig::default().with_earned_prop(earned_prop);
        let index = PolygonIndex::build(polygons.clone(), &config).unwrap();
        group.bench_function(format!("staged_prop{earned_prop}"), |b| {
            b.iter(|| black_box(containing_polygons(&points, &index)))
        });
    }

    let sides: Vec<_> = polygons.iter().map(polygon_sides).collect();
    group.bench_function("brute_force_exact", |b| {
        b.iter(|| {
            let hits: usize = points
                .iter()
                .map(|p| sides.iter().filter(|s| contains_point(s, p.at)).count())
                .sum();
            black_box(hits);
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_mesh_build,
    bench_index_build,
    bench_staged_vs_brute_force
);
criterion_main!(benches);
