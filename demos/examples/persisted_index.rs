// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persisted index.
//!
//! Build an index once, save its derived tables, load it back without rebuilding the meshes,
//! and write query results as a partitioned table.
//!
//! Run:
//! - `RUST_LOG=info cargo run -p corral_demos --example persisted_index`

use corral_query::{
    CoarseBackend, ContainConfig, Container, PartitionHints, Source, Table, Value, read_table,
    write_table,
};

fn main() {
    env_logger::init();
    let scratch = tempfile::tempdir().unwrap();

    // A 4x4 field of unit diamonds, one polygon per row of vertices.
    let mut vertices = Table::new(["zone", "block", "seq", "lon", "lat"]);
    for zone in 0..4_i64 {
        for block in 0..4_i64 {
            let (cx, cy) = (zone as f64 * 2.0, block as f64 * 2.0);
            for (seq, (dx, dy)) in (0_i64..).zip([(0.0, -1.0), (1.0, 0.0), (0.0, 1.0), (-1.0, 0.0)]) {
                vertices
                    .push_row(vec![
                        Value::Int(zone),
                        Value::Int(block),
                        Value::Int(seq),
                        Value::Float(cx + dx),
                        Value::Float(cy + dy),
                    ])
                    .unwrap();
            }
        }
    }
    let polygon_dir = scratch.path().join("input");
    write_table(&vertices, &polygon_dir, 2).unwrap();

    let config = ContainConfig::default()
        .with_polygon_id(["zone", "block"])
        .with_coords("lon", "lat")
        .with_point_seq("seq")
        .with_mesh_level(5)
        .with_backend(CoarseBackend::Grid)
        .with_partitions(PartitionHints {
            delimiter_rectangle: 1,
            polygon_side: 2,
            polygon_mesh: 4,
        });

    let index_dir = scratch.path().join("index");
    Container::build(Source::Stored(polygon_dir), config.clone())
        .unwrap()
        .save(&index_dir)
        .unwrap();
    let container = Container::load(&index_dir, config).unwrap();
    println!("{:?}", container.index());

    let mut points = Table::new(["id", "lon", "lat"]);
    for i in 0..64_i64 {
        let (x, y) = ((i % 8) as f64 * 0.9, (i / 8) as f64 * 0.9);
        points
            .push_row(vec![Value::Int(i), x.into(), y.into()])
            .unwrap();
    }
    let out = scratch.path().join("result");
    let stats = container.query_to(points, &["id"], &[], &out, 3).unwrap();
    println!("{stats:?}");

    let result = read_table(&out).unwrap();
    println!("{} rows, columns {:?}", result.len(), result.columns());
    assert_eq!(result.len(), stats.results);
}
