// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Containment basics.
//!
//! Build an index over two overlapping polygons from vertex rows, then locate a handful of
//! points and print the per-stage counts.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p corral_demos --example containment_basics`

use corral_query::{ContainConfig, Container, Table, Value};

fn vertex_rows() -> Table {
    let mut t = Table::new(["polygon_id", "point_seq", "coord_x", "coord_y"]);
    let shapes: [(&str, &[(f64, f64)]); 2] = [
        // An L with its notch in the upper right.
        (
            "ell",
            &[(0.0, 0.0), (10.0, 0.0), (10.0, 4.0), (4.0, 4.0), (4.0, 10.0), (0.0, 10.0)],
        ),
        ("block", &[(6.0, 2.0), (14.0, 2.0), (14.0, 8.0), (6.0, 8.0)]),
    ];
    for (id, ring) in shapes {
        for (seq, &(x, y)) in (0_i64..).zip(ring) {
            t.push_row(vec![id.into(), seq.into(), x.into(), y.into()])
                .unwrap();
        }
    }
    t
}

fn main() {
    env_logger::init();

    let container = Container::build(vertex_rows(), ContainConfig::default()).unwrap();
    for polygon in container.index().iter() {
        let s = polygon.mesh().stats();
        println!(
            "{}: {} cells ({} inside, {} outside, {} undecided), depth {}",
            polygon.id(),
            s.total(),
            s.inside,
            s.outside,
            s.undecided,
            s.depth
        );
    }

    let mut points = Table::new(["point_id", "coord_x", "coord_y", "label"]);
    for (id, x, y, label) in [
        (1, 2.0, 2.0, "deep inside the L"),
        (2, 7.0, 3.0, "where both overlap"),
        (3, 7.0, 7.0, "in the notch, inside the block only"),
        (4, 2.0, 12.0, "outside everything"),
        (5, 10.0, 1.0, "on the L's right edge"),
    ] {
        points
            .push_row(vec![Value::Int(id), x.into(), y.into(), label.into()])
            .unwrap();
    }

    let (rows, stats) = container.query(points, &["point_id"], &["label"]).unwrap();
    for row in rows.iter() {
        println!("point {} in {}: {}", row[0], row[1], row[4]);
    }
    println!("{stats:?}");
    assert_eq!(rows.len(), 5, "points 1 and 5 in the L, 2 in both, 3 in the block");
}
