// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mesh inspection.
//!
//! Build the mesh of a concave polygon at a few settings and print how its cells split into
//! inside, outside, and undecided. Then walk one cell's ancestry.
//!
//! Run:
//! - `cargo run -p corral_demos --example mesh_inspect`

use corral_mesh::{CellKinds, MeshParams, Polygon, PolygonMesh, RecordId};
use kurbo::Point;

fn main() {
    let ring = [
        (0.0, 0.0),
        (10.0, 0.0),
        (10.0, 4.0),
        (4.0, 4.0),
        (4.0, 10.0),
        (0.0, 10.0),
    ]
    .map(|(x, y)| Point::new(x, y))
    .to_vec();
    let ell = Polygon::new(RecordId::text("ell"), ring).unwrap();

    for (split, level, earned_prop) in [(2, 4, 0.7), (2, 4, 1.0), (3, 3, 0.9), (2, 8, 0.95)] {
        let params = MeshParams {
            split,
            level,
            earned_prop,
        };
        let mesh = PolygonMesh::build(&ell, &params).unwrap();
        let s = mesh.stats();
        let undecided_area: f64 = mesh
            .cells_of(CellKinds::UNDECIDED)
            .map(|c| c.rect.area())
            .sum();
        println!(
            "split {split} level {level} prop {earned_prop}: {} cells, {} decided, undecided area {:.3} of {:.0}",
            s.total(),
            s.inside + s.outside,
            undecided_area,
            mesh.bounds().area()
        );
    }

    let mesh = PolygonMesh::build(&ell, &MeshParams::default()).unwrap();
    let p = Point::new(3.9, 4.1);
    for cell in mesh.cells_at(p) {
        println!(
            "cell {} ({:?}, ratio {:.3}) has digits {:?}",
            cell.code,
            cell.class,
            cell.ratio,
            cell.code.digits(mesh.params().split)
        );
        let mut up = cell.code.parent(mesh.params().split);
        while let Some(code) = up {
            println!("  inside {code}: {:?}", mesh.cell_rect(code));
            up = code.parent(mesh.params().split);
        }
    }
}
