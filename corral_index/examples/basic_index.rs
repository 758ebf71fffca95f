// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Corral Index: bulk build and point queries.

use corral_index::{Aabb2D, GridIndex};

fn main() {
    let idx: GridIndex<u32> = GridIndex::build(vec![
        (Aabb2D::new(0.0, 0.0, 10.0, 10.0), 1),
        (Aabb2D::new(5.0, 5.0, 15.0, 15.0), 2),
        (Aabb2D::new(20.0, 0.0, 30.0, 10.0), 3),
    ]);
    println!("{idx:?}");

    let hits: Vec<_> = idx.query_point(6.0, 6.0).collect();
    println!("hits at (6,6): {:?}", hits);
}
