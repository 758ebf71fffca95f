// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boundary sides of a polygon and ordering of sequenced vertices.

use alloc::vec::Vec;

use kurbo::Point;

use crate::error::ValidationError;
use crate::types::{Polygon, PolygonSide};

/// Directed sides of the polygon ring, closing side included.
///
/// Returns one side per vertex; side `i` joins vertex `i` to vertex `(i + 1) mod N`, so the
/// end of each side is the start of the next.
pub fn polygon_sides(polygon: &Polygon) -> Vec<PolygonSide> {
    let v = polygon.vertices();
    let n = v.len();
    (0..n)
        .map(|seq| PolygonSide {
            seq,
            a: v[seq],
            b: v[(seq + 1) % n],
        })
        .collect()
}

/// Order vertices by their sequence value.
///
/// Sequence values may start anywhere but must be consecutive integers. Duplicates and gaps
/// are rejected.
pub fn order_vertices(mut seq_points: Vec<(i64, Point)>) -> Result<Vec<Point>, ValidationError> {
    seq_points.sort_by_key(|(seq, _)| *seq);
    for w in seq_points.windows(2) {
        let (prev, next) = (w[0].0, w[1].0);
        if prev == next {
            return Err(ValidationError::DuplicateSequence { seq: prev });
        }
        if next.checked_sub(prev) != Some(1) {
            return Err(ValidationError::MissingSequence { after: prev, next });
        }
    }
    Ok(seq_points.into_iter().map(|(_, p)| p).collect())
}
