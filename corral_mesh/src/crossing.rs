// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exact point-in-polygon test by crossing number.
//!
//! A horizontal ray is cast from the query point towards `+x` and the sides it crosses are
//! counted; an odd count means inside. Each side covers the half-open span
//! `min(a.y, b.y) <= y < max(a.y, b.y)`, so a ray through a shared vertex is counted once and
//! horizontal sides are never counted.
//!
//! Points lying on a side (vertices included) are reported as [`Location::Boundary`] and
//! treated as contained by [`contains_point`].

use kurbo::Point;

use crate::types::PolygonSide;

/// Where a point lies relative to a polygon.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Location {
    /// Strictly inside.
    Inside,
    /// On a side or vertex.
    Boundary,
    /// Strictly outside.
    Outside,
}

#[inline]
fn orient(a: Point, b: Point, p: Point) -> f64 {
    (b - a).cross(p - a)
}

fn on_side(side: &PolygonSide, p: Point) -> bool {
    let (a, b) = (side.a, side.b);
    orient(a, b, p) == 0.0
        && a.x.min(b.x) <= p.x
        && p.x <= a.x.max(b.x)
        && a.y.min(b.y) <= p.y
        && p.y <= a.y.max(b.y)
}

/// Locate `p` against the closed cycle of `sides`.
pub fn locate_point(sides: &[PolygonSide], p: Point) -> Location {
    let mut crossings = 0_u32;
    for side in sides {
        if on_side(side, p) {
            return Location::Boundary;
        }
        let (a, b) = (side.a, side.b);
        let upward = a.y <= p.y && p.y < b.y;
        let downward = b.y <= p.y && p.y < a.y;
        // Upward sides cross the ray when `p` is left of them, downward ones when right.
        if (upward && orient(a, b, p) > 0.0) || (downward && orient(a, b, p) < 0.0) {
            crossings += 1;
        }
    }
    if crossings % 2 == 1 {
        Location::Inside
    } else {
        Location::Outside
    }
}

/// Whether the polygon bounded by `sides` contains `p`, boundary included.
pub fn contains_point(sides: &[PolygonSide], p: Point) -> bool {
    locate_point(sides, p) != Location::Outside
}
