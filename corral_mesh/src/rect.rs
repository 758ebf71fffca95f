// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delimiter rectangles and the boundary-inclusive rectangle test.

use kurbo::{Point, Rect};

use crate::types::Polygon;

/// Axis-aligned bounding rectangle of a polygon's vertices.
///
/// `x0 <= x1` and `y0 <= y1` always hold, and every vertex lies inside (inclusive).
pub fn delimiter_rect(polygon: &Polygon) -> Rect {
    // `Polygon` guarantees at least three vertices.
    let (first, rest) = (polygon.vertices()[0], &polygon.vertices()[1..]);
    rest.iter().fold(Rect::from_points(first, first), |r, p| {
        Rect::new(r.x0.min(p.x), r.y0.min(p.y), r.x1.max(p.x), r.y1.max(p.y))
    })
}

/// Whether `rect` contains `p`, edges and corners included.
///
/// Unlike [`Rect::contains`], which is half-open, a point on the max edge is inside.
#[inline]
pub fn rect_contains(rect: &Rect, p: Point) -> bool {
    rect.x0 <= p.x && p.x <= rect.x1 && rect.y0 <= p.y && p.y <= rect.y1
}
