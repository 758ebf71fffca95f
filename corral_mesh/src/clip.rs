// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polygon–rectangle clipping and ring area.
//!
//! The overlap ratio of a mesh cell is `area(clip(ring, cell)) / area(cell)`. Clipping uses
//! Sutherland–Hodgman against the four half-planes of the rectangle. For a concave ring the
//! output may contain zero-width slivers along the rectangle edges; they add no area, so the
//! shoelace sum stays exact up to rounding.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

#[derive(Copy, Clone, Debug)]
enum Edge {
    Left(f64),
    Right(f64),
    Bottom(f64),
    Top(f64),
}

impl Edge {
    fn keeps(self, p: Point) -> bool {
        match self {
            Self::Left(x) => p.x >= x,
            Self::Right(x) => p.x <= x,
            Self::Bottom(y) => p.y >= y,
            Self::Top(y) => p.y <= y,
        }
    }

    /// Intersection of segment `a-b` with the edge line. Only called when `a` and `b` lie on
    /// opposite sides, so the denominator is non-zero.
    fn cut(self, a: Point, b: Point) -> Point {
        match self {
            Self::Left(x) | Self::Right(x) => {
                let t = (x - a.x) / (b.x - a.x);
                Point::new(x, a.y + t * (b.y - a.y))
            }
            Self::Bottom(y) | Self::Top(y) => {
                let t = (y - a.y) / (b.y - a.y);
                Point::new(a.x + t * (b.x - a.x), y)
            }
        }
    }
}

fn clip_edge(input: &[Point], edge: Edge, out: &mut Vec<Point>) {
    out.clear();
    let Some(&last) = input.last() else {
        return;
    };
    let mut prev = last;
    for &cur in input {
        match (edge.keeps(prev), edge.keeps(cur)) {
            (true, true) => out.push(cur),
            (true, false) => out.push(edge.cut(prev, cur)),
            (false, true) => {
                out.push(edge.cut(prev, cur));
                out.push(cur);
            }
            (false, false) => {}
        }
        prev = cur;
    }
}

/// Clip a closed ring to a rectangle.
///
/// Returns the clipped ring (open, closure implicit); empty when nothing overlaps.
pub fn clip_ring(ring: &[Point], rect: Rect) -> Vec<Point> {
    let mut a: Vec<Point> = ring.to_vec();
    let mut b: Vec<Point> = Vec::with_capacity(ring.len() + 4);
    for edge in [
        Edge::Left(rect.x0),
        Edge::Right(rect.x1),
        Edge::Bottom(rect.y0),
        Edge::Top(rect.y1),
    ] {
        clip_edge(&a, edge, &mut b);
        core::mem::swap(&mut a, &mut b);
        if a.is_empty() {
            break;
        }
    }
    a
}

/// Unsigned area of a closed ring by the shoelace formula.
///
/// Rings with fewer than three vertices have zero area.
pub fn ring_area(ring: &[Point]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    // Fan around the first vertex; keeps magnitudes small for rings far from the origin.
    let o = ring[0];
    let mut twice = 0.0;
    for i in 1..n - 1 {
        twice += (ring[i] - o).cross(ring[i + 1] - o);
    }
    let area = 0.5 * twice;
    if area < 0.0 { -area } else { area }
}

/// Whether a ring returned by [`clip_ring`] is the whole of `rect`.
///
/// True when every edge of the ring runs along one side of the rectangle and the ring
/// encloses area. Such a ring can only trace the rectangle outline, whatever the rounding in
/// its shoelace area.
pub fn covers_rect(clipped: &[Point], rect: Rect) -> bool {
    let Some(&last) = clipped.last() else {
        return false;
    };
    let on_one_side = |a: Point, b: Point| {
        (a.x == rect.x0 && b.x == rect.x0)
            || (a.x == rect.x1 && b.x == rect.x1)
            || (a.y == rect.y0 && b.y == rect.y0)
            || (a.y == rect.y1 && b.y == rect.y1)
    };
    let mut prev = last;
    for &cur in clipped {
        if !on_one_side(prev, cur) {
            return false;
        }
        prev = cur;
    }
    ring_area(clipped) > 0.5 * rect.area()
}

/// Fraction of `rect` covered by the ring, clamped to `[0, 1]`.
///
/// A zero-area rectangle has ratio `0`.
pub fn overlap_ratio(ring: &[Point], rect: Rect) -> f64 {
    let cell_area = rect.area();
    if cell_area <= 0.0 {
        return 0.0;
    }
    let clipped = clip_ring(ring, rect);
    if covers_rect(&clipped, rect) {
        return 1.0;
    }
    (ring_area(&clipped) / cell_area).clamp(0.0, 1.0)
}
