// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive rectangle type and helpers.

/// Axis-aligned bounding box in 2D with `f64` coordinates.
///
/// All containment tests are boundary-inclusive: a point lying exactly on an edge or corner
/// is contained.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2D {
    /// Minimum x (left)
    pub min_x: f64,
    /// Minimum y (bottom)
    pub min_y: f64,
    /// Maximum x (right)
    pub max_x: f64,
    /// Maximum y (top)
    pub max_y: f64,
}

impl Aabb2D {
    /// Create a new AABB from min/max corners.
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create an AABB from origin and size.
    pub const fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }

    /// Whether this AABB contains the point (boundary-inclusive).
    ///
    /// Returns `false` for NaN coordinates.
    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }

    /// The intersection of two AABBs. May be empty; see [`Aabb2D::is_empty`].
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        }
    }

    /// Smallest AABB enclosing both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Return true if the AABB is inverted. Degenerate boxes (zero width or height)
    /// still contain their boundary and are not empty.
    pub fn is_empty(&self) -> bool {
        self.max_x < self.min_x || self.max_y < self.min_y
    }

    /// Width, clamped at zero.
    #[inline]
    pub fn width(&self) -> f64 {
        (self.max_x - self.min_x).max(0.0)
    }

    /// Height, clamped at zero.
    #[inline]
    pub fn height(&self) -> f64 {
        (self.max_y - self.min_y).max(0.0)
    }

    /// Area, zero for empty or degenerate boxes.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[inline]
    pub(crate) fn center_x(&self) -> f64 {
        0.5 * (self.min_x + self.max_x)
    }

    #[inline]
    pub(crate) fn center_y(&self) -> f64 {
        0.5 * (self.min_y + self.max_y)
    }
}

/// Bounding box of a set of boxes. Returns `None` for an empty input.
pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a Aabb2D>) -> Option<Aabb2D> {
    let mut it = boxes.into_iter();
    let first = *it.next()?;
    Some(it.fold(first, |acc, b| acc.union(b)))
}
