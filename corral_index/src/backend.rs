// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for spatial indexing implementations.

use alloc::boxed::Box;
use core::fmt::Debug;

use crate::types::Aabb2D;

/// Spatial backend abstraction used by [`IndexGeneric`](crate::IndexGeneric).
///
/// Backends are built once from the full set of slots and never mutated afterwards;
/// a changed input set is handled by building a new index.
pub trait Backend: Debug {
    /// Build the spatial structure over `(slot, aabb)` pairs.
    fn bulk_build(items: &[(usize, Aabb2D)]) -> Self
    where
        Self: Sized;

    /// Query slots whose AABB contains the point (boundary-inclusive).
    fn query_point<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = usize> + 'a>;

    /// Query slots whose AABB intersects the rectangle (touching counts).
    fn query_rect<'a>(&'a self, rect: Aabb2D) -> Box<dyn Iterator<Item = usize> + 'a>;
}
