// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector backend with linear scans. Small and simple; good for tiny sets.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::Aabb2D;

/// Flat vector backend with linear scans.
#[derive(Default)]
pub struct FlatVec {
    entries: Vec<(usize, Aabb2D)>,
}

impl Debug for FlatVec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlatVec")
            .field("slots", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl Backend for FlatVec {
    fn bulk_build(items: &[(usize, Aabb2D)]) -> Self {
        Self {
            entries: items.to_vec(),
        }
    }

    fn query_point<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(
            self.entries
                .iter()
                .filter(move |(_, a)| a.contains_point(x, y))
                .map(|(slot, _)| *slot),
        )
    }

    fn query_rect<'a>(&'a self, rect: Aabb2D) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(
            self.entries
                .iter()
                .filter(move |(_, a)| !a.intersect(&rect).is_empty())
                .map(|(slot, _)| *slot),
        )
    }
}
