// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `Index` API and generic implementation over a pluggable backend.

use alloc::vec::Vec;

use crate::backend::Backend;
use crate::backends::{FlatVec, StrTree, UniformGrid};
use crate::types::{Aabb2D, union_all};

/// Slot handle of an entry: its position in the input passed to [`IndexGeneric::build`].
pub type Slot = usize;

/// A read-only AABB index parameterized by a spatial backend.
///
/// Built once from all entries; rebuild it wholesale when the input changes.
#[derive(Debug)]
pub struct IndexGeneric<P, B: Backend> {
    entries: Vec<(Aabb2D, P)>,
    backend: B,
}

impl<P, B: Backend> IndexGeneric<P, B> {
    /// Build an index over `(aabb, payload)` entries. Slots follow input order.
    pub fn build(entries: Vec<(Aabb2D, P)>) -> Self {
        let pairs: Vec<(Slot, Aabb2D)> = entries
            .iter()
            .enumerate()
            .map(|(i, (aabb, _))| (i, *aabb))
            .collect();
        Self {
            backend: B::bulk_build(&pairs),
            entries,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry stored at `slot`.
    pub fn get(&self, slot: Slot) -> Option<(&Aabb2D, &P)> {
        self.entries.get(slot).map(|(a, p)| (a, p))
    }

    /// All entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &Aabb2D, &P)> + '_ {
        self.entries.iter().enumerate().map(|(i, (a, p))| (i, a, p))
    }

    /// Bounding box of every entry, `None` when empty.
    pub fn extent(&self) -> Option<Aabb2D> {
        union_all(self.entries.iter().map(|(a, _)| a))
    }

    /// Query for entries whose AABB contains the point, in ascending slot order.
    pub fn query_point(&self, x: f64, y: f64) -> impl Iterator<Item = (Slot, &P)> + '_ {
        let mut slots: Vec<Slot> = self.backend.query_point(x, y).collect();
        slots.sort_unstable();
        slots.dedup();
        slots
            .into_iter()
            .filter_map(move |i| self.entries.get(i).map(|(_, p)| (i, p)))
    }

    /// Query for entries whose AABB intersects the given rectangle, in ascending slot order.
    pub fn query_rect(&self, rect: Aabb2D) -> impl Iterator<Item = (Slot, &P)> + '_ {
        let mut slots: Vec<Slot> = self.backend.query_rect(rect).collect();
        slots.sort_unstable();
        slots.dedup();
        slots
            .into_iter()
            .filter_map(move |i| self.entries.get(i).map(|(_, p)| (i, p)))
    }
}

/// Default index using a flat vector backend.
pub type Index<P> = IndexGeneric<P, FlatVec>;

/// Index backed by a uniform grid.
pub type GridIndex<P> = IndexGeneric<P, UniformGrid>;

/// Index backed by a packed STR R-tree.
pub type StrIndex<P> = IndexGeneric<P, StrTree>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn overlapping() -> Vec<(Aabb2D, u32)> {
        vec![
            (Aabb2D::new(0.0, 0.0, 10.0, 10.0), 1),
            (Aabb2D::new(5.0, 5.0, 15.0, 15.0), 2),
            (Aabb2D::new(20.0, 0.0, 30.0, 10.0), 3),
        ]
    }

    fn payloads<'a>(it: impl Iterator<Item = (Slot, &'a u32)>) -> Vec<u32> {
        it.map(|(_, p)| *p).collect()
    }

    #[test]
    fn backends_agree_on_point_queries() {
        let flat: Index<u32> = Index::build(overlapping());
        let grid: GridIndex<u32> = GridIndex::build(overlapping());
        let tree: StrIndex<u32> = StrIndex::build(overlapping());
        for (x, y) in [(6.0, 6.0), (1.0, 1.0), (25.0, 10.0), (17.0, 5.0), (10.0, 10.0)] {
            let want = payloads(flat.query_point(x, y));
            assert_eq!(payloads(grid.query_point(x, y)), want, "grid at ({x}, {y})");
            assert_eq!(payloads(tree.query_point(x, y)), want, "tree at ({x}, {y})");
        }
        assert_eq!(payloads(flat.query_point(6.0, 6.0)), vec![1, 2]);
    }

    #[test]
    fn rect_query_and_accessors() {
        let idx: StrIndex<u32> = StrIndex::build(overlapping());
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.get(2).map(|(_, p)| *p), Some(3));
        assert_eq!(idx.extent(), Some(Aabb2D::new(0.0, 0.0, 30.0, 15.0)));
        let hits = payloads(idx.query_rect(Aabb2D::new(12.0, 0.0, 22.0, 2.0)));
        assert_eq!(hits, vec![3]);
    }

    #[test]
    fn empty_index() {
        let idx: GridIndex<u32> = GridIndex::build(Vec::new());
        assert!(idx.is_empty());
        assert_eq!(idx.extent(), None);
        assert_eq!(idx.query_point(0.0, 0.0).count(), 0);
    }
}
