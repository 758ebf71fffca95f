// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid backend. Buckets slots by the grid cells their AABB covers.

use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::{Aabb2D, union_all};

/// Uniform grid backend.
///
/// The grid origin is the lower-left corner of the input extent. When built through
/// [`Backend::bulk_build`] the cell size splits the extent into roughly `sqrt(n)` columns and
/// rows, which keeps buckets short for evenly spread inputs. Use [`UniformGrid::with_cell_size`]
/// to choose the cell size explicitly.
///
/// Coordinates are assumed finite.
pub struct UniformGrid {
    cell_w: f64,
    cell_h: f64,
    extent: Option<Aabb2D>,
    entries: Vec<(usize, Aabb2D)>,
    cells: BTreeMap<(i64, i64), Vec<usize>>,
}

impl UniformGrid {
    /// Build a grid with the given cell size over `(slot, aabb)` pairs.
    ///
    /// Non-positive cell sizes fall back to `1.0`.
    pub fn with_cell_size(items: &[(usize, Aabb2D)], cell_w: f64, cell_h: f64) -> Self {
        let cell_w = if cell_w > 0.0 { cell_w } else { 1.0 };
        let cell_h = if cell_h > 0.0 { cell_h } else { 1.0 };
        let mut grid = Self {
            cell_w,
            cell_h,
            extent: union_all(items.iter().map(|(_, a)| a)),
            entries: items.to_vec(),
            cells: BTreeMap::new(),
        };
        for i in 0..grid.entries.len() {
            let aabb = grid.entries[i].1;
            for key in grid.cells_for_aabb(&aabb) {
                grid.cells.entry(key).or_default().push(i);
            }
        }
        grid
    }

    #[inline]
    fn floor_to_i64(v: f64) -> i64 {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Cell coordinates are bounded by the input extent divided by the cell size."
        )]
        let i = v as i64;
        if (i as f64) > v { i - 1 } else { i }
    }

    fn key_for(&self, origin: &Aabb2D, x: f64, y: f64) -> (i64, i64) {
        debug_assert!(
            self.cell_w > 0.0 && self.cell_h > 0.0,
            "cell sizes must be positive"
        );
        let cx = Self::floor_to_i64((x - origin.min_x) / self.cell_w);
        let cy = Self::floor_to_i64((y - origin.min_y) / self.cell_h);
        (cx, cy)
    }

    fn cells_for_aabb(&self, a: &Aabb2D) -> Vec<(i64, i64)> {
        let Some(origin) = self.extent else {
            return Vec::new();
        };
        let (minx, miny) = self.key_for(&origin, a.min_x, a.min_y);
        let (maxx, maxy) = self.key_for(&origin, a.max_x, a.max_y);
        let mut out = Vec::new();
        for y in miny..=maxy {
            for x in minx..=maxx {
                out.push((x, y));
            }
        }
        out
    }
}

fn ceil_sqrt(n: usize) -> usize {
    let mut g = 1_usize;
    while g * g < n {
        g += 1;
    }
    g
}

impl Backend for UniformGrid {
    fn bulk_build(items: &[(usize, Aabb2D)]) -> Self {
        let per_axis = ceil_sqrt(items.len());
        let (w, h) = union_all(items.iter().map(|(_, a)| a))
            .map(|e| (e.width(), e.height()))
            .unwrap_or((0.0, 0.0));
        #[allow(
            clippy::cast_precision_loss,
            reason = "Per-axis cell counts are small."
        )]
        let per_axis = per_axis as f64;
        Self::with_cell_size(items, w / per_axis, h / per_axis)
    }

    fn query_point<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = usize> + 'a> {
        let Some(origin) = self.extent else {
            return Box::new(core::iter::empty());
        };
        if !origin.contains_point(x, y) {
            return Box::new(core::iter::empty());
        }
        let key = self.key_for(&origin, x, y);
        let bucket = self.cells.get(&key).map(Vec::as_slice).unwrap_or(&[]);
        Box::new(
            bucket
                .iter()
                .map(|&i| self.entries[i])
                .filter(move |(_, a)| a.contains_point(x, y))
                .map(|(slot, _)| slot),
        )
    }

    fn query_rect<'a>(&'a self, rect: Aabb2D) -> Box<dyn Iterator<Item = usize> + 'a> {
        let Some(origin) = self.extent else {
            return Box::new(core::iter::empty());
        };
        let clipped = rect.intersect(&origin);
        if clipped.is_empty() {
            return Box::new(core::iter::empty());
        }
        let mut set = BTreeSet::new();
        for key in self.cells_for_aabb(&clipped) {
            if let Some(bucket) = self.cells.get(&key) {
                for &i in bucket {
                    if !self.entries[i].1.intersect(&rect).is_empty() {
                        set.insert(self.entries[i].0);
                    }
                }
            }
        }
        Box::new(set.into_iter())
    }
}

impl Debug for UniformGrid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UniformGrid")
            .field("cell_w", &self.cell_w)
            .field("cell_h", &self.cell_h)
            .field("extent", &self.extent)
            .field("slots", &self.entries.len())
            .field("cells", &self.cells.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn sorted(it: impl Iterator<Item = usize>) -> Vec<usize> {
        let mut v: Vec<_> = it.collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn point_on_shared_cell_edge_finds_both_boxes() {
        let items = vec![
            (0, Aabb2D::new(0.0, 0.0, 5.0, 5.0)),
            (1, Aabb2D::new(5.0, 0.0, 10.0, 5.0)),
            (2, Aabb2D::new(0.0, 5.0, 10.0, 10.0)),
        ];
        let grid = UniformGrid::bulk_build(&items);
        assert_eq!(sorted(grid.query_point(5.0, 2.0)), vec![0, 1]);
        assert_eq!(sorted(grid.query_point(5.0, 5.0)), vec![0, 1, 2]);
        assert_eq!(sorted(grid.query_point(11.0, 5.0)), Vec::<usize>::new());
    }

    #[test]
    fn explicit_cell_size_and_rect_query() {
        let items = vec![
            (7, Aabb2D::new(-20.0, -20.0, -10.0, -10.0)),
            (9, Aabb2D::new(10.0, 10.0, 30.0, 30.0)),
        ];
        let grid = UniformGrid::with_cell_size(&items, 4.0, 4.0);
        assert_eq!(sorted(grid.query_point(-15.0, -15.0)), vec![7]);
        assert_eq!(
            sorted(grid.query_rect(Aabb2D::new(-10.0, -10.0, 10.0, 10.0))),
            vec![7, 9]
        );
    }

    #[test]
    fn empty_grid_answers_nothing() {
        let grid = UniformGrid::bulk_build(&[]);
        assert_eq!(grid.query_point(0.0, 0.0).count(), 0);
        assert_eq!(grid.query_rect(Aabb2D::new(0.0, 0.0, 1.0, 1.0)).count(), 0);
    }
}
