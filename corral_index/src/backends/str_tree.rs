// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed R-tree backend built with Sort-Tile-Recursive passes.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::Aabb2D;

const DEFAULT_MAX_CHILDREN: usize = 8;

#[derive(Clone, Debug)]
enum Children {
    Items(Vec<(usize, Aabb2D)>),
    Nodes(Vec<usize>),
}

#[derive(Clone, Debug)]
struct Node {
    bbox: Aabb2D,
    children: Children,
}

/// Read-only packed R-tree.
///
/// Leaves hold up to `max_children` items and inner nodes up to `max_children` nodes.
/// Queries descend only into nodes whose box contains the point (or meets the rectangle).
pub struct StrTree {
    max_children: usize,
    root: Option<usize>,
    arena: Vec<Node>,
}

impl StrTree {
    /// Build a packed tree with a custom fan-out (clamped to at least 2).
    pub fn with_max_children(items: &[(usize, Aabb2D)], max_children: usize) -> Self {
        let max_children = max_children.max(2);
        let mut arena = Vec::new();
        let mut items = items.to_vec();
        let root = Self::pack(&mut arena, &mut items, max_children);
        Self {
            max_children,
            root,
            arena,
        }
    }

    /// Depth of the tree; `0` when empty, `1` when the root is a leaf.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cur = self.root;
        while let Some(i) = cur {
            depth += 1;
            cur = match &self.arena[i].children {
                Children::Nodes(n) => n.first().copied(),
                Children::Items(_) => None,
            };
        }
        depth
    }

    fn slices_for(count: usize) -> usize {
        let mut g = 1_usize;
        while g * g < count {
            g += 1;
        }
        g
    }

    fn by_center_x(a: &Aabb2D, b: &Aabb2D) -> Ordering {
        a.center_x()
            .partial_cmp(&b.center_x())
            .unwrap_or(Ordering::Equal)
    }

    fn by_center_y(a: &Aabb2D, b: &Aabb2D) -> Ordering {
        a.center_y()
            .partial_cmp(&b.center_y())
            .unwrap_or(Ordering::Equal)
    }

    fn bbox_of(boxes: impl Iterator<Item = Aabb2D>) -> Aabb2D {
        boxes
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or(Aabb2D::new(0.0, 0.0, 0.0, 0.0))
    }

    fn pack(
        arena: &mut Vec<Node>,
        items: &mut [(usize, Aabb2D)],
        max_children: usize,
    ) -> Option<usize> {
        if items.is_empty() {
            return None;
        }

        // Leaf level
        let n = items.len();
        let gx = Self::slices_for(n.div_ceil(max_children));
        items.sort_by(|a, b| Self::by_center_x(&a.1, &b.1));
        let slice_size = n.div_ceil(gx);
        let mut level: Vec<usize> = Vec::new();
        for slice in items.chunks_mut(slice_size) {
            slice.sort_by(|a, b| Self::by_center_y(&a.1, &b.1));
            for chunk in slice.chunks(max_children) {
                arena.push(Node {
                    bbox: Self::bbox_of(chunk.iter().map(|(_, b)| *b)),
                    children: Children::Items(chunk.to_vec()),
                });
                level.push(arena.len() - 1);
            }
        }

        // Promote until a single root remains
        while level.len() > 1 {
            let n_nodes = level.len();
            let gx = Self::slices_for(n_nodes.div_ceil(max_children));
            level.sort_by(|&a, &b| Self::by_center_x(&arena[a].bbox, &arena[b].bbox));
            let slice_size = n_nodes.div_ceil(gx);
            let mut next = Vec::new();
            for slice in level.chunks_mut(slice_size) {
                slice.sort_by(|&a, &b| Self::by_center_y(&arena[a].bbox, &arena[b].bbox));
                for chunk in slice.chunks(max_children) {
                    let bbox = Self::bbox_of(chunk.iter().map(|&c| arena[c].bbox));
                    arena.push(Node {
                        bbox,
                        children: Children::Nodes(chunk.to_vec()),
                    });
                    next.push(arena.len() - 1);
                }
            }
            level = next;
        }
        level.first().copied()
    }

    fn collect<F>(&self, node_hit: F) -> Vec<usize>
    where
        F: Fn(&Aabb2D) -> bool,
    {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.root.into_iter().collect();
        while let Some(i) = stack.pop() {
            let node = &self.arena[i];
            if !node_hit(&node.bbox) {
                continue;
            }
            match &node.children {
                Children::Items(items) => {
                    out.extend(items.iter().filter(|(_, b)| node_hit(b)).map(|(s, _)| *s));
                }
                Children::Nodes(nodes) => stack.extend(nodes.iter().copied()),
            }
        }
        out
    }
}

impl Backend for StrTree {
    fn bulk_build(items: &[(usize, Aabb2D)]) -> Self {
        Self::with_max_children(items, DEFAULT_MAX_CHILDREN)
    }

    fn query_point<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(self.collect(|b| b.contains_point(x, y)).into_iter())
    }

    fn query_rect<'a>(&'a self, rect: Aabb2D) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(
            self.collect(|b| !b.intersect(&rect).is_empty())
                .into_iter(),
        )
    }
}

impl Debug for StrTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StrTree")
            .field("max_children", &self.max_children)
            .field("nodes", &self.arena.len())
            .field("depth", &self.depth())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn grid_items(n: usize) -> Vec<(usize, Aabb2D)> {
        let mut out = Vec::new();
        for y in 0..n {
            for x in 0..n {
                let slot = y * n + x;
                out.push((slot, Aabb2D::from_xywh(x as f64, y as f64, 1.0, 1.0)));
            }
        }
        out
    }

    #[test]
    fn packed_tree_matches_linear_scan() {
        let items = grid_items(12);
        let tree = StrTree::bulk_build(&items);
        assert!(tree.depth() >= 2);
        for (qx, qy) in [(0.5, 0.5), (3.0, 4.0), (11.9, 0.1), (6.0, 6.0), (12.5, 1.0)] {
            let mut got: Vec<_> = tree.query_point(qx, qy).collect();
            got.sort_unstable();
            let mut want: Vec<_> = items
                .iter()
                .filter(|(_, b)| b.contains_point(qx, qy))
                .map(|(s, _)| *s)
                .collect();
            want.sort_unstable();
            assert_eq!(got, want, "query at ({qx}, {qy})");
        }
    }

    #[test]
    fn rect_query_and_small_fanout() {
        let items = grid_items(5);
        let tree = StrTree::with_max_children(&items, 2);
        let mut got: Vec<_> = tree
            .query_rect(Aabb2D::new(1.5, 1.5, 2.5, 2.5))
            .collect();
        got.sort_unstable();
        assert_eq!(got, vec![6, 7, 11, 12]);
    }

    #[test]
    fn empty_tree() {
        let tree = StrTree::bulk_build(&[]);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.query_point(0.0, 0.0).count(), 0);
    }
}
