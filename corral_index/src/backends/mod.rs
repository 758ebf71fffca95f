// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `flatvec`: flat vector with linear scans (small, simple).
//! - `grid`: uniform grid with a cell size derived from the input extent.
//! - `str_tree`: packed R-tree built with Sort-Tile-Recursive (STR) passes.
//!
//! STR note
//! --------
//! The packed tree sorts items by centroid x, cuts them into `ceil(sqrt(leaves))` vertical
//! slices, sorts each slice by centroid y, and packs runs of `max_children` items into leaves.
//! The same pass is repeated over node boxes until a single root remains.
//! Since the index is read-only there is no insertion split heuristic to maintain.

pub mod flatvec;
pub mod grid;
pub mod str_tree;

pub use flatvec::FlatVec;
pub use grid::UniformGrid;
pub use str_tree::StrTree;
