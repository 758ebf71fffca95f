// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=corral_index --heading-base-level=0

//! Corral Index: a read-only 2D AABB index.
//!
//! Corral Index answers "which boxes contain this point?" for a fixed set of boxes.
//!
//! - Build once from `(aabb, payload)` entries with [`IndexGeneric::build`].
//! - Query by point or intersecting rectangle; results come back in slot order.
//! - Containment is boundary-inclusive, so a point on a shared edge hits every box touching it.
//!
//! It works on `f64` coordinates and does not depend on any geometry crate.
//! Higher layers (like the polygon containment index in `corral_query`) compute bounding
//! rectangles and feed them here.
//!
//! Backends are pluggable via a simple trait. There is no incremental update path: when the
//! input changes, build a new index.
//!
//! # Example
//!
//! ```rust
//! use corral_index::{Aabb2D, StrIndex};
//!
//! let idx: StrIndex<&str> = StrIndex::build(vec![
//!     (Aabb2D::new(0.0, 0.0, 10.0, 10.0), "a"),
//!     (Aabb2D::new(5.0, 5.0, 15.0, 15.0), "b"),
//! ]);
//!
//! let hits: Vec<_> = idx.query_point(6.0, 6.0).map(|(_, p)| *p).collect();
//! assert_eq!(hits, ["a", "b"]);
//! ```
//!
//! ## Choosing a backend
//!
//! - `FlatVec` ([`Index`]): linear scans. Good for very small sets.
//! - `UniformGrid` ([`GridIndex`]): cell size derived from the extent. Great when boxes are
//!   evenly spread and similar in size.
//! - `StrTree` ([`StrIndex`]): packed R-tree. Good general-purpose choice for irregular
//!   distributions. See the [`backends`] docs for a brief STR overview.
//!
//! ### Float semantics
//!
//! Coordinates are assumed finite. NaN query coordinates never match.

#![no_std]

extern crate alloc;

pub mod backend;
pub mod backends;
pub mod index;
pub mod types;

pub use backend::Backend;
pub use backends::{FlatVec, StrTree, UniformGrid};
pub use index::{GridIndex, Index, IndexGeneric, Slot, StrIndex};
pub use types::{Aabb2D, union_all};
