// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=corral_mesh --heading-base-level=0

//! Corral Mesh: Kurbo-native per-polygon containment structures.
//!
//! For each simple polygon this crate derives the three structures a point containment query
//! needs, from cheapest to most exact:
//!
//! - A delimiter rectangle ([`delimiter_rect`]): the axis-aligned bounds of the ring.
//! - A mesh ([`PolygonMesh`]): the delimiter rectangle cut recursively into a `split × split`
//!   grid. Each terminal cell is [`CellClass::Inside`], [`CellClass::Outside`] or
//!   [`CellClass::Undecided`] according to how much of it the polygon covers.
//! - The sides ([`polygon_sides`]): directed boundary segments used by the exact crossing-number
//!   test ([`locate_point`], [`contains_point`]).
//!
//! A point falling in an inside cell is accepted without further work, an outside cell rejects
//! it, and only undecided cells pay for the exact test. With `earned_prop < 1.0` decided cells
//! are approximate: a small sliver of an inside cell may lie outside the polygon. Use
//! `earned_prop = 1.0` for exact answers.
//!
//! ## Boundary conventions
//!
//! - Rectangle and cell containment are boundary-inclusive.
//! - A point on a polygon side or vertex is contained.
//! - A point on an edge shared by several cells takes the strongest class among them:
//!   inside, then undecided, then outside.
//!
//! # Example
//!
//! ```rust
//! use corral_mesh::{CellClass, MeshParams, Polygon, PolygonMesh, RecordId, polygon_sides, contains_point};
//! use kurbo::Point;
//!
//! let ring = [(0., 0.), (10., 0.), (10., 4.), (4., 4.), (4., 10.), (0., 10.)]
//!     .map(|(x, y)| Point::new(x, y))
//!     .to_vec();
//! let l_shape = Polygon::new(RecordId::int(1), ring).unwrap();
//!
//! let mesh = PolygonMesh::build(&l_shape, &MeshParams::default()).unwrap();
//! assert_eq!(mesh.classify_point(Point::new(7.0, 7.0)), Some(CellClass::Outside));
//! assert_eq!(mesh.classify_point(Point::new(2.0, 2.0)), Some(CellClass::Inside));
//!
//! let sides = polygon_sides(&l_shape);
//! assert!(contains_point(&sides, Point::new(7.0, 2.0)));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod clip;
pub mod crossing;
pub mod error;
pub mod mesh;
pub mod rect;
pub mod sides;
pub mod types;

pub use clip::{clip_ring, covers_rect, overlap_ratio, ring_area};
pub use crossing::{Location, contains_point, locate_point};
pub use error::ValidationError;
pub use mesh::{MeshParams, MeshStats, PolygonMesh};
pub use rect::{delimiter_rect, rect_contains};
pub use sides::{order_vertices, polygon_sides};
pub use types::{CellClass, CellCode, CellKinds, KeyPart, MeshCell, Polygon, PolygonSide, RecordId};
