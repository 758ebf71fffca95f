// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=corral_query --heading-base-level=0

//! Corral Query: which polygons contain which points.
//!
//! Corral Query builds a [`PolygonIndex`] once from a polygon collection and answers
//! containment queries for any number of point batches against it.
//!
//! - Polygons arrive as vertex rows (id, sequence, coordinates) in a [`Table`] or a stored
//!   table directory ([`Source`]).
//! - For each polygon the index keeps its delimiter rectangle, its sides, and an area-ratio
//!   mesh (see `corral_mesh`). The rectangles go into a coarse `corral_index` backend chosen by
//!   [`CoarseBackend`].
//! - [`containing_polygons`] runs the staged query: rectangle filter, mesh cell lookup, and the
//!   exact crossing test only for points in undecided cells.
//! - [`Container`] wraps index and [`ContainConfig`] and works on tables end to end, including
//!   persistence of the derived tables and of query results.
//!
//! Work is spread over the rayon thread pool: meshes per polygon while building, points while
//! querying. Progress is reported through the `log` facade; no logger is installed here.
//!
//! # Example
//!
//! ```rust
//! use corral_mesh::{Polygon, RecordId};
//! use corral_query::{ContainConfig, PolygonIndex, QueryPoint, containing_polygons};
//! use kurbo::Point;
//!
//! let square = |id, x0: f64, y0: f64| {
//!     let ring = [(0., 0.), (10., 0.), (10., 10.), (0., 10.)]
//!         .map(|(x, y)| Point::new(x0 + x, y0 + y))
//!         .to_vec();
//!     Polygon::new(RecordId::int(id), ring).unwrap()
//! };
//! let index = PolygonIndex::build(
//!     vec![square(1, 0.0, 0.0), square(2, 5.0, 5.0)],
//!     &ContainConfig::default(),
//! )
//! .unwrap();
//!
//! let points = [QueryPoint::new(RecordId::text("p"), Point::new(7.0, 7.0))];
//! let (found, stats) = containing_polygons(&points, &index);
//! assert_eq!(found.len(), 2);
//! assert_eq!(stats.decided_inside, 2);
//! ```
//!
//! ## Boundaries and precision
//!
//! Points on a polygon edge or vertex are contained. With `earned_prop < 1.0` the mesh decides
//! some points from cell coverage alone, so a point in a mostly covered cell can be accepted
//! just outside the polygon (and the converse). Set `earned_prop` to `1.0` for exact results.

pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod ingest;
pub mod source;
pub mod store;
pub mod table;

pub use config::{CoarseBackend, ContainConfig, InvalidPolygonPolicy, PartitionHints};
pub use engine::{Container, ContainmentResult, QueryStats, containing_polygons};
pub use error::{ContainError, Result};
pub use index::{IndexedPolygon, PolygonIndex};
pub use ingest::{IngestedPoints, IngestedPolygons, QueryPoint, points_from_table, polygons_from_table};
pub use source::Source;
pub use store::{read_table, write_table};
pub use table::{Table, Value};
