// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Validation errors for polygons and mesh parameters.

use thiserror::Error;

/// Reasons a polygon or a set of mesh parameters is rejected.
///
/// Every variant is fatal for the polygon (or mesh) it was raised for.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Fewer than three distinct ring vertices.
    #[error("polygon has {count} vertices, at least 3 are required")]
    TooFewVertices {
        /// Vertex count after dropping a repeated closing vertex.
        count: usize,
    },

    /// A vertex coordinate is NaN or infinite.
    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Position of the vertex in ring order.
        index: usize,
    },

    /// Two vertices share a sequence value.
    #[error("vertex sequence value {seq} appears more than once")]
    DuplicateSequence {
        /// The repeated sequence value.
        seq: i64,
    },

    /// The sequence values skip one or more integers.
    #[error("vertex sequence jumps from {after} to {next}")]
    MissingSequence {
        /// Last sequence value before the gap.
        after: i64,
        /// First sequence value after the gap.
        next: i64,
    },

    /// `split` must be at least 2.
    #[error("mesh split must be at least 2, got {split}")]
    SplitTooSmall {
        /// Offending branching factor.
        split: u32,
    },

    /// `earned_prop` must lie in (0.5, 1.0].
    #[error("earned proportion must be in (0.5, 1.0], got {value}")]
    EarnedPropOutOfRange {
        /// Offending threshold.
        value: f64,
    },

    /// `split^level` does not fit the cell coordinate range.
    #[error("mesh split {split} with level {level} exceeds the addressable cell range")]
    MeshTooDeep {
        /// Branching factor.
        split: u32,
        /// Requested depth.
        level: u32,
    },

    /// Stored mesh cells do not match the mesh parameters or tile the rectangle.
    #[error("mesh cells are inconsistent: {0}")]
    InconsistentMesh(&'static str),

    /// A stored derived record (delimiter rectangle or side) disagrees with the vertices it
    /// was derived from.
    #[error("stored {0} does not match the polygon vertices")]
    StaleDerived(&'static str),
}
