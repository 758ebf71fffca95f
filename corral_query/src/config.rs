// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable configuration shared by index construction and queries.

use corral_mesh::MeshParams;

use crate::error::{ContainError, Result};

/// What to do with a polygon that fails validation during ingestion.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InvalidPolygonPolicy {
    /// Fail the whole batch on the first invalid polygon.
    #[default]
    Abort,
    /// Drop the polygon, log a warning, and keep going.
    Skip,
}

/// Backend of the coarse delimiter-rectangle filter.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CoarseBackend {
    /// Linear scan; fine for a handful of polygons.
    Flat,
    /// Uniform grid sized from the polygon extent.
    Grid,
    /// Packed STR R-tree.
    #[default]
    StrTree,
}

/// Number of part files written per persisted table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PartitionHints {
    /// Parts of the delimiter rectangle table.
    pub delimiter_rectangle: usize,
    /// Parts of the polygon side table.
    pub polygon_side: usize,
    /// Parts of the polygon mesh table.
    pub polygon_mesh: usize,
}

impl Default for PartitionHints {
    fn default() -> Self {
        Self {
            delimiter_rectangle: 1,
            polygon_side: 1,
            polygon_mesh: 1,
        }
    }
}

/// Column names, mesh parameters, and policies.
///
/// Built once with the `with_*` methods and then passed by reference; nothing mutates it
/// afterwards.
///
/// ```
/// use corral_query::{CoarseBackend, ContainConfig};
///
/// let config = ContainConfig::default()
///     .with_polygon_id(["zone", "block"])
///     .with_coords("lon", "lat")
///     .with_mesh_level(6)
///     .with_backend(CoarseBackend::Grid);
/// config.validate().unwrap();
/// assert_eq!(config.polygon_id(), ["zone", "block"]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ContainConfig {
    polygon_id: Vec<String>,
    coords: [String; 2],
    point_seq: String,
    mesh: MeshParams,
    invalid_polygons: InvalidPolygonPolicy,
    backend: CoarseBackend,
    partitions: PartitionHints,
}

impl Default for ContainConfig {
    fn default() -> Self {
        Self {
            polygon_id: vec!["polygon_id".to_owned()],
            coords: ["coord_x".to_owned(), "coord_y".to_owned()],
            point_seq: "point_seq".to_owned(),
            mesh: MeshParams::default(),
            invalid_polygons: InvalidPolygonPolicy::Abort,
            backend: CoarseBackend::StrTree,
            partitions: PartitionHints::default(),
        }
    }
}

impl ContainConfig {
    /// Polygon identifier column(s); several names form a composite key.
    pub fn with_polygon_id<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.polygon_id = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Coordinate column names, `x` first.
    pub fn with_coords(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.coords = [x.into(), y.into()];
        self
    }

    /// Vertex ordering column of the polygon table.
    pub fn with_point_seq(mut self, column: impl Into<String>) -> Self {
        self.point_seq = column.into();
        self
    }

    /// All mesh parameters at once.
    pub fn with_mesh(mut self, mesh: MeshParams) -> Self {
        self.mesh = mesh;
        self
    }

    /// Mesh branching factor per axis.
    pub fn with_mesh_split(mut self, split: u32) -> Self {
        self.mesh.split = split;
        self
    }

    /// Deepest mesh level.
    pub fn with_mesh_level(mut self, level: u32) -> Self {
        self.mesh.level = level;
        self
    }

    /// Overlap ratio that settles a cell.
    pub fn with_earned_prop(mut self, earned_prop: f64) -> Self {
        self.mesh.earned_prop = earned_prop;
        self
    }

    /// Validation policy for polygons.
    pub fn with_invalid_polygons(mut self, policy: InvalidPolygonPolicy) -> Self {
        self.invalid_polygons = policy;
        self
    }

    /// Coarse filter backend.
    pub fn with_backend(mut self, backend: CoarseBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Part counts for persisted tables.
    pub fn with_partitions(mut self, partitions: PartitionHints) -> Self {
        self.partitions = partitions;
        self
    }

    /// Polygon identifier column(s).
    pub fn polygon_id(&self) -> &[String] {
        &self.polygon_id
    }

    /// Coordinate column names.
    pub fn coords(&self) -> &[String; 2] {
        &self.coords
    }

    /// Vertex ordering column.
    pub fn point_seq(&self) -> &str {
        &self.point_seq
    }

    /// Mesh parameters.
    pub fn mesh(&self) -> &MeshParams {
        &self.mesh
    }

    /// Validation policy.
    pub fn invalid_polygons(&self) -> InvalidPolygonPolicy {
        self.invalid_polygons
    }

    /// Coarse filter backend.
    pub fn backend(&self) -> CoarseBackend {
        self.backend
    }

    /// Part counts for persisted tables.
    pub fn partitions(&self) -> &PartitionHints {
        &self.partitions
    }

    /// Check every setting. Called before any computation starts.
    pub fn validate(&self) -> Result<()> {
        self.mesh.validate()?;
        if self.polygon_id.is_empty() {
            return Err(ContainError::Configuration(
                "at least one polygon id column is required".to_owned(),
            ));
        }
        let names = self
            .polygon_id
            .iter()
            .chain(&self.coords)
            .chain(core::iter::once(&self.point_seq));
        if names.clone().any(String::is_empty) {
            return Err(ContainError::Configuration(
                "column names must not be empty".to_owned(),
            ));
        }
        if self.coords[0] == self.coords[1] {
            return Err(ContainError::Configuration(format!(
                "x and y coordinates share the column `{}`",
                self.coords[0]
            )));
        }
        if let Some(dup) = names
            .clone()
            .enumerate()
            .find_map(|(i, a)| names.clone().skip(i + 1).find(|b| *b == a))
        {
            return Err(ContainError::Configuration(format!(
                "column `{dup}` is used for more than one role"
            )));
        }
        let p = &self.partitions;
        if p.delimiter_rectangle == 0 || p.polygon_side == 0 || p.polygon_mesh == 0 {
            return Err(ContainError::Configuration(
                "partition counts must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}
