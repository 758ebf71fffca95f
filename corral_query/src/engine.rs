// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The staged containment query.
//!
//! 1. Coarse filter: polygons whose delimiter rectangle contains the point.
//! 2. Cell lookup: the point's terminal mesh cell in each candidate polygon. Inside cells
//!    accept, outside cells reject, undecided cells go on.
//! 3. Exact test: crossing number against the polygon sides, for undecided candidates only.
//!    A candidate whose mesh has no cell at the point is treated as undecided.
//! 4. Compose: accepted pairs from stages 2 and 3, carrying the point's attributes, with
//!    each (point, polygon) pair kept once.

use std::collections::HashSet;
use std::ops::AddAssign;
use std::path::Path;

use corral_index::Slot;
use corral_mesh::{CellClass, RecordId, contains_point};
use kurbo::Point;
use rayon::prelude::*;

use crate::config::ContainConfig;
use crate::error::{ContainError, Result};
use crate::index::PolygonIndex;
use crate::ingest::{QueryPoint, points_from_table};
use crate::source::Source;
use crate::store::write_table;
use crate::table::{Table, Value};

/// Per-stage counts of one query.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Points examined.
    pub points: usize,
    /// Point/polygon pairs that passed the coarse filter.
    pub candidates: usize,
    /// Pairs accepted by an inside cell.
    pub decided_inside: usize,
    /// Pairs rejected by an outside cell.
    pub decided_outside: usize,
    /// Pairs that landed in an undecided cell.
    pub undecided: usize,
    /// Pairs whose point matched no mesh cell; resolved by the exact test.
    pub unmatched_cells: usize,
    /// Pairs accepted by the exact test.
    pub accepted_exact: usize,
    /// Result rows.
    pub results: usize,
}

impl AddAssign for QueryStats {
    fn add_assign(&mut self, o: Self) {
        self.points += o.points;
        self.candidates += o.candidates;
        self.decided_inside += o.decided_inside;
        self.decided_outside += o.decided_outside;
        self.undecided += o.undecided;
        self.unmatched_cells += o.unmatched_cells;
        self.accepted_exact += o.accepted_exact;
        self.results += o.results;
    }
}

/// A point contained in a polygon.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainmentResult {
    /// Point identifier.
    pub point: RecordId,
    /// Polygon identifier.
    pub polygon: RecordId,
    /// Point location.
    pub at: Point,
    /// Passthrough attributes of the point.
    pub attrs: Vec<Value>,
}

// Stages 1 to 3 for one point. Returns accepted slots, ascending.
fn locate(point: &QueryPoint, index: &PolygonIndex) -> (Vec<Slot>, QueryStats) {
    let mut stats = QueryStats {
        points: 1,
        ..QueryStats::default()
    };
    let candidates = index.candidates(point.at, point.hint.as_ref());
    stats.candidates = candidates.len();

    let mut accepted = Vec::new();
    let mut exact = Vec::new();
    for slot in candidates {
        let Some(entry) = index.get(slot) else {
            continue;
        };
        match entry.mesh().classify_point(point.at) {
            Some(CellClass::Inside) => {
                stats.decided_inside += 1;
                accepted.push(slot);
            }
            Some(CellClass::Outside) => stats.decided_outside += 1,
            Some(CellClass::Undecided) => {
                stats.undecided += 1;
                exact.push(slot);
            }
            None => {
                log::warn!(
                    "point {} at ({}, {}) matched no mesh cell of polygon {}",
                    point.id,
                    point.at.x,
                    point.at.y,
                    entry.id()
                );
                stats.unmatched_cells += 1;
                exact.push(slot);
            }
        }
    }
    for slot in exact {
        if index
            .get(slot)
            .is_some_and(|entry| contains_point(entry.sides(), point.at))
        {
            stats.accepted_exact += 1;
            accepted.push(slot);
        }
    }
    accepted.sort_unstable();
    accepted.dedup();
    (accepted, stats)
}

/// Every polygon of `index` containing each of `points`.
///
/// Points are processed in parallel. Results come in point order, then polygon identifier
/// order, so identical inputs give identical output. A point in no polygon yields no
/// result; a point in several polygons yields one result per polygon.
pub fn containing_polygons(
    points: &[QueryPoint],
    index: &PolygonIndex,
) -> (Vec<ContainmentResult>, QueryStats) {
    let located: Vec<(Vec<Slot>, QueryStats)> =
        points.par_iter().map(|p| locate(p, index)).collect();

    let mut stats = QueryStats::default();
    let mut seen: HashSet<(&RecordId, &RecordId)> = HashSet::new();
    let mut out = Vec::new();
    for (point, (slots, s)) in points.iter().zip(located) {
        stats += s;
        for entry in slots.into_iter().filter_map(|slot| index.get(slot)) {
            if seen.insert((&point.id, entry.id())) {
                out.push(ContainmentResult {
                    point: point.id.clone(),
                    polygon: entry.id().clone(),
                    at: point.at,
                    attrs: point.attrs.clone(),
                });
            }
        }
    }
    stats.results = out.len();
    log::debug!("containment query: {stats:?}");
    (out, stats)
}

/// A polygon index together with the configuration it was built with.
///
/// ```
/// use corral_query::{ContainConfig, Container, Table, Value};
///
/// let mut polygons = Table::new(["polygon_id", "point_seq", "coord_x", "coord_y"]);
/// for (seq, (x, y)) in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)].into_iter().enumerate() {
///     polygons
///         .push_row(vec![Value::Int(1), Value::Int(seq as i64), x.into(), y.into()])
///         .unwrap();
/// }
/// let container = Container::build(polygons, ContainConfig::default()).unwrap();
///
/// let mut points = Table::new(["point_id", "coord_x", "coord_y"]);
/// points.push_row(vec!["in".into(), 5.0.into(), 5.0.into()]).unwrap();
/// points.push_row(vec!["out".into(), 15.0.into(), 5.0.into()]).unwrap();
///
/// let (rows, stats) = container.query(points, &["point_id"], &[]).unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows.rows()[0][0], Value::from("in"));
/// assert_eq!(stats.points, 2);
/// ```
#[derive(Debug)]
pub struct Container {
    config: ContainConfig,
    index: PolygonIndex,
}

impl Container {
    /// Ingest polygon vertex rows and build the index.
    pub fn build(polygons: impl Into<Source>, config: ContainConfig) -> Result<Self> {
        let index = PolygonIndex::from_source(polygons.into(), &config)?;
        Ok(Self { config, index })
    }

    /// Load an index saved with [`Container::save`].
    pub fn load(dir: &Path, config: ContainConfig) -> Result<Self> {
        let index = PolygonIndex::load(dir, &config)?;
        Ok(Self { config, index })
    }

    /// Persist the index under `dir`.
    pub fn save(&self, dir: &Path) -> Result<()> {
        self.index.save(dir, &self.config)
    }

    /// Configuration in use.
    pub fn config(&self) -> &ContainConfig {
        &self.config
    }

    /// The polygon index.
    pub fn index(&self) -> &PolygonIndex {
        &self.index
    }

    /// Locate point rows.
    ///
    /// The result has the point id column(s), the polygon id column(s), the coordinates, and
    /// the `add_cols` columns, with duplicate rows removed.
    pub fn query<S: AsRef<str>>(
        &self,
        points: impl Into<Source>,
        point_id: &[S],
        add_cols: &[S],
    ) -> Result<(Table, QueryStats)> {
        self.config.validate()?;
        let table = points.into().resolve()?;
        let ingested = points_from_table(&table, point_id, add_cols, &self.config)?;

        let [x, y] = self.config.coords();
        let columns: Vec<String> = point_id
            .iter()
            .map(|c| c.as_ref().to_owned())
            .chain(self.config.polygon_id().iter().cloned())
            .chain([x.clone(), y.clone()])
            .chain(ingested.attr_columns.iter().cloned())
            .collect();
        if let Some(dup) = (0..columns.len())
            .find_map(|i| columns[i + 1..].iter().find(|c| **c == columns[i]))
        {
            return Err(ContainError::Configuration(format!(
                "column `{dup}` would appear twice in the result"
            )));
        }

        let (found, mut stats) = containing_polygons(&ingested.points, &self.index);
        let mut out = Table::new(columns);
        for r in found {
            let mut row: Vec<Value> = r.point.0.into_iter().map(Value::from).collect();
            row.extend(r.polygon.0.into_iter().map(Value::from));
            row.extend([Value::Float(r.at.x), Value::Float(r.at.y)]);
            row.extend(r.attrs);
            out.push_row(row)?;
        }
        let out = out.distinct();
        stats.results = out.len();
        Ok((out, stats))
    }

    /// Locate point rows and write the result table to `dir` in `partitions` parts.
    pub fn query_to<S: AsRef<str>>(
        &self,
        points: impl Into<Source>,
        point_id: &[S],
        add_cols: &[S],
        dir: &Path,
        partitions: usize,
    ) -> Result<QueryStats> {
        let (table, stats) = self.query(points, point_id, add_cols)?;
        write_table(&table, dir, partitions)?;
        log::info!("wrote {} containment rows to {}", table.len(), dir.display());
        Ok(stats)
    }
}
