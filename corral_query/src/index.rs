// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The prebuilt polygon index: delimiter rectangles, sides, and meshes of every polygon,
//! behind a coarse rectangle filter.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use corral_index::{Aabb2D, GridIndex, Index, Slot, StrIndex};
use corral_mesh::{
    CellClass, CellCode, MeshParams, MeshStats, Polygon, PolygonMesh, PolygonSide, RecordId,
    ValidationError, delimiter_rect, polygon_sides, rect_contains,
};
use kurbo::{Point, Rect};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{CoarseBackend, ContainConfig};
use crate::error::{ContainError, Result};
use crate::ingest::{polygons_from_table, reject};
use crate::source::Source;
use crate::store::{read_table, write_table};
use crate::table::{Table, Value};

/// Sub-directory of the polygon vertex table.
pub const POLYGON_DIR: &str = "polygon";
/// Sub-directory of the delimiter rectangle table.
pub const DELIMITER_RECTANGLE_DIR: &str = "delimiter_rectangle";
/// Sub-directory of the polygon side table.
pub const POLYGON_SIDE_DIR: &str = "polygon_side";
/// Sub-directory of the mesh cell table.
pub const POLYGON_MESH_DIR: &str = "polygon_mesh";
const MESH_PARAMS_FILE: &str = "mesh.json";

const RECT_COLUMNS: [&str; 4] = ["min_x", "max_x", "min_y", "max_y"];
const SIDE_COLUMNS: [&str; 5] = ["side_seq", "start_x", "start_y", "end_x", "end_y"];
const CELL_COLUMNS: [&str; 6] = [
    "cell_id",
    "cell_level",
    "cell_ix",
    "cell_iy",
    "cell_type",
    "cell_ratio",
];

#[derive(Serialize, Deserialize)]
struct StoredMeshParams {
    split: u32,
    level: u32,
    earned_prop: f64,
}

/// Everything derived from one polygon.
#[derive(Clone, Debug)]
pub struct IndexedPolygon {
    polygon: Polygon,
    rect: Rect,
    sides: Vec<PolygonSide>,
    mesh: PolygonMesh,
}

impl IndexedPolygon {
    fn build(polygon: Polygon, params: &MeshParams) -> Result<Self> {
        let mesh = PolygonMesh::build(&polygon, params).map_err(|source| {
            ContainError::Validation {
                polygon: polygon.id().clone(),
                source,
            }
        })?;
        Ok(Self {
            rect: delimiter_rect(&polygon),
            sides: polygon_sides(&polygon),
            mesh,
            polygon,
        })
    }

    /// Polygon identifier.
    pub fn id(&self) -> &RecordId {
        self.polygon.id()
    }

    /// The polygon.
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Delimiter rectangle.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Boundary sides in ring order.
    pub fn sides(&self) -> &[PolygonSide] {
        &self.sides
    }

    /// Area-ratio mesh.
    pub fn mesh(&self) -> &PolygonMesh {
        &self.mesh
    }
}

fn aabb(r: Rect) -> Aabb2D {
    Aabb2D::new(r.x0, r.y0, r.x1, r.y1)
}

// One variant per coarse backend; each owns the polygons as payloads, in slot order.
enum Coarse {
    Flat(Index<IndexedPolygon>),
    Grid(GridIndex<IndexedPolygon>),
    Str(StrIndex<IndexedPolygon>),
}

impl Coarse {
    fn build(backend: CoarseBackend, polygons: Vec<IndexedPolygon>) -> Self {
        let entries: Vec<_> = polygons.into_iter().map(|p| (aabb(p.rect), p)).collect();
        match backend {
            CoarseBackend::Flat => Self::Flat(Index::build(entries)),
            CoarseBackend::Grid => Self::Grid(GridIndex::build(entries)),
            CoarseBackend::StrTree => Self::Str(StrIndex::build(entries)),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Flat(i) => i.len(),
            Self::Grid(i) => i.len(),
            Self::Str(i) => i.len(),
        }
    }

    fn get(&self, slot: Slot) -> Option<&IndexedPolygon> {
        let hit = match self {
            Self::Flat(i) => i.get(slot),
            Self::Grid(i) => i.get(slot),
            Self::Str(i) => i.get(slot),
        };
        hit.map(|(_, p)| p)
    }

    fn query_point(&self, p: Point) -> Vec<Slot> {
        match self {
            Self::Flat(i) => i.query_point(p.x, p.y).map(|(s, _)| s).collect(),
            Self::Grid(i) => i.query_point(p.x, p.y).map(|(s, _)| s).collect(),
            Self::Str(i) => i.query_point(p.x, p.y).map(|(s, _)| s).collect(),
        }
    }

    fn backend(&self) -> CoarseBackend {
        match self {
            Self::Flat(_) => CoarseBackend::Flat,
            Self::Grid(_) => CoarseBackend::Grid,
            Self::Str(_) => CoarseBackend::StrTree,
        }
    }
}

/// Read-only containment index over a polygon collection.
///
/// Built once and shared by any number of concurrent queries. When the polygons change,
/// build a new one.
pub struct PolygonIndex {
    coarse: Coarse,
    slots: BTreeMap<RecordId, Slot>,
    params: MeshParams,
    skipped: Vec<(RecordId, ValidationError)>,
}

impl fmt::Debug for PolygonIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolygonIndex")
            .field("polygons", &self.len())
            .field("backend", &self.coarse.backend())
            .field("params", &self.params)
            .field("skipped", &self.skipped.len())
            .finish_non_exhaustive()
    }
}

impl PolygonIndex {
    /// Build rectangles, sides, and meshes for `polygons`, in parallel.
    ///
    /// Polygons are ordered by identifier; two polygons with the same identifier are a
    /// configuration error.
    pub fn build(mut polygons: Vec<Polygon>, config: &ContainConfig) -> Result<Self> {
        config.validate()?;
        polygons.sort_by(|a, b| a.id().cmp(b.id()));
        if let Some(w) = polygons.windows(2).find(|w| w[0].id() == w[1].id()) {
            return Err(ContainError::Configuration(format!(
                "polygon identifier {} appears more than once",
                w[0].id()
            )));
        }
        let params = *config.mesh();
        let built = polygons
            .into_par_iter()
            .map(|p| IndexedPolygon::build(p, &params))
            .collect::<Result<Vec<_>>>()?;
        let index = Self::assemble(built, params, config.backend());
        let stats = index.mesh_stats();
        log::info!(
            "built polygon index: {} polygons, {} mesh cells ({} inside, {} outside, {} undecided)",
            index.len(),
            stats.total(),
            stats.inside,
            stats.outside,
            stats.undecided
        );
        Ok(index)
    }

    /// Ingest vertex rows and build the index. Polygons rejected under
    /// [`InvalidPolygonPolicy::Skip`](crate::InvalidPolygonPolicy::Skip) are listed by
    /// [`PolygonIndex::skipped`].
    pub fn from_source(source: Source, config: &ContainConfig) -> Result<Self> {
        config.validate()?;
        let table = source.resolve()?;
        let ingested = polygons_from_table(&table, config)?;
        let mut index = Self::build(ingested.polygons, config)?;
        index.skipped = ingested.skipped;
        Ok(index)
    }

    fn assemble(polygons: Vec<IndexedPolygon>, params: MeshParams, backend: CoarseBackend) -> Self {
        let slots = polygons
            .iter()
            .enumerate()
            .map(|(slot, p)| (p.id().clone(), slot))
            .collect();
        Self {
            coarse: Coarse::build(backend, polygons),
            slots,
            params,
            skipped: Vec::new(),
        }
    }

    /// Number of indexed polygons.
    pub fn len(&self) -> usize {
        self.coarse.len()
    }

    /// Whether no polygon is indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mesh parameters every mesh was built with.
    pub fn params(&self) -> &MeshParams {
        &self.params
    }

    /// Polygons dropped during ingestion.
    pub fn skipped(&self) -> &[(RecordId, ValidationError)] {
        &self.skipped
    }

    /// Polygon at `slot`.
    pub fn get(&self, slot: Slot) -> Option<&IndexedPolygon> {
        self.coarse.get(slot)
    }

    /// Slot of the polygon with this identifier.
    pub fn slot_of(&self, id: &RecordId) -> Option<Slot> {
        self.slots.get(id).copied()
    }

    /// Polygons in slot order, which is identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexedPolygon> + '_ {
        (0..self.len()).filter_map(|slot| self.get(slot))
    }

    /// Coarse filter: slots of the polygons whose delimiter rectangle contains `p`, ascending.
    ///
    /// With a `hint`, only that polygon is considered.
    pub fn candidates(&self, p: Point, hint: Option<&RecordId>) -> Vec<Slot> {
        match hint {
            None => self.coarse.query_point(p),
            Some(id) => self
                .slot_of(id)
                .filter(|&slot| self.get(slot).is_some_and(|c| rect_contains(&c.rect, p)))
                .into_iter()
                .collect(),
        }
    }

    /// Mesh cell counts summed over all polygons.
    pub fn mesh_stats(&self) -> MeshStats {
        self.iter().fold(MeshStats::default(), |mut acc, p| {
            let s = p.mesh.stats();
            acc.inside += s.inside;
            acc.outside += s.outside;
            acc.undecided += s.undecided;
            acc.depth = acc.depth.max(s.depth);
            acc
        })
    }

    fn id_values(id: &RecordId) -> impl Iterator<Item = Value> + '_ {
        id.parts().iter().cloned().map(Value::from)
    }

    fn columns_with(config: &ContainConfig, extra: &[&str]) -> Vec<String> {
        config
            .polygon_id()
            .iter()
            .cloned()
            .chain(extra.iter().map(|c| (*c).to_owned()))
            .collect()
    }

    /// One row per vertex: polygon id, sequence, coordinates.
    pub fn polygon_table(&self, config: &ContainConfig) -> Result<Table> {
        let [x, y] = config.coords();
        let mut t = Table::new(Self::columns_with(config, &[config.point_seq(), x.as_str(), y.as_str()]));
        for p in self.iter() {
            for (seq, v) in (0_i64..).zip(p.polygon.vertices()) {
                let mut row: Vec<Value> = Self::id_values(p.id()).collect();
                row.extend([Value::from(seq), v.x.into(), v.y.into()]);
                t.push_row(row)?;
            }
        }
        Ok(t)
    }

    /// One row per polygon: id and delimiter rectangle.
    pub fn delimiter_rectangle_table(&self, config: &ContainConfig) -> Result<Table> {
        let mut t = Table::new(Self::columns_with(config, &RECT_COLUMNS));
        for p in self.iter() {
            let r = p.rect;
            let mut row: Vec<Value> = Self::id_values(p.id()).collect();
            row.extend([Value::from(r.x0), r.x1.into(), r.y0.into(), r.y1.into()]);
            t.push_row(row)?;
        }
        Ok(t)
    }

    /// One row per side: id, side sequence, endpoints.
    pub fn polygon_side_table(&self, config: &ContainConfig) -> Result<Table> {
        let mut t = Table::new(Self::columns_with(config, &SIDE_COLUMNS));
        for p in self.iter() {
            for s in &p.sides {
                let mut row: Vec<Value> = Self::id_values(p.id()).collect();
                row.extend([
                    int_value(s.seq as u64),
                    s.a.x.into(),
                    s.a.y.into(),
                    s.b.x.into(),
                    s.b.y.into(),
                ]);
                t.push_row(row)?;
            }
        }
        Ok(t)
    }

    /// One row per terminal mesh cell: id, cell code, classification, ratio, rectangle.
    pub fn polygon_mesh_table(&self, config: &ContainConfig) -> Result<Table> {
        let extra: Vec<&str> = CELL_COLUMNS.iter().chain(&RECT_COLUMNS).copied().collect();
        let mut t = Table::new(Self::columns_with(config, &extra));
        for p in self.iter() {
            for c in p.mesh.cells() {
                let mut row: Vec<Value> = Self::id_values(p.id()).collect();
                row.extend([
                    Value::from(c.code.to_string()),
                    int_value(u64::from(c.code.level)),
                    int_value(c.code.ix),
                    int_value(c.code.iy),
                    c.class.as_str().into(),
                    c.ratio.into(),
                    c.rect.x0.into(),
                    c.rect.x1.into(),
                    c.rect.y0.into(),
                    c.rect.y1.into(),
                ]);
                t.push_row(row)?;
            }
        }
        Ok(t)
    }

    /// Persist every derived table under `dir`, plus the mesh parameters.
    pub fn save(&self, dir: &Path, config: &ContainConfig) -> Result<()> {
        let parts = config.partitions();
        write_table(&self.polygon_table(config)?, &dir.join(POLYGON_DIR), 1)?;
        write_table(
            &self.delimiter_rectangle_table(config)?,
            &dir.join(DELIMITER_RECTANGLE_DIR),
            parts.delimiter_rectangle,
        )?;
        write_table(
            &self.polygon_side_table(config)?,
            &dir.join(POLYGON_SIDE_DIR),
            parts.polygon_side,
        )?;
        write_table(
            &self.polygon_mesh_table(config)?,
            &dir.join(POLYGON_MESH_DIR),
            parts.polygon_mesh,
        )?;
        let path = dir.join(MESH_PARAMS_FILE);
        let stored = StoredMeshParams {
            split: self.params.split,
            level: self.params.level,
            earned_prop: self.params.earned_prop,
        };
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| ContainError::decode(&path, e.to_string()))?;
        fs::write(&path, json).map_err(|e| ContainError::io(&path, e))?;
        log::info!("saved polygon index with {} polygons to {}", self.len(), dir.display());
        Ok(())
    }

    /// Load an index written by [`PolygonIndex::save`] without rebuilding the meshes.
    ///
    /// Column names come from `config`; mesh parameters come from the stored data. Each
    /// polygon's stored rectangle and sides must equal the ones derived from its stored
    /// vertices, and its cells must tile the rectangle; a polygon failing either check is
    /// handled by the configured [`InvalidPolygonPolicy`](crate::InvalidPolygonPolicy).
    pub fn load(dir: &Path, config: &ContainConfig) -> Result<Self> {
        config.validate()?;
        let path = dir.join(MESH_PARAMS_FILE);
        let raw = fs::read_to_string(&path).map_err(|e| ContainError::io(&path, e))?;
        let stored: StoredMeshParams =
            serde_json::from_str(&raw).map_err(|e| ContainError::decode(&path, e.to_string()))?;
        let params = MeshParams {
            split: stored.split,
            level: stored.level,
            earned_prop: stored.earned_prop,
        };
        params.validate()?;
        if params != *config.mesh() {
            log::debug!("stored mesh parameters {params:?} differ from configured ones");
        }

        let ingested = polygons_from_table(&read_table(&dir.join(POLYGON_DIR))?, config)?;
        let mut rects = load_rects(&dir.join(DELIMITER_RECTANGLE_DIR), config)?;
        let mut sides = load_sides(&dir.join(POLYGON_SIDE_DIR), config)?;
        let mut cells = load_cells(&dir.join(POLYGON_MESH_DIR), config)?;

        let mut skipped = ingested.skipped;
        let mut built = Vec::with_capacity(ingested.polygons.len());
        for polygon in ingested.polygons {
            let id = polygon.id().clone();
            let missing = |table: &str| {
                ContainError::decode(dir.join(table), format!("no rows for polygon {id}"))
            };
            let rect = rects.remove(&id).ok_or_else(|| missing(DELIMITER_RECTANGLE_DIR))?;
            let ring_sides = sides.remove(&id).ok_or_else(|| missing(POLYGON_SIDE_DIR))?;
            let mesh_cells = cells.remove(&id).ok_or_else(|| missing(POLYGON_MESH_DIR))?;
            let checked = if rect != delimiter_rect(&polygon) {
                Err(ValidationError::StaleDerived("delimiter rectangle"))
            } else if ring_sides != polygon_sides(&polygon) {
                Err(ValidationError::StaleDerived("polygon sides"))
            } else {
                PolygonMesh::from_cells(rect, &params, mesh_cells)
            };
            match checked {
                Ok(mesh) => built.push(IndexedPolygon {
                    polygon,
                    rect,
                    sides: ring_sides,
                    mesh,
                }),
                Err(e) => reject(config.invalid_polygons(), id, e, &mut skipped)?,
            }
        }
        let mut index = Self::assemble(built, params, config.backend());
        index.skipped = skipped;
        log::info!("loaded polygon index with {} polygons from {}", index.len(), dir.display());
        Ok(index)
    }
}

fn int_value(v: u64) -> Value {
    Value::Int(i64::try_from(v).unwrap_or(i64::MAX))
}

fn unsigned<T: TryFrom<i64>>(table: &Table, row: &[Value], i: usize) -> Result<T> {
    let v = table.integer(row, i)?;
    T::try_from(v).map_err(|_| {
        ContainError::value(&table.columns()[i], format!("{v} is out of range"))
    })
}

fn rect_at(table: &Table, row: &[Value], idx: &[usize]) -> Result<Rect> {
    Ok(Rect::new(
        table.number(row, idx[0])?,
        table.number(row, idx[2])?,
        table.number(row, idx[1])?,
        table.number(row, idx[3])?,
    ))
}

fn load_rects(dir: &Path, config: &ContainConfig) -> Result<BTreeMap<RecordId, Rect>> {
    let t = read_table(dir)?;
    let id_idx = t.require_columns(config.polygon_id())?;
    let r_idx = t.require_columns(&RECT_COLUMNS)?;
    let mut out = BTreeMap::new();
    for row in t.iter() {
        out.insert(t.record_id(row, &id_idx)?, rect_at(&t, row, &r_idx)?);
    }
    Ok(out)
}

fn load_sides(dir: &Path, config: &ContainConfig) -> Result<BTreeMap<RecordId, Vec<PolygonSide>>> {
    let t = read_table(dir)?;
    let id_idx = t.require_columns(config.polygon_id())?;
    let s_idx = t.require_columns(&SIDE_COLUMNS)?;
    let mut out: BTreeMap<RecordId, Vec<PolygonSide>> = BTreeMap::new();
    for row in t.iter() {
        out.entry(t.record_id(row, &id_idx)?)
            .or_default()
            .push(PolygonSide {
                seq: unsigned(&t, row, s_idx[0])?,
                a: Point::new(t.number(row, s_idx[1])?, t.number(row, s_idx[2])?),
                b: Point::new(t.number(row, s_idx[3])?, t.number(row, s_idx[4])?),
            });
    }
    for (id, sides) in &mut out {
        sides.sort_by_key(|s| s.seq);
        if sides.iter().enumerate().any(|(i, s)| s.seq != i) {
            return Err(ContainError::decode(
                dir,
                format!("side sequence of polygon {id} is not 0..n"),
            ));
        }
    }
    Ok(out)
}

type StoredCell = (CellCode, CellClass, f64);

fn load_cells(dir: &Path, config: &ContainConfig) -> Result<BTreeMap<RecordId, Vec<StoredCell>>> {
    let t = read_table(dir)?;
    let id_idx = t.require_columns(config.polygon_id())?;
    let c_idx = t.require_columns(&CELL_COLUMNS)?;
    let mut out: BTreeMap<RecordId, Vec<StoredCell>> = BTreeMap::new();
    for row in t.iter() {
        let code = CellCode {
            level: unsigned(&t, row, c_idx[1])?,
            ix: unsigned(&t, row, c_idx[2])?,
            iy: unsigned(&t, row, c_idx[3])?,
        };
        let name = t.text(row, c_idx[4])?;
        let class = CellClass::parse(name)
            .ok_or_else(|| ContainError::value(CELL_COLUMNS[4], format!("unknown cell type `{name}`")))?;
        let ratio = t.number(row, c_idx[5])?;
        out.entry(t.record_id(row, &id_idx)?)
            .or_default()
            .push((code, class, ratio));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InvalidPolygonPolicy;

    fn polygon(id: i64, coords: &[(f64, f64)]) -> Polygon {
        let ring = coords.iter().map(|&(x, y)| Point::new(x, y)).collect();
        Polygon::new(RecordId::int(id), ring).unwrap()
    }

    fn square(id: i64, x0: f64, y0: f64, size: f64) -> Polygon {
        polygon(
            id,
            &[(x0, y0), (x0 + size, y0), (x0 + size, y0 + size), (x0, y0 + size)],
        )
    }

    fn l_shape(id: i64) -> Polygon {
        polygon(
            id,
            &[
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 4.0),
                (4.0, 4.0),
                (4.0, 10.0),
                (0.0, 10.0),
            ],
        )
    }

    #[test]
    fn coarse_filter_is_inclusive_and_backend_independent() {
        for backend in [CoarseBackend::Flat, CoarseBackend::Grid, CoarseBackend::StrTree] {
            let config = ContainConfig::default().with_backend(backend);
            let idx = PolygonIndex::build(
                vec![square(2, 5.0, 5.0, 10.0), square(1, 0.0, 0.0, 10.0)],
                &config,
            )
            .unwrap();
            assert_eq!(idx.get(0).map(|p| p.id()), Some(&RecordId::int(1)));
            assert_eq!(idx.candidates(Point::new(7.0, 7.0), None), vec![0, 1]);
            assert_eq!(idx.candidates(Point::new(10.0, 2.0), None), vec![0]);
            assert!(idx.candidates(Point::new(15.5, 2.0), None).is_empty());
            let hint = RecordId::int(2);
            assert_eq!(idx.candidates(Point::new(7.0, 7.0), Some(&hint)), vec![1]);
            assert!(idx.candidates(Point::new(2.0, 2.0), Some(&hint)).is_empty());
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = PolygonIndex::build(
            vec![square(1, 0.0, 0.0, 1.0), square(1, 5.0, 5.0, 1.0)],
            &ContainConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ContainError::Configuration(_)));
    }

    #[test]
    fn derived_tables_have_one_row_per_item() {
        let config = ContainConfig::default();
        let idx = PolygonIndex::build(vec![l_shape(1), square(2, 20.0, 0.0, 5.0)], &config)
            .unwrap();
        assert_eq!(idx.polygon_table(&config).unwrap().len(), 10);
        assert_eq!(idx.delimiter_rectangle_table(&config).unwrap().len(), 2);
        assert_eq!(idx.polygon_side_table(&config).unwrap().len(), 10);
        let cells = idx.mesh_stats().total();
        assert_eq!(idx.polygon_mesh_table(&config).unwrap().len(), cells);
        let rects = idx.delimiter_rectangle_table(&config).unwrap();
        assert_eq!(
            rects.columns(),
            ["polygon_id", "min_x", "max_x", "min_y", "max_y"]
        );
        assert_eq!(rects.rows()[1][1], Value::Float(20.0));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = ContainConfig::default()
            .with_mesh_level(3)
            .with_backend(CoarseBackend::Grid);
        let idx = PolygonIndex::build(vec![l_shape(1), square(2, 20.0, 0.0, 5.0)], &config)
            .unwrap();
        idx.save(dir.path(), &config).unwrap();
        assert!(dir.path().join(POLYGON_MESH_DIR).join("schema.json").exists());

        // Different configured mesh: the stored parameters win.
        let other = ContainConfig::default().with_mesh_level(7);
        let back = PolygonIndex::load(dir.path(), &other).unwrap();
        assert_eq!(back.params(), idx.params());
        assert_eq!(back.len(), 2);
        assert_eq!(back.mesh_stats(), idx.mesh_stats());
        for (a, b) in idx.iter().zip(back.iter()) {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.rect(), b.rect());
            assert_eq!(a.sides(), b.sides());
            assert_eq!(a.polygon(), b.polygon());
        }
    }

    #[test]
    fn load_reports_corrupt_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let config = ContainConfig::default();
        let idx = PolygonIndex::build(vec![l_shape(1)], &config).unwrap();
        idx.save(dir.path(), &config).unwrap();

        // Drop one cell so the mesh no longer tiles its rectangle.
        let mesh_dir = dir.path().join(POLYGON_MESH_DIR);
        let mut cells = read_table(&mesh_dir).unwrap();
        cells = cells.filter(|r| r[1] != Value::from("1:1:1"));
        write_table(&cells, &mesh_dir, 1).unwrap();

        let err = PolygonIndex::load(dir.path(), &config).unwrap_err();
        assert!(matches!(
            err,
            ContainError::Validation {
                source: ValidationError::InconsistentMesh(_),
                ..
            }
        ));
        let skip = config.with_invalid_polygons(InvalidPolygonPolicy::Skip);
        let back = PolygonIndex::load(dir.path(), &skip).unwrap();
        assert!(back.is_empty());
        assert_eq!(back.skipped().len(), 1);
    }

    fn rewrite_rows(dir: &Path, mut edit: impl FnMut(&mut Vec<Value>)) {
        let stored = read_table(dir).unwrap();
        let mut out = Table::new(stored.columns().to_vec());
        for row in stored.rows() {
            let mut row = row.clone();
            edit(&mut row);
            out.push_row(row).unwrap();
        }
        write_table(&out, dir, 1).unwrap();
    }

    fn saved_pair(config: &ContainConfig) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let idx = PolygonIndex::build(vec![l_shape(1), square(2, 20.0, 0.0, 5.0)], config)
            .unwrap();
        idx.save(dir.path(), config).unwrap();
        dir
    }

    #[test]
    fn load_rejects_rectangles_and_sides_that_disagree_with_vertices() {
        let config = ContainConfig::default();
        let skip = config.clone().with_invalid_polygons(InvalidPolygonPolicy::Skip);

        // Shrink the first polygon's rectangle: max_x 10 -> 8.
        let dir = saved_pair(&config);
        rewrite_rows(&dir.path().join(DELIMITER_RECTANGLE_DIR), |row| {
            if row[0] == Value::Int(1) {
                row[2] = Value::Float(8.0);
            }
        });
        let err = PolygonIndex::load(dir.path(), &config).unwrap_err();
        assert!(matches!(
            err,
            ContainError::Validation {
                source: ValidationError::StaleDerived("delimiter rectangle"),
                ..
            }
        ));
        let back = PolygonIndex::load(dir.path(), &skip).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.get(0).map(|p| p.id()), Some(&RecordId::int(2)));
        assert_eq!(back.skipped()[0].0, RecordId::int(1));

        // Move the start of one side of the first polygon.
        let dir = saved_pair(&config);
        rewrite_rows(&dir.path().join(POLYGON_SIDE_DIR), |row| {
            if row[0] == Value::Int(1) && row[1] == Value::Int(2) {
                row[2] = Value::Float(9.5);
            }
        });
        let err = PolygonIndex::load(dir.path(), &config).unwrap_err();
        assert!(matches!(
            err,
            ContainError::Validation {
                source: ValidationError::StaleDerived("polygon sides"),
                ..
            }
        ));
        let back = PolygonIndex::load(dir.path(), &skip).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.skipped().len(), 1);
    }
}
