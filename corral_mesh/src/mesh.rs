// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recursive area-ratio mesh over a polygon's delimiter rectangle.
//!
//! The delimiter rectangle is the root cell. Each cell is clipped against the polygon and its
//! overlap ratio `r = covered / cell_area` decides what happens next:
//!
//! - `r >= earned_prop`: the cell is [`CellClass::Inside`] and terminal.
//! - `r <= 1 - earned_prop`: the cell is [`CellClass::Outside`] and terminal.
//! - otherwise the cell is cut into `split × split` children, unless it already sits at
//!   `level`, in which case it is [`CellClass::Undecided`] and terminal.
//!
//! Zero-area cells are outside. A cell whose clipped ring traces its whole outline has ratio
//! exactly `1`; every other ratio is the shoelace quotient as computed, so any sliver of the
//! polygon keeps a cell off `Outside` at `earned_prop = 1.0`. Construction drains an explicit
//! work stack, so the call depth stays constant whatever the level.

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use kurbo::{Point, Rect};

use crate::clip::{clip_ring, covers_rect, ring_area};
use crate::error::ValidationError;
use crate::rect::{delimiter_rect, rect_contains};
use crate::types::{CellClass, CellCode, CellKinds, MeshCell, Polygon};

/// Largest cell count per axis; keeps cell boundaries exactly representable.
const MAX_CELLS_PER_AXIS: u64 = 1 << 53;

/// Mesh construction parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshParams {
    /// Branching factor per axis; each refined cell gets `split × split` children.
    pub split: u32,
    /// Deepest level a cell may reach. Level 0 is the delimiter rectangle itself.
    pub level: u32,
    /// Overlap ratio that settles a cell as inside; `1 - earned_prop` settles it as outside.
    pub earned_prop: f64,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            split: 2,
            level: 4,
            earned_prop: 0.7,
        }
    }
}

impl MeshParams {
    /// Check the parameter ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.split < 2 {
            return Err(ValidationError::SplitTooSmall { split: self.split });
        }
        if !(self.earned_prop > 0.5 && self.earned_prop <= 1.0) {
            return Err(ValidationError::EarnedPropOutOfRange {
                value: self.earned_prop,
            });
        }
        match u64::from(self.split).checked_pow(self.level) {
            Some(n) if n <= MAX_CELLS_PER_AXIS => Ok(()),
            _ => Err(ValidationError::MeshTooDeep {
                split: self.split,
                level: self.level,
            }),
        }
    }

    /// Classify a cell at `level` with overlap `ratio`; `None` means refine further.
    pub fn classify(&self, ratio: f64, level: u32) -> Option<CellClass> {
        if ratio >= self.earned_prop {
            Some(CellClass::Inside)
        } else if ratio <= 1.0 - self.earned_prop {
            Some(CellClass::Outside)
        } else if level < self.level {
            None
        } else {
            Some(CellClass::Undecided)
        }
    }

    fn cells_per_axis(&self, level: u32) -> u64 {
        u64::from(self.split).pow(level)
    }
}

/// Cell counts of a mesh, by classification.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MeshStats {
    /// Terminal inside cells.
    pub inside: usize,
    /// Terminal outside cells.
    pub outside: usize,
    /// Terminal undecided cells.
    pub undecided: usize,
    /// Deepest level among terminal cells.
    pub depth: u32,
}

impl MeshStats {
    /// Total terminal cells.
    pub fn total(&self) -> usize {
        self.inside + self.outside + self.undecided
    }
}

struct Task {
    code: CellCode,
    // Polygon ring already clipped to the parent cell.
    ring: Vec<Point>,
}

/// Terminal cells of one polygon, keyed by position.
///
/// The terminal cells tile the delimiter rectangle: they do not overlap and their areas sum
/// to the rectangle's area.
#[derive(Clone, Debug)]
pub struct PolygonMesh {
    bounds: Rect,
    params: MeshParams,
    cells: BTreeMap<CellCode, MeshCell>,
}

fn axis_at(lo: f64, hi: f64, i: u64, n: u64) -> f64 {
    if i == 0 {
        lo
    } else if i >= n {
        hi
    } else {
        // Same rational `i / n` at any level maps to the same coordinate.
        #[allow(
            clippy::cast_precision_loss,
            reason = "Cell indices are capped at 2^53."
        )]
        let t = i as f64 / n as f64;
        lo + (hi - lo) * t
    }
}

impl PolygonMesh {
    /// Build the mesh of `polygon`.
    pub fn build(polygon: &Polygon, params: &MeshParams) -> Result<Self, ValidationError> {
        params.validate()?;
        let mut mesh = Self {
            bounds: delimiter_rect(polygon),
            params: *params,
            cells: BTreeMap::new(),
        };
        let mut stack = vec![Task {
            code: CellCode::ROOT,
            ring: polygon.vertices().to_vec(),
        }];
        while let Some(task) = stack.pop() {
            let rect = mesh.cell_rect(task.code);
            let area = rect.area();
            let (ratio, clipped) = if area > 0.0 {
                let clipped = clip_ring(&task.ring, rect);
                let ratio = if covers_rect(&clipped, rect) {
                    1.0
                } else {
                    (ring_area(&clipped) / area).clamp(0.0, 1.0)
                };
                (ratio, clipped)
            } else {
                (0.0, Vec::new())
            };
            let class = if area > 0.0 {
                params.classify(ratio, task.code.level)
            } else {
                Some(CellClass::Outside)
            };
            match class {
                Some(class) => {
                    mesh.cells.insert(
                        task.code,
                        MeshCell {
                            code: task.code,
                            rect,
                            class,
                            ratio,
                        },
                    );
                }
                None => {
                    for child in task.code.children(params.split) {
                        stack.push(Task {
                            code: child,
                            ring: clipped.clone(),
                        });
                    }
                }
            }
        }
        log::trace!(
            "mesh for polygon {}: {:?}",
            polygon.id(),
            mesh.stats()
        );
        Ok(mesh)
    }

    /// Rebuild a mesh from stored terminal cells.
    ///
    /// Cell rectangles are recomputed from their codes. Fails unless the cells tile `bounds`
    /// exactly once at `params`.
    pub fn from_cells(
        bounds: Rect,
        params: &MeshParams,
        cells: impl IntoIterator<Item = (CellCode, CellClass, f64)>,
    ) -> Result<Self, ValidationError> {
        params.validate()?;
        let mut mesh = Self {
            bounds,
            params: *params,
            cells: BTreeMap::new(),
        };
        let split = u128::from(params.split);
        let full = split.pow(2 * params.level);
        let mut covered: u128 = 0;
        for (code, class, ratio) in cells {
            if code.level > params.level {
                return Err(ValidationError::InconsistentMesh("cell deeper than mesh level"));
            }
            let n = mesh.params.cells_per_axis(code.level);
            if code.ix >= n || code.iy >= n {
                return Err(ValidationError::InconsistentMesh("cell outside the grid"));
            }
            let cell = MeshCell {
                code,
                rect: mesh.cell_rect(code),
                class,
                ratio,
            };
            if mesh.cells.insert(code, cell).is_some() {
                return Err(ValidationError::InconsistentMesh("duplicate cell"));
            }
            covered = covered.saturating_add(split.pow(2 * (params.level - code.level)));
        }
        let nested = mesh.cells.keys().any(|code| {
            let mut cur = *code;
            while let Some(parent) = cur.parent(params.split) {
                if mesh.cells.contains_key(&parent) {
                    return true;
                }
                cur = parent;
            }
            false
        });
        if nested || covered != full {
            return Err(ValidationError::InconsistentMesh(
                "cells do not tile the delimiter rectangle",
            ));
        }
        Ok(mesh)
    }

    /// Delimiter rectangle (the root cell).
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Parameters the mesh was built with.
    pub fn params(&self) -> &MeshParams {
        &self.params
    }

    /// Rectangle of any cell code, terminal or not.
    ///
    /// Neighbouring cells share exactly the same edge coordinates, at every level.
    pub fn cell_rect(&self, code: CellCode) -> Rect {
        let n = self.params.cells_per_axis(code.level);
        let b = self.bounds;
        Rect::new(
            axis_at(b.x0, b.x1, code.ix, n),
            axis_at(b.y0, b.y1, code.iy, n),
            axis_at(b.x0, b.x1, code.ix + 1, n),
            axis_at(b.y0, b.y1, code.iy + 1, n),
        )
    }

    /// Terminal cells in code order.
    pub fn cells(&self) -> impl Iterator<Item = &MeshCell> + '_ {
        self.cells.values()
    }

    /// Terminal cells whose class is in `kinds`.
    pub fn cells_of(&self, kinds: CellKinds) -> impl Iterator<Item = &MeshCell> + '_ {
        self.cells
            .values()
            .filter(move |c| kinds.contains(CellKinds::from(c.class)))
    }

    /// The terminal cell with this code, if any.
    pub fn cell(&self, code: CellCode) -> Option<&MeshCell> {
        self.cells.get(&code)
    }

    /// Number of terminal cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the mesh has no cells. Never true for a built mesh.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell counts by classification.
    pub fn stats(&self) -> MeshStats {
        let mut stats = MeshStats::default();
        for cell in self.cells.values() {
            match cell.class {
                CellClass::Inside => stats.inside += 1,
                CellClass::Outside => stats.outside += 1,
                CellClass::Undecided => stats.undecided += 1,
            }
            stats.depth = stats.depth.max(cell.code.level);
        }
        stats
    }

    /// Terminal cells containing `p` (boundary-inclusive).
    ///
    /// Usually one cell; several when `p` lies on a shared cell edge or corner; none when `p`
    /// is outside the delimiter rectangle.
    pub fn cells_at(&self, p: Point) -> Vec<&MeshCell> {
        let mut out = Vec::new();
        if !rect_contains(&self.bounds, p) {
            return out;
        }
        let mut stack = vec![CellCode::ROOT];
        while let Some(code) = stack.pop() {
            if let Some(cell) = self.cells.get(&code) {
                if rect_contains(&cell.rect, p) {
                    out.push(cell);
                }
                continue;
            }
            if code.level >= self.params.level {
                continue;
            }
            stack.extend(
                code.children(self.params.split)
                    .filter(|child| rect_contains(&self.cell_rect(*child), p)),
            );
        }
        out
    }

    /// Classification of the cell containing `p`.
    ///
    /// On a shared edge the strongest evidence wins: inside over undecided over outside.
    /// `None` means no terminal cell matched.
    pub fn classify_point(&self, p: Point) -> Option<CellClass> {
        self.cells_at(p)
            .into_iter()
            .map(|c| c.class)
            .max_by_key(|c| c.strength())
    }
}
