// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: identifiers, polygons, sides, and mesh cells.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Line, Point, Rect};

use crate::error::ValidationError;

/// One field of a record identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyPart {
    /// Boolean key field.
    Bool(bool),
    /// Integer key field.
    Int(i64),
    /// Text key field.
    Text(String),
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Identifier of a polygon or a point: one or more key fields (composite keys allowed).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub Vec<KeyPart>);

impl RecordId {
    /// Single integer key.
    pub fn int(v: i64) -> Self {
        Self(alloc::vec![KeyPart::Int(v)])
    }

    /// Single text key.
    pub fn text(v: impl Into<String>) -> Self {
        Self(alloc::vec![KeyPart::Text(v.into())])
    }

    /// Key fields in declaration order.
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

/// A simple polygon: one closed ring given as an open vertex sequence.
///
/// The closing side from the last vertex back to the first is implicit.
/// Immutable once constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    id: RecordId,
    vertices: Vec<Point>,
}

impl Polygon {
    /// Validate and build a polygon.
    ///
    /// A trailing vertex equal to the first one is treated as an explicit closure and dropped.
    /// Fails when fewer than three vertices remain or any coordinate is not finite.
    pub fn new(id: RecordId, mut vertices: Vec<Point>) -> Result<Self, ValidationError> {
        if let Some(index) = vertices
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite()))
        {
            return Err(ValidationError::NonFiniteCoordinate { index });
        }
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return Err(ValidationError::TooFewVertices {
                count: vertices.len(),
            });
        }
        Ok(Self { id, vertices })
    }

    /// Polygon identifier.
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Ring vertices in order, without a repeated closing vertex.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }
}

/// A directed boundary segment of a polygon.
///
/// Side `seq` runs from vertex `seq` to vertex `(seq + 1) mod N`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PolygonSide {
    /// Position of the side in ring order.
    pub seq: usize,
    /// Start point.
    pub a: Point,
    /// End point.
    pub b: Point,
}

impl PolygonSide {
    /// The side as a kurbo line.
    pub fn line(&self) -> Line {
        Line::new(self.a, self.b)
    }
}

/// Classification of a terminal mesh cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CellClass {
    /// Overlap ratio reached the earned proportion; points here are accepted.
    Inside,
    /// Overlap ratio at or below `1 - earned_prop`; points here are rejected.
    Outside,
    /// Deepest level reached with an inconclusive ratio; points need the exact test.
    Undecided,
}

impl CellClass {
    /// Lower-case name used in stored records.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inside => "inside",
            Self::Outside => "outside",
            Self::Undecided => "undecided",
        }
    }

    /// Parse a stored name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "inside" => Some(Self::Inside),
            "outside" => Some(Self::Outside),
            "undecided" => Some(Self::Undecided),
            _ => None,
        }
    }

    /// Precedence when a point lies on the shared edge of several cells.
    pub(crate) const fn strength(self) -> u8 {
        match self {
            Self::Inside => 2,
            Self::Undecided => 1,
            Self::Outside => 0,
        }
    }
}

bitflags::bitflags! {
    /// Set of cell classifications, used to filter mesh cells.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CellKinds: u8 {
        /// Cells classified inside.
        const INSIDE    = 0b0000_0001;
        /// Cells classified outside.
        const OUTSIDE   = 0b0000_0010;
        /// Cells left undecided.
        const UNDECIDED = 0b0000_0100;
        /// Cells that settle a point without the exact test.
        const DECIDED   = Self::INSIDE.bits() | Self::OUTSIDE.bits();
    }
}

impl From<CellClass> for CellKinds {
    fn from(class: CellClass) -> Self {
        match class {
            CellClass::Inside => Self::INSIDE,
            CellClass::Outside => Self::OUTSIDE,
            CellClass::Undecided => Self::UNDECIDED,
        }
    }
}

/// Positional identifier of a cell in the recursive grid.
///
/// At `level` the delimiter rectangle is cut into `split^level` columns and rows; `ix`/`iy`
/// are the column and row counted from the minimum corner. The parent of a cell is
/// `(ix / split, iy / split)` one level up, so ancestry needs no stored links.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellCode {
    /// Nesting level; the root cell is level 0.
    pub level: u32,
    /// Column at this level.
    pub ix: u64,
    /// Row at this level.
    pub iy: u64,
}

impl CellCode {
    /// The root cell covering the whole delimiter rectangle.
    pub const ROOT: Self = Self {
        level: 0,
        ix: 0,
        iy: 0,
    };

    /// The enclosing cell one level up, `None` for the root.
    pub fn parent(self, split: u32) -> Option<Self> {
        let s = u64::from(split);
        (self.level > 0).then(|| Self {
            level: self.level - 1,
            ix: self.ix / s,
            iy: self.iy / s,
        })
    }

    /// The `split × split` cells one level down, row by row.
    pub fn children(self, split: u32) -> impl Iterator<Item = Self> {
        let s = u64::from(split);
        (0..s).flat_map(move |dy| {
            (0..s).map(move |dx| Self {
                level: self.level + 1,
                ix: self.ix * s + dx,
                iy: self.iy * s + dy,
            })
        })
    }

    /// Whether `self` is `other` or one of its ancestors.
    pub fn covers(self, other: Self, split: u32) -> bool {
        let mut cur = other;
        while cur.level > self.level {
            match cur.parent(split) {
                Some(p) => cur = p,
                None => return false,
            }
        }
        cur == self
    }

    /// Fixed-width positional code: one `(column, row)` digit pair in base `split` per level,
    /// from the root down.
    pub fn digits(self, split: u32) -> Vec<(u32, u32)> {
        let mut out = Vec::with_capacity(self.level as usize);
        let mut cur = self;
        while let Some(parent) = cur.parent(split) {
            let s = u64::from(split);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Remainders are below `split`, which is a u32."
            )]
            out.push(((cur.ix % s) as u32, (cur.iy % s) as u32));
            cur = parent;
        }
        out.reverse();
        out
    }
}

impl fmt::Display for CellCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.level, self.ix, self.iy)
    }
}

/// A terminal cell of a polygon mesh.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshCell {
    /// Position in the recursive grid.
    pub code: CellCode,
    /// Cell rectangle.
    pub rect: Rect,
    /// Classification.
    pub class: CellClass,
    /// Fraction of the cell area covered by the polygon, in `[0, 1]`.
    pub ratio: f64,
}

impl MeshCell {
    /// Nesting level of the cell.
    pub fn level(&self) -> u32 {
        self.code.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn polygon_drops_explicit_closure() {
        let ring = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 0.0),
        ];
        let p = Polygon::new(RecordId::int(1), ring).unwrap();
        assert_eq!(p.vertices().len(), 3);
    }

    #[test]
    fn polygon_rejects_bad_input() {
        let two = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
        assert_eq!(
            Polygon::new(RecordId::int(1), two),
            Err(ValidationError::TooFewVertices { count: 2 })
        );
        let nan = vec![
            Point::new(0.0, 0.0),
            Point::new(f64::NAN, 0.0),
            Point::new(1.0, 1.0),
        ];
        assert_eq!(
            Polygon::new(RecordId::int(1), nan),
            Err(ValidationError::NonFiniteCoordinate { index: 1 })
        );
    }

    #[test]
    fn cell_code_ancestry() {
        let c = CellCode {
            level: 3,
            ix: 5,
            iy: 2,
        };
        assert_eq!(c.digits(2), vec![(1, 0), (0, 1), (1, 0)]);
        assert_eq!(
            c.parent(2),
            Some(CellCode {
                level: 2,
                ix: 2,
                iy: 1
            })
        );
        assert!(CellCode::ROOT.covers(c, 2));
        assert!(!CellCode { level: 1, ix: 0, iy: 0 }.covers(c, 2));
        assert_eq!(CellCode::ROOT.children(3).count(), 9);
        assert!(CellCode::ROOT.children(2).all(|k| k.parent(2) == Some(CellCode::ROOT)));
        assert_eq!(c.to_string(), "3:5:2");
    }

    #[test]
    fn composite_id_display_and_kinds() {
        let id = RecordId(vec![KeyPart::Text("zone".into()), KeyPart::Int(7)]);
        assert_eq!(id.to_string(), "zone/7");
        assert!(CellKinds::DECIDED.contains(CellKinds::from(CellClass::Outside)));
        assert!(!CellKinds::DECIDED.contains(CellKinds::from(CellClass::Undecided)));
        assert_eq!(CellClass::parse("undecided"), Some(CellClass::Undecided));
    }
}
