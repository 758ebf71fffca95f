// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turning record tables into polygons and query points.

use std::collections::BTreeMap;

use corral_mesh::{Polygon, RecordId, ValidationError, order_vertices};
use kurbo::Point;

use crate::config::{ContainConfig, InvalidPolygonPolicy};
use crate::error::{ContainError, Result};
use crate::table::{Table, Value};

/// Polygons read from vertex rows, plus the ones dropped by [`InvalidPolygonPolicy::Skip`].
#[derive(Clone, Debug, Default)]
pub struct IngestedPolygons {
    /// Valid polygons, ordered by identifier.
    pub polygons: Vec<Polygon>,
    /// Rejected polygons and why.
    pub skipped: Vec<(RecordId, ValidationError)>,
}

/// Apply the validation policy to a failed polygon.
pub(crate) fn reject(
    policy: InvalidPolygonPolicy,
    id: RecordId,
    error: ValidationError,
    skipped: &mut Vec<(RecordId, ValidationError)>,
) -> Result<()> {
    match policy {
        InvalidPolygonPolicy::Abort => Err(ContainError::Validation {
            polygon: id,
            source: error,
        }),
        InvalidPolygonPolicy::Skip => {
            log::warn!("skipping polygon {id}: {error}");
            skipped.push((id, error));
            Ok(())
        }
    }
}

/// Read polygons from a table with one row per vertex.
///
/// Rows are grouped by the polygon id column(s) and ordered by the sequence column, whose
/// values must be consecutive integers. A last vertex equal to the first is dropped.
pub fn polygons_from_table(table: &Table, config: &ContainConfig) -> Result<IngestedPolygons> {
    let id_idx = table.require_columns(config.polygon_id())?;
    let xy = table.require_columns(config.coords())?;
    let seq = table.require_columns(&[config.point_seq()])?[0];

    let mut groups: BTreeMap<RecordId, Vec<(i64, Point)>> = BTreeMap::new();
    for row in table.iter() {
        let id = table.record_id(row, &id_idx)?;
        let p = Point::new(table.number(row, xy[0])?, table.number(row, xy[1])?);
        let s = table.integer(row, seq)?;
        groups.entry(id).or_default().push((s, p));
    }

    let mut out = IngestedPolygons::default();
    for (id, vertices) in groups {
        match order_vertices(vertices).and_then(|ring| Polygon::new(id.clone(), ring)) {
            Ok(polygon) => out.polygons.push(polygon),
            Err(e) => reject(config.invalid_polygons(), id, e, &mut out.skipped)?,
        }
    }
    log::debug!(
        "ingested {} polygons from {} vertex rows, {} skipped",
        out.polygons.len(),
        table.len(),
        out.skipped.len()
    );
    Ok(out)
}

/// One point to locate.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryPoint {
    /// Point identifier.
    pub id: RecordId,
    /// Location.
    pub at: Point,
    /// Passthrough attributes, copied to every result of this point.
    pub attrs: Vec<Value>,
    /// Polygon this point is already known to belong to, if any. Only that polygon is
    /// considered.
    pub hint: Option<RecordId>,
}

impl QueryPoint {
    /// A point without attributes or hint.
    pub fn new(id: RecordId, at: Point) -> Self {
        Self {
            id,
            at,
            attrs: Vec::new(),
            hint: None,
        }
    }
}

/// Query points read from a table, plus the names of the carried attribute columns.
#[derive(Clone, Debug, Default)]
pub struct IngestedPoints {
    /// Points in row order.
    pub points: Vec<QueryPoint>,
    /// Names of the values in [`QueryPoint::attrs`].
    pub attr_columns: Vec<String>,
}

/// Read query points.
///
/// `add_cols` names extra columns to carry into the results; coordinate and point id
/// columns are skipped since the results hold them anyway. When the table also has every
/// polygon id column, each row's polygon id becomes the point's hint; a row with a null
/// there gets no hint.
pub fn points_from_table<S: AsRef<str>>(
    table: &Table,
    point_id: &[S],
    add_cols: &[S],
    config: &ContainConfig,
) -> Result<IngestedPoints> {
    if point_id.is_empty() {
        return Err(ContainError::Configuration(
            "at least one point id column is required".to_owned(),
        ));
    }
    let id_idx = table.require_columns(point_id)?;
    let xy = table.require_columns(config.coords())?;
    let attr_columns: Vec<String> = add_cols
        .iter()
        .map(|c| c.as_ref())
        .filter(|c| !config.coords().iter().any(|k| k.as_str() == *c))
        .filter(|c| !point_id.iter().any(|k| k.as_ref() == *c))
        .map(str::to_owned)
        .collect();
    let attr_idx = table.require_columns(attr_columns.as_slice())?;
    let hint_idx = if table.has_columns(config.polygon_id()) {
        Some(table.require_columns(config.polygon_id())?)
    } else {
        None
    };

    let mut points = Vec::with_capacity(table.len());
    for row in table.iter() {
        let hint = match &hint_idx {
            Some(idx) if idx.iter().all(|&i| row[i] != Value::Null) => {
                Some(table.record_id(row, idx)?)
            }
            _ => None,
        };
        points.push(QueryPoint {
            id: table.record_id(row, &id_idx)?,
            at: Point::new(table.number(row, xy[0])?, table.number(row, xy[1])?),
            attrs: attr_idx.iter().map(|&i| row[i].clone()).collect(),
            hint,
        });
    }
    Ok(IngestedPoints {
        points,
        attr_columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex_rows(rows: &[(i64, i64, f64, f64)]) -> Table {
        let mut t = Table::new(["polygon_id", "point_seq", "coord_x", "coord_y"]);
        for &(id, seq, x, y) in rows {
            t.push_row(vec![id.into(), seq.into(), x.into(), y.into()])
                .unwrap();
        }
        t
    }

    #[test]
    fn groups_and_orders_vertices() {
        // Rows out of order, sequence starting at 5, explicit closing vertex.
        let t = vertex_rows(&[
            (2, 7, 1.0, 1.0),
            (1, 2, 10.0, 0.0),
            (2, 5, 0.0, 0.0),
            (1, 1, 0.0, 0.0),
            (2, 6, 1.0, 0.0),
            (1, 3, 10.0, 10.0),
            (1, 4, 0.0, 10.0),
            (1, 5, 0.0, 0.0),
        ]);
        let got = polygons_from_table(&t, &ContainConfig::default()).unwrap();
        assert!(got.skipped.is_empty());
        assert_eq!(got.polygons.len(), 2);
        assert_eq!(got.polygons[0].id(), &RecordId::int(1));
        assert_eq!(got.polygons[0].vertices().len(), 4);
        assert_eq!(got.polygons[0].vertices()[1], Point::new(10.0, 0.0));
        assert_eq!(got.polygons[1].vertices()[0], Point::new(0.0, 0.0));
    }

    #[test]
    fn validation_policy_abort_and_skip() {
        let t = vertex_rows(&[
            (1, 0, 0.0, 0.0),
            (1, 1, 1.0, 0.0),
            (1, 2, 1.0, 1.0),
            (2, 0, 0.0, 0.0),
            (2, 0, 1.0, 0.0),
            (2, 1, 1.0, 1.0),
            (3, 0, 0.0, 0.0),
            (3, 1, 1.0, 0.0),
        ]);
        let err = polygons_from_table(&t, &ContainConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ContainError::Validation {
                source: ValidationError::DuplicateSequence { seq: 0 },
                ..
            }
        ));

        let skip = ContainConfig::default().with_invalid_polygons(InvalidPolygonPolicy::Skip);
        let got = polygons_from_table(&t, &skip).unwrap();
        assert_eq!(got.polygons.len(), 1);
        assert_eq!(got.skipped.len(), 2);
        assert_eq!(
            got.skipped[1],
            (RecordId::int(3), ValidationError::TooFewVertices { count: 2 })
        );
    }

    #[test]
    fn missing_columns_fail_before_reading_rows() {
        let t = Table::new(["polygon_id", "x", "y", "point_seq"]);
        assert!(matches!(
            polygons_from_table(&t, &ContainConfig::default()),
            Err(ContainError::Configuration(_))
        ));
    }

    #[test]
    fn non_numeric_coordinate_is_a_value_error() {
        let mut t = Table::new(["polygon_id", "point_seq", "coord_x", "coord_y"]);
        t.push_row(vec![1_i64.into(), 0_i64.into(), "east".into(), 0.0.into()])
            .unwrap();
        assert!(matches!(
            polygons_from_table(&t, &ContainConfig::default()),
            Err(ContainError::Value { .. })
        ));
    }

    #[test]
    fn points_carry_attributes_and_hints() {
        let mut t = Table::new(["point_id", "coord_x", "coord_y", "kind", "polygon_id"]);
        t.push_row(vec!["a".into(), 1.0.into(), 2.0.into(), "shop".into(), 4_i64.into()])
            .unwrap();
        t.push_row(vec!["b".into(), 3.0.into(), 4.0.into(), "home".into(), Value::Null])
            .unwrap();
        let got = points_from_table(
            &t,
            &["point_id"],
            &["kind", "coord_x", "point_id"],
            &ContainConfig::default(),
        )
        .unwrap();
        assert_eq!(got.attr_columns, ["kind"]);
        assert_eq!(got.points[0].attrs, vec![Value::from("shop")]);
        assert_eq!(got.points[0].hint, Some(RecordId::int(4)));
        assert_eq!(got.points[1].hint, None);
        assert_eq!(got.points[1].at, Point::new(3.0, 4.0));

        let err = points_from_table(&t, &["point_id"], &["colour"], &ContainConfig::default());
        assert!(matches!(err, Err(ContainError::Configuration(_))));
    }
}
