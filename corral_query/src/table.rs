// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-process record table and the set-algebra primitives the pipeline composes.

use std::collections::HashSet;
use std::fmt;

use corral_mesh::{KeyPart, RecordId};
use serde::{Deserialize, Serialize};

use crate::error::{ContainError, Result};

/// One cell of a [`Table`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Text(String),
}

// Hashable stand-in for `Value`; floats compare by bit pattern.
#[derive(Clone, PartialEq, Eq, Hash)]
enum ValueKey<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Text(&'a str),
}

impl Value {
    fn key(&self) -> ValueKey<'_> {
        match self {
            Self::Null => ValueKey::Null,
            Self::Bool(b) => ValueKey::Bool(*b),
            Self::Int(i) => ValueKey::Int(*i),
            // -0.0 and 0.0 are the same value.
            Self::Float(f) if *f == 0.0 => ValueKey::Float(0),
            Self::Float(f) => ValueKey::Float(f.to_bits()),
            Self::Text(s) => ValueKey::Text(s),
        }
    }

    /// Numeric value of an `Int` or `Float` cell.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(
                clippy::cast_precision_loss,
                reason = "Integer coordinates beyond 2^53 are not meaningful."
            )]
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer value of an `Int` cell, or of a `Float` cell holding an integral value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Only integral values within the i64 range are converted."
            )]
            Self::Float(f) if f.fract() == 0.0 && f.abs() < 9.2e18 => Some(*f as i64),
            _ => None,
        }
    }

    /// Key field for a record identifier. Floats and nulls are not valid keys.
    pub fn as_key_part(&self) -> Option<KeyPart> {
        match self {
            Self::Bool(b) => Some(KeyPart::Bool(*b)),
            Self::Int(i) => Some(KeyPart::Int(*i)),
            Self::Text(s) => Some(KeyPart::Text(s.clone())),
            Self::Null | Self::Float(_) => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "a boolean",
            Self::Int(_) => "an integer",
            Self::Float(_) => "a float",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<KeyPart> for Value {
    fn from(v: KeyPart) -> Self {
        match v {
            KeyPart::Bool(b) => Self::Bool(b),
            KeyPart::Int(i) => Self::Int(i),
            KeyPart::Text(s) => Self::Text(s),
        }
    }
}

/// Named columns and rows of [`Value`]s.
///
/// Rows always have exactly one value per column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Empty table with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Fails when its length differs from the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ContainError::Arity {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Iterate over rows.
    pub fn iter(&self) -> impl Iterator<Item = &[Value]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Whether every named column is present.
    pub fn has_columns<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|n| self.column_index(n.as_ref()).is_some())
    }

    /// Positions of the named columns, or a configuration error naming the first absent one.
    pub fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|n| {
                let n = n.as_ref();
                self.column_index(n).ok_or_else(|| {
                    ContainError::Configuration(format!("column `{n}` is absent from the input"))
                })
            })
            .collect()
    }

    /// Projection onto the named columns, in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let idx = self.require_columns(names)?;
        Ok(Self {
            columns: names.iter().map(|n| n.as_ref().to_owned()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| idx.iter().map(|&i| r[i].clone()).collect())
                .collect(),
        })
    }

    /// Rows for which `keep` returns true.
    pub fn filter(&self, mut keep: impl FnMut(&[Value]) -> bool) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Rows of `self` followed by rows of `other`. Both must have the same columns.
    pub fn union(mut self, other: Self) -> Result<Self> {
        if self.columns != other.columns {
            return Err(ContainError::Configuration(format!(
                "cannot union tables with columns {:?} and {:?}",
                self.columns, other.columns
            )));
        }
        self.rows.extend(other.rows);
        Ok(self)
    }

    /// Rows with duplicates removed; the first occurrence keeps its position.
    pub fn distinct(self) -> Self {
        let mut seen = HashSet::with_capacity(self.rows.len());
        let mut keep = Vec::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            let key: Vec<ValueKey<'_>> = row.iter().map(Value::key).collect();
            if seen.insert(key) {
                keep.push(i);
            }
        }
        drop(seen);
        let mut keep = keep.into_iter().peekable();
        let rows = self
            .rows
            .into_iter()
            .enumerate()
            .filter_map(|(i, row)| keep.next_if_eq(&i).map(|_| row))
            .collect();
        Self {
            columns: self.columns,
            rows,
        }
    }

    /// Record identifier read from the columns at `idx`.
    pub(crate) fn record_id(&self, row: &[Value], idx: &[usize]) -> Result<RecordId> {
        idx.iter()
            .map(|&i| {
                row[i].as_key_part().ok_or_else(|| {
                    ContainError::value(
                        &self.columns[i],
                        format!(
                            "identifiers must be boolean, integer or text, found {}",
                            row[i].kind()
                        ),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(RecordId)
    }

    /// Number read from column `i`.
    pub(crate) fn number(&self, row: &[Value], i: usize) -> Result<f64> {
        row[i].as_f64().ok_or_else(|| {
            ContainError::value(
                &self.columns[i],
                format!("expected a number, found {}", row[i].kind()),
            )
        })
    }

    /// Integer read from column `i`.
    pub(crate) fn integer(&self, row: &[Value], i: usize) -> Result<i64> {
        row[i].as_i64().ok_or_else(|| {
            ContainError::value(
                &self.columns[i],
                format!("expected an integer, found {}", row[i].kind()),
            )
        })
    }

    /// Text read from column `i`.
    pub(crate) fn text<'a>(&self, row: &'a [Value], i: usize) -> Result<&'a str> {
        match &row[i] {
            Value::Text(s) => Ok(s),
            other => Err(ContainError::value(
                &self.columns[i],
                format!("expected text, found {}", other.kind()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Table {
        let mut t = Table::new(["id", "name", "score"]);
        t.push_row(vec![1_i64.into(), "ada".into(), 3.5.into()]).unwrap();
        t.push_row(vec![2_i64.into(), "bo".into(), Value::Null]).unwrap();
        t.push_row(vec![1_i64.into(), "ada".into(), 3.5.into()]).unwrap();
        t
    }

    #[test]
    fn push_row_checks_arity() {
        let mut t = Table::new(["a", "b"]);
        assert!(matches!(
            t.push_row(vec![Value::Null]),
            Err(ContainError::Arity {
                expected: 2,
                found: 1
            })
        ));
        assert!(t.is_empty());
    }

    #[test]
    fn select_filter_distinct() {
        let t = people();
        let names = t.select(&["name"]).unwrap();
        assert_eq!(names.columns(), ["name"]);
        assert_eq!(names.len(), 3);

        let scored = t.filter(|r| r[2] != Value::Null);
        assert_eq!(scored.len(), 2);

        let d = t.distinct();
        assert_eq!(d.len(), 2);
        assert_eq!(d.rows()[1][1], Value::from("bo"));
    }

    #[test]
    fn union_requires_same_schema() {
        let a = people();
        let b = people();
        assert_eq!(a.clone().union(b).unwrap().len(), 6);
        let other = Table::new(["id"]);
        assert!(a.union(other).is_err());
    }

    #[test]
    fn missing_column_is_a_configuration_error() {
        let t = people();
        assert_eq!(t.require_columns(&["score", "id"]).unwrap(), vec![2, 0]);
        let err = t.require_columns(&["id", "coord_x"]).unwrap_err();
        assert!(
            err.to_string().contains("coord_x"),
            "error should name the column: {err}"
        );
    }

    #[test]
    fn value_conversions() {
        assert_eq!(Value::Int(4).as_f64(), Some(4.0));
        assert_eq!(Value::Float(4.0).as_i64(), Some(4));
        assert_eq!(Value::Float(4.5).as_i64(), None);
        assert_eq!(Value::Float(1.0).as_key_part(), None);
        assert_eq!(Value::from("x").as_key_part(), Some(KeyPart::Text("x".into())));
        let json = serde_json::to_string(&vec![
            Value::Null,
            Value::Int(3),
            Value::Float(3.0),
            Value::from("t"),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,3,3.0,"t"]"#);
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[1], Value::Int(3));
        assert_eq!(back[2], Value::Float(3.0));
    }
}
