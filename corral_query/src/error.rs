// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy of the query layer.

use std::io;
use std::path::PathBuf;

use corral_mesh::{RecordId, ValidationError};
use thiserror::Error;

/// Result alias used throughout this crate.
pub type Result<T> = core::result::Result<T, ContainError>;

/// Failures of index construction, persistence, and queries.
///
/// A point that lies in no polygon is not an error; it is simply absent from the results.
#[derive(Debug, Error)]
pub enum ContainError {
    /// A polygon failed validation.
    #[error("polygon {polygon}: {source}")]
    Validation {
        /// Identifier of the offending polygon.
        polygon: RecordId,
        /// What was wrong with it.
        #[source]
        source: ValidationError,
    },

    /// Mesh parameters are out of range.
    #[error("invalid mesh parameters: {0}")]
    Parameters(#[from] ValidationError),

    /// A referenced column is absent or a setting is unusable. Raised before any computation.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A row does not have as many cells as the table has columns.
    #[error("row has {found} values, table has {expected} columns")]
    Arity {
        /// Column count of the table.
        expected: usize,
        /// Cell count of the row.
        found: usize,
    },

    /// A cell holds a value of the wrong kind.
    #[error("column `{column}`: {detail}")]
    Value {
        /// Column name.
        column: String,
        /// What was expected.
        detail: String,
    },

    /// Reading or writing a stored table failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A stored table is malformed.
    #[error("malformed stored data in {}: {detail}", path.display())]
    Decode {
        /// File involved.
        path: PathBuf,
        /// What could not be decoded.
        detail: String,
    },
}

impl ContainError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn value(column: &str, detail: impl Into<String>) -> Self {
        Self::Value {
            column: column.to_owned(),
            detail: detail.into(),
        }
    }
}
