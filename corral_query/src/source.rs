// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input that is either an in-memory table or a stored one.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::store::read_table;
use crate::table::Table;

/// A table in memory, or the directory of a stored table.
///
/// Resolved once, at the boundary, into a [`Table`].
#[derive(Clone, Debug)]
pub enum Source {
    /// Rows already in memory.
    Table(Table),
    /// Directory written by [`write_table`](crate::write_table).
    Stored(PathBuf),
}

impl Source {
    /// Load the rows.
    pub fn resolve(self) -> Result<Table> {
        match self {
            Self::Table(table) => Ok(table),
            Self::Stored(dir) => read_table(&dir),
        }
    }
}

impl From<Table> for Source {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

impl From<PathBuf> for Source {
    fn from(dir: PathBuf) -> Self {
        Self::Stored(dir)
    }
}

impl From<&Path> for Source {
    fn from(dir: &Path) -> Self {
        Self::Stored(dir.to_path_buf())
    }
}
