// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Partitioned on-disk tables.
//!
//! A stored table is a directory holding `schema.json` (the column names) and one or more
//! JSON-lines part files `part-00000.jsonl`, `part-00001.jsonl`, ... Each line is one row
//! encoded as a JSON array. Reading concatenates the parts in name order, so row order
//! survives a round trip.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ContainError, Result};
use crate::table::{Table, Value};

const SCHEMA_FILE: &str = "schema.json";
const PART_PREFIX: &str = "part-";
const PART_SUFFIX: &str = ".jsonl";

#[derive(Serialize, Deserialize)]
struct Schema {
    columns: Vec<String>,
}

fn part_name(i: usize) -> String {
    format!("{PART_PREFIX}{i:05}{PART_SUFFIX}")
}

fn is_part(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(PART_PREFIX) && n.ends_with(PART_SUFFIX))
}

fn part_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut parts = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ContainError::io(dir, e))? {
        let path = entry.map_err(|e| ContainError::io(dir, e))?.path();
        if is_part(&path) {
            parts.push(path);
        }
    }
    parts.sort();
    Ok(parts)
}

/// Write `table` into `dir` as `partitions` contiguous parts.
///
/// The directory is created if needed; part files from an earlier write are replaced.
/// `partitions` is clamped to at least 1.
pub fn write_table(table: &Table, dir: &Path, partitions: usize) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| ContainError::io(dir, e))?;
    for stale in part_files(dir)? {
        fs::remove_file(&stale).map_err(|e| ContainError::io(&stale, e))?;
    }

    let schema_path = dir.join(SCHEMA_FILE);
    let schema = Schema {
        columns: table.columns().to_vec(),
    };
    let json = serde_json::to_string_pretty(&schema)
        .map_err(|e| ContainError::decode(&schema_path, e.to_string()))?;
    fs::write(&schema_path, json).map_err(|e| ContainError::io(&schema_path, e))?;

    let partitions = partitions.max(1);
    let per_part = table.len().div_ceil(partitions).max(1);
    let mut rows = table.rows().chunks(per_part);
    for i in 0..partitions {
        let path = dir.join(part_name(i));
        let file = File::create(&path).map_err(|e| ContainError::io(&path, e))?;
        let mut out = BufWriter::new(file);
        for row in rows.next().unwrap_or_default() {
            serde_json::to_writer(&mut out, row)
                .map_err(|e| ContainError::decode(&path, e.to_string()))?;
            out.write_all(b"\n").map_err(|e| ContainError::io(&path, e))?;
        }
        out.flush().map_err(|e| ContainError::io(&path, e))?;
    }
    log::debug!(
        "wrote {} rows to {} in {partitions} part(s)",
        table.len(),
        dir.display()
    );
    Ok(())
}

/// Read a table written by [`write_table`].
pub fn read_table(dir: &Path) -> Result<Table> {
    let schema_path = dir.join(SCHEMA_FILE);
    let raw = fs::read_to_string(&schema_path).map_err(|e| ContainError::io(&schema_path, e))?;
    let schema: Schema = serde_json::from_str(&raw)
        .map_err(|e| ContainError::decode(&schema_path, e.to_string()))?;
    let mut table = Table::new(schema.columns);

    for path in part_files(dir)? {
        let file = File::open(&path).map_err(|e| ContainError::io(&path, e))?;
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| ContainError::io(&path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let row: Vec<Value> = serde_json::from_str(&line)
                .map_err(|e| ContainError::decode(&path, format!("line {}: {e}", n + 1)))?;
            table
                .push_row(row)
                .map_err(|e| ContainError::decode(&path, format!("line {}: {e}", n + 1)))?;
        }
    }
    log::debug!("read {} rows from {}", table.len(), dir.display());
    Ok(table)
}
