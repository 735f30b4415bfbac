use crate::error::{IoError, Result};
use crate::table::TableFormat;
use crate::{csv, xlsx};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One fully materialized output table: final header, rows, and the
/// positions of phone-bearing columns that receive the text-protection
/// prefix.
#[derive(Debug, Clone, Default)]
pub struct OutputTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub protected: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteCounts {
    pub kept: usize,
    pub removed: usize,
}

/// Serializes the kept and removed row sets for one run.
///
/// Every file is written to a temporary sibling first and renamed into
/// place only after all writes succeed, so a failed run never leaves a
/// partial output behind.
#[derive(Debug, Clone)]
pub struct RecordWriter {
    format: TableFormat,
    text_protect_prefix: char,
}

impl RecordWriter {
    pub fn new(format: TableFormat, text_protect_prefix: char) -> Self {
        Self {
            format,
            text_protect_prefix,
        }
    }

    /// Write the kept rows to `kept_path` and the removed rows to the
    /// `_removed` sibling. Both files appear atomically or not at all.
    pub fn write(&self, kept: &OutputTable, removed: &OutputTable, kept_path: &Path) -> Result<WriteCounts> {
        let removed_path = removed_sibling(kept_path);
        let staged = [(kept, kept_path.to_path_buf()), (removed, removed_path)];

        let mut temporaries = Vec::new();
        let result = (|| -> Result<()> {
            for (table, path) in &staged {
                ensure_parent(path)?;
                let temporary = temporary_sibling(path);
                self.write_one(table, &temporary)?;
                temporaries.push(temporary);
            }
            for ((_, path), temporary) in staged.iter().zip(&temporaries) {
                fs::rename(temporary, path).map_err(|source| IoError::Write {
                    path: path.clone(),
                    source,
                })?;
            }
            Ok(())
        })();

        if let Err(err) = result {
            for temporary in &temporaries {
                let _ = fs::remove_file(temporary);
            }
            return Err(err);
        }

        Ok(WriteCounts {
            kept: kept.rows.len(),
            removed: removed.rows.len(),
        })
    }

    /// Write a single output (excerpt runs have no removed sibling).
    pub fn write_single(&self, table: &OutputTable, path: &Path) -> Result<usize> {
        ensure_parent(path)?;
        let temporary = temporary_sibling(path);
        if let Err(err) = self.write_one(table, &temporary) {
            let _ = fs::remove_file(&temporary);
            return Err(err);
        }
        fs::rename(&temporary, path).map_err(|source| IoError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(table.rows.len())
    }

    fn write_one(&self, table: &OutputTable, path: &Path) -> Result<()> {
        let rows = self.protect_rows(table);
        match self.format {
            TableFormat::Csv { delimiter } => csv::write(path, &table.columns, &rows, delimiter),
            TableFormat::Xlsx => xlsx::write(path, &table.columns, &rows, &table.protected),
        }
    }

    fn protect_rows(&self, table: &OutputTable) -> Vec<Vec<String>> {
        table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(column, value)| {
                        if table.protected.contains(&column) {
                            protect_cell(self.text_protect_prefix, value)
                        } else {
                            value.clone()
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

/// Prefix a phone-bearing cell so spreadsheet consumers treat it as
/// text. Empty cells and already-protected values pass through.
fn protect_cell(prefix: char, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() || value.starts_with(prefix) {
        return value.to_string();
    }
    format!("{prefix}{value}")
}

/// `leads.csv` -> `leads_removed.csv`. Extensionless paths get the
/// marker appended.
pub fn removed_sibling(path: &Path) -> PathBuf {
    sibling_with_marker(path, "_removed")
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn sibling_with_marker(path: &Path, marker: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}{marker}.{}", ext.to_string_lossy()),
        None => format!("{stem}{marker}"),
    };
    path.with_file_name(name)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| IoError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

/// Flat machine-readable run summary: key -> count, written as JSON next
/// to the kept output.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RunSummary(BTreeMap<String, u64>);

impl RunSummary {
    pub fn set(&mut self, key: &str, value: u64) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.0.get(key).copied()
    }

    /// Write `<output stem>_summary.json` beside the given output file.
    pub fn write_beside(&self, output: &Path) -> Result<PathBuf> {
        let path = sibling_with_marker(output, "_summary");
        let path = path.with_extension("json");
        let body = serde_json::to_string_pretty(self).map_err(|err| IoError::Serialize {
            path: path.clone(),
            message: err.to_string(),
        })?;
        fs::write(&path, body).map_err(|source| IoError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
