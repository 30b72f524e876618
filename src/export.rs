//! CSV export of a (filtered, projected) record collection.
//!
//! Encoding is memoized by [`CsvCache`]: repeated downloads of an unchanged
//! table reuse the bytes, and any change to its rows or columns re-encodes.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config;
use crate::error::{DashboardError, Result};
use crate::models::{Cell, Field, Record, RecordCollection};

/// Encode `records` as UTF-8 CSV: a header of the active columns, then one
/// line per record. A collection with no rows still gets its header.
pub fn to_csv(records: &RecordCollection) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(records.columns().iter().map(|f| f.name()))?;
    for row in records.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| DashboardError::Io(e.into_error()))
}

// ---------------------------------------------------------------------------
// CsvTable
// ---------------------------------------------------------------------------

/// A decoded export: the header's columns, in file order, and typed cells.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub columns: Vec<Field>,
    pub rows: Vec<Vec<Cell>>,
}

impl From<&RecordCollection> for CsvTable {
    /// The table [`to_csv`] writes for `records`.
    fn from(records: &RecordCollection) -> Self {
        Self {
            columns: records.columns().to_vec(),
            rows: records
                .rows()
                .map(|row| row.into_iter().map(Cell::from).collect())
                .collect(),
        }
    }
}

/// Decode CSV produced by [`to_csv`].
///
/// Any non-empty set of schema columns is accepted. Unknown header names are
/// `InvalidCriteria`; a repeated column is `InvalidArgument`; a cell that
/// does not parse as its column's type is `DataParse`.
pub fn read_csv(bytes: &[u8]) -> Result<CsvTable> {
    let mut reader = csv::Reader::from_reader(bytes);
    let columns: Vec<Field> = reader
        .headers()?
        .iter()
        .map(|name| name.parse::<Field>())
        .collect::<Result<_>>()?;

    if columns.is_empty() {
        return Err(DashboardError::InvalidArgument("CSV has no columns".to_string()));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = columns.iter().find(|f| !seen.insert(**f)) {
        return Err(DashboardError::InvalidArgument(format!(
            "CSV repeats column {}",
            dup
        )));
    }

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cells = columns
            .iter()
            .zip(row.iter())
            .map(|(field, raw)| field.parse_cell(raw))
            .collect::<Result<Vec<_>>>()?;
        rows.push(cells);
    }

    Ok(CsvTable { columns, rows })
}

/// File name offered for a download: `base` with `.csv` appended if absent.
///
/// A blank base falls back to the default export name.
pub fn download_file_name(base: &str) -> String {
    let base = base.trim();
    let base = if base.is_empty() {
        config::DEFAULT_EXPORT_NAME
    } else {
        base
    };
    if base.to_ascii_lowercase().ends_with(".csv") {
        base.to_string()
    } else {
        format!("{}.csv", base)
    }
}

// ---------------------------------------------------------------------------
// CsvDownload
// ---------------------------------------------------------------------------

/// A ready-to-serve CSV artifact.
#[derive(Debug, Clone)]
pub struct CsvDownload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Arc<Vec<u8>>,
}

impl CsvDownload {
    /// Write the artifact into `dir`, returning the final path.
    ///
    /// Writes to a temp file in the same directory first and renames on
    /// success, so an interrupted write never leaves a partial file behind.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let dest = dir.join(&self.file_name);

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&self.bytes)?;
        tmp.flush()?;
        tmp.persist(&dest).map_err(|e| DashboardError::Io(e.error))?;

        tracing::info!(path = %dest.display(), bytes = self.bytes.len(), "wrote CSV download");
        Ok(dest)
    }
}

// ---------------------------------------------------------------------------
// CsvCache
// ---------------------------------------------------------------------------

/// Single-entry memo of the last CSV encoding.
///
/// Keyed by a SHA-256 fingerprint of the projected columns and rows, so the
/// entry is replaced as soon as the upstream table changes.
#[derive(Debug, Default)]
pub struct CsvCache {
    entry: Option<(String, Arc<Vec<u8>>)>,
}

impl CsvCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The CSV bytes of `records`, encoding only on a fingerprint miss.
    pub fn get_or_encode(&mut self, records: &RecordCollection) -> Result<Arc<Vec<u8>>> {
        let key = fingerprint(records)?;
        if let Some((cached_key, bytes)) = &self.entry {
            if *cached_key == key {
                tracing::debug!(%key, "CSV cache hit");
                return Ok(Arc::clone(bytes));
            }
        }

        tracing::debug!(%key, "CSV cache miss");
        let bytes = Arc::new(to_csv(records)?);
        self.entry = Some((key, Arc::clone(&bytes)));
        Ok(bytes)
    }

    /// Fingerprint of the cached table, if any.
    pub fn cached_key(&self) -> Option<&str> {
        self.entry.as_ref().map(|(k, _)| k.as_str())
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}

/// SHA-256 of the collection's columns and rows, as lowercase hex.
pub fn fingerprint(records: &RecordCollection) -> Result<String> {
    #[derive(Serialize)]
    struct Key<'a> {
        columns: &'a [Field],
        records: &'a [Record],
    }

    let json = serde_json::to_vec(&Key {
        columns: records.columns(),
        records: records.records(),
    })?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    Ok(format!("{:x}", hasher.finalize()))
}
