//! Loaded tables and their source metadata.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::TableKind;

/// Metadata about an input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of header columns.
    pub column_count: usize,
}

impl SourceMetadata {
    /// Create metadata for a file that has been read.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
        }
    }
}

/// A defect found while reading rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseAnomaly {
    /// Row has a different number of fields than the header.
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    /// Row could not be decoded at all and was skipped.
    Malformed { line: u64, message: String },
}

impl ParseAnomaly {
    /// 1-based line number in the source file.
    pub fn line(&self) -> u64 {
        match self {
            ParseAnomaly::FieldCount { line, .. } | ParseAnomaly::Malformed { line, .. } => *line,
        }
    }
}

impl std::fmt::Display for ParseAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseAnomaly::FieldCount {
                line,
                expected,
                found,
            } => write!(f, "line {}: expected {} fields, found {}", line, expected, found),
            ParseAnomaly::Malformed { line, message } => write!(f, "line {}: {}", line, message),
        }
    }
}

/// A parsed export: header, rows in file order, and the anomalies found.
///
/// Rows are always header-width; short rows are padded with empty cells and
/// long rows truncated, with the mismatch recorded in `anomalies`.
#[derive(Debug, Clone)]
pub struct Table {
    /// Which export this is.
    pub kind: TableKind,
    /// Column headers, trimmed.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
    /// Defects found while reading.
    pub anomalies: Vec<ParseAnomaly>,
    /// The delimiter used.
    pub delimiter: u8,
}

impl Table {
    /// Create a new table.
    pub fn new(
        kind: TableKind,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        anomalies: Vec<ParseAnomaly>,
        delimiter: u8,
    ) -> Self {
        Self {
            kind,
            headers,
            rows,
            anomalies,
            delimiter,
        }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Index of the first column with this header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Number of rows whose field count differed from the header.
    pub fn ragged_rows(&self) -> usize {
        self.anomalies
            .iter()
            .filter(|a| matches!(a, ParseAnomaly::FieldCount { .. }))
            .count()
    }
}
