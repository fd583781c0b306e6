//! Tolerant CSV reader.
//!
//! Reading only fails when the file itself is unusable: missing, unreadable,
//! empty, not UTF-8, or without a header row. Rows with the wrong number of
//! fields are kept and recorded as [`ParseAnomaly`] values so every
//! structural defect can be reported in one pass.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::source::{ParseAnomaly, SourceMetadata, Table};
use crate::config::TableKind;
use crate::error::{Result, SanityError};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b',', b'\t', b';', b'|'];

/// Anomalies logged individually before switching to a summary line.
const LOGGED_ANOMALIES: usize = 5;

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: Some(b','),
            quote: b'"',
        }
    }
}

/// Reads delimited exports into [`Table`]s.
#[derive(Debug, Clone, Default)]
pub struct Reader {
    config: ReaderConfig,
}

impl Reader {
    /// Create a reader with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader with custom configuration.
    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read a file and return the table and its metadata.
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub fn read_table(&self, path: &Path, kind: TableKind) -> Result<(Table, SourceMetadata)> {
        let io_err = |e: std::io::Error| SanityError::Io {
            path: path.to_path_buf(),
            source: e,
        };

        let mut file = File::open(path).map_err(io_err)?;
        let size_bytes = file.metadata().map_err(io_err)?.len();
        if size_bytes == 0 {
            return Err(SanityError::EmptyFile(path.to_path_buf()));
        }

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(io_err)?;

        if let Err(e) = std::str::from_utf8(&contents) {
            return Err(SanityError::Encoding {
                path: path.to_path_buf(),
                offset: e.valid_up_to(),
            });
        }

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents),
        };

        let table = self.parse_bytes(&contents, delimiter, kind, path)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            table.row_count(),
            table.column_count(),
        );

        debug!(
            rows = table.row_count(),
            columns = table.column_count(),
            anomalies = table.anomalies.len(),
            "read table"
        );

        Ok((table, metadata))
    }

    /// Parse in-memory text, e.g. an export already held by the caller.
    pub fn read_str(&self, content: &str, kind: TableKind) -> Result<Table> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(content.as_bytes()),
        };
        self.parse_bytes(content.as_bytes(), delimiter, kind, Path::new("<memory>"))
    }

    fn parse_bytes(
        &self,
        bytes: &[u8],
        delimiter: u8,
        kind: TableKind,
        origin: &Path,
    ) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut records = reader.records();

        let headers: Vec<String> = match records.next() {
            Some(record) => record?
                .iter()
                .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
                .collect(),
            None => return Err(SanityError::MissingHeader(origin.to_path_buf())),
        };
        if headers.is_empty() {
            return Err(SanityError::MissingHeader(origin.to_path_buf()));
        }

        let expected_cols = headers.len();
        let mut rows = Vec::new();
        let mut anomalies = Vec::new();

        for result in records {
            match result {
                Ok(record) => {
                    let line = record.position().map(|p| p.line()).unwrap_or_default();
                    let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();

                    if row.len() != expected_cols {
                        anomalies.push(ParseAnomaly::FieldCount {
                            line,
                            expected: expected_cols,
                            found: row.len(),
                        });
                        row.resize(expected_cols, String::new());
                    }

                    rows.push(row);
                }
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or_default();
                    anomalies.push(ParseAnomaly::Malformed {
                        line,
                        message: e.to_string(),
                    });
                }
            }
        }

        for anomaly in anomalies.iter().take(LOGGED_ANOMALIES) {
            warn!(table = %kind, "{}", anomaly);
        }
        if anomalies.len() > LOGGED_ANOMALIES {
            warn!(
                table = %kind,
                "{} more malformed rows not shown",
                anomalies.len() - LOGGED_ANOMALIES
            );
        }

        Ok(Table::new(kind, headers, rows, anomalies, delimiter))
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let Some(&first_count) = counts.first() else {
            continue;
        };
        if first_count == 0 {
            continue;
        }

        // Consistent counts across lines beat raw frequency
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    best_delimiter
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
