#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loading, cleaning, and appending the road-fatality dataset.
//!
//! The dataset is a semicolon-delimited UTF-8 file with a header row.
//! [`load`] reads it into a [`CleanTable`]: rows with an unknown province are
//! dropped and the coordinate, age, year and month columns are coerced into
//! numbers. Cell-level problems never fail a load; only a structurally
//! broken file does.

pub mod append;
pub mod cleaning;
pub mod normalize;
pub mod reader;

use std::path::{Path, PathBuf};

use sasv_incident_models::IncidentRecord;
use serde::Serialize;
use sha2::{Digest as _, Sha256};
use thiserror::Error;

pub use append::{append_row, next_incident_id};
pub use cleaning::{normalize_age, parse_number};
pub use normalize::{normalize, normalize_row};

/// Errors that make the dataset unavailable or a write fail.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset file could not be opened or read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The file is not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// A structurally required column is absent from the header.
    #[error("Missing required column '{column}'")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },

    /// A row has more fields than the header.
    #[error("Row at line {line} has {found} fields, expected at most {expected}")]
    RowShape {
        /// Line number of the offending row.
        line: u64,
        /// Number of fields in the row.
        found: usize,
        /// Number of header columns.
        expected: usize,
    },
}

/// A normalized snapshot of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanTable {
    /// Header columns in file order.
    pub columns: Vec<String>,
    /// Normalized records.
    pub records: Vec<IncidentRecord>,
    /// SHA-256 hex digest of the bytes the table was read from.
    pub fingerprint: String,
}

impl CleanTable {
    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` if the source header contains `column`.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Returns the SHA-256 hex digest identifying a dataset snapshot.
#[must_use]
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Loads and normalizes the dataset at `path`.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file is missing, unreadable, not UTF-8,
/// not valid CSV, or lacks a required column.
pub fn load(path: &Path) -> Result<CleanTable, DatasetError> {
    log::info!("Loading dataset from {}", path.display());
    let bytes = std::fs::read(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_bytes(&bytes)
}

/// Normalizes dataset contents already in memory.
///
/// # Errors
///
/// Returns [`DatasetError`] if the bytes are not a structurally valid
/// dataset.
pub fn load_bytes(bytes: &[u8]) -> Result<CleanTable, DatasetError> {
    let fingerprint = fingerprint(bytes);
    let (columns, rows) = reader::read_rows(bytes)?;

    let total = rows.len();
    let records = normalize(rows);

    log::debug!(
        "Dropped {} of {total} rows without a known province",
        total - records.len()
    );
    log::info!(
        "Loaded {} records ({} columns, fingerprint {})",
        records.len(),
        columns.len(),
        &fingerprint[..12]
    );

    Ok(CleanTable {
        columns,
        records,
        fingerprint,
    })
}
