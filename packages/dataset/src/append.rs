//! Appending new incidents to the dataset file.
//!
//! A row is serialized completely before anything touches the file, then
//! written with one `write_all`. If the write fails the file is truncated
//! back to its previous length, so readers see either the old file or the
//! old file plus exactly one well-formed row.

use std::collections::BTreeMap;
use std::io::{Read as _, Seek as _, SeekFrom, Write as _};
use std::path::Path;

use sasv_incident_models::columns;

use crate::DatasetError;
use crate::reader::{DELIMITER, read_header};

/// Identifier assigned when no existing identifier contains digits.
pub const FIRST_INCIDENT_ID: u64 = 100_000;

/// Appends one row to the dataset at `path`.
///
/// Values are matched to the file's header by column name; columns without
/// a value are left empty and values for unknown columns are ignored. No
/// header is ever written.
///
/// # Errors
///
/// Returns [`DatasetError`] if the header cannot be read or the row cannot
/// be written. On a write error the file is restored to its original
/// length.
pub fn append_row(path: &Path, values: &BTreeMap<String, String>) -> Result<(), DatasetError> {
    let header = read_header(path)?;
    if header.is_empty() {
        return Err(DatasetError::MissingColumn {
            column: columns::PROVINCE.to_string(),
        });
    }

    for column in values.keys() {
        if !header.contains(column) {
            log::debug!("Ignoring value for column not in dataset: {column}");
        }
    }

    let record: Vec<&str> = header
        .iter()
        .map(|column| values.get(column).map_or("", String::as_str))
        .collect();

    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(&record)?;
    let row = writer
        .into_inner()
        .map_err(|e| DatasetError::Io(e.into_error()))?;

    let mut file = std::fs::OpenOptions::new()
        .read(true)
        .append(true)
        .open(path)?;
    let original_len = file.metadata()?.len();

    let mut buffer = Vec::with_capacity(row.len() + 1);
    if original_len > 0 && !ends_with_newline(&mut file, original_len)? {
        buffer.push(b'\n');
    }
    buffer.extend_from_slice(&row);

    if let Err(e) = file.write_all(&buffer).and_then(|()| file.sync_data()) {
        log::error!(
            "Failed to append row to {}: {e}; restoring original length",
            path.display()
        );
        file.set_len(original_len)?;
        return Err(e.into());
    }

    log::info!("Appended 1 row to {}", path.display());

    Ok(())
}

fn ends_with_newline(file: &mut std::fs::File, len: u64) -> std::io::Result<bool> {
    let mut last = [0_u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Computes the identifier for the next registered incident from the
/// dataset at `path`.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read.
pub fn next_incident_id(path: &Path) -> Result<String, DatasetError> {
    let file = std::fs::File::open(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .from_reader(file);

    let Some(index) = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == columns::INCIDENT_ID)
    else {
        let id = uuid::Uuid::new_v4().to_string();
        log::warn!("Dataset has no {} column; using random id {id}", columns::INCIDENT_ID);
        return Ok(id);
    };

    let mut ids = Vec::new();
    for result in reader.records() {
        let record = result?;
        if let Some(id) = record.get(index) {
            ids.push(id.to_string());
        }
    }

    Ok(next_id_from(ids.iter().map(String::as_str)).to_string())
}

/// Returns one more than the largest number embedded in `ids`, reading the
/// first run of digits of each id, or [`FIRST_INCIDENT_ID`] when none has
/// digits.
#[must_use]
pub fn next_id_from<'a, I>(ids: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    ids.into_iter()
        .filter_map(first_digit_run)
        .max()
        .map_or(FIRST_INCIDENT_ID, |max| max.saturating_add(1))
}

fn first_digit_run(id: &str) -> Option<u64> {
    let start = id.find(|c: char| c.is_ascii_digit())?;
    let digits: String = id[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
