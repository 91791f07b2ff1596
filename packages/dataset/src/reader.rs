//! Semicolon-delimited CSV reading.

use sasv_incident_models::{RawCell, RawRow, columns};

use crate::DatasetError;

/// Field delimiter of the published dataset.
pub const DELIMITER: u8 = b';';

/// Parses the dataset bytes into its header and raw rows.
///
/// # Errors
///
/// * [`DatasetError::Encoding`] if the bytes are not UTF-8
/// * [`DatasetError::Csv`] on CSV syntax errors
/// * [`DatasetError::MissingColumn`] if a required column is absent
/// * [`DatasetError::RowShape`] if a row has more fields than the header
pub fn read_rows(bytes: &[u8]) -> Result<(Vec<String>, Vec<RawRow>), DatasetError> {
    let text = std::str::from_utf8(bytes)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    for required in columns::REQUIRED {
        if !headers.iter().any(|h| h == required) {
            return Err(DatasetError::MissingColumn {
                column: (*required).to_string(),
            });
        }
    }

    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;

        if record.len() > headers.len() {
            return Err(DatasetError::RowShape {
                line: record.position().map_or(0, csv::Position::line),
                found: record.len(),
                expected: headers.len(),
            });
        }

        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                (
                    header.clone(),
                    RawCell::from_field(record.get(i).unwrap_or("")),
                )
            })
            .collect();
        rows.push(row);
    }

    Ok((headers, rows))
}

/// Reads only the header row of a dataset file.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be opened or its first line
/// is not valid CSV.
pub fn read_header(path: &std::path::Path) -> Result<Vec<String>, DatasetError> {
    let file = std::fs::File::open(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .from_reader(file);

    Ok(reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_keyed_by_header() {
        let data = "provincia_nombre;latitud;longitud;anio\n\
                    Salta;-24.7;-65.4;2019\n\
                    Chaco;;-60.8\n";

        let (headers, rows) = read_rows(data.as_bytes()).unwrap();

        assert_eq!(headers, vec!["provincia_nombre", "latitud", "longitud", "anio"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].get("anio"),
            Some(&RawCell::Text("2019".to_string()))
        );
        assert_eq!(rows[1].get("latitud"), Some(&RawCell::Missing));
        assert_eq!(rows[1].get("anio"), Some(&RawCell::Missing));
    }

    #[test]
    fn rejects_missing_required_column() {
        let err = read_rows(b"provincia_nombre;latitud\nSalta;-24\n").unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingColumn { ref column } if column == "longitud"
        ));
    }

    #[test]
    fn rejects_rows_wider_than_header() {
        let data = "provincia_nombre;latitud;longitud\nSalta;1;2;3\n";
        let err = read_rows(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::RowShape {
                found: 4,
                expected: 3,
                ..
            }
        ));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = read_rows(b"provincia_nombre;latitud;longitud\n\xff\xfe;1;2\n").unwrap_err();
        assert!(matches!(err, DatasetError::Encoding(_)));
    }

    #[test]
    fn empty_input_is_a_structural_failure() {
        assert!(read_rows(b"").is_err());
    }
}
