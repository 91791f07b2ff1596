//! Row normalization into [`IncidentRecord`]s.

use sasv_incident_models::{IncidentRecord, RawCell, RawRow, UNKNOWN_PROVINCE, columns};

use crate::cleaning::{normalize_age, parse_number};

/// Normalizes raw rows, dropping those without a usable province.
///
/// Never fails: malformed cells become missing fields.
pub fn normalize<I>(rows: I) -> Vec<IncidentRecord>
where
    I: IntoIterator<Item = RawRow>,
{
    rows.into_iter().filter_map(normalize_row).collect()
}

/// Normalizes a single row. Returns `None` when the province is missing
/// or is the unknown-province marker.
#[must_use]
pub fn normalize_row(mut row: RawRow) -> Option<IncidentRecord> {
    let province_name = take(&mut row, columns::PROVINCE)
        .into_text()
        .filter(|p| p != UNKNOWN_PROVINCE)?;

    let latitude = parse_number(&take(&mut row, columns::LATITUDE));
    let longitude = parse_number(&take(&mut row, columns::LONGITUDE));
    let victim_age = normalize_age(&take(&mut row, columns::VICTIM_AGE));
    let year = parse_number(&take(&mut row, columns::YEAR));
    let month = parse_number(&take(&mut row, columns::MONTH));

    let place_type = take(&mut row, columns::PLACE_TYPE).into_text();
    let street_name = take(&mut row, columns::STREET).into_text();
    let incident_date = take(&mut row, columns::INCIDENT_DATE).into_text();
    let incident_time = take(&mut row, columns::INCIDENT_TIME).into_text();

    let attributes = row
        .into_iter()
        .filter_map(|(column, cell)| cell.into_text().map(|text| (column, text)))
        .collect();

    Some(IncidentRecord {
        province_name,
        latitude,
        longitude,
        victim_age,
        year,
        month,
        place_type,
        street_name,
        incident_date,
        incident_time,
        attributes,
    })
}

fn take(row: &mut RawRow, column: &str) -> RawCell {
    row.remove(column).unwrap_or(RawCell::Missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| ((*k).to_string(), RawCell::from_field(v)))
            .collect()
    }

    #[test]
    fn drops_unknown_and_missing_provinces() {
        let rows = vec![
            row(&[("provincia_nombre", "Desconocido"), ("latitud", "-34")]),
            row(&[("provincia_nombre", ""), ("latitud", "-34")]),
            row(&[("latitud", "-34")]),
            row(&[("provincia_nombre", "Salta"), ("latitud", "-24.7")]),
        ];

        let records = normalize(rows);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].province_name, "Salta");
    }

    #[test]
    fn malformed_fields_become_missing() {
        let record = normalize_row(row(&[
            ("provincia_nombre", "Chaco"),
            ("latitud", "no-data"),
            ("longitud", "-60.84"),
            ("victima_tr_edad", "desconocida"),
            ("anio", "dos mil"),
            ("mes", "7"),
        ]))
        .unwrap();

        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, Some(-60.84));
        assert_eq!(record.victim_age, None);
        assert_eq!(record.year, None);
        assert_eq!(record.month, Some(7.0));
    }

    #[test]
    fn keeps_passthrough_columns_as_attributes() {
        let record = normalize_row(row(&[
            ("provincia_nombre", "Jujuy"),
            ("localidad_nombre", "Palpalá"),
            ("victima_vehiculo", ""),
            ("tipo_lugar", "Ruta"),
        ]))
        .unwrap();

        assert_eq!(record.place_type.as_deref(), Some("Ruta"));
        assert_eq!(
            record.attributes.get("localidad_nombre").map(String::as_str),
            Some("Palpalá")
        );
        assert!(!record.attributes.contains_key("victima_vehiculo"));
        assert!(!record.attributes.contains_key("tipo_lugar"));
    }

    #[test]
    fn normalizing_clean_records_is_a_no_op() {
        let first = normalize(vec![
            row(&[
                ("provincia_nombre", "Mendoza"),
                ("latitud", "-32.9"),
                ("longitud", "-68.8"),
                ("victima_tr_edad", "25-29"),
                ("anio", "2021"),
                ("mes", "4"),
                ("hora_hecho", "07:15:00"),
                ("id_hecho", "12"),
            ]),
            row(&[
                ("provincia_nombre", "Mendoza"),
                ("victima_tr_edad", "menos de 1"),
            ]),
        ]);

        let second = normalize(first.iter().map(IncidentRecord::to_raw_row));

        assert_eq!(first, second);
    }
}
