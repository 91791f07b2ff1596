//! Filtered extracts of the table.

use sasv_analytics_models::{ExploreFilter, ExploreResult};
use sasv_dataset::CleanTable;
use sasv_incident_models::{IncidentRecord, RawCell};

use crate::{AnalyticsError, check_year_range, year_in_range};

/// Number of records returned in an explorer preview.
pub const PREVIEW_ROWS: usize = 100;

fn matching<'a>(
    table: &'a CleanTable,
    filter: &'a ExploreFilter,
) -> Result<impl Iterator<Item = &'a IncidentRecord>, AnalyticsError> {
    check_year_range(filter.year_from, filter.year_to)?;
    Ok(table.records.iter().filter(move |r| {
        year_in_range(r.year, filter.year_from, filter.year_to)
            && filter.provinces.contains(&r.province_name)
    }))
}

/// Records with a year in range and a selected province.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidYearRange`] if the range is reversed.
pub fn explore(table: &CleanTable, filter: &ExploreFilter) -> Result<ExploreResult, AnalyticsError> {
    let mut total = 0;
    let mut preview = Vec::new();
    for record in matching(table, filter)? {
        total += 1;
        if preview.len() < PREVIEW_ROWS {
            preview.push(record.clone());
        }
    }

    log::debug!(
        "Explorer {}-{} over {} provinces matched {total} records",
        filter.year_from,
        filter.year_to,
        filter.provinces.len()
    );

    Ok(ExploreResult { total, preview })
}

/// Every record matching `filter` as comma-separated CSV, with the table's
/// columns as the header.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the range is reversed or the CSV writer
/// fails.
pub fn explore_csv(table: &CleanTable, filter: &ExploreFilter) -> Result<Vec<u8>, AnalyticsError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;

    for record in matching(table, filter)? {
        let mut row = record.to_raw_row();
        let fields: Vec<String> = table
            .columns
            .iter()
            .map(|column| {
                row.remove(column)
                    .and_then(RawCell::into_text)
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&fields)?;
    }

    writer
        .into_inner()
        .map_err(|e| AnalyticsError::Io(e.into_error()))
}
