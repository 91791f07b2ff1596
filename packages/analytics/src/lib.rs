#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Statistics over a cleaned road-fatality table.
//!
//! Every function is pure over a [`CleanTable`] and returns plain data from
//! `sasv_analytics_models`, ready to be serialized by the server or printed
//! by the CLI.

pub mod distribution;
pub mod explore;
pub mod map;
pub mod stats;

use std::collections::{BTreeMap, BTreeSet};

use sasv_analytics_models::YearBounds;
use sasv_dataset::CleanTable;
use thiserror::Error;

pub use distribution::{category_distribution, distribution_csv};
pub use explore::{explore, explore_csv};
pub use map::{heatmap_points, province_markers};
pub use stats::{province_comparison, province_summary};

/// Errors that can occur while computing a view.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A heatmap was requested with no month selected.
    #[error("Select at least one month")]
    NoMonthsSelected,

    /// A month outside 1-12 was selected.
    #[error("Invalid month {0}: expected a value between 1 and 12")]
    InvalidMonth(u32),

    /// The year range is reversed.
    #[error("Invalid year range {from}-{to}")]
    InvalidYearRange {
        /// First year requested.
        from: i32,
        /// Last year requested.
        to: i32,
    },

    /// Writing a CSV export failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing a CSV export failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rounds to two decimals.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean, `None` for an empty input.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Counts occurrences and orders them by descending count, then by value.
pub(crate) fn ranked_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

pub(crate) fn check_year_range(from: i32, to: i32) -> Result<(), AnalyticsError> {
    if from > to {
        return Err(AnalyticsError::InvalidYearRange { from, to });
    }
    Ok(())
}

pub(crate) fn year_in_range(year: Option<f64>, from: i32, to: i32) -> bool {
    year.is_some_and(|y| y >= f64::from(from) && y <= f64::from(to))
}

/// Earliest and latest year in the table.
#[must_use]
pub fn year_bounds(table: &CleanTable) -> Option<YearBounds> {
    let years = table.records.iter().filter_map(|r| r.year_number());
    let (min, max) = years.fold(None, |acc: Option<(i32, i32)>, y| {
        Some(acc.map_or((y, y), |(lo, hi)| (lo.min(y), hi.max(y))))
    })?;
    Some(YearBounds { min, max })
}

/// Distinct province names, sorted.
#[must_use]
pub fn provinces(table: &CleanTable) -> Vec<String> {
    table
        .records
        .iter()
        .map(|r| r.province_name.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Distinct non-empty place types, sorted.
#[must_use]
pub fn place_types(table: &CleanTable) -> Vec<String> {
    table
        .records
        .iter()
        .filter_map(|r| r.place_type.as_deref())
        .filter(|p| !p.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::BTreeMap;

    use sasv_dataset::CleanTable;
    use sasv_incident_models::{IncidentRecord, columns};

    /// Builds a record with the fields the views read.
    pub fn record(province: &str, year: Option<f64>, month: Option<f64>, age: Option<f64>) -> IncidentRecord {
        IncidentRecord {
            province_name: province.to_string(),
            latitude: Some(-31.4),
            longitude: Some(-64.2),
            victim_age: age,
            year,
            month,
            place_type: None,
            street_name: None,
            incident_date: None,
            incident_time: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Adds a pass-through attribute.
    pub fn with(mut record: IncidentRecord, column: &str, value: &str) -> IncidentRecord {
        if column == columns::PLACE_TYPE {
            record.place_type = Some(value.to_string());
        } else {
            record.attributes.insert(column.to_string(), value.to_string());
        }
        record
    }

    pub fn table(records: Vec<IncidentRecord>) -> CleanTable {
        CleanTable {
            columns: vec![
                columns::INCIDENT_ID.to_string(),
                columns::PROVINCE.to_string(),
                columns::VICTIM_AGE.to_string(),
                columns::LATITUDE.to_string(),
                columns::LONGITUDE.to_string(),
                columns::YEAR.to_string(),
                columns::MONTH.to_string(),
                columns::PLACE_TYPE.to_string(),
            ],
            records,
            fingerprint: "fixture".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{record, table, with};
    use super::*;
    use sasv_incident_models::columns;

    #[test]
    fn option_lists_are_sorted_and_distinct() {
        let t = table(vec![
            with(record("Salta", Some(2019.0), None, None), columns::PLACE_TYPE, "Ruta"),
            with(record("Córdoba", Some(2017.0), None, None), columns::PLACE_TYPE, "Calle"),
            with(record("Salta", Some(2021.0), None, None), columns::PLACE_TYPE, "Ruta"),
            record("Chaco", None, None, None),
        ]);

        assert_eq!(provinces(&t), ["Chaco", "Córdoba", "Salta"]);
        assert_eq!(place_types(&t), ["Calle", "Ruta"]);
        assert_eq!(year_bounds(&t), Some(YearBounds { min: 2017, max: 2021 }));
    }

    #[test]
    fn year_bounds_of_empty_table() {
        assert_eq!(year_bounds(&table(Vec::new())), None);
    }

    #[test]
    fn ranked_counts_break_ties_by_value() {
        let ranked = ranked_counts(["b", "a", "c", "c"].into_iter());
        assert_eq!(
            ranked,
            [
                ("c".to_string(), 2),
                ("a".to_string(), 1),
                ("b".to_string(), 1)
            ]
        );
    }

    #[test]
    fn rounding_and_mean() {
        assert!((round2(33.333_333) - 33.33).abs() < 1e-9);
        assert_eq!(mean(std::iter::empty()), None);
        assert_eq!(mean([20.0, 30.0].into_iter()), Some(25.0));
    }
}
