//! Per-province statistics and the cross-province comparison.

use std::collections::{BTreeMap, BTreeSet};

use sasv_analytics_models::{
    LocalityCount, MonthCount, ProvinceComparison, ProvinceSummary, YearCount,
};
use sasv_dataset::CleanTable;
use sasv_incident_models::{IncidentRecord, Month, columns};

use crate::{mean, ranked_counts, round2};

const TOP_LOCALITIES: usize = 10;

/// Groups records by province name.
pub(crate) fn by_province(table: &CleanTable) -> BTreeMap<&str, Vec<&IncidentRecord>> {
    let mut groups: BTreeMap<&str, Vec<&IncidentRecord>> = BTreeMap::new();
    for record in &table.records {
        groups
            .entry(record.province_name.as_str())
            .or_default()
            .push(record);
    }
    groups
}

/// Earliest and latest year of `records`, `(0, 0)` when none has a year.
pub(crate) fn year_range(records: &[&IncidentRecord]) -> (i32, i32) {
    records
        .iter()
        .filter_map(|r| r.year_number())
        .fold(None, |acc: Option<(i32, i32)>, y| {
            Some(acc.map_or((y, y), |(lo, hi)| (lo.min(y), hi.max(y))))
        })
        .unwrap_or((0, 0))
}

/// Detailed statistics for `province`, or `None` if it has no records.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn province_summary(table: &CleanTable, province: &str) -> Option<ProvinceSummary> {
    let records: Vec<&IncidentRecord> = table
        .records
        .iter()
        .filter(|r| r.province_name == province)
        .collect();

    if records.is_empty() {
        return None;
    }

    let total = records.len();
    let (first_year, last_year) = year_range(&records);
    let deaths_per_year = if last_year > first_year {
        total as f64 / (f64::from(last_year) - f64::from(first_year) + 1.0)
    } else {
        total as f64
    };

    let mut yearly: BTreeMap<i32, usize> = BTreeMap::new();
    let mut monthly: BTreeMap<u32, usize> = BTreeMap::new();
    for record in &records {
        if let Some(year) = record.year_number() {
            *yearly.entry(year).or_default() += 1;
        }
        if let Some(month) = record.month_number() {
            *monthly.entry(month).or_default() += 1;
        }
    }

    let top_localities = ranked_counts(records.iter().filter_map(|r| r.text(columns::LOCALITY)))
        .into_iter()
        .take(TOP_LOCALITIES)
        .map(|(locality, deaths)| LocalityCount { locality, deaths })
        .collect();

    Some(ProvinceSummary {
        province: province.to_string(),
        total_deaths: total,
        mean_age: mean(records.iter().filter_map(|r| r.victim_age)).unwrap_or(0.0),
        first_year,
        last_year,
        deaths_per_year,
        yearly: yearly
            .into_iter()
            .map(|(year, deaths)| YearCount { year, deaths })
            .collect(),
        monthly: monthly
            .into_iter()
            .map(|(month, deaths)| MonthCount {
                month,
                label: Month::from_number(month)
                    .map_or_else(String::new, |m| m.short_label().to_string()),
                deaths,
            })
            .collect(),
        top_localities,
    })
}

/// Totals, mean age, and years with data for every province, most deaths
/// first.
#[must_use]
pub fn province_comparison(table: &CleanTable) -> Vec<ProvinceComparison> {
    let mut rows: Vec<ProvinceComparison> = by_province(table)
        .into_iter()
        .map(|(province, records)| ProvinceComparison {
            province: province.to_string(),
            total_deaths: records.len(),
            mean_age: round2(mean(records.iter().filter_map(|r| r.victim_age)).unwrap_or(0.0)),
            years_with_data: records
                .iter()
                .filter_map(|r| r.year_number())
                .collect::<BTreeSet<_>>()
                .len(),
        })
        .collect();

    rows.sort_by(|a, b| b.total_deaths.cmp(&a.total_deaths));
    log::debug!("Compared {} provinces", rows.len());
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{record, table, with};

    fn sample() -> CleanTable {
        table(vec![
            with(record("Córdoba", Some(2018.0), Some(1.0), Some(20.0)), columns::LOCALITY, "Río Cuarto"),
            with(record("Córdoba", Some(2020.0), Some(1.0), Some(30.0)), columns::LOCALITY, "Córdoba"),
            with(record("Córdoba", Some(2020.0), Some(12.0), None), columns::LOCALITY, "Córdoba"),
            record("Córdoba", None, None, None),
            record("Salta", Some(2019.0), Some(5.0), None),
        ])
    }

    #[test]
    fn summary_of_a_province() {
        let summary = province_summary(&sample(), "Córdoba").unwrap();

        assert_eq!(summary.total_deaths, 4);
        assert!((summary.mean_age - 25.0).abs() < 1e-9);
        assert_eq!((summary.first_year, summary.last_year), (2018, 2020));
        assert!((summary.deaths_per_year - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            summary.yearly,
            [
                YearCount { year: 2018, deaths: 1 },
                YearCount { year: 2020, deaths: 2 }
            ]
        );
        assert_eq!(summary.monthly.len(), 2);
        assert_eq!(summary.monthly[0].label, "Ene");
        assert_eq!(summary.monthly[0].deaths, 2);
        assert_eq!(summary.monthly[1].label, "Dic");
        assert_eq!(summary.top_localities[0].locality, "Córdoba");
        assert_eq!(summary.top_localities[0].deaths, 2);
    }

    #[test]
    fn extreme_year_span_does_not_overflow() {
        let t = table(vec![
            record("Salta", Some(2_000_000_000.0), Some(1.0), None),
            record("Salta", Some(-2_000_000_000.0), Some(1.0), None),
        ]);
        let summary = province_summary(&t, "Salta").unwrap();

        assert_eq!((summary.first_year, summary.last_year), (-2_000_000_000, 2_000_000_000));
        assert!(summary.deaths_per_year > 0.0);
        assert!(summary.deaths_per_year < 1e-8);
    }

    #[test]
    fn summary_without_ages_or_span() {
        let summary = province_summary(&sample(), "Salta").unwrap();

        assert!(summary.mean_age.abs() < f64::EPSILON);
        assert_eq!((summary.first_year, summary.last_year), (2019, 2019));
        assert!((summary.deaths_per_year - 1.0).abs() < f64::EPSILON);
        assert!(summary.top_localities.is_empty());
    }

    #[test]
    fn unknown_province_has_no_summary() {
        assert!(province_summary(&sample(), "Jujuy").is_none());
    }

    #[test]
    fn comparison_orders_by_total() {
        let rows = province_comparison(&sample());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].province, "Córdoba");
        assert_eq!(rows[0].total_deaths, 4);
        assert_eq!(rows[0].years_with_data, 2);
        assert!((rows[0].mean_age - 25.0).abs() < 1e-9);
        assert_eq!(rows[1].province, "Salta");
        assert!(rows[1].mean_age.abs() < f64::EPSILON);
    }
}
