//! Map data: per-province markers and heatmap points.

use sasv_analytics_models::{HeatmapFilter, HeatmapPoint, MarkerTier, ProvinceMarker};
use sasv_dataset::CleanTable;
use sasv_incident_models::province;

use crate::stats::{by_province, year_range};
use crate::{AnalyticsError, check_year_range, mean, round2, year_in_range};

/// One marker per province with a known centroid.
///
/// Provinces without centroid coordinates are left off the map.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn province_markers(table: &CleanTable) -> Vec<ProvinceMarker> {
    by_province(table)
        .into_iter()
        .filter_map(|(name, records)| {
            let Some((latitude, longitude)) = province::centroid(name) else {
                log::debug!("No centroid for province '{name}', skipping marker");
                return None;
            };

            let total = records.len();
            let tier = MarkerTier::from_total(total);
            let (first_year, last_year) = year_range(&records);

            Some(ProvinceMarker {
                province: name.to_string(),
                latitude,
                longitude,
                total_deaths: total,
                mean_age: round2(mean(records.iter().filter_map(|r| r.victim_age)).unwrap_or(0.0)),
                first_year,
                last_year,
                average_per_year: total as f64
                    / (f64::from(last_year) - f64::from(first_year) + 1.0),
                tier,
                color: tier.color().to_string(),
                radius: tier.radius(),
            })
        })
        .collect()
}

/// Coordinates of the records matching `filter`.
///
/// # Errors
///
/// * [`AnalyticsError::NoMonthsSelected`] if `filter.months` is empty
/// * [`AnalyticsError::InvalidMonth`] if a month is outside 1-12
/// * [`AnalyticsError::InvalidYearRange`] if the range is reversed
pub fn heatmap_points(
    table: &CleanTable,
    filter: &HeatmapFilter,
) -> Result<Vec<HeatmapPoint>, AnalyticsError> {
    if filter.months.is_empty() {
        return Err(AnalyticsError::NoMonthsSelected);
    }
    if let Some(&month) = filter.months.iter().find(|m| !(1..=12).contains(*m)) {
        return Err(AnalyticsError::InvalidMonth(month));
    }
    check_year_range(filter.year_from, filter.year_to)?;

    let points: Vec<HeatmapPoint> = table
        .records
        .iter()
        .filter(|r| year_in_range(r.year, filter.year_from, filter.year_to))
        .filter(|r| r.month_number().is_some_and(|m| filter.months.contains(&m)))
        .filter_map(|r| Some([r.latitude?, r.longitude?]))
        .collect();

    log::debug!(
        "Heatmap {}-{} over {} months: {} points",
        filter.year_from,
        filter.year_to,
        filter.months.len(),
        points.len()
    );

    Ok(points)
}
