//! Value counts of the categorical columns.

use sasv_analytics_models::{CategoryCount, Distribution, DistributionColumn};
use sasv_dataset::CleanTable;

use crate::{AnalyticsError, ranked_counts, round2};

/// Counts the non-empty values of `column`, optionally within one province.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn category_distribution(
    table: &CleanTable,
    column: DistributionColumn,
    province: Option<&str>,
) -> Distribution {
    let values = table
        .records
        .iter()
        .filter(|r| province.is_none_or(|p| r.province_name == p))
        .filter_map(|r| r.text(column.column()))
        .filter(|v| !v.is_empty());

    let counts = ranked_counts(values);
    let total: usize = counts.iter().map(|(_, c)| c).sum();

    let entries = counts
        .into_iter()
        .map(|(value, count)| CategoryCount {
            value,
            count,
            percentage: round2(count as f64 / total as f64 * 100.0),
        })
        .collect();

    Distribution {
        column,
        province: province.map(str::to_string),
        total,
        entries,
    }
}

/// Serializes a distribution as comma-separated CSV with a header row.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the CSV writer fails.
pub fn distribution_csv(distribution: &Distribution) -> Result<Vec<u8>, AnalyticsError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([distribution.column.column(), "cantidad", "porcentaje"])?;
    for entry in &distribution.entries {
        let count = entry.count.to_string();
        let percentage = format!("{:.2}", entry.percentage);
        writer.write_record([entry.value.as_str(), count.as_str(), percentage.as_str()])?;
    }
    writer
        .into_inner()
        .map_err(|e| AnalyticsError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use sasv_incident_models::columns;

    use super::*;
    use crate::fixtures::{record, table, with};

    fn sample() -> CleanTable {
        table(vec![
            with(record("Salta", None, None, None), columns::VICTIM_VEHICLE, "Moto"),
            with(record("Salta", None, None, None), columns::VICTIM_VEHICLE, "Moto"),
            with(record("Salta", None, None, None), columns::VICTIM_VEHICLE, "Auto"),
            with(record("Jujuy", None, None, None), columns::VICTIM_VEHICLE, "Auto"),
            with(record("Jujuy", None, None, None), columns::VICTIM_VEHICLE, ""),
            record("Jujuy", None, None, None),
        ])
    }

    #[test]
    fn counts_with_percentages() {
        let dist = category_distribution(&sample(), DistributionColumn::VictimVehicle, None);

        assert_eq!(dist.total, 4);
        assert_eq!(dist.entries.len(), 2);
        assert_eq!(dist.entries[0].value, "Auto");
        assert_eq!(dist.entries[0].count, 2);
        assert!((dist.entries[0].percentage - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn restricted_to_a_province() {
        let dist = category_distribution(&sample(), DistributionColumn::VictimVehicle, Some("Salta"));

        assert_eq!(dist.total, 3);
        assert_eq!(dist.entries[0].value, "Moto");
        assert!((dist.entries[0].percentage - 66.67).abs() < 1e-9);
        assert!((dist.entries[1].percentage - 33.33).abs() < 1e-9);
        assert_eq!(dist.clone().top(1).entries.len(), 1);
    }

    #[test]
    fn empty_distribution() {
        let dist = category_distribution(&sample(), DistributionColumn::ProductionMode, None);
        assert_eq!(dist.total, 0);
        assert!(dist.entries.is_empty());
    }

    #[test]
    fn csv_export() {
        let dist = category_distribution(&sample(), DistributionColumn::VictimVehicle, Some("Salta"));
        let csv = String::from_utf8(distribution_csv(&dist).unwrap()).unwrap();

        assert_eq!(
            csv,
            "victima_vehiculo,cantidad,porcentaje\nMoto,2,66.67\nAuto,1,33.33\n"
        );
    }
}
