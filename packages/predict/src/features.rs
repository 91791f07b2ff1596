//! Feature derivation from raw incident fields.

use chrono::{Datelike as _, NaiveDate, NaiveDateTime, NaiveTime, Timelike as _};
use sasv_dataset::CleanTable;
use sasv_incident_models::{IncidentRecord, TimeBucket, Weekday, format_number};
use sasv_predict_models::DerivedFeatures;

/// Street values that mean "unknown street" (compared lowercased).
pub const UNKNOWN_STREETS: &[&str] = &["sin determinar", "perdido"];

/// Number of categorical features the model consumes.
pub const FEATURE_COUNT: usize = 5;

/// Categorical feature values in model order: province, month, time bucket,
/// weekday, place type.
pub type FeatureValues = [String; FEATURE_COUNT];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Derives the time bucket and weekday of a record.
#[must_use]
pub fn derive_features(record: &IncidentRecord) -> DerivedFeatures {
    DerivedFeatures {
        time_bucket: record.incident_time.as_deref().and_then(time_bucket),
        weekday: record.incident_date.as_deref().and_then(weekday),
    }
}

/// Parses the hour out of an `HH:MM:SS` time.
#[must_use]
pub fn parse_hour(text: &str) -> Option<u32> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M:%S")
        .ok()
        .map(|t| t.hour())
}

/// Buckets an `HH:MM:SS` time into a segment of the day.
#[must_use]
pub fn time_bucket(text: &str) -> Option<TimeBucket> {
    parse_hour(text).and_then(TimeBucket::from_hour)
}

/// Parses a date in any of the accepted formats.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
                .map(|dt| dt.date())
        })
}

/// Returns the weekday of a date string.
#[must_use]
pub fn weekday(text: &str) -> Option<Weekday> {
    parse_date(text).map(|d| d.weekday().into())
}

/// Month value as it is encoded for the model.
#[must_use]
pub fn month_key(month: f64) -> String {
    format_number(month)
}

/// A record reduced to its model features and street.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingRow {
    /// Feature values in model order.
    pub features: FeatureValues,
    /// Street name (the class label).
    pub street: String,
}

/// Extracts the usable training rows of a table: every feature present, a
/// street present, and the street not one of [`UNKNOWN_STREETS`].
#[must_use]
pub fn training_rows(table: &CleanTable) -> Vec<TrainingRow> {
    table.records.iter().filter_map(training_row).collect()
}

fn training_row(record: &IncidentRecord) -> Option<TrainingRow> {
    let street = record.street_name.as_ref()?;
    let lowered = street.to_lowercase();
    if UNKNOWN_STREETS.contains(&lowered.as_str()) {
        return None;
    }

    let derived = derive_features(record);

    Some(TrainingRow {
        features: [
            record.province_name.clone(),
            month_key(record.month?),
            derived.time_bucket?.to_string(),
            derived.weekday?.to_string(),
            record.place_type.clone()?,
        ],
        street: street.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_bucket_at_boundaries() {
        let cases = [
            ("00:00:00", TimeBucket::Madrugada),
            ("05:59:59", TimeBucket::Madrugada),
            ("06:00:00", TimeBucket::Manana),
            ("11:30:00", TimeBucket::Manana),
            ("12:00:00", TimeBucket::Tarde),
            ("18:59:00", TimeBucket::Tarde),
            ("19:00:00", TimeBucket::Noche),
            ("23:59:59", TimeBucket::Noche),
        ];
        for (time, expected) in cases {
            assert_eq!(time_bucket(time), Some(expected), "{time}");
        }
    }

    #[test]
    fn unparseable_times_have_no_bucket() {
        assert_eq!(time_bucket("24:00:00"), None);
        assert_eq!(time_bucket("14:30"), None);
        assert_eq!(time_bucket("tarde"), None);
        assert_eq!(time_bucket(""), None);
    }

    #[test]
    fn weekday_from_supported_date_formats() {
        assert_eq!(weekday("2024-01-15"), Some(Weekday::Monday));
        assert_eq!(weekday("15/01/2024"), Some(Weekday::Monday));
        assert_eq!(weekday("2024-01-21 10:00:00"), Some(Weekday::Sunday));
        assert_eq!(weekday("2024-01-20T10:00:00"), Some(Weekday::Saturday));
        assert_eq!(weekday("not a date"), None);
        assert_eq!(weekday("2024-02-30"), None);
    }

    #[test]
    fn month_key_drops_integral_fraction() {
        assert_eq!(month_key(3.0), "3");
        assert_eq!(month_key(12.0), "12");
    }

    fn record(street: Option<&str>, time: Option<&str>) -> IncidentRecord {
        IncidentRecord {
            province_name: "Buenos Aires".to_string(),
            latitude: None,
            longitude: None,
            victim_age: None,
            year: Some(2020.0),
            month: Some(3.0),
            place_type: Some("Ruta".to_string()),
            street_name: street.map(str::to_string),
            incident_date: Some("2020-03-02".to_string()),
            incident_time: time.map(str::to_string),
            attributes: std::collections::BTreeMap::new(),
        }
    }

    #[test]
    fn training_row_requires_every_feature() {
        let row = training_row(&record(Some("Calle Uno"), Some("13:00:00"))).unwrap();
        assert_eq!(
            row.features,
            [
                "Buenos Aires".to_string(),
                "3".to_string(),
                "Tarde".to_string(),
                "Monday".to_string(),
                "Ruta".to_string(),
            ]
        );
        assert!(training_row(&record(Some("Calle Uno"), None)).is_none());
        assert!(training_row(&record(None, Some("13:00:00"))).is_none());
    }

    #[test]
    fn unknown_streets_are_excluded_case_insensitively() {
        assert!(training_row(&record(Some("SIN DETERMINAR"), Some("13:00:00"))).is_none());
        assert!(training_row(&record(Some("Perdido"), Some("13:00:00"))).is_none());
    }
}
