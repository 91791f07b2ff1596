#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the SASV server.
//!
//! Query parameter structs mirror what the browser sends: list-valued
//! filters arrive as comma-separated strings and are split by the helpers
//! here, so handlers and tests agree on one parsing rule.

use sasv_analytics_models::YearBounds;
use sasv_incident_models::{Month, TimeBucket, Weekday};
use sasv_predict_models::{RankedStreet, TrainingSummary};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body returned with every non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Province list and year coverage, used to populate filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProvinces {
    /// Distinct provinces, sorted.
    pub provinces: Vec<String>,
    /// First and last year present, if any record has a year.
    pub years: Option<YearBounds>,
}

/// Response format for endpoints that can export CSV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// JSON body.
    #[default]
    Json,
    /// CSV attachment.
    Csv,
}

/// Query parameters for the heatmap endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapQueryParams {
    /// First year, inclusive. Defaults to the earliest year in the data.
    pub year_from: Option<i32>,
    /// Last year, inclusive. Defaults to the latest year in the data.
    pub year_to: Option<i32>,
    /// Comma-separated month numbers. All months when absent.
    pub months: Option<String>,
}

/// Query parameters for the distribution endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionQueryParams {
    /// Restrict to one province.
    pub province: Option<String>,
    /// Keep only the most frequent values.
    pub top: Option<usize>,
    /// Response format.
    #[serde(default)]
    pub format: ExportFormat,
}

/// Query parameters for the explorer endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreQueryParams {
    /// First year, inclusive. Defaults to the earliest year in the data.
    pub year_from: Option<i32>,
    /// Last year, inclusive. Defaults to the latest year in the data.
    pub year_to: Option<i32>,
    /// Comma-separated provinces. All provinces when absent.
    pub provinces: Option<String>,
    /// Response format.
    #[serde(default)]
    pub format: ExportFormat,
}

/// A month choice for selectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMonth {
    /// Month number (1-12).
    pub number: u32,
    /// Spanish name.
    pub name: String,
}

impl From<Month> for ApiMonth {
    fn from(month: Month) -> Self {
        Self {
            number: month.number(),
            name: month.to_string(),
        }
    }
}

/// A weekday choice for selectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiWeekday {
    /// Value to send back in a prediction request.
    pub value: Weekday,
    /// Spanish label.
    pub label: String,
}

/// Choices for the prediction form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPredictOptions {
    /// Provinces present in the data.
    pub provinces: Vec<String>,
    /// Place types present in the data.
    pub place_types: Vec<String>,
    /// Months.
    pub months: Vec<ApiMonth>,
    /// Segments of the day.
    pub time_buckets: Vec<TimeBucket>,
    /// Days of the week.
    pub weekdays: Vec<ApiWeekday>,
}

impl ApiPredictOptions {
    /// Builds the options with the fixed calendar choices.
    #[must_use]
    pub fn new(provinces: Vec<String>, place_types: Vec<String>) -> Self {
        Self {
            provinces,
            place_types,
            months: Month::all().iter().copied().map(ApiMonth::from).collect(),
            time_buckets: TimeBucket::all().to_vec(),
            weekdays: Weekday::all()
                .iter()
                .map(|&day| ApiWeekday {
                    value: day,
                    label: day.spanish_label().to_string(),
                })
                .collect(),
        }
    }
}

/// Ranked streets for one prediction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPrediction {
    /// Most probable streets first.
    pub streets: Vec<RankedStreet>,
    /// How the model behind this answer was trained.
    pub model: TrainingSummary,
}

/// Response to a successful registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegistered {
    /// Identifier assigned to the new incident.
    pub id: String,
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
#[must_use]
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Parses a comma-separated list of month numbers.
///
/// # Errors
///
/// Returns the first entry that is not a non-negative integer.
pub fn parse_months(s: &str) -> Result<Vec<u32>, String> {
    split_list(s)
        .into_iter()
        .map(|m| m.parse().map_err(|_| m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_ignore_blanks() {
        assert_eq!(split_list(" Salta, ,Jujuy,"), ["Salta", "Jujuy"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn months_parse_or_name_the_bad_entry() {
        assert_eq!(parse_months("1, 2,12"), Ok(vec![1, 2, 12]));
        assert_eq!(parse_months(""), Ok(Vec::new()));
        assert_eq!(parse_months("1,mayo"), Err("mayo".to_string()));
    }

    #[test]
    fn predict_options_carry_calendar_choices() {
        let options = ApiPredictOptions::new(vec!["Salta".to_string()], Vec::new());
        assert_eq!(options.months.len(), 12);
        assert_eq!(options.months[0].name, "Enero");
        assert_eq!(options.time_buckets.len(), 4);
        assert_eq!(options.weekdays[6].label, "Domingo");
    }

    #[test]
    fn export_format_defaults_to_json() {
        let params: ExploreQueryParams = serde_json::from_str(r#"{"yearFrom": 2019}"#).unwrap();
        assert_eq!(params.format, ExportFormat::Json);
        assert_eq!(params.year_from, Some(2019));

        let params: DistributionQueryParams = serde_json::from_str(r#"{"format": "csv"}"#).unwrap();
        assert_eq!(params.format, ExportFormat::Csv);
    }
}
