#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Road-fatality incident record types.
//!
//! Defines the raw cell representation read from the published dataset and
//! the strongly typed [`IncidentRecord`] produced by normalization. Every
//! field that can be malformed in the source is an `Option`, so a bad cell
//! degrades to "missing" instead of leaking a string of the wrong kind.

pub mod calendar;
pub mod columns;
pub mod province;
pub mod registration;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use calendar::{Month, TimeBucket, Weekday};
pub use registration::{NewIncident, RegistrationOptions};

/// Province value marking rows whose province is unknown.
pub const UNKNOWN_PROVINCE: &str = "Desconocido";

/// Cell contents read as "no value" when loading the dataset.
pub const MISSING_TOKENS: &[&str] = &[
    "",
    "#N/A",
    "#N/A N/A",
    "#NA",
    "-1.#IND",
    "-1.#QNAN",
    "-NaN",
    "-nan",
    "1.#IND",
    "1.#QNAN",
    "<NA>",
    "N/A",
    "NA",
    "NULL",
    "NaN",
    "None",
    "n/a",
    "nan",
    "null",
];

/// A single cell of an unnormalized row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum RawCell {
    /// No value.
    Missing,
    /// Free text as it appears in the source.
    Text(String),
    /// A value that is already numeric.
    Number(f64),
}

impl RawCell {
    /// Classifies a field read from the CSV file. Missing-value tokens
    /// become [`RawCell::Missing`]; everything else is kept verbatim as text.
    #[must_use]
    pub fn from_field(field: &str) -> Self {
        if MISSING_TOKENS.contains(&field) {
            Self::Missing
        } else {
            Self::Text(field.to_string())
        }
    }

    /// Returns the cell as text, formatting numbers without a trailing
    /// `.0` when they are integral.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Missing => None,
            Self::Text(text) => Some(text),
            Self::Number(value) => Some(format_number(value)),
        }
    }

    /// Returns `true` for [`RawCell::Missing`].
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<Option<f64>> for RawCell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Number)
    }
}

impl From<Option<String>> for RawCell {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Missing, Self::Text)
    }
}

/// An unnormalized row keyed by column name.
pub type RawRow = BTreeMap<String, RawCell>;

/// Formats a number the way it is written back to the dataset: integral
/// values without a fractional part, everything else in shortest form.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// A cleaned road-fatality record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Province where the incident happened. Never empty and never
    /// [`UNKNOWN_PROVINCE`].
    pub province_name: String,
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
    /// Victim age in years.
    pub victim_age: Option<f64>,
    /// Calendar year.
    pub year: Option<f64>,
    /// Calendar month.
    pub month: Option<f64>,
    /// Place type (route, street, highway, ...).
    pub place_type: Option<String>,
    /// Street name.
    pub street_name: Option<String>,
    /// Date as written in the source.
    pub incident_date: Option<String>,
    /// Time of day as written in the source.
    pub incident_time: Option<String>,
    /// Every other non-missing column, keyed by column name.
    pub attributes: BTreeMap<String, String>,
}

impl IncidentRecord {
    /// Returns the textual value of a column, covering both the typed text
    /// fields and the pass-through attributes. Numeric columns return
    /// `None`; read their typed fields instead.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<&str> {
        match column {
            columns::PROVINCE => Some(self.province_name.as_str()),
            columns::PLACE_TYPE => self.place_type.as_deref(),
            columns::STREET => self.street_name.as_deref(),
            columns::INCIDENT_DATE => self.incident_date.as_deref(),
            columns::INCIDENT_TIME => self.incident_time.as_deref(),
            _ => self.attributes.get(column).map(String::as_str),
        }
    }

    /// Year as an integer, when present and integral.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn year_number(&self) -> Option<i32> {
        self.year
            .filter(|y| y.fract() == 0.0 && y.abs() < f64::from(i32::MAX))
            .map(|y| y as i32)
    }

    /// Month as a number 1-12, when present and valid.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn month_number(&self) -> Option<u32> {
        self.month
            .filter(|m| m.fract() == 0.0 && (1.0..=12.0).contains(m))
            .map(|m| m as u32)
    }

    /// Converts the record back into a raw row. Numeric fields become
    /// [`RawCell::Number`] cells, so normalizing the result reproduces this
    /// record.
    #[must_use]
    pub fn to_raw_row(&self) -> RawRow {
        let mut row: RawRow = self
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), RawCell::Text(v.clone())))
            .collect();

        row.insert(
            columns::PROVINCE.to_string(),
            RawCell::Text(self.province_name.clone()),
        );
        row.insert(columns::LATITUDE.to_string(), self.latitude.into());
        row.insert(columns::LONGITUDE.to_string(), self.longitude.into());
        row.insert(columns::VICTIM_AGE.to_string(), self.victim_age.into());
        row.insert(columns::YEAR.to_string(), self.year.into());
        row.insert(columns::MONTH.to_string(), self.month.into());
        row.insert(columns::PLACE_TYPE.to_string(), self.place_type.clone().into());
        row.insert(columns::STREET.to_string(), self.street_name.clone().into());
        row.insert(
            columns::INCIDENT_DATE.to_string(),
            self.incident_date.clone().into(),
        );
        row.insert(
            columns::INCIDENT_TIME.to_string(),
            self.incident_time.clone().into(),
        );

        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tokens_read_as_missing() {
        assert!(RawCell::from_field("").is_missing());
        assert!(RawCell::from_field("NaN").is_missing());
        assert!(RawCell::from_field("null").is_missing());
        assert_eq!(
            RawCell::from_field("Ruta"),
            RawCell::Text("Ruta".to_string())
        );
    }

    #[test]
    fn integral_numbers_format_without_fraction() {
        assert_eq!(format_number(2019.0), "2019");
        assert_eq!(format_number(-34.6037), "-34.6037");
        assert_eq!(RawCell::Number(3.0).into_text().as_deref(), Some("3"));
    }

    #[test]
    fn text_reads_typed_and_passthrough_columns() {
        let mut attributes = BTreeMap::new();
        attributes.insert(columns::LOCALITY.to_string(), "Rosario".to_string());
        let record = IncidentRecord {
            province_name: "Santa Fe".to_string(),
            latitude: None,
            longitude: None,
            victim_age: None,
            year: Some(2020.0),
            month: Some(13.0),
            place_type: Some("Ruta".to_string()),
            street_name: None,
            incident_date: None,
            incident_time: None,
            attributes,
        };

        assert_eq!(record.text(columns::PROVINCE), Some("Santa Fe"));
        assert_eq!(record.text(columns::PLACE_TYPE), Some("Ruta"));
        assert_eq!(record.text(columns::LOCALITY), Some("Rosario"));
        assert_eq!(record.text(columns::STREET), None);
        assert_eq!(record.year_number(), Some(2020));
        assert_eq!(record.month_number(), None);
    }
}
