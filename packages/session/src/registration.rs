//! Validation and row building for newly registered incidents.

use std::collections::{BTreeMap, BTreeSet};

use sasv_dataset::CleanTable;
use sasv_incident_models::registration::{
    ADULT_AGE, DEFAULT_PLACE_TYPES, DEFAULT_PRODUCTION_MODES, DEFAULT_VEHICLES, MAX_VICTIM_AGE,
    VICTIM_PERSON_TYPE, VICTIM_SEX_OPTIONS,
};
use sasv_incident_models::{
    NewIncident, RegistrationOptions, columns, format_number, province,
};
use thiserror::Error;

/// Reasons a registration form is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// The province is not one of the registration provinces.
    #[error("Unknown province '{0}'")]
    UnknownProvince(String),

    /// A required selection is empty.
    #[error("Missing value for {0}")]
    MissingField(&'static str),

    /// The victim sex is not one of the offered choices.
    #[error("Invalid victim sex '{0}'")]
    InvalidSex(String),

    /// The victim age is out of range.
    #[error("Invalid victim age {0}: expected at most {MAX_VICTIM_AGE}")]
    InvalidAge(u32),

    /// A coordinate is not a valid latitude/longitude.
    #[error("Invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        /// Latitude given.
        latitude: f64,
        /// Longitude given.
        longitude: f64,
    },
}

/// Checks a submitted form.
///
/// # Errors
///
/// Returns the first [`RegistrationError`] found.
pub fn validate(incident: &NewIncident) -> Result<(), RegistrationError> {
    if !province::REGISTRATION_PROVINCES.contains(&incident.province.as_str()) {
        return Err(RegistrationError::UnknownProvince(incident.province.clone()));
    }

    let selections = [
        ("place type", &incident.place_type),
        ("production mode", &incident.production_mode),
        ("victim vehicle", &incident.victim_vehicle),
        ("accused vehicle", &incident.accused_vehicle),
    ];
    for (name, value) in selections {
        if value.trim().is_empty() {
            return Err(RegistrationError::MissingField(name));
        }
    }

    if !VICTIM_SEX_OPTIONS.contains(&incident.victim_sex.as_str()) {
        return Err(RegistrationError::InvalidSex(incident.victim_sex.clone()));
    }

    if incident.victim_age > MAX_VICTIM_AGE {
        return Err(RegistrationError::InvalidAge(incident.victim_age));
    }

    let (latitude, longitude) = coordinates(incident);
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(RegistrationError::InvalidCoordinates {
            latitude,
            longitude,
        });
    }

    Ok(())
}

/// Coordinates to record: the submitted ones, or the province centroid.
#[must_use]
pub fn coordinates(incident: &NewIncident) -> (f64, f64) {
    let (lat, lon) = province::centroid(&incident.province).unwrap_or_else(province::fallback_centroid);
    (
        incident.latitude.unwrap_or(lat),
        incident.longitude.unwrap_or(lon),
    )
}

/// Builds the dataset row for a validated form.
#[must_use]
pub fn build_row(incident: &NewIncident, id: &str) -> BTreeMap<String, String> {
    use chrono::Datelike as _;

    let (latitude, longitude) = coordinates(incident);
    let adult = if incident.victim_age >= ADULT_AGE {
        "Sí"
    } else {
        "No"
    };

    [
        (columns::INCIDENT_ID, id.to_string()),
        (columns::PROVINCE, incident.province.clone()),
        (columns::LOCALITY, incident.locality.trim().to_string()),
        (columns::YEAR, incident.date.year().to_string()),
        (columns::MONTH, incident.date.month().to_string()),
        (
            columns::INCIDENT_DATE,
            incident.date.format("%d/%m/%Y").to_string(),
        ),
        (columns::LATITUDE, format_number(latitude)),
        (columns::LONGITUDE, format_number(longitude)),
        (columns::VICTIM_AGE, incident.victim_age.to_string()),
        (columns::VICTIM_SEX, incident.victim_sex.clone()),
        (columns::PLACE_TYPE, incident.place_type.clone()),
        (columns::PRODUCTION_MODE, incident.production_mode.clone()),
        (columns::VICTIM_VEHICLE, incident.victim_vehicle.clone()),
        (columns::ACCUSED_VEHICLE, incident.accused_vehicle.clone()),
        (columns::PERSON_TYPE, VICTIM_PERSON_TYPE.to_string()),
        (columns::VICTIM_IS_ADULT, adult.to_string()),
    ]
    .into_iter()
    .map(|(column, value)| (column.to_string(), value))
    .collect()
}

/// Capitalizes the first letter of every word and lowercases the rest.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for c in text.chars() {
        if previous_is_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        previous_is_letter = c.is_alphabetic();
    }
    out
}

fn column_options(table: Option<&CleanTable>, column: &str, defaults: &[&str]) -> Vec<String> {
    let values: BTreeSet<String> = table
        .filter(|t| t.has_column(column))
        .map(|t| {
            t.records
                .iter()
                .filter_map(|r| r.text(column))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(title_case)
                .collect()
        })
        .unwrap_or_default();

    if values.is_empty() {
        defaults.iter().map(ToString::to_string).collect()
    } else {
        values.into_iter().collect()
    }
}

/// Selector choices for the form, taken from the data when available.
#[must_use]
pub fn registration_options(table: Option<&CleanTable>) -> RegistrationOptions {
    let owned = |values: &[&str]| values.iter().map(ToString::to_string).collect();

    RegistrationOptions {
        provinces: owned(province::REGISTRATION_PROVINCES),
        place_types: column_options(table, columns::PLACE_TYPE, DEFAULT_PLACE_TYPES),
        vehicles: column_options(table, columns::VICTIM_VEHICLE, DEFAULT_VEHICLES),
        production_modes: column_options(table, columns::PRODUCTION_MODE, DEFAULT_PRODUCTION_MODES),
        victim_sexes: owned(VICTIM_SEX_OPTIONS),
    }
}
