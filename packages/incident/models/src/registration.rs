//! The new-incident registration form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Victim sex choices offered on the form.
pub const VICTIM_SEX_OPTIONS: &[&str] = &["Masculino", "Femenino", "Otro", "Sin determinar"];

/// Oldest accepted victim age.
pub const MAX_VICTIM_AGE: u32 = 120;

/// Age from which a victim counts as an adult.
pub const ADULT_AGE: u32 = 18;

/// `tipo_persona` written for every registered incident.
pub const VICTIM_PERSON_TYPE: &str = "Víctima";

/// Place types offered when the dataset has none.
pub const DEFAULT_PLACE_TYPES: &[&str] = &["Ruta", "Calle", "Autopista"];

/// Vehicles offered when the dataset has none.
pub const DEFAULT_VEHICLES: &[&str] = &["Auto", "Moto", "Bicicleta", "Peatón", "Camión"];

/// Production modes offered when the dataset has none.
pub const DEFAULT_PRODUCTION_MODES: &[&str] = &[
    "Colisión vehículo-vehículo",
    "Vuelco",
    "Colisión vehículo-persona",
];

/// A submitted registration form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncident {
    /// Date of the incident.
    pub date: NaiveDate,
    /// Province, one of
    /// [`REGISTRATION_PROVINCES`](crate::province::REGISTRATION_PROVINCES).
    pub province: String,
    /// Locality, free text.
    #[serde(default)]
    pub locality: String,
    /// Latitude; defaults to the province centroid.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude; defaults to the province centroid.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Place type.
    pub place_type: String,
    /// Victim age in years.
    pub victim_age: u32,
    /// Victim sex, one of [`VICTIM_SEX_OPTIONS`].
    pub victim_sex: String,
    /// How the incident happened.
    pub production_mode: String,
    /// Vehicle the victim was using.
    pub victim_vehicle: String,
    /// Vehicle of the accused party.
    pub accused_vehicle: String,
}

/// Choices for the registration form selectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOptions {
    /// Provinces.
    pub provinces: Vec<String>,
    /// Place types.
    pub place_types: Vec<String>,
    /// Vehicles, for both the victim and the accused.
    pub vehicles: Vec<String>,
    /// Production modes.
    pub production_modes: Vec<String>,
    /// Victim sexes.
    pub victim_sexes: Vec<String>,
}
