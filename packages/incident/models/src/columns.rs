//! Column names of the road-fatality dataset.
//!
//! The dataset is published with Spanish headers; these constants are the
//! single place where the header spelling lives.

/// Incident identifier.
pub const INCIDENT_ID: &str = "id_hecho";
/// Province name.
pub const PROVINCE: &str = "provincia_nombre";
/// Locality (municipality) name.
pub const LOCALITY: &str = "localidad_nombre";
/// Victim age, free text in the published data ("25", "20-24", "menos de 1").
pub const VICTIM_AGE: &str = "victima_tr_edad";
/// Latitude in decimal degrees.
pub const LATITUDE: &str = "latitud";
/// Longitude in decimal degrees.
pub const LONGITUDE: &str = "longitud";
/// Calendar year.
pub const YEAR: &str = "anio";
/// Calendar month (1-12).
pub const MONTH: &str = "mes";
/// Time of day (`HH:MM:SS`).
pub const INCIDENT_TIME: &str = "hora_hecho";
/// Date of the incident.
pub const INCIDENT_DATE: &str = "fecha_hecho";
/// Place type (route, street, highway, ...).
pub const PLACE_TYPE: &str = "tipo_lugar";
/// Street name.
pub const STREET: &str = "calle_nombre";
/// Victim sex.
pub const VICTIM_SEX: &str = "victima_sexo";
/// Vehicle the victim was using.
pub const VICTIM_VEHICLE: &str = "victima_vehiculo";
/// Vehicle of the accused party.
pub const ACCUSED_VEHICLE: &str = "inculpado_vehiculo";
/// How the incident happened (collision type, rollover, ...).
pub const PRODUCTION_MODE: &str = "modo_produccion_hecho";
/// Role of the person in the row.
pub const PERSON_TYPE: &str = "tipo_persona";
/// Whether the victim was an adult (`Sí` / `No`).
pub const VICTIM_IS_ADULT: &str = "victima_18_años_o_mas";

/// Columns without which a file cannot be read as this dataset at all.
pub const REQUIRED: &[&str] = &[PROVINCE, LATITUDE, LONGITUDE];

/// Columns decoded into typed fields of
/// [`IncidentRecord`](crate::IncidentRecord). Every other column is carried
/// through as text.
pub const TYPED: &[&str] = &[
    PROVINCE,
    LATITUDE,
    LONGITUDE,
    VICTIM_AGE,
    YEAR,
    MONTH,
    PLACE_TYPE,
    STREET,
    INCIDENT_DATE,
    INCIDENT_TIME,
];
