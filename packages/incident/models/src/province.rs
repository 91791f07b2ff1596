//! Argentine province names and centroid coordinates.
//!
//! Centroids place the per-province map markers and pre-fill the
//! coordinates of newly registered incidents.

/// Centroid (latitude, longitude) of each province as it is spelled in the
/// dataset. Buenos Aires city is listed under its short name `CABA`.
pub const PROVINCE_CENTROIDS: &[(&str, f64, f64)] = &[
    ("Buenos Aires", -36.6769, -60.5598),
    ("CABA", -34.6037, -58.3816),
    ("Catamarca", -27.4578, -66.9084),
    ("Chaco", -27.0854, -60.8447),
    ("Chubut", -43.7925, -68.7495),
    ("Córdoba", -31.3995, -64.2127),
    ("Corrientes", -29.1723, -57.8540),
    ("Entre Ríos", -32.0520, -59.2016),
    ("Formosa", -24.9658, -59.5447),
    ("Jujuy", -23.3175, -65.7331),
    ("La Pampa", -37.1610, -65.4190),
    ("La Rioja", -29.8340, -67.1627),
    ("Mendoza", -34.6542, -68.5866),
    ("Misiones", -26.8687, -54.6534),
    ("Neuquén", -38.7454, -70.1172),
    ("Río Negro", -40.4026, -67.2014),
    ("Salta", -24.7821, -65.4239),
    ("San Juan", -30.8654, -68.8878),
    ("San Luis", -33.7431, -66.1960),
    ("Santa Cruz", -48.8156, -70.0152),
    ("Santa Fe", -31.6496, -60.7001),
    ("Santiago del Estero", -27.7801, -63.3644),
    ("Tierra del Fuego", -54.8019, -68.3030),
    ("Tucumán", -26.8083, -65.2282),
];

/// Full name used for Buenos Aires city on the registration form.
pub const AUTONOMOUS_CITY: &str = "Ciudad Autónoma de Buenos Aires";

/// Province names offered on the registration form, sorted.
pub const REGISTRATION_PROVINCES: &[&str] = &[
    "Buenos Aires",
    "Catamarca",
    "Chaco",
    "Chubut",
    "Ciudad Autónoma de Buenos Aires",
    "Corrientes",
    "Córdoba",
    "Entre Ríos",
    "Formosa",
    "Jujuy",
    "La Pampa",
    "La Rioja",
    "Mendoza",
    "Misiones",
    "Neuquén",
    "Río Negro",
    "Salta",
    "San Juan",
    "San Luis",
    "Santa Cruz",
    "Santa Fe",
    "Santiago del Estero",
    "Tierra del Fuego",
    "Tucumán",
];

/// Returns the centroid of a province, accepting the long name of Buenos
/// Aires city as an alias for `CABA`.
#[must_use]
pub fn centroid(province: &str) -> Option<(f64, f64)> {
    let key = if province == AUTONOMOUS_CITY {
        "CABA"
    } else {
        province
    };
    PROVINCE_CENTROIDS
        .iter()
        .find(|(name, _, _)| *name == key)
        .map(|&(_, lat, lon)| (lat, lon))
}

/// Centroid used when a province has no known coordinates.
#[must_use]
pub fn fallback_centroid() -> (f64, f64) {
    (-34.6037, -58.3816)
}
