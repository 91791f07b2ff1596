#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result and filter types for the statistics views.
//!
//! Every type here is plain data: the analytics crate fills them from a
//! cleaned table, and the server and CLI render them.

use sasv_incident_models::{IncidentRecord, columns};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Deaths recorded in one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearCount {
    /// Calendar year.
    pub year: i32,
    /// Number of deaths.
    pub deaths: usize,
}

/// Deaths recorded in one calendar month, across years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCount {
    /// Month number (1-12).
    pub month: u32,
    /// Short Spanish label (`Ene`, `Feb`, ...).
    pub label: String,
    /// Number of deaths.
    pub deaths: usize,
}

/// Deaths recorded in one locality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalityCount {
    /// Locality name.
    pub locality: String,
    /// Number of deaths.
    pub deaths: usize,
}

/// Detailed statistics for a single province.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceSummary {
    /// Province name.
    pub province: String,
    /// Number of records.
    pub total_deaths: usize,
    /// Mean victim age, or 0 when no record has an age.
    pub mean_age: f64,
    /// Earliest year, or 0 when no record has a year.
    pub first_year: i32,
    /// Latest year, or 0 when no record has a year.
    pub last_year: i32,
    /// Average deaths per year over the covered period.
    pub deaths_per_year: f64,
    /// Deaths per year, ascending by year.
    pub yearly: Vec<YearCount>,
    /// Deaths per month, January first, months without deaths omitted.
    pub monthly: Vec<MonthCount>,
    /// The ten localities with the most deaths.
    pub top_localities: Vec<LocalityCount>,
}

/// One row of the province comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceComparison {
    /// Province name.
    pub province: String,
    /// Number of records.
    pub total_deaths: usize,
    /// Mean victim age rounded to 2 decimals, or 0.
    pub mean_age: f64,
    /// Number of distinct years with data.
    pub years_with_data: usize,
}

/// Severity tier of a province marker.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MarkerTier {
    /// More than 5000 deaths.
    Critical,
    /// More than 2000 deaths.
    High,
    /// More than 500 deaths.
    Moderate,
    /// 500 deaths or fewer.
    Low,
}

impl MarkerTier {
    /// Tier for a province total.
    #[must_use]
    pub const fn from_total(total: usize) -> Self {
        if total > 5000 {
            Self::Critical
        } else if total > 2000 {
            Self::High
        } else if total > 500 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Marker color as a hex string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Critical => "#D9534F",
            Self::High => "#FF8C00",
            Self::Moderate => "#FFD700",
            Self::Low => "#24F81D",
        }
    }

    /// Marker radius in pixels.
    #[must_use]
    pub const fn radius(self) -> u32 {
        match self {
            Self::Critical => 15,
            Self::High => 12,
            Self::Moderate => 10,
            Self::Low => 8,
        }
    }
}

/// A province drawn on the national map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceMarker {
    /// Province name.
    pub province: String,
    /// Centroid latitude.
    pub latitude: f64,
    /// Centroid longitude.
    pub longitude: f64,
    /// Number of records.
    pub total_deaths: usize,
    /// Mean victim age rounded to 2 decimals, or 0.
    pub mean_age: f64,
    /// Earliest year, or 0.
    pub first_year: i32,
    /// Latest year, or 0.
    pub last_year: i32,
    /// Deaths divided by the number of years in the period.
    pub average_per_year: f64,
    /// Severity tier.
    pub tier: MarkerTier,
    /// Marker color.
    pub color: String,
    /// Marker radius.
    pub radius: u32,
}

/// Filter for the heatmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapFilter {
    /// First year, inclusive.
    pub year_from: i32,
    /// Last year, inclusive.
    pub year_to: i32,
    /// Selected month numbers (1-12). Must not be empty.
    pub months: Vec<u32>,
}

/// A `[latitude, longitude]` pair.
pub type HeatmapPoint = [f64; 2];

/// Categorical columns with a distribution view.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum DistributionColumn {
    /// `tipo_lugar`.
    #[serde(rename = "tipo_lugar")]
    #[strum(serialize = "tipo_lugar")]
    PlaceType,
    /// `victima_vehiculo`.
    #[serde(rename = "victima_vehiculo")]
    #[strum(serialize = "victima_vehiculo")]
    VictimVehicle,
    /// `inculpado_vehiculo`.
    #[serde(rename = "inculpado_vehiculo")]
    #[strum(serialize = "inculpado_vehiculo")]
    AccusedVehicle,
    /// `modo_produccion_hecho`.
    #[serde(rename = "modo_produccion_hecho")]
    #[strum(serialize = "modo_produccion_hecho")]
    ProductionMode,
}

impl DistributionColumn {
    /// Dataset column the view reads.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::PlaceType => columns::PLACE_TYPE,
            Self::VictimVehicle => columns::VICTIM_VEHICLE,
            Self::AccusedVehicle => columns::ACCUSED_VEHICLE,
            Self::ProductionMode => columns::PRODUCTION_MODE,
        }
    }

    /// Returns all variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::PlaceType,
            Self::VictimVehicle,
            Self::AccusedVehicle,
            Self::ProductionMode,
        ]
    }
}

/// One value of a categorical distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Column value.
    pub value: String,
    /// Number of records with this value.
    pub count: usize,
    /// Share of the distribution total, in percent, rounded to 2 decimals.
    pub percentage: f64,
}

/// Counts of the values of one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    /// Column the counts are for.
    pub column: DistributionColumn,
    /// Province the records were restricted to, if any.
    pub province: Option<String>,
    /// Number of records with a non-empty value.
    pub total: usize,
    /// Values by descending count, ties by value.
    pub entries: Vec<CategoryCount>,
}

impl Distribution {
    /// Keeps only the `n` most frequent values.
    #[must_use]
    pub fn top(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }
}

/// Filter for the data explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreFilter {
    /// First year, inclusive.
    pub year_from: i32,
    /// Last year, inclusive.
    pub year_to: i32,
    /// Selected provinces.
    pub provinces: Vec<String>,
}

/// Records matched by an [`ExploreFilter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreResult {
    /// Number of matching records.
    pub total: usize,
    /// The first matching records, in file order.
    pub preview: Vec<IncidentRecord>,
}

/// Smallest and largest year present in the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearBounds {
    /// Earliest year.
    pub min: i32,
    /// Latest year.
    pub max: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_tiers_follow_thresholds() {
        assert_eq!(MarkerTier::from_total(5001), MarkerTier::Critical);
        assert_eq!(MarkerTier::from_total(5000), MarkerTier::High);
        assert_eq!(MarkerTier::from_total(2001), MarkerTier::High);
        assert_eq!(MarkerTier::from_total(2000), MarkerTier::Moderate);
        assert_eq!(MarkerTier::from_total(501), MarkerTier::Moderate);
        assert_eq!(MarkerTier::from_total(500), MarkerTier::Low);
        assert_eq!(MarkerTier::from_total(0), MarkerTier::Low);
    }

    #[test]
    fn tier_styles() {
        assert_eq!(MarkerTier::Critical.color(), "#D9534F");
        assert_eq!(MarkerTier::Critical.radius(), 15);
        assert_eq!(MarkerTier::Low.color(), "#24F81D");
        assert_eq!(MarkerTier::Low.radius(), 8);
    }

    #[test]
    fn distribution_columns_parse_from_column_names() {
        for column in DistributionColumn::all() {
            let parsed: DistributionColumn = column.column().parse().unwrap();
            assert_eq!(parsed, *column);
        }
        assert!("calle_nombre".parse::<DistributionColumn>().is_err());
    }
}
