//! Calendar buckets used to describe when an incident happened.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Segment of the day an incident falls into.
///
/// Boundaries are half-open: `[0, 6)`, `[6, 12)`, `[12, 19)`, `[19, 24)`.
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
pub enum TimeBucket {
    /// Early morning, 00:00 to 05:59.
    Madrugada,
    /// Morning, 06:00 to 11:59.
    #[serde(rename = "Mañana")]
    #[strum(serialize = "Mañana")]
    Manana,
    /// Afternoon, 12:00 to 18:59.
    Tarde,
    /// Night, 19:00 to 23:59.
    Noche,
}

impl TimeBucket {
    /// Buckets an hour of the day. Hours outside `0..24` have no bucket.
    #[must_use]
    pub const fn from_hour(hour: u32) -> Option<Self> {
        match hour {
            0..6 => Some(Self::Madrugada),
            6..12 => Some(Self::Manana),
            12..19 => Some(Self::Tarde),
            19..24 => Some(Self::Noche),
            _ => None,
        }
    }

    /// Returns all variants in the order they appear in a day.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Madrugada, Self::Manana, Self::Tarde, Self::Noche]
    }
}

/// Day of the week, named in English regardless of locale.
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
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Spanish display label, for user-facing selectors.
    #[must_use]
    pub const fn spanish_label(self) -> &'static str {
        match self {
            Self::Monday => "Lunes",
            Self::Tuesday => "Martes",
            Self::Wednesday => "Miércoles",
            Self::Thursday => "Jueves",
            Self::Friday => "Viernes",
            Self::Saturday => "Sábado",
            Self::Sunday => "Domingo",
        }
    }

    /// Returns all variants, Monday first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Monday,
            Self::Tuesday,
            Self::Wednesday,
            Self::Thursday,
            Self::Friday,
            Self::Saturday,
            Self::Sunday,
        ]
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

/// Calendar month with Spanish names, numbered 1-12.
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
pub enum Month {
    Enero = 1,
    Febrero = 2,
    Marzo = 3,
    Abril = 4,
    Mayo = 5,
    Junio = 6,
    Julio = 7,
    Agosto = 8,
    Septiembre = 9,
    Octubre = 10,
    Noviembre = 11,
    Diciembre = 12,
}

impl Month {
    /// Returns the month number (1-12).
    #[must_use]
    pub const fn number(self) -> u32 {
        self as u32
    }

    /// Creates a month from its number.
    #[must_use]
    pub const fn from_number(number: u32) -> Option<Self> {
        match number {
            1 => Some(Self::Enero),
            2 => Some(Self::Febrero),
            3 => Some(Self::Marzo),
            4 => Some(Self::Abril),
            5 => Some(Self::Mayo),
            6 => Some(Self::Junio),
            7 => Some(Self::Julio),
            8 => Some(Self::Agosto),
            9 => Some(Self::Septiembre),
            10 => Some(Self::Octubre),
            11 => Some(Self::Noviembre),
            12 => Some(Self::Diciembre),
            _ => None,
        }
    }

    /// Three-letter label used on chart axes.
    #[must_use]
    pub const fn short_label(self) -> &'static str {
        match self {
            Self::Enero => "Ene",
            Self::Febrero => "Feb",
            Self::Marzo => "Mar",
            Self::Abril => "Abr",
            Self::Mayo => "May",
            Self::Junio => "Jun",
            Self::Julio => "Jul",
            Self::Agosto => "Ago",
            Self::Septiembre => "Sep",
            Self::Octubre => "Oct",
            Self::Noviembre => "Nov",
            Self::Diciembre => "Dic",
        }
    }

    /// Returns all months, January first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Enero,
            Self::Febrero,
            Self::Marzo,
            Self::Abril,
            Self::Mayo,
            Self::Junio,
            Self::Julio,
            Self::Agosto,
            Self::Septiembre,
            Self::Octubre,
            Self::Noviembre,
            Self::Diciembre,
        ]
    }
}
