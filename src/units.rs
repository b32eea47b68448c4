//! Display unit conversion.
//!
//! All accumulation in the crate happens in raw SI units (meters, meters per
//! second). Conversion to the display unit system is applied once, when a
//! summary is formatted.

use serde::{Deserialize, Serialize};

/// Meters in one statute mile.
pub const METERS_PER_MILE: f64 = 1609.344;

/// Feet in one meter.
pub const FEET_PER_METER: f64 = 3.28084;

/// Unit system used for displayed distances, elevation and pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Kilometers and meters
    #[default]
    Metric,
    /// Miles and feet
    Imperial,
}

impl UnitSystem {
    /// Conversion factors and labels for this system.
    pub fn display_units(self) -> DisplayUnits {
        match self {
            UnitSystem::Metric => DisplayUnits {
                meters_per_distance_unit: 1000.0,
                distance_unit: "km",
                elevation_per_meter: 1.0,
                elevation_unit: "m",
            },
            UnitSystem::Imperial => DisplayUnits {
                meters_per_distance_unit: METERS_PER_MILE,
                distance_unit: "mi",
                elevation_per_meter: FEET_PER_METER,
                elevation_unit: "ft",
            },
        }
    }
}

/// Conversion factors from raw meters to display values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayUnits {
    /// Meters in one display distance unit
    pub meters_per_distance_unit: f64,
    /// Label for the distance unit ("km" / "mi")
    pub distance_unit: &'static str,
    /// Display elevation units per meter
    pub elevation_per_meter: f64,
    /// Label for the elevation unit ("m" / "ft")
    pub elevation_unit: &'static str,
}

impl DisplayUnits {
    /// Meters to display distance, rounded to one decimal place.
    pub fn distance(&self, meters: f64) -> f64 {
        round_to(meters / self.meters_per_distance_unit, 1)
    }

    /// Meters to display elevation, rounded to a whole number.
    pub fn elevation(&self, meters: f64) -> i64 {
        (meters * self.elevation_per_meter).round() as i64
    }

    /// Format a speed as pace per display distance unit, e.g. `5'30"`.
    ///
    /// The pace is rounded to the nearest second, so 4 m/s gives `4'10"`
    /// where a truncating formatter would print `4'09"`.
    ///
    /// Returns `None` for zero, negative or non-finite speeds so that callers
    /// never render `NaN` or an infinite pace.
    pub fn pace(&self, meters_per_second: f64) -> Option<String> {
        if !meters_per_second.is_finite() || meters_per_second <= 0.0 {
            return None;
        }
        let total_seconds = (self.meters_per_distance_unit / meters_per_second).round() as u64;
        Some(format!("{}'{:02}\"", total_seconds / 60, total_seconds % 60))
    }
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
