//! Linear unit conversion
//!
//! Every unit carries a fixed multiplier to meters and a fixed multiplier
//! back from meters. Conversion always goes through meters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported real-world length units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinearUnit {
    #[default]
    Meters,
    Centimeters,
    Feet,
    Inches,
}

impl LinearUnit {
    pub const ALL: [LinearUnit; 4] =
        [LinearUnit::Meters, LinearUnit::Centimeters, LinearUnit::Feet, LinearUnit::Inches];

    /// Multiplier taking a value in this unit to meters
    pub fn to_meters(self) -> f64 {
        match self {
            LinearUnit::Meters => 1.0,
            LinearUnit::Centimeters => 0.01,
            LinearUnit::Feet => 0.3048,
            LinearUnit::Inches => 0.0254,
        }
    }

    /// Multiplier taking a value in meters to this unit
    ///
    /// Always the exact reciprocal of [`LinearUnit::to_meters`], so a
    /// conversion there and back returns the input.
    pub fn from_meters(self) -> f64 {
        1.0 / self.to_meters()
    }

    pub fn name(self) -> &'static str {
        match self {
            LinearUnit::Meters => "meters",
            LinearUnit::Centimeters => "centimeters",
            LinearUnit::Feet => "feet",
            LinearUnit::Inches => "inches",
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            LinearUnit::Meters => "m",
            LinearUnit::Centimeters => "cm",
            LinearUnit::Feet => "ft",
            LinearUnit::Inches => "in",
        }
    }
}

impl fmt::Display for LinearUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown unit: {0}")]
pub struct UnitParseError(pub String);

impl FromStr for LinearUnit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        LinearUnit::ALL
            .into_iter()
            .find(|unit| unit.name() == normalized || unit.abbreviation() == normalized)
            .ok_or_else(|| UnitParseError(s.to_owned()))
    }
}

/// Convert a value between two units
pub fn convert(value: f64, from: LinearUnit, to: LinearUnit) -> f64 {
    value * from.to_meters() * to.from_meters()
}

/// Convert using unit names
///
/// Names that do not parse are treated as meters, so a stray unit string
/// degrades to an identity factor instead of failing.
pub fn convert_by_name(value: f64, from: &str, to: &str) -> f64 {
    let to_meters = lenient_unit(from).map_or(1.0, LinearUnit::to_meters);
    let from_meters = lenient_unit(to).map_or(1.0, LinearUnit::from_meters);
    value * to_meters * from_meters
}

fn lenient_unit(name: &str) -> Option<LinearUnit> {
    match name.parse() {
        Ok(unit) => Some(unit),
        Err(err) => {
            log::debug!("{err}, using identity factor");
            None
        }
    }
}
