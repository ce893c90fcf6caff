//! Temperature Units
//!
//! Conversions between Celsius, Fahrenheit and Kelvin, plus coordinate
//! display.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Offset between Celsius and Kelvin.
const KELVIN_OFFSET: f64 = 273.15;

/// Largest number of decimal places accepted when formatting.
pub const MAX_DECIMALS: usize = 100;

/// Decimal places used for coordinates unless told otherwise.
pub const DEFAULT_COORDINATE_DECIMALS: usize = 6;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UnitError {
    #[error("Unknown temperature unit: {0}")]
    Unknown(String),
}

// == Temperature Unit ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    pub const ALL: [TemperatureUnit; 3] = [
        TemperatureUnit::Celsius,
        TemperatureUnit::Fahrenheit,
        TemperatureUnit::Kelvin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
            TemperatureUnit::Kelvin => "kelvin",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
            TemperatureUnit::Kelvin => "K",
        }
    }

    /// Display label, e.g. `Celsius (°C)`.
    pub fn label(&self) -> String {
        let name = match self {
            TemperatureUnit::Celsius => "Celsius",
            TemperatureUnit::Fahrenheit => "Fahrenheit",
            TemperatureUnit::Kelvin => "Kelvin",
        };
        format!("{} ({})", name, self.symbol())
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "celsius" | "c" => Ok(TemperatureUnit::Celsius),
            "fahrenheit" | "f" => Ok(TemperatureUnit::Fahrenheit),
            "kelvin" | "k" => Ok(TemperatureUnit::Kelvin),
            _ => Err(UnitError::Unknown(s.to_string())),
        }
    }
}

// == Conversions ==
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + KELVIN_OFFSET
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

pub fn fahrenheit_to_kelvin(fahrenheit: f64) -> f64 {
    celsius_to_kelvin(fahrenheit_to_celsius(fahrenheit))
}

pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    celsius_to_fahrenheit(kelvin_to_celsius(kelvin))
}

/// Converts `value` from one unit to another.
pub fn convert(value: f64, from: TemperatureUnit, to: TemperatureUnit) -> f64 {
    use TemperatureUnit::*;

    match (from, to) {
        (Celsius, Fahrenheit) => celsius_to_fahrenheit(value),
        (Celsius, Kelvin) => celsius_to_kelvin(value),
        (Fahrenheit, Celsius) => fahrenheit_to_celsius(value),
        (Fahrenheit, Kelvin) => fahrenheit_to_kelvin(value),
        (Kelvin, Celsius) => kelvin_to_celsius(value),
        (Kelvin, Fahrenheit) => kelvin_to_fahrenheit(value),
        _ => value,
    }
}

/// Formats a temperature with its unit symbol, `--` for non-finite values.
pub fn format_temperature(value: f64, unit: TemperatureUnit, decimals: usize) -> String {
    if !value.is_finite() {
        return "--".to_string();
    }
    format!("{:.*}{}", decimals.min(MAX_DECIMALS), value, unit.symbol())
}

// == Coordinates ==
/// Formats a position as `39.904200°N, 116.407400°E`.
///
/// Zero counts as north and east.
pub fn format_coordinates(lat: f64, lon: f64, decimals: usize) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    let lat_dir = if lat >= 0.0 { 'N' } else { 'S' };
    let lon_dir = if lon >= 0.0 { 'E' } else { 'W' };

    format!(
        "{:.*}°{}, {:.*}°{}",
        decimals,
        lat.abs(),
        lat_dir,
        decimals,
        lon.abs(),
        lon_dir
    )
}
