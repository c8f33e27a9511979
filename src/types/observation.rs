//! Raw station observations and the weather indicators they carry.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A continuous weather indicator measured at a station.
///
/// Every indicator has a fixed column name in the observation frame (see
/// [`Indicator::column`]). Aggregation stages iterate over [`Indicator::ALL`] to build their
/// default plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    /// Wind direction in degrees.
    WindDirection,
    /// Wind speed in m/s.
    WindSpeed,
    /// Precipitation in mm over the reporting interval.
    Precipitation,
    /// Relative humidity in percent.
    Humidity,
    /// Dew point temperature.
    DewPoint,
    /// Air temperature.
    Temperature,
    /// Sea level pressure.
    Pressure,
}

impl Indicator {
    pub const ALL: [Indicator; 7] = [
        Indicator::WindDirection,
        Indicator::WindSpeed,
        Indicator::Precipitation,
        Indicator::Humidity,
        Indicator::DewPoint,
        Indicator::Temperature,
        Indicator::Pressure,
    ];

    /// The column holding this indicator in observation and cell frames.
    pub fn column(&self) -> &'static str {
        match self {
            Indicator::WindDirection => "wind_direction",
            Indicator::WindSpeed => "wind_speed",
            Indicator::Precipitation => "precipitation",
            Indicator::Humidity => "humidity",
            Indicator::DewPoint => "dew_point",
            Indicator::Temperature => "temperature",
            Indicator::Pressure => "pressure",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// A single raw reading from one station.
///
/// Station metadata (coordinates, elevation) is repeated on every row, as it is in the
/// delimited input files. The [`crate::StationRegistry`] keeps the first-seen triple per
/// station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub station_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub timestamp: NaiveDateTime,
    pub wind_direction: Option<f64>,
    pub wind_speed: Option<f64>,
    pub precipitation: Option<f64>,
    pub humidity: Option<f64>,
    pub dew_point: Option<f64>,
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
}

impl Observation {
    /// An observation with every indicator missing.
    pub fn new(
        station_id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            latitude,
            longitude,
            elevation: None,
            timestamp,
            wind_direction: None,
            wind_speed: None,
            precipitation: None,
            humidity: None,
            dew_point: None,
            temperature: None,
            pressure: None,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    pub fn with_precipitation(mut self, precipitation: f64) -> Self {
        self.precipitation = Some(precipitation);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Reads the value of `indicator`.
    pub fn value(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::WindDirection => self.wind_direction,
            Indicator::WindSpeed => self.wind_speed,
            Indicator::Precipitation => self.precipitation,
            Indicator::Humidity => self.humidity,
            Indicator::DewPoint => self.dew_point,
            Indicator::Temperature => self.temperature,
            Indicator::Pressure => self.pressure,
        }
    }
}
