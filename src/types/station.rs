//! Defines the data structures representing weather stations, their location, and the
//! hex-cell assignment the pipeline attaches to them.

use crate::types::cell::HexCell;
use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are decimal degrees.
///
/// # Examples
///
/// ```
/// use meteohex::LatLon;
///
/// let toulouse = LatLon(43.6045, 1.4440);
/// assert_eq!(toulouse.0, 43.6045); // Latitude
/// assert_eq!(toulouse.1, 1.4440); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn latitude(&self) -> f64 {
        self.0
    }

    pub fn longitude(&self) -> f64 {
        self.1
    }
}

/// Represents the geographical location of a weather station.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
    /// Elevation above sea level in meters, if available.
    pub elevation: Option<f64>,
}

impl Location {
    pub fn lat_lon(&self) -> LatLon {
        LatLon(self.latitude, self.longitude)
    }
}

/// A weather station, deduplicated from raw observations.
///
/// Stations are assumed static: the registry keeps the first location seen for an id and
/// ignores later rows that disagree.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Station {
    /// The unique station identifier as it appears in the input files.
    pub id: String,
    /// Geographical location details (latitude, longitude, elevation).
    pub location: Location,
}

/// A station together with its hex cell and its positional neighbor slots.
///
/// `neighbors` always has one entry per configured slot. A slot is `None` when the ring
/// around the cell had fewer candidates than slots.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedStation {
    pub station: Station,
    pub cell: HexCell,
    pub neighbors: Vec<Option<HexCell>>,
}

impl AssignedStation {
    /// Neighbor identifiers in slot order, `None` for empty slots.
    pub fn neighbor_ids(&self) -> Vec<Option<String>> {
        self.neighbors
            .iter()
            .map(|slot| slot.map(|cell| cell.id()))
            .collect()
    }
}
