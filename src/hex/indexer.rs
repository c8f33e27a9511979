//! Maps coordinates onto the hierarchical hexagonal grid and walks cell rings.

use crate::hex::error::HexError;
use crate::types::cell::{CellBoundary, HexCell};
use h3o::{CellIndex, LatLng, Resolution};
use std::str::FromStr;

/// Indexes coordinates into hex cells at a fixed resolution.
///
/// Resolution 0 is the coarsest level (about 1100 km edges) and 15 the finest. The
/// default used by the pipeline is 3, with edges of roughly 60 km.
#[derive(Debug, Clone, Copy)]
pub struct HexIndexer {
    resolution: Resolution,
}

impl HexIndexer {
    /// # Errors
    ///
    /// Returns [`HexError::InvalidResolution`] for resolutions above 15.
    pub fn new(resolution: u8) -> Result<Self, HexError> {
        let resolution = Resolution::try_from(resolution)
            .map_err(|e| HexError::InvalidResolution(resolution, e))?;
        Ok(Self { resolution })
    }

    pub fn resolution(&self) -> u8 {
        u8::from(self.resolution)
    }

    /// The cell containing `(latitude, longitude)` at this indexer's resolution.
    pub fn cell(&self, latitude: f64, longitude: f64) -> Result<HexCell, HexError> {
        cell_of_resolution(latitude, longitude, self.resolution)
    }

    /// The cell itself plus every cell one grid step away.
    ///
    /// The order is implementation-defined: it follows the grid library's disk
    /// traversal (currently the origin first, then the ring counter-clockwise) and
    /// is not guaranteed to be stable across library versions. Callers that need a
    /// stable order should sort the result.
    pub fn ring_of(&self, cell: HexCell) -> Vec<HexCell> {
        cell.index()
            .grid_disk::<Vec<_>>(1)
            .into_iter()
            .map(HexCell::new)
            .collect()
    }

    pub fn boundary_of(&self, cell: HexCell) -> CellBoundary {
        cell.boundary()
    }

    /// Parses a cell identifier as produced by [`HexCell::id`].
    pub fn parse(&self, id: &str) -> Result<HexCell, HexError> {
        parse_cell(id)
    }
}

/// The cell containing `(latitude, longitude)` at `resolution`.
///
/// # Errors
///
/// * [`HexError::InvalidCoordinate`] if the latitude is outside `[-90, 90]`, the
///   longitude outside `[-180, 180]`, or either is not finite.
/// * [`HexError::InvalidResolution`] for resolutions above 15.
pub fn cell_of(latitude: f64, longitude: f64, resolution: u8) -> Result<HexCell, HexError> {
    let resolution = Resolution::try_from(resolution)
        .map_err(|e| HexError::InvalidResolution(resolution, e))?;
    cell_of_resolution(latitude, longitude, resolution)
}

fn cell_of_resolution(
    latitude: f64,
    longitude: f64,
    resolution: Resolution,
) -> Result<HexCell, HexError> {
    let invalid = || HexError::InvalidCoordinate {
        latitude,
        longitude,
    };
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(invalid());
    }
    let lat_lng = LatLng::new(latitude, longitude).map_err(|_| invalid())?;
    Ok(HexCell::new(lat_lng.to_cell(resolution)))
}

pub fn parse_cell(id: &str) -> Result<HexCell, HexError> {
    CellIndex::from_str(id)
        .map(HexCell::new)
        .map_err(|e| HexError::InvalidCellId {
            id: id.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::cell::BOUNDARY_TOLERANCE_DEG;
    use crate::LatLon;

    const POINTS: [(f64, f64); 6] = [
        (43.6045, 1.4440),
        (48.8566, 2.3522),
        (45.7640, 4.8357),
        (-33.8688, 151.2093),
        (64.1466, -21.9426),
        (0.0, 0.0),
    ];

    #[test]
    fn test_cell_of_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
        for (lat, lon) in POINTS {
            for resolution in [0u8, 3, 7, 12] {
                let first = cell_of(lat, lon, resolution)?;
                let second = cell_of(lat, lon, resolution)?;
                assert_eq!(first, second);
                assert_eq!(first.id(), second.id());
                assert_eq!(first.resolution(), resolution);
            }
        }
        Ok(())
    }

    #[test]
    fn test_boundary_contains_indexed_point() -> Result<(), Box<dyn std::error::Error>> {
        for (lat, lon) in POINTS {
            for resolution in [2u8, 3, 5, 8] {
                let indexer = HexIndexer::new(resolution)?;
                let cell = indexer.cell(lat, lon)?;
                let boundary = indexer.boundary_of(cell);
                assert!(
                    boundary.contains(LatLon(lat, lon), BOUNDARY_TOLERANCE_DEG),
                    "boundary of {} does not contain ({}, {})",
                    cell,
                    lat,
                    lon
                );
            }
        }
        Ok(())
    }

    #[test]
    fn test_ring_contains_cell_exactly_once() -> Result<(), Box<dyn std::error::Error>> {
        let indexer = HexIndexer::new(3)?;
        for (lat, lon) in POINTS {
            let cell = indexer.cell(lat, lon)?;
            let ring = indexer.ring_of(cell);
            assert_eq!(ring.iter().filter(|c| **c == cell).count(), 1);
            // Six neighbors for hexagons, five for pentagons.
            assert!(ring.len() == 7 || ring.len() == 6, "ring size {}", ring.len());
        }
        Ok(())
    }

    #[test]
    fn test_ring_of_pentagon() -> Result<(), Box<dyn std::error::Error>> {
        let indexer = HexIndexer::new(0)?;
        let pentagon = CellIndex::base_cells()
            .find(|cell| cell.is_pentagon())
            .map(HexCell::new)
            .ok_or("no pentagon base cell")?;
        let ring = indexer.ring_of(pentagon);
        assert_eq!(ring.len(), 6);
        assert_eq!(ring.iter().filter(|c| **c == pentagon).count(), 1);
        Ok(())
    }

    #[test]
    fn test_invalid_coordinates_fail() {
        for (lat, lon) in [
            (90.5, 0.0),
            (-91.0, 10.0),
            (10.0, 180.1),
            (10.0, -200.0),
            (f64::NAN, 0.0),
        ] {
            assert!(matches!(
                cell_of(lat, lon, 3),
                Err(HexError::InvalidCoordinate { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_resolution_fails() {
        assert!(matches!(
            HexIndexer::new(16),
            Err(HexError::InvalidResolution(16, _))
        ));
    }

    #[test]
    fn test_parse_round_trips_identifier() -> Result<(), Box<dyn std::error::Error>> {
        let indexer = HexIndexer::new(3)?;
        let cell = indexer.cell(43.6045, 1.4440)?;
        assert_eq!(indexer.parse(&cell.id())?, cell);
        assert!(matches!(
            indexer.parse("not-a-cell"),
            Err(HexError::InvalidCellId { .. })
        ));
        Ok(())
    }
}
