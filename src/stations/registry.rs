use crate::frames::observation_frame::ObservationFrame;
use crate::hex::indexer::HexIndexer;
use crate::stations::error::StationError;
use crate::types::cell::HexCell;
use crate::types::columns::{neighbor_column, CELL_ID, ELEVATION, LATITUDE, LONGITUDE, STATION_ID};
use crate::types::station::{AssignedStation, Location, Station};
use log::{debug, info, warn};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// How ring cells are ordered before they are assigned to neighbor slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingOrder {
    /// Sorted by cell index value. Stable across grid library versions.
    #[default]
    Canonical,
    /// The grid library's own traversal order. Implementation-defined; slot contents may
    /// change when the library is upgraded.
    Traversal,
}

/// Which ring cells end up in the `neighbor_i` slots of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborSelection {
    /// Number of neighbor slots. Stations whose ring has fewer candidates get empty slots.
    pub slots: usize,
    pub order: RingOrder,
    /// Whether the station's own cell is a candidate. The ring always contains it, so by
    /// default one of the slots may hold the station's own cell. Set to `false` to keep
    /// only true neighbors.
    pub include_origin: bool,
}

impl Default for NeighborSelection {
    fn default() -> Self {
        Self {
            slots: 3,
            order: RingOrder::Canonical,
            include_origin: true,
        }
    }
}

impl NeighborSelection {
    /// Picks the slot contents for `cell`.
    pub fn select(&self, indexer: &HexIndexer, cell: HexCell) -> Vec<Option<HexCell>> {
        let mut candidates: Vec<HexCell> = indexer
            .ring_of(cell)
            .into_iter()
            .filter(|candidate| self.include_origin || *candidate != cell)
            .collect();
        if self.order == RingOrder::Canonical {
            candidates.sort();
        }

        let mut slots: Vec<Option<HexCell>> =
            candidates.into_iter().take(self.slots).map(Some).collect();
        if slots.len() < self.slots {
            debug!(
                "Cell {} has only {} ring candidates for {} neighbor slots",
                cell,
                slots.len(),
                self.slots
            );
            slots.resize(self.slots, None);
        }
        slots
    }
}

/// Deduplicated stations with their hex cell and neighbor slots.
#[derive(Debug, Clone)]
pub struct StationRegistry {
    stations: Vec<AssignedStation>,
    index: HashMap<String, usize>,
    neighbor_slots: usize,
}

impl StationRegistry {
    /// Deduplicates the stations found in `observations` and assigns them to cells.
    ///
    /// The first row seen for a station id provides its location; later rows are
    /// ignored. Rows without a station id are skipped with a warning.
    ///
    /// # Errors
    ///
    /// * [`StationError::MissingCoordinate`] if the first row of a station lacks a
    ///   latitude or longitude.
    /// * [`StationError::Hex`] if a station's coordinates are out of range. No partial
    ///   registry is returned.
    pub fn build(
        observations: &ObservationFrame,
        indexer: &HexIndexer,
        selection: &NeighborSelection,
    ) -> Result<Self, StationError> {
        let df = observations
            .frame
            .clone()
            .select([
                col(STATION_ID).cast(DataType::String),
                col(LATITUDE).cast(DataType::Float64),
                col(LONGITUDE).cast(DataType::Float64),
                col(ELEVATION).cast(DataType::Float64),
            ])
            .collect()?;
        let stations = unique_stations(&df)?;
        Self::from_stations(stations, indexer, selection)
    }

    /// Assigns already-deduplicated stations to cells.
    pub fn from_stations(
        stations: Vec<Station>,
        indexer: &HexIndexer,
        selection: &NeighborSelection,
    ) -> Result<Self, StationError> {
        let mut assigned = Vec::with_capacity(stations.len());
        let mut index = HashMap::with_capacity(stations.len());

        for station in stations {
            if index.contains_key(&station.id) {
                continue;
            }
            let cell = indexer
                .cell(station.location.latitude, station.location.longitude)
                .map_err(|source| StationError::Hex {
                    station: station.id.clone(),
                    source,
                })?;
            let neighbors = selection.select(indexer, cell);
            index.insert(station.id.clone(), assigned.len());
            assigned.push(AssignedStation {
                station,
                cell,
                neighbors,
            });
        }

        info!(
            "Assigned {} stations to {} cells at resolution {}",
            assigned.len(),
            assigned.iter().map(|s| s.cell).collect::<HashSet<_>>().len(),
            indexer.resolution()
        );

        Ok(Self {
            stations: assigned,
            index,
            neighbor_slots: selection.slots,
        })
    }

    pub fn stations(&self) -> &[AssignedStation] {
        &self.stations
    }

    pub fn get(&self, station_id: &str) -> Option<&AssignedStation> {
        self.index.get(station_id).map(|&i| &self.stations[i])
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn neighbor_slots(&self) -> usize {
        self.neighbor_slots
    }

    /// Distinct cells holding at least one station, in canonical order.
    pub fn cells(&self) -> Vec<HexCell> {
        self.stations
            .iter()
            .map(|s| s.cell)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// The station → cell assignment table: `station_id`, `cell_id`, `neighbor_i`.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let mut columns = vec![
            Column::new(
                STATION_ID.into(),
                self.stations
                    .iter()
                    .map(|s| s.station.id.as_str())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                CELL_ID.into(),
                self.stations
                    .iter()
                    .map(|s| s.cell.id())
                    .collect::<Vec<_>>(),
            ),
        ];
        for slot in 0..self.neighbor_slots {
            let ids: Vec<Option<String>> = self
                .stations
                .iter()
                .map(|s| s.neighbors.get(slot).copied().flatten().map(|c| c.id()))
                .collect();
            columns.push(Column::new(neighbor_column(slot).as_str().into(), ids));
        }
        DataFrame::new(columns)
    }
}

fn unique_stations(df: &DataFrame) -> Result<Vec<Station>, StationError> {
    let column = |name: &str| {
        df.column(name)
            .map_err(|e| StationError::MissingColumn(name.to_string(), e))
    };
    let ids = column(STATION_ID)?.str()?;
    let latitudes = column(LATITUDE)?.f64()?;
    let longitudes = column(LONGITUDE)?.f64()?;
    let elevations = column(ELEVATION)?.f64()?;

    let mut seen = HashSet::new();
    let mut stations = Vec::new();
    let mut missing_ids = 0usize;

    for idx in 0..df.height() {
        let Some(id) = ids.get(idx) else {
            missing_ids += 1;
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        let (Some(latitude), Some(longitude)) = (latitudes.get(idx), longitudes.get(idx)) else {
            return Err(StationError::MissingCoordinate {
                station: id.to_string(),
            });
        };
        stations.push(Station {
            id: id.to_string(),
            location: Location {
                latitude,
                longitude,
                elevation: elevations.get(idx),
            },
        });
    }

    if missing_ids > 0 {
        warn!("Skipped {} observation rows without a station id", missing_ids);
    }
    Ok(stations)
}
