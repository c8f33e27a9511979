//! Shared fixtures for unit tests.

use crate::hex::indexer::HexIndexer;
use crate::stations::registry::{NeighborSelection, StationRegistry};
use crate::types::cell::HexCell;
use crate::types::observation::Observation;
use chrono::{Duration, NaiveDate, NaiveDateTime};

pub const LAT: f64 = 43.60;
pub const LON: f64 = 1.44;

/// 2016-01-01 00:00 plus `h` hours.
pub fn hour(h: i64) -> NaiveDateTime {
    base() + Duration::hours(h)
}

/// 2016-01-01 00:00 plus `d` days and `m` minutes.
pub fn at(d: i64, m: i64) -> NaiveDateTime {
    base() + Duration::days(d) + Duration::minutes(m)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn obs(id: &str, latitude: f64, longitude: f64, timestamp: NaiveDateTime) -> Observation {
    Observation::new(id, latitude, longitude, timestamp)
}

/// An observation with every indicator set; precipitation is `precipitation`.
pub fn full(
    id: &str,
    latitude: f64,
    longitude: f64,
    timestamp: NaiveDateTime,
    precipitation: f64,
) -> Observation {
    let mut o = Observation::new(id, latitude, longitude, timestamp);
    o.wind_direction = Some(180.0);
    o.wind_speed = Some(3.0);
    o.precipitation = Some(precipitation);
    o.humidity = Some(80.0);
    o.dew_point = Some(2.0);
    o.temperature = Some(6.0);
    o.pressure = Some(1015.0);
    o
}

/// The cell holding (`LAT`, `LON`) at resolution 3 and the first slot that holds another cell.
pub fn home_and_neighbor() -> (HexIndexer, HexCell, HexCell) {
    let indexer = HexIndexer::new(3).expect("valid resolution");
    let home = indexer.cell(LAT, LON).expect("valid coordinate");
    let neighbor = NeighborSelection::default()
        .select(&indexer, home)
        .into_iter()
        .flatten()
        .find(|cell| *cell != home)
        .expect("hexagon has neighbors");
    (indexer, home, neighbor)
}

/// Slot index of `cell` among the default neighbor slots of `home`.
pub fn slot_of(indexer: &HexIndexer, home: HexCell, cell: HexCell) -> usize {
    NeighborSelection::default()
        .select(indexer, home)
        .iter()
        .position(|slot| *slot == Some(cell))
        .expect("cell is a neighbor slot")
}

pub fn registry_for(observations: &[Observation], indexer: &HexIndexer) -> StationRegistry {
    let frame = crate::frames::observation_frame::ObservationFrame::from_observations(observations)
        .expect("valid observations");
    StationRegistry::build(&frame, indexer, &NeighborSelection::default())
        .expect("valid registry")
}

fn base() -> NaiveDateTime {
    date(2016, 1, 1).and_hms_opt(0, 0, 0).expect("valid test time")
}
