//! Contains the `ObservationFrame` structure wrapping raw per-station observations.

use crate::types::columns::{ELEVATION, LATITUDE, LONGITUDE, STATION_ID, TIMESTAMP};
use crate::types::observation::{Indicator, Observation};
use polars::prelude::*;

/// A wrapper around a Polars `LazyFrame` holding raw station observations.
///
/// The frame carries one row per reading with the columns `station_id` (string),
/// `latitude`, `longitude`, `elevation` (float), `timestamp` (timezone-naive datetime,
/// millisecond precision) and one float column per [`Indicator`].
///
/// Instances are obtained from typed rows with [`ObservationFrame::from_observations`] or
/// from delimited files with [`crate::data::load_csv`].
#[derive(Clone)]
pub struct ObservationFrame {
    /// The underlying Polars LazyFrame containing the observations.
    pub frame: LazyFrame,
}

impl ObservationFrame {
    /// Wraps a `LazyFrame` that already follows the observation schema.
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    /// Builds the observation frame from typed rows.
    ///
    /// # Errors
    ///
    /// Returns a [`PolarsError`] if the columns cannot be assembled into a frame.
    pub fn from_observations(observations: &[Observation]) -> PolarsResult<Self> {
        let timestamps: Vec<i64> = observations
            .iter()
            .map(|o| o.timestamp.and_utc().timestamp_millis())
            .collect();

        let mut columns = vec![
            Column::new(
                STATION_ID.into(),
                observations
                    .iter()
                    .map(|o| o.station_id.as_str())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                LATITUDE.into(),
                observations.iter().map(|o| o.latitude).collect::<Vec<_>>(),
            ),
            Column::new(
                LONGITUDE.into(),
                observations.iter().map(|o| o.longitude).collect::<Vec<_>>(),
            ),
            Column::new(
                ELEVATION.into(),
                observations.iter().map(|o| o.elevation).collect::<Vec<_>>(),
            ),
            Column::new(TIMESTAMP.into(), timestamps)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
        ];
        for indicator in Indicator::ALL {
            columns.push(Column::new(
                indicator.column().into(),
                observations
                    .iter()
                    .map(|o| o.value(indicator))
                    .collect::<Vec<_>>(),
            ));
        }

        Ok(Self::new(DataFrame::new(columns)?.lazy()))
    }

    /// Filters the observations with an arbitrary predicate, returning a new frame.
    pub fn filter(&self, predicate: Expr) -> ObservationFrame {
        ObservationFrame::new(self.frame.clone().filter(predicate))
    }

    /// Concatenates several observation frames vertically. Rows are stacked as they come;
    /// nothing is merged by key.
    pub fn concat(frames: &[ObservationFrame]) -> PolarsResult<ObservationFrame> {
        let lazy: Vec<LazyFrame> = frames.iter().map(|f| f.frame.clone()).collect();
        Ok(ObservationFrame::new(concat(lazy, UnionArgs::default())?))
    }
}
