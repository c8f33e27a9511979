//! Station observations → one record per (cell, hour).

use crate::frames::cell_hourly_frame::CellHourlyFrame;
use crate::frames::observation_frame::ObservationFrame;
use crate::processing::error::ProcessingError;
use crate::stations::registry::StationRegistry;
use crate::types::aggregation::AggregationPlan;
use crate::types::columns::{neighbor_column, CELL_ID, HOUR, STATION_ID, TIMESTAMP};
use log::{debug, warn};
use polars::prelude::*;

const HOUR_MS: i64 = 3_600_000;
const HALF_HOUR_MS: i64 = HOUR_MS / 2;

/// Rounds a datetime expression to the nearest hour. Exactly half past rounds up.
pub fn round_to_hour(expr: Expr) -> Expr {
    let millis = expr
        .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
        .cast(DataType::Int64);
    ((millis + lit(HALF_HOUR_MS)).floor_div(lit(HOUR_MS)) * lit(HOUR_MS))
        .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
}

/// Collapses station observations to cell/hour records following an [`AggregationPlan`].
///
/// Plan columns that the registry provides (`neighbor_i`) are attached after
/// the station-level step; every other plan column is read from the observations.
#[derive(Debug, Clone)]
pub struct TemporalAggregator {
    plan: AggregationPlan,
}

impl Default for TemporalAggregator {
    fn default() -> Self {
        Self::new(AggregationPlan::hourly(3))
    }
}

impl TemporalAggregator {
    pub fn new(plan: AggregationPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &AggregationPlan {
        &self.plan
    }

    /// Rounds timestamps to the hour, averages each station's readings per hour, attaches
    /// the registry assignment and aggregates per (cell, hour).
    ///
    /// Observations of stations missing from `registry` end up in the null-cell group;
    /// their row count is logged as a warning.
    pub fn aggregate(
        &self,
        observations: &ObservationFrame,
        registry: &StationRegistry,
    ) -> Result<CellHourlyFrame, ProcessingError> {
        let registry_columns: Vec<String> =
            (0..registry.neighbor_slots()).map(neighbor_column).collect();
        let station_means: Vec<Expr> = self
            .plan
            .columns()
            .iter()
            .filter(|c| !registry_columns.contains(&c.column))
            .map(|c| col(c.column.as_str()).mean().alias(c.column.as_str()))
            .collect();

        let station_hours = observations
            .frame
            .clone()
            .with_columns([
                col(STATION_ID).cast(DataType::String),
                round_to_hour(col(TIMESTAMP)).alias(HOUR),
            ])
            .group_by([col(STATION_ID), col(HOUR)])
            .agg(station_means);

        let assigned = station_hours.join(
            registry.to_frame()?.lazy(),
            [col(STATION_ID)],
            [col(STATION_ID)],
            JoinArgs::new(JoinType::Left),
        );

        let unassigned = unassigned_rows(&assigned)?;
        if unassigned > 0 {
            warn!(
                "{} station/hour rows have no cell assignment and form the null-cell group",
                unassigned
            );
        }

        self.aggregate_cell_hours(assigned)
            .map(|frame| CellHourlyFrame::new(frame.frame, registry.neighbor_slots()))
    }

    /// Groups by (`cell_id`, `hour`) with the plan and sorts by cell then hour.
    ///
    /// Running it again on its own output returns the same frame.
    pub fn aggregate_cell_hours(&self, frame: LazyFrame) -> Result<CellHourlyFrame, ProcessingError> {
        let exprs = self.plan.exprs()?;
        debug!("Aggregating cell hours with {} expressions", exprs.len());
        let slots = (0..)
            .take_while(|slot| {
                let name = neighbor_column(*slot);
                self.plan.columns().iter().any(|c| c.column == name)
            })
            .count();

        let aggregated = frame
            .group_by([col(CELL_ID), col(HOUR)])
            .agg(exprs)
            .sort(
                [CELL_ID, HOUR],
                SortMultipleOptions::default().with_maintain_order(true),
            );
        Ok(CellHourlyFrame::new(aggregated, slots))
    }
}

fn unassigned_rows(frame: &LazyFrame) -> Result<u64, ProcessingError> {
    let counted = frame
        .clone()
        .select([col(CELL_ID)
            .null_count()
            .cast(DataType::UInt64)
            .alias("unassigned")])
        .collect()?;
    Ok(counted.column("unassigned")?.u64()?.get(0).unwrap_or(0))
}
