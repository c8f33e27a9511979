//! Attaches neighbor-cell precipitation to each cell/hour record.

use crate::frames::cell_hourly_frame::{CellHourlyFrame, EnrichedHourlyFrame};
use crate::processing::error::ProcessingError;
use crate::types::columns::{neighbor_column, neighbor_precip_column, CELL_ID, HOUR};
use crate::types::observation::Indicator;
use log::debug;
use polars::prelude::*;

/// Combines the neighbor's reading with the record's own one.
///
/// Null when `own` is null. Otherwise the candidate, or `own` when the candidate is null.
pub fn merge_neighbor_precip(candidate: Expr, own: Expr) -> Expr {
    when(own.clone().is_null())
        .then(lit(NULL).cast(DataType::Float64))
        .otherwise(candidate.fill_null(own))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeighborEnricher;

impl NeighborEnricher {
    pub fn new() -> Self {
        Self
    }

    /// Adds `neighbor_i_precip` for every neighbor slot of `hourly`.
    ///
    /// For every slot the candidate is looked up by joining (`neighbor_i`, `hour`) against
    /// the same frame's (`cell_id`, `hour`), then combined with the record's own reading by
    /// [`merge_neighbor_precip`]. A slot pointing at the cell itself yields its own reading.
    ///
    /// # Arguments
    ///
    /// * `hourly` - Cell/hour records from [`crate::TemporalAggregator::aggregate`].
    ///
    /// # Returns
    ///
    /// An [`EnrichedHourlyFrame`] with every input column, one `neighbor_i_precip` column
    /// per slot, and the (cell, hour) order of the input.
    ///
    /// # Errors
    ///
    /// * [`ProcessingError::MissingColumn`] if `hourly` has no `precipitation` column.
    /// * [`ProcessingError::Polars`] if the schema cannot be resolved.
    pub fn enrich(&self, hourly: &CellHourlyFrame) -> Result<EnrichedHourlyFrame, ProcessingError> {
        let precipitation = Indicator::Precipitation.column();
        let mut input = hourly.frame.clone();
        let schema = input.collect_schema()?;
        if schema.get(precipitation).is_none() {
            return Err(ProcessingError::MissingColumn(precipitation.to_string()));
        }
        let mut output: Vec<Expr> = schema.iter_names().map(|name| col(name.clone())).collect();

        let mut frame = input;
        for slot in 0..hourly.neighbor_slots {
            let neighbor = neighbor_column(slot);
            let candidate = format!("{neighbor}_candidate");
            let lookup = hourly
                .frame
                .clone()
                .filter(col(CELL_ID).is_not_null())
                .select([
                    col(CELL_ID).alias(neighbor.as_str()),
                    col(HOUR),
                    col(precipitation).alias(candidate.as_str()),
                ]);

            frame = frame
                .join(
                    lookup,
                    [col(neighbor.as_str()), col(HOUR)],
                    [col(neighbor.as_str()), col(HOUR)],
                    JoinArgs::new(JoinType::Left),
                )
                .with_column(
                    merge_neighbor_precip(col(candidate.as_str()), col(precipitation))
                        .alias(neighbor_precip_column(slot).as_str()),
                );
            output.push(col(neighbor_precip_column(slot).as_str()));
        }
        debug!("Enriched {} neighbor slots", hourly.neighbor_slots);

        let frame = frame.select(output).sort(
            [CELL_ID, HOUR],
            SortMultipleOptions::default().with_maintain_order(true),
        );
        Ok(EnrichedHourlyFrame::new(frame, hourly.neighbor_slots))
    }
}
