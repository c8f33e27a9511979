//! Contains the hourly per-cell frames produced by the temporal aggregator and the
//! neighbor enricher.

use crate::types::columns::{CELL_ID, HOUR};
use chrono::NaiveDateTime;
use polars::prelude::{col, lit, Expr, LazyFrame};

/// A wrapper around a Polars `LazyFrame` with one record per (cell, hour).
///
/// Columns: `cell_id` (string, null for stations without an assignment), `hour`
/// (datetime truncated to the hour), the mean of every indicator, and the
/// mode-aggregated `neighbor_0..neighbor_{k-1}` identifiers.
///
/// Instances are produced by [`crate::TemporalAggregator::aggregate`].
#[derive(Clone)]
pub struct CellHourlyFrame {
    /// The underlying Polars LazyFrame containing the aggregated hourly data.
    pub frame: LazyFrame,
    /// Number of `neighbor_i` columns carried by the frame.
    pub neighbor_slots: usize,
}

impl CellHourlyFrame {
    /// Creates a new `CellHourlyFrame` wrapping the given Polars `LazyFrame`.
    ///
    /// # Arguments
    ///
    /// * `frame` - A `LazyFrame` with the cell/hour schema described above.
    /// * `neighbor_slots` - How many `neighbor_i` columns the frame carries.
    pub fn new(frame: LazyFrame, neighbor_slots: usize) -> Self {
        Self {
            frame,
            neighbor_slots,
        }
    }

    /// Filters the records with an arbitrary predicate, returning a new frame.
    pub fn filter(&self, predicate: Expr) -> CellHourlyFrame {
        CellHourlyFrame::new(self.frame.clone().filter(predicate), self.neighbor_slots)
    }

    /// Keeps only the records of one cell.
    pub fn for_cell(&self, cell_id: &str) -> CellHourlyFrame {
        self.filter(col(CELL_ID).eq(lit(cell_id)))
    }

    /// Filters the records to the hours within the specified range (inclusive).
    ///
    /// # Arguments
    ///
    /// * `start` - The first hour kept.
    /// * `end` - The last hour kept.
    ///
    /// # Returns
    ///
    /// A new `CellHourlyFrame` restricted to `[start, end]`. The original is unchanged.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use chrono::NaiveDate;
    /// use meteohex::data::load_csv;
    /// use meteohex::{HexPipeline, PipelineConfig};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let observations = load_csv(&["data/stations_2016.csv"], "%Y%m%d %H:%M")?;
    /// let output = HexPipeline::new(PipelineConfig::default())?.run(&observations)?;
    ///
    /// let day = NaiveDate::from_ymd_opt(2016, 3, 1).ok_or("bad date")?;
    /// let morning = output.hourly.get_range(
    ///     day.and_hms_opt(6, 0, 0).ok_or("bad time")?,
    ///     day.and_hms_opt(12, 0, 0).ok_or("bad time")?,
    /// );
    /// println!("{}", morning.frame.collect()?);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// The filter is lazy; a later `.collect()` may return a
    /// [`polars::prelude::PolarsError`].
    pub fn get_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> CellHourlyFrame {
        self.filter(
            col(HOUR)
                .gt_eq(lit(start))
                .and(col(HOUR).lt_eq(lit(end))),
        )
    }
}

/// A [`CellHourlyFrame`] extended with `neighbor_i_precip` columns.
///
/// Each `neighbor_i_precip` holds the precipitation of the `neighbor_i` cell at the same
/// hour, or the record's own precipitation when that neighbor has no reading. It is null
/// exactly when the record's own precipitation is null.
///
/// Instances are produced by [`crate::NeighborEnricher::enrich`].
#[derive(Clone)]
pub struct EnrichedHourlyFrame {
    /// The underlying Polars LazyFrame containing the enriched hourly data.
    pub frame: LazyFrame,
    /// Number of `neighbor_i` / `neighbor_i_precip` column pairs carried by the frame.
    pub neighbor_slots: usize,
}

impl EnrichedHourlyFrame {
    pub fn new(frame: LazyFrame, neighbor_slots: usize) -> Self {
        Self {
            frame,
            neighbor_slots,
        }
    }

    pub fn filter(&self, predicate: Expr) -> EnrichedHourlyFrame {
        EnrichedHourlyFrame::new(self.frame.clone().filter(predicate), self.neighbor_slots)
    }

    pub fn for_cell(&self, cell_id: &str) -> EnrichedHourlyFrame {
        self.filter(col(CELL_ID).eq(lit(cell_id)))
    }
}
