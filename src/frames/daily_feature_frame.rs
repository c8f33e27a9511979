//! Contains the `DailyFeatureFrame` produced by the daily feature builder, and its
//! collected counterpart handed to forecasting components.

use crate::types::columns::{CELL_ID, DATE};
use chrono::NaiveDate;
use polars::prelude::{col, lit, DataFrame, Expr, LazyFrame, PolarsResult};

/// A wrapper around a Polars `LazyFrame` keyed by (cell, date), together with the
/// names forecasting components need.
///
/// * `target` is the column to forecast (by default `precipitation_mean`).
/// * `instances` lists every feature column in frame order, i.e. every column except
///   `target`, `date` and `cell_id`.
///
/// Instances are produced by [`crate::DailyFeatureBuilder::build`].
#[derive(Clone)]
pub struct DailyFeatureFrame {
    /// The underlying Polars LazyFrame containing the daily features.
    pub frame: LazyFrame,
    pub target: String,
    pub instances: Vec<String>,
}

impl DailyFeatureFrame {
    pub fn new(frame: LazyFrame, target: String, instances: Vec<String>) -> Self {
        Self {
            frame,
            target,
            instances,
        }
    }

    /// Filters the daily rows based on a Polars predicate expression.
    ///
    /// It returns a *new* `DailyFeatureFrame` with the filter applied lazily, carrying the
    /// same `target` and `instances`. The original remains unchanged.
    ///
    /// # Arguments
    ///
    /// * `predicate` - A Polars [`Expr`] defining the filtering condition.
    ///
    /// # Returns
    ///
    /// A new `DailyFeatureFrame` representing the filtered rows.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use meteohex::data::load_csv;
    /// use meteohex::{DailyFeatureBuilder, NeighborEnricher, PipelineConfig, TemporalAggregator};
    /// use meteohex::{NeighborSelection, StationRegistry};
    /// use polars::prelude::{col, lit};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let observations = load_csv(&["data/stations_2016.csv"], "%Y%m%d %H:%M")?;
    /// let indexer = PipelineConfig::default().indexer()?;
    /// let registry =
    ///     StationRegistry::build(&observations, &indexer, &NeighborSelection::default())?;
    /// let hourly = TemporalAggregator::default().aggregate(&observations, &registry)?;
    /// let enriched = NeighborEnricher::new().enrich(&hourly)?;
    /// let daily = DailyFeatureBuilder::default().build(&enriched)?;
    ///
    /// // Rainy days only
    /// let wet = daily.filter(col("precipitation_mean").gt(lit(1.0f64)));
    /// println!("{}", wet.frame.collect()?);
    /// # Ok(())
    /// # }
    /// ```
    pub fn filter(&self, predicate: Expr) -> DailyFeatureFrame {
        DailyFeatureFrame::new(
            self.frame.clone().filter(predicate),
            self.target.clone(),
            self.instances.clone(),
        )
    }

    pub fn for_cell(&self, cell_id: &str) -> DailyFeatureFrame {
        self.filter(col(CELL_ID).eq(lit(cell_id)))
    }

    /// Filters the rows to dates within the specified range (inclusive).
    ///
    /// # Arguments
    ///
    /// * `start` - The first date kept.
    /// * `end` - The last date kept.
    pub fn get_range(&self, start: NaiveDate, end: NaiveDate) -> DailyFeatureFrame {
        self.filter(col(DATE).gt_eq(lit(start)).and(col(DATE).lt_eq(lit(end))))
    }

    /// Executes the query.
    pub fn collect(&self) -> PolarsResult<DailyFeatures> {
        Ok(DailyFeatures {
            frame: self.frame.clone().collect()?,
            target: self.target.clone(),
            instances: self.instances.clone(),
        })
    }
}

/// Collected daily features: the pipeline artifact.
#[derive(Debug, Clone)]
pub struct DailyFeatures {
    pub frame: DataFrame,
    pub target: String,
    pub instances: Vec<String>,
}
