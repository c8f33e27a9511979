//! Enriched hourly records → daily per-cell feature table.

use crate::frames::cell_hourly_frame::EnrichedHourlyFrame;
use crate::frames::daily_feature_frame::DailyFeatureFrame;
use crate::processing::error::ProcessingError;
use crate::types::aggregation::{AggregationPlan, AggregationRule};
use crate::types::columns::{lag_column, month_column, CELL_ID, DATE, HIGH_SEASON, HOUR};
use crate::types::observation::Indicator;
use bon::bon;
use log::{debug, info};
use polars::prelude::*;

pub const DEFAULT_TARGET: &str = "precipitation_mean";
pub const PRECIPITATION_RANGE: &str = "precipitation_range";

const HIGH_SEASON_MONTHS: std::ops::RangeInclusive<i32> = 4..=9;

/// Builds the daily feature table from enriched hourly records.
///
/// Phase one aggregates each (cell, date), adds `precipitation_range` and back-fills the
/// features within each cell. With `calendar_and_lags`, phase two adds the season flag,
/// twelve month indicators and lagged columns, then drops the rows left incomplete.
///
/// Lags are positional within each cell: `<column>_lag_k` holds the value of the k-th
/// previous row of the same cell. When a day has no records, the lag reaches past it,
/// so after a gap `lag_1` is the last observed day rather than the calendar day before.
#[derive(Debug, Clone)]
pub struct DailyFeatureBuilder {
    target: String,
    calendar_and_lags: bool,
    nb_lag_var: usize,
    nb_lag_exo: usize,
    plan: Option<AggregationPlan>,
}

impl Default for DailyFeatureBuilder {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[bon]
impl DailyFeatureBuilder {
    /// Configures a builder.
    ///
    /// * `.target(..)`: column to forecast. Defaults to `precipitation_mean`.
    /// * `.calendar_and_lags(bool)`: run phase two. Defaults to `true`.
    /// * `.nb_lag_var(usize)`: lags of the target. Defaults to 1.
    /// * `.nb_lag_exo(usize)`: lags of every other feature. Defaults to 1.
    /// * `.plan(AggregationPlan)`: the daily plan. Defaults to
    ///   [`AggregationPlan::daily`] for the input's neighbor slots.
    #[builder]
    pub fn new(
        #[builder(into)] target: Option<String>,
        calendar_and_lags: Option<bool>,
        nb_lag_var: Option<usize>,
        nb_lag_exo: Option<usize>,
        plan: Option<AggregationPlan>,
    ) -> Self {
        Self {
            target: target.unwrap_or_else(|| DEFAULT_TARGET.to_string()),
            calendar_and_lags: calendar_and_lags.unwrap_or(true),
            nb_lag_var: nb_lag_var.unwrap_or(1),
            nb_lag_exo: nb_lag_exo.unwrap_or(1),
            plan,
        }
    }
}

impl DailyFeatureBuilder {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn nb_lag_var(&self) -> usize {
        self.nb_lag_var
    }

    pub fn nb_lag_exo(&self) -> usize {
        self.nb_lag_exo
    }

    /// Runs both phases over `hourly`.
    ///
    /// # Errors
    ///
    /// [`ProcessingError::MissingColumn`] if the plan does not produce the target, plus any
    /// plan validation error.
    pub fn build(&self, hourly: &EnrichedHourlyFrame) -> Result<DailyFeatureFrame, ProcessingError> {
        let plan = self
            .plan
            .clone()
            .unwrap_or_else(|| AggregationPlan::daily(hourly.neighbor_slots));
        let aggregated_names = plan.output_names();
        if !aggregated_names.contains(&self.target) {
            return Err(ProcessingError::MissingColumn(self.target.clone()));
        }

        let precipitation = Indicator::Precipitation.column();
        let min = plan.output_name(precipitation, AggregationRule::Min);
        let max = plan.output_name(precipitation, AggregationRule::Max);
        let has_range = aggregated_names.contains(&min) && aggregated_names.contains(&max);

        let mut features: Vec<String> = aggregated_names
            .iter()
            .filter(|name| **name != self.target)
            .filter(|name| !has_range || (**name != min && **name != max))
            .cloned()
            .collect();
        if has_range {
            features.push(PRECIPITATION_RANGE.to_string());
        }

        let mut daily = hourly
            .frame
            .clone()
            .with_column(col(HOUR).dt().date().alias(DATE))
            .group_by([col(CELL_ID), col(DATE)])
            .agg(plan.exprs()?);
        if has_range {
            daily = daily.with_column(
                (col(max.as_str()) - col(min.as_str())).alias(PRECIPITATION_RANGE),
            );
        }

        let mut phase_one: Vec<Expr> = vec![col(CELL_ID), col(DATE), col(self.target.as_str())];
        phase_one.extend(features.iter().map(|f| col(f.as_str())));
        let daily = daily
            .select(phase_one)
            .sort(
                [CELL_ID, DATE],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .with_columns(
                features
                    .iter()
                    .map(|f| {
                        col(f.as_str())
                            .fill_null_with_strategy(FillNullStrategy::Backward(None))
                            .over([col(CELL_ID)])
                    })
                    .collect::<Vec<_>>(),
            );

        if !self.calendar_and_lags {
            debug!("Built {} daily features without calendar or lags", features.len());
            return Ok(DailyFeatureFrame::new(daily, self.target.clone(), features));
        }

        let (frame, instances) = self.add_calendar_and_lags(daily, &features);
        info!(
            "Built {} daily features ({} target lags, {} exogenous lags)",
            instances.len(),
            self.nb_lag_var,
            self.nb_lag_exo
        );
        Ok(DailyFeatureFrame::new(frame, self.target.clone(), instances))
    }

    fn add_calendar_and_lags(
        &self,
        daily: LazyFrame,
        features: &[String],
    ) -> (LazyFrame, Vec<String>) {
        let month = || col(DATE).dt().month().cast(DataType::Int32);
        let flag = |condition: Expr, name: &str| {
            when(condition)
                .then(lit(1i32))
                .otherwise(lit(0i32))
                .alias(name)
        };

        let mut derived = vec![flag(
            month()
                .gt_eq(lit(*HIGH_SEASON_MONTHS.start()))
                .and(month().lt_eq(lit(*HIGH_SEASON_MONTHS.end()))),
            HIGH_SEASON,
        )];
        let mut instances = vec![HIGH_SEASON.to_string()];
        for m in 1..=12u32 {
            let name = month_column(m);
            derived.push(flag(month().eq(lit(m as i32)), &name));
            instances.push(name);
        }

        let target = self.target.as_str();
        let lags = (1..=self.nb_lag_var)
            .map(|k| (target, k))
            .chain(
                features
                    .iter()
                    .flat_map(|f| (1..=self.nb_lag_exo).map(move |k| (f.as_str(), k))),
            );
        for (column, k) in lags {
            let name = lag_column(column, k);
            derived.push(
                col(column)
                    .shift(lit(k as i64))
                    .over([col(CELL_ID)])
                    .alias(name.as_str()),
            );
            instances.push(name);
        }

        let mut kept = vec![col(CELL_ID), col(DATE), col(self.target.as_str())];
        kept.extend(instances.iter().map(|name| col(name.as_str())));
        let complete = std::iter::once(self.target.as_str())
            .chain(instances.iter().map(String::as_str))
            .map(|name| col(name).is_not_null())
            .reduce(|acc, e| acc.and(e))
            .unwrap_or(lit(true));

        let frame = daily.with_columns(derived).select(kept).filter(complete);
        (frame, instances)
    }
}
