//! Daily features shaped for forecasting models.

use crate::forecast::error::ForecastError;
use crate::frames::daily_feature_frame::DailyFeatures;
use crate::processing::splitter::{split, ChronologicalSplit, SplitBoundary};
use crate::types::columns::{CELL_ID, DATE};
use chrono::{Duration, NaiveDate};
use log::debug;
use polars::prelude::*;

pub const DEFAULT_HOLDOUT_DAYS: i64 = 7;

/// A collected feature table with its target and feature names.
#[derive(Debug, Clone)]
pub struct ModelDataset {
    frame: DataFrame,
    target: String,
    instances: Vec<String>,
}

/// A date-cut split of one dataset. `cutoff` is the last training date.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub cutoff: NaiveDate,
    pub split: ChronologicalSplit,
}

/// Sliding windows over a series: `inputs[i]` holds `time_steps` consecutive rows,
/// `targets[i]` the target on the row right after them.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceWindows {
    pub columns: Vec<String>,
    pub inputs: Vec<Vec<Vec<f64>>>,
    pub targets: Vec<f64>,
}

impl ModelDataset {
    pub fn new(features: DailyFeatures) -> Self {
        Self {
            frame: features.frame,
            target: features.target,
            instances: features.instances,
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn instances(&self) -> &[String] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// One cell's series, sorted by date.
    pub fn for_cell(&self, cell_id: &str) -> Result<ModelDataset, ForecastError> {
        let frame = self
            .frame
            .clone()
            .lazy()
            .filter(col(CELL_ID).eq(lit(cell_id)))
            .sort([DATE], SortMultipleOptions::default().with_maintain_order(true))
            .collect()?;
        debug!("Cell {} has {} daily rows", cell_id, frame.height());
        Ok(Self {
            frame,
            target: self.target.clone(),
            instances: self.instances.clone(),
        })
    }

    /// The `instances` columns in order.
    pub fn feature_matrix(&self) -> Result<DataFrame, ForecastError> {
        self.select(&self.instances)
    }

    pub fn target_vector(&self) -> Result<Series, ForecastError> {
        Ok(self
            .column(&self.target)?
            .as_materialized_series()
            .clone())
    }

    /// Holds out the last `holdout_days` days for testing.
    ///
    /// Rows are sorted by date; the training part ends on `max(date) - holdout_days`.
    pub fn prepare(&self, holdout_days: i64) -> Result<PreparedDataset, ForecastError> {
        let sorted = self
            .frame
            .sort([DATE], SortMultipleOptions::default().with_maintain_order(true))?;
        let days = column_of(&sorted, DATE)?.cast(&DataType::Int32)?;
        let last = days.i32()?.max().ok_or(ForecastError::EmptyDataset)?;
        let cutoff = NaiveDate::default() + Duration::days(i64::from(last) - holdout_days);

        let mut keyed = vec![DATE.to_string()];
        keyed.extend(self.instances.iter().cloned());
        let x = sorted.select(keyed)?;
        let y = column_of(&sorted, &self.target)?
            .as_materialized_series()
            .clone();

        let parts = split(&x, &y, SplitBoundary::Date(cutoff))?;
        Ok(PreparedDataset {
            cutoff,
            split: ChronologicalSplit {
                x_train: parts.x_train.select(self.instances.iter().cloned())?,
                x_test: parts.x_test.select(self.instances.iter().cloned())?,
                y_train: parts.y_train,
                y_test: parts.y_test,
            },
        })
    }

    /// Windows over the target followed by every feature column.
    pub fn sequence_windows(&self, time_steps: usize) -> Result<SequenceWindows, ForecastError> {
        if time_steps == 0 {
            return Err(ForecastError::InvalidWindow);
        }
        let mut columns = vec![self.target.clone()];
        columns.extend(self.instances.iter().cloned());
        let rows = to_rows(&self.select(&columns)?)?;

        let count = rows.len().saturating_sub(time_steps);
        let inputs = (0..count)
            .map(|i| rows[i..i + time_steps].to_vec())
            .collect();
        let targets = (0..count).map(|i| rows[i + time_steps][0]).collect();
        Ok(SequenceWindows {
            columns,
            inputs,
            targets,
        })
    }

    fn select(&self, names: &[String]) -> Result<DataFrame, ForecastError> {
        for name in names {
            self.column(name)?;
        }
        Ok(self.frame.select(names.iter().cloned())?)
    }

    fn column(&self, name: &str) -> Result<&Column, ForecastError> {
        column_of(&self.frame, name)
    }
}

fn column_of<'a>(frame: &'a DataFrame, name: &str) -> Result<&'a Column, ForecastError> {
    frame
        .column(name)
        .map_err(|_| ForecastError::MissingColumn(name.to_string()))
}

/// Row-major `f64` copy of `df`. Every column is cast to float; nulls are rejected.
pub fn to_rows(df: &DataFrame) -> Result<Vec<Vec<f64>>, ForecastError> {
    let mut rows = vec![Vec::with_capacity(df.width()); df.height()];
    for column in df.get_columns() {
        let values = column.cast(&DataType::Float64)?;
        for (row, value) in values.f64()?.into_iter().enumerate() {
            let value = value.ok_or_else(|| ForecastError::NullValue {
                column: column.name().to_string(),
                row,
            })?;
            rows[row].push(value);
        }
    }
    Ok(rows)
}

/// Converts a float series to a vector, rejecting nulls.
pub fn to_values(series: &Series) -> Result<Vec<f64>, ForecastError> {
    let values = series.cast(&DataType::Float64)?;
    values
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| ForecastError::NullValue {
                column: series.name().to_string(),
                row,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::date;

    /// Two cells over ten days: target `1..=10` (cell "a") and `11..=20` (cell "b").
    fn dataset() -> ModelDataset {
        let epoch = NaiveDate::default();
        let mut cells = Vec::new();
        let mut days = Vec::new();
        let mut target = Vec::new();
        let mut lag = Vec::new();
        for (cell, offset) in [("a", 0.0), ("b", 10.0)] {
            for d in 0..10u32 {
                cells.push(cell);
                days.push(date(2016, 1, 1 + d).signed_duration_since(epoch).num_days() as i32);
                target.push(offset + f64::from(d) + 1.0);
                lag.push(offset + f64::from(d));
            }
        }
        let frame = DataFrame::new(vec![
            Column::new(CELL_ID.into(), cells),
            Column::new(DATE.into(), days)
                .cast(&DataType::Date)
                .expect("day numbers"),
            Column::new("precipitation_mean".into(), target),
            Column::new("precipitation_mean_lag_1".into(), lag),
            Column::new("high_season".into(), vec![0i32; 20]),
        ])
        .expect("consistent columns");
        ModelDataset::new(DailyFeatures {
            frame,
            target: "precipitation_mean".to_string(),
            instances: vec![
                "precipitation_mean_lag_1".to_string(),
                "high_season".to_string(),
            ],
        })
    }

    #[test]
    fn test_matrix_and_vector() -> Result<(), Box<dyn std::error::Error>> {
        let data = dataset().for_cell("b")?;
        assert_eq!(data.len(), 10);
        let x = data.feature_matrix()?;
        assert_eq!(x.width(), 2);
        assert_eq!(to_values(&data.target_vector()?)?[0], 11.0);
        assert_eq!(to_rows(&x)?[0], vec![10.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_prepare_holds_out_last_week() -> Result<(), Box<dyn std::error::Error>> {
        let prepared = dataset().for_cell("a")?.prepare(DEFAULT_HOLDOUT_DAYS)?;
        assert_eq!(prepared.cutoff, date(2016, 1, 3));
        assert_eq!(prepared.split.x_train.height(), 3);
        assert_eq!(prepared.split.x_test.height(), 7);
        assert_eq!(to_values(&prepared.split.y_test)?[0], 4.0);
        assert!(prepared.split.x_test.column(DATE).is_err());
        Ok(())
    }

    #[test]
    fn test_sequence_windows() -> Result<(), Box<dyn std::error::Error>> {
        let windows = dataset().for_cell("a")?.sequence_windows(7)?;
        assert_eq!(windows.inputs.len(), 3);
        assert_eq!(windows.inputs[0].len(), 7);
        assert_eq!(windows.inputs[0][0], vec![1.0, 0.0, 0.0]);
        assert_eq!(windows.targets, vec![8.0, 9.0, 10.0]);
        assert_eq!(windows.columns[0], "precipitation_mean");

        let none = dataset().for_cell("a")?.sequence_windows(12)?;
        assert!(none.inputs.is_empty());
        assert!(matches!(
            dataset().sequence_windows(0),
            Err(ForecastError::InvalidWindow)
        ));
        Ok(())
    }

    #[test]
    fn test_missing_column() {
        let mut data = dataset();
        data.instances.push("nope".to_string());
        assert!(matches!(
            data.feature_matrix(),
            Err(ForecastError::MissingColumn(c)) if c == "nope"
        ));
    }
}
