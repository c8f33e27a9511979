//! Order-preserving train/test split.

use crate::processing::error::ProcessingError;
use crate::types::columns::DATE;
use chrono::NaiveDate;
use log::info;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Where the training part of a series ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitBoundary {
    /// Rows `0..=i` train.
    LastTrainIndex(usize),
    /// Fraction of rows reserved for test, `0 < f < 1`. The first
    /// `floor(len * (1 - f))` rows train.
    TestFraction(f64),
    /// Rows dated on or before the given day train. Requires a `date` column in the
    /// feature matrix, sorted ascending.
    Date(NaiveDate),
}

impl SplitBoundary {
    /// Reads a numeric boundary: below one it is a test fraction, otherwise the last
    /// training index.
    pub fn from_value(value: f64) -> Result<Self, ProcessingError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ProcessingError::InvalidBoundary(value));
        }
        if value < 1.0 {
            Ok(SplitBoundary::TestFraction(value))
        } else {
            Ok(SplitBoundary::LastTrainIndex(value.floor() as usize))
        }
    }

    fn train_len(&self, x: &DataFrame) -> Result<usize, ProcessingError> {
        let len = x.height();
        match *self {
            SplitBoundary::LastTrainIndex(i) => {
                if i >= len {
                    return Err(ProcessingError::InvalidBoundary(i as f64));
                }
                Ok(i + 1)
            }
            SplitBoundary::TestFraction(f) => {
                if !(f > 0.0 && f < 1.0) {
                    return Err(ProcessingError::InvalidBoundary(f));
                }
                Ok((len as f64 * (1.0 - f)).floor() as usize)
            }
            SplitBoundary::Date(date) => {
                let cutoff = days_since_epoch(date);
                let days = x
                    .column(DATE)
                    .map_err(|_| ProcessingError::MissingColumn(DATE.to_string()))?
                    .cast(&DataType::Int32)?;
                let first_test = days
                    .i32()?
                    .into_iter()
                    .position(|d| d.is_some_and(|d| d > cutoff))
                    .unwrap_or(len);
                Ok(first_test)
            }
        }
    }
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    date.signed_duration_since(NaiveDate::default()).num_days() as i32
}

/// Training and test parts of a feature matrix and its target, in input order.
#[derive(Debug, Clone)]
pub struct ChronologicalSplit {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Series,
    pub y_test: Series,
}

/// Splits `x` and `y` at `boundary` without shuffling.
///
/// Training rows are those up to and including the boundary; every later row is test.
/// A boundary on the last row (or a date past the end of the series) leaves the test
/// side empty, which is allowed.
///
/// # Arguments
///
/// * `x` - The feature matrix, one row per day in chronological order.
/// * `y` - The target, aligned with `x`.
/// * `boundary` - Where the training part ends. See [`SplitBoundary`].
///
/// # Returns
///
/// A [`ChronologicalSplit`] whose train and test halves concatenate back to the inputs.
///
/// # Errors
///
/// * [`ProcessingError::LengthMismatch`] when `x` and `y` differ in length.
/// * [`ProcessingError::InvalidBoundary`] for a fraction outside `(0, 1)` or an index
///   past the last row.
/// * [`ProcessingError::EmptySplit`] when no row would train.
///
/// # Example
///
/// ```
/// use meteohex::{split, SplitBoundary};
/// use polars::prelude::*;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let x = df!("feature" => [1.0, 2.0, 3.0, 4.0])?;
/// let y = Series::new("target".into(), [1.0, 2.0, 3.0, 4.0]);
///
/// let parts = split(&x, &y, SplitBoundary::LastTrainIndex(2))?;
/// assert_eq!(parts.x_train.height(), 3);
/// assert_eq!(parts.y_test.len(), 1);
/// # Ok(())
/// # }
/// ```
pub fn split(
    x: &DataFrame,
    y: &Series,
    boundary: SplitBoundary,
) -> Result<ChronologicalSplit, ProcessingError> {
    if x.height() != y.len() {
        return Err(ProcessingError::LengthMismatch {
            features: x.height(),
            target: y.len(),
        });
    }
    let len = x.height();
    let train_len = boundary.train_len(x)?;
    if train_len == 0 {
        return Err(ProcessingError::EmptySplit);
    }

    let test_len = len - train_len;
    info!(
        "Chronological split at {:?}: {} train rows, {} test rows",
        boundary, train_len, test_len
    );
    Ok(ChronologicalSplit {
        x_train: x.slice(0, train_len),
        x_test: x.slice(train_len as i64, test_len),
        y_train: y.slice(0, train_len),
        y_test: y.slice(train_len as i64, test_len),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::date;

    fn series(n: usize) -> (DataFrame, Series) {
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let x = DataFrame::new(vec![Column::new("feature".into(), values.clone())])
            .expect("single column");
        (x, Series::new("target".into(), values))
    }

    #[test]
    fn test_fraction_reserves_test_share() -> Result<(), Box<dyn std::error::Error>> {
        let (x, y) = series(8);
        let parts = split(&x, &y, SplitBoundary::TestFraction(0.25))?;
        assert_eq!(parts.x_train.height(), 6);
        assert_eq!(parts.x_test.height(), 2);
        assert_eq!(parts.y_train.len() + parts.y_test.len(), 8);
        assert_eq!(parts.y_test.f64()?.get(0), Some(6.0));
        assert_eq!(parts.x_train.column("feature")?.f64()?.get(5), Some(5.0));

        let uneven = split(&series(10).0, &series(10).1, SplitBoundary::TestFraction(0.33))?;
        assert_eq!(uneven.x_train.height(), 6);
        Ok(())
    }

    #[test]
    fn test_index_boundary_is_inclusive() -> Result<(), Box<dyn std::error::Error>> {
        let (x, y) = series(8);
        let parts = split(&x, &y, SplitBoundary::LastTrainIndex(4))?;
        assert_eq!(parts.x_train.height(), 5);
        assert_eq!(parts.y_train.f64()?.get(4), Some(4.0));
        assert_eq!(parts.y_test.f64()?.get(0), Some(5.0));
        Ok(())
    }

    #[test]
    fn test_boundary_on_last_row_leaves_test_empty() -> Result<(), Box<dyn std::error::Error>> {
        let (x, y) = series(3);
        let parts = split(&x, &y, SplitBoundary::LastTrainIndex(2))?;
        assert_eq!(parts.x_train.height(), 3);
        assert_eq!(parts.x_test.height(), 0);
        assert_eq!(parts.y_train.len() + parts.y_test.len(), 3);
        Ok(())
    }

    #[test]
    fn test_from_value() -> Result<(), ProcessingError> {
        assert_eq!(SplitBoundary::from_value(0.2)?, SplitBoundary::TestFraction(0.2));
        assert_eq!(SplitBoundary::from_value(5.0)?, SplitBoundary::LastTrainIndex(5));
        assert!(matches!(
            SplitBoundary::from_value(-1.0),
            Err(ProcessingError::InvalidBoundary(_))
        ));
        assert!(SplitBoundary::from_value(f64::NAN).is_err());
        Ok(())
    }

    #[test]
    fn test_date_boundary() -> Result<(), Box<dyn std::error::Error>> {
        let days: Vec<i32> = (0..5).map(|d| days_since_epoch(date(2016, 1, 1 + d))).collect();
        let x = DataFrame::new(vec![
            Column::new(DATE.into(), days).cast(&DataType::Date)?,
            Column::new("feature".into(), [1.0, 2.0, 3.0, 4.0, 5.0].to_vec()),
        ])?;
        let y = Series::new("target".into(), [1.0, 2.0, 3.0, 4.0, 5.0].to_vec());
        let parts = split(&x, &y, SplitBoundary::Date(date(2016, 1, 3)))?;
        assert_eq!(parts.x_train.height(), 3);
        assert_eq!(parts.y_test.len(), 2);
        Ok(())
    }

    #[test]
    fn test_errors() {
        let (x, y) = series(4);
        let short = Series::new("target".into(), [1.0].to_vec());
        assert!(matches!(
            split(&x, &short, SplitBoundary::TestFraction(0.5)),
            Err(ProcessingError::LengthMismatch { features: 4, target: 1 })
        ));
        assert!(matches!(
            split(&x, &y, SplitBoundary::LastTrainIndex(10)),
            Err(ProcessingError::InvalidBoundary(_))
        ));
        assert!(matches!(
            split(&x, &y, SplitBoundary::TestFraction(0.9)),
            Err(ProcessingError::EmptySplit)
        ));
        assert!(matches!(
            split(&x, &y, SplitBoundary::TestFraction(1.5)),
            Err(ProcessingError::InvalidBoundary(_))
        ));
    }
}
