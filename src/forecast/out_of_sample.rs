//! Recursive out-of-sample prediction over a held-out period.

use crate::forecast::dataset::{to_rows, to_values, ModelDataset};
use crate::forecast::error::ForecastError;
use crate::types::columns::lag_column;
use log::info;
use polars::prelude::DataFrame;

/// A model fitted on feature rows, predicting one target value per row.
pub trait Forecaster {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ForecastError>;

    fn predict(&self, features: &[f64]) -> f64;
}

/// Predicts the previous day's target, read from `<target>_lag_1`.
#[derive(Debug, Clone)]
pub struct PersistenceForecaster {
    lag_position: usize,
}

impl PersistenceForecaster {
    pub fn new(instances: &[String], target: &str) -> Result<Self, ForecastError> {
        let lag = lag_column(target, 1);
        let lag_position = instances
            .iter()
            .position(|name| *name == lag)
            .ok_or(ForecastError::MissingColumn(lag))?;
        Ok(Self { lag_position })
    }
}

impl Forecaster for PersistenceForecaster {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ForecastError> {
        if x.len() != y.len() {
            return Err(ForecastError::LengthMismatch {
                expected: x.len(),
                found: y.len(),
            });
        }
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> f64 {
        features.get(self.lag_position).copied().unwrap_or(f64::NAN)
    }
}

/// Walks `x_test` in order, feeding earlier predictions back as target lags.
///
/// For test row `i` and lag `k` in `1..=nb_lag_var`, `<target>_lag_k` is replaced by
/// prediction `i - k` when `i >= k`. Earlier rows keep their observed lags, which fall in
/// the training period.
pub fn predict_out_of_sample<F: Forecaster>(
    model: &F,
    x_test: &DataFrame,
    instances: &[String],
    target: &str,
    nb_lag_var: usize,
) -> Result<Vec<f64>, ForecastError> {
    let lag_positions = (1..=nb_lag_var)
        .map(|k| {
            let name = lag_column(target, k);
            instances
                .iter()
                .position(|i| *i == name)
                .map(|pos| (k, pos))
                .ok_or(ForecastError::MissingColumn(name))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let rows = to_rows(&x_test.select(instances.iter().cloned())?)?;
    let mut predictions: Vec<f64> = Vec::with_capacity(rows.len());
    for (i, mut row) in rows.into_iter().enumerate() {
        for &(k, pos) in &lag_positions {
            if i >= k {
                row[pos] = predictions[i - k];
            }
        }
        predictions.push(model.predict(&row));
    }
    Ok(predictions)
}

pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64, ForecastError> {
    if y_true.len() != y_pred.len() {
        return Err(ForecastError::LengthMismatch {
            expected: y_true.len(),
            found: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(ForecastError::EmptyDataset);
    }
    let total: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).abs())
        .sum();
    Ok(total / y_true.len() as f64)
}

/// Predictions and error over one held-out period.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldoutForecast {
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
    pub mae: f64,
}

/// Prepares `dataset` with `holdout_days`, fits `model` on the training part and predicts
/// the held-out days recursively.
pub fn evaluate_holdout<F: Forecaster>(
    model: &mut F,
    dataset: &ModelDataset,
    holdout_days: i64,
    nb_lag_var: usize,
) -> Result<HoldoutForecast, ForecastError> {
    let prepared = dataset.prepare(holdout_days)?;
    let split = &prepared.split;
    model.fit(&to_rows(&split.x_train)?, &to_values(&split.y_train)?)?;

    let predicted = predict_out_of_sample(
        model,
        &split.x_test,
        dataset.instances(),
        dataset.target(),
        nb_lag_var,
    )?;
    let actual = to_values(&split.y_test)?;
    let mae = mean_absolute_error(&actual, &predicted)?;
    info!(
        "Held out {} days after {}: MAE {:.4}",
        actual.len(),
        prepared.cutoff,
        mae
    );
    Ok(HoldoutForecast {
        actual,
        predicted,
        mae,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::daily_feature_frame::DailyFeatures;
    use crate::test_support::date;
    use crate::types::columns::DATE;
    use chrono::NaiveDate;
    use polars::prelude::*;

    /// Adds the first lag and half the second lag.
    struct LagSum;

    impl Forecaster for LagSum {
        fn fit(&mut self, _x: &[Vec<f64>], _y: &[f64]) -> Result<(), ForecastError> {
            Ok(())
        }

        fn predict(&self, features: &[f64]) -> f64 {
            features[0] + 0.5 * features[1]
        }
    }

    fn instances() -> Vec<String> {
        vec![
            "precipitation_mean_lag_1".to_string(),
            "precipitation_mean_lag_2".to_string(),
        ]
    }

    fn x_test() -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new("precipitation_mean_lag_1".into(), [4.0, 100.0, 100.0].to_vec()),
            Column::new("precipitation_mean_lag_2".into(), [2.0, 6.0, 100.0].to_vec()),
        ])
    }

    #[test]
    fn test_recursive_lags_use_predictions() -> Result<(), Box<dyn std::error::Error>> {
        let predictions =
            predict_out_of_sample(&LagSum, &x_test()?, &instances(), "precipitation_mean", 2)?;
        // Row 0: observed lags. Row 1: lag_1 = p0, lag_2 observed. Row 2: both predicted.
        assert_eq!(predictions, vec![5.0, 8.0, 10.5]);
        Ok(())
    }

    #[test]
    fn test_persistence_repeats_first_prediction() -> Result<(), Box<dyn std::error::Error>> {
        let model = PersistenceForecaster::new(&instances(), "precipitation_mean")?;
        let predictions =
            predict_out_of_sample(&model, &x_test()?, &instances(), "precipitation_mean", 1)?;
        assert_eq!(predictions, vec![4.0, 4.0, 4.0]);
        Ok(())
    }

    #[test]
    fn test_missing_lag_column() {
        let result = PersistenceForecaster::new(&["high_season".to_string()], "precipitation_mean");
        assert!(matches!(result, Err(ForecastError::MissingColumn(c)) if c == "precipitation_mean_lag_1"));
    }

    #[test]
    fn test_mean_absolute_error() -> Result<(), ForecastError> {
        assert_eq!(mean_absolute_error(&[1.0, 2.0, 3.0], &[2.0, 2.0, 1.0])?, 1.0);
        assert!(matches!(
            mean_absolute_error(&[1.0], &[1.0, 2.0]),
            Err(ForecastError::LengthMismatch { .. })
        ));
        assert!(mean_absolute_error(&[], &[]).is_err());
        Ok(())
    }

    #[test]
    fn test_evaluate_holdout_with_persistence() -> Result<(), Box<dyn std::error::Error>> {
        let epoch = NaiveDate::default();
        let days: Vec<i32> = (0..10u32)
            .map(|d| date(2016, 1, 1 + d).signed_duration_since(epoch).num_days() as i32)
            .collect();
        let target: Vec<f64> = (1..=10).map(f64::from).collect();
        let lag: Vec<f64> = (0..10).map(f64::from).collect();
        let frame = DataFrame::new(vec![
            Column::new(DATE.into(), days).cast(&DataType::Date)?,
            Column::new("precipitation_mean".into(), target),
            Column::new("precipitation_mean_lag_1".into(), lag),
        ])?;
        let dataset = ModelDataset::new(DailyFeatures {
            frame,
            target: "precipitation_mean".to_string(),
            instances: vec!["precipitation_mean_lag_1".to_string()],
        });
        let mut model = PersistenceForecaster::new(dataset.instances(), dataset.target())?;

        let forecast = evaluate_holdout(&mut model, &dataset, 7, 1)?;
        // The first held-out day (target 4) sees the observed lag 3; later days repeat it.
        assert_eq!(forecast.predicted, vec![3.0; 7]);
        assert_eq!(forecast.actual, vec![4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        assert_eq!(forecast.mae, 4.0);
        Ok(())
    }
}
