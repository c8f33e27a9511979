//! The station observations → daily cell features pipeline.

use crate::config::PipelineConfig;
use crate::data::loader::load_csv;
use crate::data::writer::{write_csv, write_parquet};
use crate::error::MeteohexError;
use crate::forecast::dataset::{ModelDataset, PreparedDataset};
use crate::forecast::error::ForecastError;
use crate::forecast::out_of_sample::{evaluate_holdout, Forecaster, HoldoutForecast};
use crate::frames::cell_hourly_frame::{CellHourlyFrame, EnrichedHourlyFrame};
use crate::frames::daily_feature_frame::DailyFeatures;
use crate::frames::observation_frame::ObservationFrame;
use crate::hex::geojson::cells_to_feature_collection;
use crate::hex::indexer::HexIndexer;
use crate::processing::daily_features::DailyFeatureBuilder;
use crate::processing::neighbor_enricher::NeighborEnricher;
use crate::processing::temporal_aggregator::TemporalAggregator;
use crate::stations::registry::StationRegistry;
use crate::types::aggregation::AggregationPlan;
use bon::bon;
use geojson::FeatureCollection;
use log::info;
use std::path::{Path, PathBuf};

/// Every artifact of one run, from the station registry to the daily features.
#[derive(Clone)]
pub struct PipelineOutput {
    pub registry: StationRegistry,
    pub hourly: CellHourlyFrame,
    pub enriched: EnrichedHourlyFrame,
    pub features: DailyFeatures,
    holdout_days: i64,
    nb_lag_var: usize,
}

impl PipelineOutput {
    pub fn model_dataset(&self) -> ModelDataset {
        ModelDataset::new(self.features.clone())
    }

    /// Days held out by [`PipelineOutput::prepare`] and [`PipelineOutput::evaluate_cell`],
    /// taken from [`PipelineConfig::holdout_days`].
    pub fn holdout_days(&self) -> i64 {
        self.holdout_days
    }

    /// Splits the whole feature table, holding out the configured number of days.
    pub fn prepare(&self) -> Result<PreparedDataset, ForecastError> {
        self.model_dataset().prepare(self.holdout_days)
    }

    /// Fits `model` on one cell's training days and forecasts its held-out days.
    ///
    /// # Arguments
    ///
    /// * `cell_id` - The cell to evaluate.
    /// * `model` - Any [`Forecaster`]; it is fitted in place.
    ///
    /// # Returns
    ///
    /// The held-out targets, the out-of-sample predictions and their mean absolute error.
    /// The configured `holdout_days` and `nb_lag_var` drive the split and the recursive lags.
    pub fn evaluate_cell<F: Forecaster>(
        &self,
        cell_id: &str,
        model: &mut F,
    ) -> Result<HoldoutForecast, ForecastError> {
        let dataset = self.model_dataset().for_cell(cell_id)?;
        evaluate_holdout(model, &dataset, self.holdout_days, self.nb_lag_var)
    }

    /// Polygons of the cells holding at least one station.
    pub fn cell_geojson(&self) -> FeatureCollection {
        cells_to_feature_collection(&self.registry.cells())
    }
}

/// Runs the stages in order: registry, hourly aggregation, neighbor enrichment and
/// daily features.
///
/// ```no_run
/// use meteohex::{HexPipeline, PipelineConfig};
/// use std::path::PathBuf;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = HexPipeline::new(PipelineConfig::default())?;
/// let paths = vec![PathBuf::from("data/station_a.csv"), PathBuf::from("data/station_b.csv")];
///
/// let output = pipeline
///     .files(&paths)
///     .csv_output(&PathBuf::from("features.csv"))
///     .call()?;
/// println!("{}", output.features.frame);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HexPipeline {
    config: PipelineConfig,
    indexer: HexIndexer,
    aggregator: TemporalAggregator,
    enricher: NeighborEnricher,
    features: DailyFeatureBuilder,
}

#[bon]
impl HexPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, MeteohexError> {
        let indexer = config.indexer()?;
        let aggregator = TemporalAggregator::new(AggregationPlan::hourly(config.neighbor_slots));
        let features = config.feature_builder();
        Ok(Self {
            config,
            indexer,
            aggregator,
            enricher: NeighborEnricher::new(),
            features,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn indexer(&self) -> &HexIndexer {
        &self.indexer
    }

    pub fn run(&self, observations: &ObservationFrame) -> Result<PipelineOutput, MeteohexError> {
        let registry = StationRegistry::build(
            observations,
            &self.indexer,
            &self.config.neighbor_selection(),
        )?;
        let hourly = self.aggregator.aggregate(observations, &registry)?;
        let enriched = self.enricher.enrich(&hourly)?;
        let features = self.features.build(&enriched)?.collect()?;
        info!(
            "Pipeline produced {} daily rows with {} features over {} cells",
            features.frame.height(),
            features.instances.len(),
            registry.cells().len()
        );
        Ok(PipelineOutput {
            registry,
            hourly,
            enriched,
            features,
            holdout_days: self.config.holdout_days,
            nb_lag_var: self.config.nb_lag_var,
        })
    }

    /// Loads delimited files, runs the pipeline and optionally writes the daily features.
    ///
    /// * `.files(&[PathBuf])`: **Required.** Input files, concatenated in order.
    /// * `.csv_output(&Path)`: Optional CSV destination.
    /// * `.parquet_output(&Path)`: Optional parquet destination.
    #[builder(start_fn = files)]
    #[doc(hidden)]
    pub fn run_files(
        &self,
        #[builder(start_fn)] paths: &[PathBuf],
        csv_output: Option<&Path>,
        parquet_output: Option<&Path>,
    ) -> Result<PipelineOutput, MeteohexError> {
        let observations = load_csv(paths, &self.config.timestamp_format)?;
        let mut output = self.run(&observations)?;
        if let Some(path) = csv_output {
            write_csv(&mut output.features.frame, path)?;
        }
        if let Some(path) = parquet_output {
            write_parquet(&mut output.features.frame, path)?;
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::out_of_sample::PersistenceForecaster;
    use crate::test_support::{full, home_and_neighbor, hour, obs, LAT, LON};
    use crate::types::columns::{neighbor_precip_column, CELL_ID};
    use polars::prelude::*;
    use std::fs;

    fn precip_series(id: &str, values: [f64; 3]) -> Vec<crate::types::observation::Observation> {
        values
            .iter()
            .enumerate()
            .map(|(h, v)| obs(id, LAT, LON, hour(h as i64)).with_precipitation(*v))
            .collect()
    }

    #[test]
    fn test_three_stations_average_per_cell_hour() -> Result<(), Box<dyn std::error::Error>> {
        let mut rows = precip_series("a", [0.0, 2.0, 4.0]);
        rows.extend(precip_series("b", [1.0, 3.0, 5.0]));
        rows.extend(precip_series("c", [2.0, 4.0, 6.0]));
        let observations = ObservationFrame::from_observations(&rows)?;

        let output = HexPipeline::new(PipelineConfig::default())?.run(&observations)?;
        let hourly = output.hourly.frame.collect()?;
        let precipitation: Vec<Option<f64>> =
            hourly.column("precipitation")?.f64()?.into_iter().collect();
        assert_eq!(precipitation, vec![Some(1.0), Some(3.0), Some(5.0)]);
        assert_eq!(output.registry.cells().len(), 1);
        Ok(())
    }

    #[test]
    fn test_isolated_cell_keeps_own_precipitation() -> Result<(), Box<dyn std::error::Error>> {
        let (_, home, _) = home_and_neighbor();
        let observations =
            ObservationFrame::from_observations(&precip_series("solo", [0.5, 1.5, 2.5]))?;

        let output = HexPipeline::new(PipelineConfig::default())?.run(&observations)?;
        let enriched = output.enriched.for_cell(&home.id()).frame.collect()?;
        for slot in 0..3 {
            let values: Vec<Option<f64>> = enriched
                .column(neighbor_precip_column(slot).as_str())?
                .f64()?
                .into_iter()
                .collect();
            assert_eq!(values, vec![Some(0.5), Some(1.5), Some(2.5)]);
        }
        Ok(())
    }

    #[test]
    fn test_daily_features_and_geojson() -> Result<(), Box<dyn std::error::Error>> {
        let (_, home, neighbor) = home_and_neighbor();
        let there = neighbor.center();
        let mut rows = Vec::new();
        for day in 0..5 {
            for h in [0, 12] {
                let ts = hour(day * 24 + h);
                rows.push(full("home", LAT, LON, ts, day as f64));
                rows.push(full("next", there.latitude(), there.longitude(), ts, 10.0 + day as f64));
            }
        }
        let observations = ObservationFrame::from_observations(&rows)?;
        let output = HexPipeline::new(PipelineConfig::default())?.run(&observations)?;

        let df = &output.features.frame;
        assert_eq!(df.height(), 8);
        let homes = df
            .column(CELL_ID)?
            .str()?
            .into_iter()
            .filter(|c| *c == Some(home.id().as_str()))
            .count();
        assert_eq!(homes, 4);
        assert!(df.column("neighbor_0_precip_mean_lag_1").is_ok());
        assert_eq!(output.cell_geojson().features.len(), 2);

        let dataset = output.model_dataset().for_cell(&home.id())?;
        assert_eq!(dataset.len(), 4);
        Ok(())
    }

    #[test]
    fn test_holdout_days_drive_evaluation() -> Result<(), Box<dyn std::error::Error>> {
        let (_, home, _) = home_and_neighbor();
        let mut rows = Vec::new();
        for day in 0..5 {
            for h in [0, 12] {
                rows.push(full("home", LAT, LON, hour(day * 24 + h), day as f64));
            }
        }
        let observations = ObservationFrame::from_observations(&rows)?;
        let config = PipelineConfig::builder().holdout_days(2).build();
        let output = HexPipeline::new(config)?.run(&observations)?;
        assert_eq!(output.holdout_days(), 2);

        // Days 2016-01-02..05 survive the first lag; the last two are held out.
        let prepared = output.prepare()?;
        assert_eq!(prepared.split.x_train.height(), 2);
        assert_eq!(prepared.split.x_test.height(), 2);

        let dataset = output.model_dataset();
        let mut model = PersistenceForecaster::new(dataset.instances(), dataset.target())?;
        let forecast = output.evaluate_cell(&home.id(), &mut model)?;
        assert_eq!(forecast.actual, vec![3.0, 4.0]);
        assert_eq!(forecast.predicted, vec![2.0, 2.0]);
        assert_eq!(forecast.mae, 1.5);
        Ok(())
    }

    #[test]
    fn test_run_files_writes_features() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("obs.csv");
        let mut csv = String::from("station_id,latitude,longitude,elevation,timestamp,wind_direction,wind_speed,precipitation,humidity,dew_point,temperature,pressure\n");
        for day in 1..=4 {
            csv.push_str(&format!(
                "31069001,43.6,1.44,150,201601{day:02} 00:06,200,3.0,{day}.0,80,2.0,6.0,101500\n"
            ));
        }
        fs::write(&input, csv)?;
        let csv_out = dir.path().join("features.csv");
        let parquet_out = dir.path().join("features.parquet");

        let output = HexPipeline::new(PipelineConfig::default())?
            .files(&[input])
            .csv_output(&csv_out)
            .parquet_output(&parquet_out)
            .call()?;
        assert_eq!(output.features.frame.height(), 3);
        assert!(csv_out.exists());
        let back = LazyFrame::scan_parquet(&parquet_out, Default::default())?.collect()?;
        assert_eq!(back.height(), 3);
        Ok(())
    }
}
