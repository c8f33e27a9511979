//! Pipeline configuration.

use crate::data::error::DataError;
use crate::data::loader::DEFAULT_TIMESTAMP_FORMAT;
use crate::forecast::dataset::DEFAULT_HOLDOUT_DAYS;
use crate::hex::error::HexError;
use crate::hex::indexer::HexIndexer;
use crate::processing::daily_features::{DailyFeatureBuilder, DEFAULT_TARGET};
use crate::stations::registry::{NeighborSelection, RingOrder};
use bon::Builder;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for every stage of [`crate::HexPipeline`].
///
/// Missing keys in a JSON config take the builder defaults.
///
/// ```
/// use meteohex::PipelineConfig;
///
/// let config = PipelineConfig::builder().resolution(5).nb_lag_var(3).build();
/// assert_eq!(config.resolution, 5);
/// assert_eq!(config.neighbor_slots, 3);
/// assert_eq!(config.holdout_days, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct PipelineConfig {
    /// H3 resolution, 0 to 15.
    #[builder(default = 3)]
    pub resolution: u8,
    #[builder(default = 3)]
    pub neighbor_slots: usize,
    #[builder(default)]
    pub ring_order: RingOrder,
    /// Whether a station's own cell may fill one of its neighbor slots.
    #[builder(default = true)]
    pub include_origin: bool,
    /// chrono format of the `timestamp` column in input files.
    #[builder(default = DEFAULT_TIMESTAMP_FORMAT.to_string())]
    pub timestamp_format: String,
    #[builder(default = DEFAULT_TARGET.to_string())]
    pub target: String,
    #[builder(default = true)]
    pub calendar_and_lags: bool,
    #[builder(default = 1)]
    pub nb_lag_var: usize,
    #[builder(default = 1)]
    pub nb_lag_exo: usize,
    #[builder(default = DEFAULT_HOLDOUT_DAYS)]
    pub holdout_days: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, DataError> {
        let raw =
            fs::read_to_string(path).map_err(|e| DataError::ConfigRead(path.to_path_buf(), e))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| DataError::ConfigParse(path.to_path_buf(), e))?;
        info!("Loaded pipeline config from {:?}", path);
        Ok(config)
    }

    pub fn indexer(&self) -> Result<HexIndexer, HexError> {
        HexIndexer::new(self.resolution)
    }

    pub fn neighbor_selection(&self) -> NeighborSelection {
        NeighborSelection {
            slots: self.neighbor_slots,
            order: self.ring_order,
            include_origin: self.include_origin,
        }
    }

    pub fn feature_builder(&self) -> DailyFeatureBuilder {
        DailyFeatureBuilder::builder()
            .target(self.target.clone())
            .calendar_and_lags(self.calendar_and_lags)
            .nb_lag_var(self.nb_lag_var)
            .nb_lag_exo(self.nb_lag_exo)
            .build()
    }
}
