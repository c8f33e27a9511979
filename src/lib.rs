mod config;
mod error;
mod frames;
mod pipeline;
mod processing;
mod stations;
mod types;

pub mod data;
pub mod forecast;
pub mod geocode;
pub mod hex;

#[cfg(test)]
mod test_support;

pub use config::PipelineConfig;
pub use error::MeteohexError;
pub use pipeline::*;

pub use frames::cell_hourly_frame::*;
pub use frames::daily_feature_frame::*;
pub use frames::observation_frame::*;

pub use types::aggregation::{AggregationPlan, AggregationRule, ColumnAggregation, ColumnNaming};
pub use types::cell::{CellBoundary, HexCell, BOUNDARY_TOLERANCE_DEG};
pub use types::columns;
pub use types::observation::{Indicator, Observation};
pub use types::station::*;

pub use hex::indexer::{cell_of, parse_cell, HexIndexer};
pub use stations::registry::{NeighborSelection, RingOrder, StationRegistry};

pub use processing::daily_features::{DailyFeatureBuilder, DEFAULT_TARGET, PRECIPITATION_RANGE};
pub use processing::neighbor_enricher::{merge_neighbor_precip, NeighborEnricher};
pub use processing::splitter::{split, ChronologicalSplit, SplitBoundary};
pub use processing::temporal_aggregator::{round_to_hour, TemporalAggregator};

pub use hex::error::HexError;
pub use processing::error::ProcessingError;
pub use stations::error::StationError;
