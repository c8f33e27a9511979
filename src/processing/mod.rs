pub mod daily_features;
pub mod error;
pub mod neighbor_enricher;
pub mod splitter;
pub mod temporal_aggregator;
