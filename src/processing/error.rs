use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("Column '{column}' has several rules but the plan keeps input names")]
    AmbiguousAggregation { column: String },

    #[error("Aggregation plan has no rules")]
    EmptyAggregation,

    #[error("Feature matrix has {features} rows but target has {target}")]
    LengthMismatch { features: usize, target: usize },

    #[error("Invalid split boundary {0}")]
    InvalidBoundary(f64),

    #[error("Split leaves no rows to train or test on")]
    EmptySplit,

    #[error("Required column '{0}' missing")]
    MissingColumn(String),
}
