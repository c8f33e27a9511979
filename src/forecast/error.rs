use crate::processing::error::ProcessingError;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Required column '{0}' missing from the dataset")]
    MissingColumn(String),

    #[error("Null value in column '{column}' at row {row}")]
    NullValue { column: String, row: usize },

    #[error("Dataset has no rows")]
    EmptyDataset,

    #[error("Window length must be at least one step")]
    InvalidWindow,

    #[error("Expected {expected} values, got {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Model failed: {0}")]
    Model(String),

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error("Failed processing DataFrame: {0}")]
    Polars(#[from] PolarsError),
}
