use crate::hex::error::HexError;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StationError {
    #[error("Failed to assign a hex cell to station '{station}'")]
    Hex {
        station: String,
        #[source]
        source: HexError,
    },

    #[error("Station '{station}' has no latitude/longitude")]
    MissingCoordinate { station: String },

    #[error("Required column '{0}' not found in observations")]
    MissingColumn(String, #[source] PolarsError),

    #[error("Failed processing station metadata: {0}")]
    Polars(#[from] PolarsError),
}
