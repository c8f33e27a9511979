use crate::data::error::DataError;
use crate::forecast::error::ForecastError;
use crate::geocode::error::GeocodeError;
use crate::hex::error::HexError;
use crate::processing::error::ProcessingError;
use crate::stations::error::StationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeteohexError {
    #[error(transparent)]
    Hex(#[from] HexError),

    #[error(transparent)]
    Station(#[from] StationError),

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("Failed processing DataFrame: {0}")]
    Polars(#[from] polars::error::PolarsError),
}
