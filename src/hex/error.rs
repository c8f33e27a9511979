use thiserror::Error;

#[derive(Debug, Error)]
pub enum HexError {
    #[error("Coordinate out of range: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid hex resolution {0}, expected 0..=15")]
    InvalidResolution(u8, #[source] h3o::error::InvalidResolution),

    #[error("Invalid hex cell identifier '{id}': {reason}")]
    InvalidCellId { id: String, reason: String },
}
