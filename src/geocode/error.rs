use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode geocoding response from {0}")]
    Decode(String, #[source] reqwest::Error),

    #[error("No region name found for ({latitude}, {longitude})")]
    NoLabel { latitude: f64, longitude: f64 },
}
