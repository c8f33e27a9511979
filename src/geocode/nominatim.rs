use crate::geocode::error::GeocodeError;
use crate::geocode::reverse::ReverseGeocoder;
use crate::types::station::LatLon;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const NOMINATIM_REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// Reverse geocoder backed by a Nominatim `/reverse` endpoint.
///
/// The region name is the `state` of the returned address, falling back to `region`,
/// `county` and finally the display name.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    zoom: u8,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct Address {
    state: Option<String>,
    region: Option<String>,
    county: Option<String>,
}

impl ReverseResponse {
    fn into_region(self) -> Option<String> {
        self.address
            .and_then(|a| a.state.or(a.region).or(a.county))
            .or(self.display_name)
    }
}

impl NominatimGeocoder {
    /// Nominatim's usage policy requires an identifying user agent.
    pub fn new(user_agent: &str) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(GeocodeError::ClientBuild)?;
        Ok(Self {
            client,
            base_url: NOMINATIM_REVERSE_URL.to_string(),
            zoom: 5,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Address detail level; 5 resolves to states and provinces.
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    async fn region_name(&self, location: LatLon) -> Result<String, GeocodeError> {
        let url = format!(
            "{}?format=jsonv2&lat={}&lon={}&zoom={}",
            self.base_url,
            location.latitude(),
            location.longitude(),
            self.zoom
        );
        debug!("Reverse geocoding {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GeocodeError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(match e.status() {
                    Some(status) => GeocodeError::HttpStatus {
                        url,
                        status,
                        source: e,
                    },
                    None => GeocodeError::NetworkRequest(url, e),
                });
            }
        };

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Decode(url.clone(), e))?;
        body.into_region().ok_or(GeocodeError::NoLabel {
            latitude: location.latitude(),
            longitude: location.longitude(),
        })
    }
}
