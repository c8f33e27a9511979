use crate::geocode::error::GeocodeError;
use crate::types::cell::HexCell;
use crate::types::station::LatLon;
use log::{info, warn};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// Resolves a coordinate to an administrative region name.
pub trait ReverseGeocoder {
    fn region_name(
        &self,
        location: LatLon,
    ) -> impl Future<Output = Result<String, GeocodeError>> + Send;
}

/// Labels every cell by reverse-geocoding its center, one request at a time.
///
/// `delay` is waited between consecutive requests. A failed lookup is logged and stored
/// as `None`; it never aborts the labeling of the remaining cells.
pub async fn label_cells<G: ReverseGeocoder>(
    geocoder: &G,
    cells: &[HexCell],
    delay: Duration,
) -> HashMap<String, Option<String>> {
    let mut labels: HashMap<String, Option<String>> = HashMap::with_capacity(cells.len());
    for cell in cells {
        let id = cell.id();
        if labels.contains_key(&id) {
            continue;
        }
        if !labels.is_empty() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let label = match geocoder.region_name(cell.center()).await {
            Ok(name) => Some(name),
            Err(e) => {
                warn!("Reverse geocoding failed for cell {}: {}", id, e);
                None
            }
        };
        labels.insert(id, label);
    }

    info!(
        "Labeled {} of {} cells",
        labels.values().filter(|l| l.is_some()).count(),
        labels.len()
    );
    labels
}
