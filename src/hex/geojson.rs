//! GeoJSON export of cell polygons for mapping front ends.

use crate::types::cell::HexCell;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

/// One `Polygon` feature per cell, each a closed ring of `[longitude, latitude]` pairs,
/// with the cell identifier in the `cell_id` property.
pub fn cells_to_feature_collection<'a>(
    cells: impl IntoIterator<Item = &'a HexCell>,
) -> FeatureCollection {
    let features = cells.into_iter().map(cell_feature).collect();
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

pub fn cell_feature(cell: &HexCell) -> Feature {
    let ring = cell.boundary().closed_ring();
    let mut properties = JsonObject::new();
    properties.insert("cell_id".to_string(), json!(cell.id()));
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
