use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Number, Value as JsonValue, json};

use crate::{
    error::Result,
    frame::Frame,
    link::LinkTable,
    region::Region,
    session::Session,
    types::View,
};

fn number(value: f64) -> JsonValue {
    Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number)
}

/// Closed exterior ring of a region's boundary, in grid coordinates
fn ring(region: &Region) -> Vec<Vec<f64>> {
    let mut ring: Vec<Vec<f64>> = region
        .boundary()
        .iter()
        .map(|p| vec![p.x as f64, p.y as f64])
        .collect();
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }
    ring
}

fn region_feature(region: &Region, links: &LinkTable, view: View) -> Feature {
    let bbox = region.bbox();
    let pos = region.pos3d();
    let link_id = links.record_of(view, region.id()).map(|record| record.id());

    let mut properties = Map::new();
    properties.insert("id".to_string(), JsonValue::from(region.id()));
    properties.insert("color".to_string(), JsonValue::String(region.color().to_hex()));
    properties.insert("area".to_string(), JsonValue::from(region.area()));
    properties.insert("perimeter".to_string(), number(region.perimeter() as f64));
    properties.insert("bbox".to_string(), json!(bbox.to_array()));
    properties.insert("link_id".to_string(), link_id.map_or(JsonValue::Null, JsonValue::from));
    properties.insert(
        "pos3d".to_string(),
        JsonValue::Array(vec![number(pos.x as f64), number(pos.y as f64), number(pos.z as f64)]),
    );
    properties.insert("feature_points".to_string(), json!(region.feature_points()));

    Feature {
        bbox: Some(vec![
            bbox.min.x as f64,
            bbox.min.y as f64,
            bbox.max.x as f64,
            bbox.max.y as f64,
        ]),
        geometry: Some(Geometry::new(Value::Polygon(vec![ring(region)]))),
        id: Some(geojson::feature::Id::Number(Number::from(region.id()))),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Export the regions of a frame as a GeoJSON feature collection, one
/// polygon per region in id order
pub fn frame_to_geojson(frame: &Frame, links: &LinkTable) -> FeatureCollection {
    let features = frame
        .regions()
        .map(|region| region_feature(region, links, frame.view()))
        .collect();

    // Add metadata to foreign members of the FeatureCollection
    let mut foreign_members = Map::new();
    foreign_members.insert("image_width".to_string(), JsonValue::from(frame.width()));
    foreign_members.insert("image_height".to_string(), JsonValue::from(frame.height()));
    foreign_members.insert("view".to_string(), JsonValue::String(frame.view().to_string()));
    foreign_members.insert("region_count".to_string(), JsonValue::from(frame.len()));

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

impl Session {
    /// Export one view's regions to GeoJSON
    pub fn frame_geojson(&self, view: View) -> FeatureCollection {
        frame_to_geojson(self.frame(view), self.links())
    }

    /// Export to GeoJSON and serialize to JSON string
    pub fn frame_geojson_string(&self, view: View) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.frame_geojson(view))?)
    }

    /// Save GeoJSON to file
    pub fn save_frame_geojson(&self, view: View, path: impl AsRef<std::path::Path>) -> Result<()> {
        std::fs::write(path, self.frame_geojson_string(view)?)?;
        Ok(())
    }
}
