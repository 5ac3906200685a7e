pub mod geojson;

pub use geojson::frame_to_geojson;
