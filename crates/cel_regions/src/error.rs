use cel_raster::RasterError;
use thiserror::Error;

use crate::types::{LinkId, RegionId, View};

#[derive(Error, Debug)]
pub enum RegionError {
    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),

    #[error("Source raster is empty")]
    EmptyRaster,

    #[error("Dimension mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },

    #[error("Region {id} not found in {view} view")]
    RegionNotFound { view: View, id: RegionId },

    #[error("Link {0} not found")]
    LinkNotFound(LinkId),

    #[error("Operation requires at least {required} linked views, found {linked}")]
    NotEnoughLinkedViews { required: usize, linked: usize },

    #[error("Feature point {index} out of range for a boundary of {len} pixels")]
    FeaturePointOutOfRange { index: usize, len: usize },

    #[error("Feature point {0} already exists")]
    DuplicateFeaturePoint(usize),

    #[error("Feature point {index} must lie strictly between {lower} and {upper}")]
    FeaturePointOrder {
        index: usize,
        lower: usize,
        upper: usize,
    },

    #[error("Region {0} has an empty boundary")]
    EmptyBoundary(RegionId),

    #[error("Scribble does not touch region {0}")]
    ScribbleOutsideRegion(RegionId),

    #[error("Invalid edit state: {0}")]
    InvalidEditState(String),

    #[error("Linked regions have different line counts: {front} vs {side}")]
    MismatchedLines { front: usize, side: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

pub type Result<T> = std::result::Result<T, RegionError>;

/// Fail with [`RegionError::DimensionMismatch`] unless both grids have the same size
pub(crate) fn ensure_same_size<A, B>(
    expected: &cel_raster::Grid<A>,
    actual: &cel_raster::Grid<B>,
) -> Result<()> {
    if expected.same_size(actual) {
        Ok(())
    } else {
        Err(RegionError::DimensionMismatch {
            expected_width: expected.width(),
            expected_height: expected.height(),
            width: actual.width(),
            height: actual.height(),
        })
    }
}
