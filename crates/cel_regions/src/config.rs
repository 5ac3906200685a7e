use cel_raster::Rgb;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::error::Result;
use crate::types::{RegionId, ViewRotation};

/// Id-map value of a pixel not yet visited by segmentation
pub const UNLABELED_ID: RegionId = RegionId::MAX;
/// Id-map value of background pixels
pub const BACKGROUND_ID: RegionId = RegionId::MAX - 1;

/// Boundary traces stop after this many pixels
pub const MAX_BOUNDARY_PIXELS: usize = 100_000;
/// Largest gap (in pixels) the boundary chaining pass will bridge
pub const CHAIN_JUMP_LIMIT: f32 = 10.0;
/// Colors further apart than this (normalized RGB) never match
pub const COLOR_REJECT_DISTANCE: f32 = 0.3;
/// Regions further apart than this (normalized image coordinates) never match
pub const BOUNDARY_REJECT_DISTANCE: f32 = 0.1;
pub const DEPTH_ITERATIONS: usize = 100;
pub const PITCH_LIMIT: f32 = 90.0;
pub const YAW_LIMIT: f32 = 180.0;
pub const LINK_PALETTE_SIZE: u32 = 64;

/// Which similarity score the matcher uses
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SimilarityKind {
    /// Bounding-box proximity weighted by rotation, times a size ratio term
    #[default]
    Proximity,
    /// Mask overlap or size/compactness agreement, for nearby regions only
    Overlap,
}

/// Session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SessionConfig {
    /// Pixels of this color are background and never form a region
    pub background_color: Rgb,
    /// Merge black ink lines into their nearest region after segmentation
    pub absorb_line_art: bool,
    pub similarity: SimilarityKind,
    pub front_rotation: ViewRotation,
    pub side_rotation: ViewRotation,
    /// Outline stroke width for renderers
    #[schemars(range(min = 1, max = 32))]
    pub edge_width: u32,
    /// Scribble brush radius in pixels
    #[schemars(range(min = 1, max = 256))]
    pub brush_radius: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            background_color: Rgb::WHITE,
            absorb_line_art: true,
            similarity: SimilarityKind::Proximity,
            front_rotation: ViewRotation::new(0.0, 0.0),
            side_rotation: ViewRotation::new(0.0, 45.0),
            edge_width: 2,
            brush_radius: 1,
        }
    }
}

impl SessionConfig {
    /// Parse a config from JSON; missing fields take their defaults and
    /// rotations are clamped
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: SessionConfig = serde_json::from_str(json)?;
        config.front_rotation = config.front_rotation.clamped();
        config.side_rotation = config.side_rotation.clamped();
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Get the JSON schema for the config
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SessionConfig)
    }
}
