use cel_raster::{IVec2, Mat3, Vec2, Vec3};
use geo_types::{Coord, LineString};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::config::{PITCH_LIMIT, YAW_LIMIT};

/// Region identifier, unique within one frame
pub type RegionId = u32;

/// Identifier of a cross-view link record
pub type LinkId = u32;

/// The two views of a character. `Front` is the main view: every colored
/// pixel of the front image belongs to a region with a link record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, EnumCount, VariantNames, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum View {
    Front,
    Side,
}

impl View {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_main(self) -> bool {
        self == View::Front
    }

    /// The opposite view
    pub fn other(self) -> View {
        match self {
            View::Front => View::Side,
            View::Side => View::Front,
        }
    }
}

/// Axis-aligned pixel bounding box, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: IVec2,
    pub max: IVec2,
}

impl BoundingBox {
    /// Smallest box containing every point, `None` for an empty slice
    pub fn from_points(points: &[IVec2]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max).as_vec2() * 0.5
    }

    /// Extent as `max - min` (zero for a single pixel)
    pub fn extent(&self) -> Vec2 {
        (self.max - self.min).as_vec2()
    }

    pub fn contains(&self, p: IVec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn to_array(&self) -> [i32; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }
}

/// Rotation of a view in degrees. Pitch turns about the x axis, yaw about the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ViewRotation {
    pub pitch: f32,
    pub yaw: f32,
}

impl ViewRotation {
    /// Create a new rotation, clamped to the allowed range
    pub fn new(pitch: f32, yaw: f32) -> Self {
        Self { pitch, yaw }.clamped()
    }

    pub fn clamped(self) -> Self {
        Self {
            pitch: self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            yaw: self.yaw.clamp(-YAW_LIMIT, YAW_LIMIT),
        }
    }

    /// Pose matrix `RotY(yaw) * RotX(pitch)`
    pub fn pose(&self) -> Mat3 {
        Mat3::from_rotation_y(self.yaw.to_radians()) * Mat3::from_rotation_x(self.pitch.to_radians())
    }

    /// Where the pose sends the +Z axis
    pub fn direction(&self) -> Vec3 {
        self.pose() * Vec3::Z
    }

    /// Per-axis difference `other - self`
    pub fn delta(&self, other: &ViewRotation) -> ViewRotation {
        ViewRotation {
            pitch: other.pitch - self.pitch,
            yaw: other.yaw - self.yaw,
        }
    }
}

/// One boundary segment between two consecutive feature points
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Line {
    pub points: Vec<Vec2>,
}

impl Line {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Polyline length
    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::new(
            self.points
                .iter()
                .map(|p| Coord { x: p.x as f64, y: p.y as f64 })
                .collect(),
        )
    }
}
