use cel_raster::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::algorithms::resample::resample;
use crate::error::{RegionError, Result};
use crate::region::Region;
use crate::types::ViewRotation;

/// Outline of a linked region pair blended for an in-between view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolatedOutline {
    /// Blend factor: 0 is the front view, 1 the side view
    pub t: f32,
    /// Points relative to the bounding-box center, scaled by its size
    pub points: Vec<Vec2>,
    /// Blended bounding rectangle center, in pixels
    pub center: Vec2,
    /// Blended bounding rectangle size, in pixels
    pub size: Vec2,
    pub pos3d: Vec3,
}

/// Blend factor for `current` between two view rotations: the normalized
/// share of the distance to the front view direction
pub fn blend_factor(front: &ViewRotation, side: &ViewRotation, current: &ViewRotation) -> f32 {
    let here = current.direction();
    let dist = Vec2::new(
        (here - front.direction()).length(),
        (here - side.direction()).length(),
    );
    dist.normalize_or_zero().x
}

/// Blend the outlines of a front region and its side counterpart.
///
/// Both regions must have the same number of lines. Each pair of lines is
/// resampled to the larger vertex count before blending.
pub fn interpolate_outline(
    front: &Region,
    side: &Region,
    front_rotation: &ViewRotation,
    side_rotation: &ViewRotation,
    current: &ViewRotation,
) -> Result<InterpolatedOutline> {
    let (front_lines, side_lines) = (front.lines(), side.lines());
    if front_lines.len() != side_lines.len() {
        return Err(RegionError::MismatchedLines {
            front: front_lines.len(),
            side: side_lines.len(),
        });
    }
    let t = blend_factor(front_rotation, side_rotation, current);

    let (front_center, side_center) = (front.center(), side.center());
    let front_size = front.bbox().extent();
    let side_size = side.bbox().extent();
    let center = front_center.lerp(side_center, t);
    let size = front_size.lerp(side_size, t);

    // single-pixel extents would divide by zero
    let safe = |v: Vec2| v.max(Vec2::ONE);
    let (front_scale, side_scale) = (safe(front_size), safe(side_size));

    let mut points = Vec::new();
    for (fl, sl) in front_lines.iter().zip(side_lines) {
        let count = fl.len().max(sl.len());
        let fp = resample(fl, count);
        let sp = resample(sl, count);
        points.extend(fp.iter().zip(&sp).map(|(a, b)| {
            let a = (*a - front_center) / front_scale;
            let b = (*b - side_center) / side_scale;
            a.lerp(b, t)
        }));
    }

    Ok(InterpolatedOutline {
        t,
        points,
        center,
        size,
        pos3d: front.pos3d().lerp(side.pos3d(), t),
    })
}
