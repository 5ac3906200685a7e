use cel_raster::{Vec2, Vec3};

use crate::types::ViewRotation;

/// A 3D line through two points, used as a back-projected view ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray3 {
    pub start: Vec3,
    pub end: Vec3,
}

impl Ray3 {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// Orthographic back-projection of a pixel position.
    ///
    /// The pixel maps to normalized device coordinates in `[-1, 1]`, and the
    /// points at depth 0 and 1 are taken through the inverse view pose.
    pub fn through_pixel(pixel: Vec2, width: u32, height: u32, rotation: &ViewRotation) -> Self {
        let ndc = Vec2::new(
            pixel.x * 2.0 / width as f32 - 1.0,
            pixel.y * 2.0 / height as f32 - 1.0,
        );
        let inverse = rotation.pose().transpose();
        Self {
            start: inverse * ndc.extend(0.0),
            end: inverse * ndc.extend(1.0),
        }
    }

    pub fn direction(&self) -> Vec3 {
        self.end - self.start
    }

    /// Closest point on the infinite line to `p`
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let dir = self.direction();
        let len_sq = dir.length_squared();
        if len_sq <= f32::EPSILON {
            return self.start;
        }
        let t = (p - self.start).dot(dir) / len_sq;
        self.start + dir * t
    }

    pub fn distance_to(&self, p: Vec3) -> f32 {
        self.closest_point(p).distance(p)
    }
}

/// Fixed-point estimate of the point nearest to all rays.
///
/// Starting from the origin, each iteration replaces the estimate with the
/// average of its projections onto every ray.
pub fn estimate_intersection(rays: &[Ray3], iterations: usize) -> Vec3 {
    if rays.is_empty() {
        return Vec3::ZERO;
    }
    let mut current = Vec3::ZERO;
    for _ in 0..iterations {
        let sum: Vec3 = rays.iter().map(|r| r.closest_point(current)).sum();
        current = sum / rays.len() as f32;
    }
    current
}
