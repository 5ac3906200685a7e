use cel_raster::Vec2;
use geo::LineInterpolatePoint;

use crate::types::Line;

/// Resample a polyline to `count` points spaced uniformly by arc length.
///
/// The first and last points are kept. A polyline with zero length yields
/// `count` copies of its first point.
pub fn resample(line: &Line, count: usize) -> Vec<Vec2> {
    let Some(&first) = line.points.first() else {
        return Vec::new();
    };
    match count {
        0 => return Vec::new(),
        1 => return vec![first],
        _ => {}
    }
    if line.points.len() == 1 || line.length() <= f32::EPSILON {
        return vec![first; count];
    }

    let path = line.to_line_string();
    (0..count)
        .map(|i| {
            let fraction = i as f64 / (count - 1) as f64;
            path.line_interpolate_point(fraction)
                .map(|p| Vec2::new(p.x() as f32, p.y() as f32))
                .unwrap_or(first)
        })
        .collect()
}
