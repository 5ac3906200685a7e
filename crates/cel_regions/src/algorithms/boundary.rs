use cel_raster::{Grid, IVec2, NEIGHBORS_4};
use geo::Area;
use geo_types::{Coord, LineString, Polygon};
use tracing::{debug, warn};

use crate::config::{CHAIN_JUMP_LIMIT, MAX_BOUNDARY_PIXELS};
use crate::types::BoundingBox;

/// Moore neighborhood in walk priority order
const MOORE_OFFSETS: [IVec2; 8] = [
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
    IVec2::new(1, 0),
    IVec2::new(1, 1),
    IVec2::new(0, 1),
    IVec2::new(-1, 1),
    IVec2::new(-1, 0),
];

/// Ordered outline of a region with its bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub pixels: Vec<IVec2>,
    pub bbox: BoundingBox,
}

/// A set cell is on the boundary if it touches the grid edge or an unset
/// 4-neighbor
#[inline]
pub fn is_boundary(mask: &Grid<bool>, p: IVec2) -> bool {
    mask.get(p.x, p.y) == Some(&true)
        && NEIGHBORS_4
            .iter()
            .any(|o| mask.get(p.x + o.x, p.y + o.y) != Some(&true))
}

/// Raw Moore-neighbor walk over every boundary fragment, in scan order of
/// each fragment's first pixel
pub fn trace_contour(mask: &Grid<bool>) -> Vec<IVec2> {
    let mut visited = Grid::like(mask, false);
    let mut out = Vec::new();

    for y in 0..mask.height() as i32 {
        for x in 0..mask.width() as i32 {
            let start = IVec2::new(x, y);
            if *visited.at(x, y) || !is_boundary(mask, start) {
                continue;
            }

            out.push(start);
            visited.set(x, y, true);
            let mut current = start;
            loop {
                if out.len() >= MAX_BOUNDARY_PIXELS {
                    warn!(cap = MAX_BOUNDARY_PIXELS, "boundary trace hit the pixel cap, truncating");
                    return out;
                }
                let next = MOORE_OFFSETS.iter().map(|o| current + *o).find(|n| {
                    visited.get(n.x, n.y) == Some(&false) && is_boundary(mask, *n)
                });
                match next {
                    Some(n) => {
                        out.push(n);
                        visited.set(n.x, n.y, true);
                        current = n;
                    }
                    None => {
                        let gap = current - start;
                        if gap.x.abs() <= 1 && gap.y.abs() <= 1 {
                            debug!(start = %start, "closed boundary fragment");
                        } else {
                            warn!(start = %start, end = %current, "boundary walk hit a dead end");
                        }
                        break;
                    }
                }
            }
        }
    }
    out
}

/// Reorder points by greedy nearest-neighbor chaining from the first point.
///
/// Ties go to the earlier point. The chain stops when the nearest remaining
/// point is more than [`CHAIN_JUMP_LIMIT`] away; the rest is dropped.
pub fn chain_nearest(points: &[IVec2]) -> Vec<IVec2> {
    let Some((&first, rest)) = points.split_first() else {
        return Vec::new();
    };
    let limit = CHAIN_JUMP_LIMIT * CHAIN_JUMP_LIMIT;
    let mut remaining = rest.to_vec();
    let mut chain = Vec::with_capacity(points.len());
    chain.push(first);
    let mut current = first;

    while !remaining.is_empty() {
        let mut best = 0;
        let mut best_dist = i32::MAX;
        for (i, p) in remaining.iter().enumerate() {
            let d = (*p - current).length_squared();
            if d < best_dist {
                best = i;
                best_dist = d;
            }
        }
        if best_dist as f32 > limit {
            debug!(dropped = remaining.len(), "boundary chain stopped at a gap");
            break;
        }
        current = remaining.remove(best);
        chain.push(current);
    }
    chain
}

/// Shoelace area of the closed polygon through `points`; positive when
/// counter-clockwise in grid (y-up) coordinates
pub fn signed_area(points: &[IVec2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let ring: LineString<f64> = points
        .iter()
        .map(|p| Coord { x: p.x as f64, y: p.y as f64 })
        .collect();
    Polygon::new(ring, vec![]).signed_area()
}

/// Make the winding clockwise, keeping the first point in place
pub fn normalize_winding(points: &mut [IVec2]) {
    if signed_area(points) > 0.0 {
        points[1..].reverse();
    }
}

/// Trace, chain and orient the outline of `mask`. `None` when the mask is empty.
pub fn trace_boundary(mask: &Grid<bool>) -> Option<Boundary> {
    let raw = trace_contour(mask);
    let mut pixels = chain_nearest(&raw);
    normalize_winding(&mut pixels);
    let bbox = BoundingBox::from_points(&pixels)?;
    debug!(raw = raw.len(), kept = pixels.len(), "traced boundary");
    Some(Boundary { pixels, bbox })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_mask(w: u32, h: u32, min: IVec2, max: IVec2) -> Grid<bool> {
        let mut mask = Grid::new(w, h, false).expect("Should build grid");
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                mask.set(x, y, true);
            }
        }
        mask
    }

    #[test]
    fn test_single_pixel_boundary() {
        let mask = rect_mask(10, 10, IVec2::new(5, 5), IVec2::new(5, 5));
        let boundary = trace_boundary(&mask).expect("Should trace");
        assert_eq!(boundary.pixels, vec![IVec2::new(5, 5)]);
        assert_eq!(boundary.bbox.min, IVec2::new(5, 5));
        assert_eq!(boundary.bbox.max, IVec2::new(5, 5));
    }

    #[test]
    fn test_rectangle_boundary_is_closed_and_clockwise() {
        let mask = rect_mask(12, 10, IVec2::new(2, 3), IVec2::new(8, 7));
        let boundary = trace_boundary(&mask).expect("Should trace");

        // perimeter of a 7x5 block
        assert_eq!(boundary.pixels.len(), 2 * 7 + 2 * 5 - 4);
        assert_eq!(boundary.pixels[0], IVec2::new(2, 3));
        assert!(signed_area(&boundary.pixels) < 0.0);

        let start = boundary.pixels[0];
        let last = *boundary.pixels.last().expect("Should have points");
        assert!((last - start).abs().max_element() <= 1);
        for pair in boundary.pixels.windows(2) {
            assert!((pair[1] - pair[0]).abs().max_element() <= 1);
        }
        for p in &boundary.pixels {
            assert!(is_boundary(&mask, *p));
            assert!(boundary.bbox.contains(*p));
        }
        assert_eq!(boundary.bbox.min, IVec2::new(2, 3));
        assert_eq!(boundary.bbox.max, IVec2::new(8, 7));
    }

    #[test]
    fn test_edge_pixels_are_boundary() {
        let mask = rect_mask(3, 3, IVec2::ZERO, IVec2::new(2, 2));
        assert!(is_boundary(&mask, IVec2::new(0, 1)));
        assert!(!is_boundary(&mask, IVec2::new(1, 1)));
    }

    #[test]
    fn test_chain_stops_at_large_gap() {
        let points = vec![IVec2::new(0, 0), IVec2::new(1, 0), IVec2::new(40, 0)];
        assert_eq!(chain_nearest(&points), vec![IVec2::new(0, 0), IVec2::new(1, 0)]);
    }

    #[test]
    fn test_normalize_winding_keeps_first_point() {
        let mut ccw = vec![IVec2::new(0, 0), IVec2::new(1, 0), IVec2::new(1, 1), IVec2::new(0, 1)];
        normalize_winding(&mut ccw);
        assert_eq!(ccw, vec![IVec2::new(0, 0), IVec2::new(0, 1), IVec2::new(1, 1), IVec2::new(1, 0)]);
        assert!(signed_area(&ccw) < 0.0);
    }

    #[test]
    fn test_empty_mask_has_no_boundary() {
        let mask = Grid::new(4, 4, false).expect("Should build grid");
        assert!(trace_boundary(&mask).is_none());
    }
}
