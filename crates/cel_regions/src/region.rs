use cel_raster::{Grid, IVec2, Rgb, Rgba, Vec2, Vec3};
use tracing::debug;

use crate::algorithms::boundary::trace_boundary;
use crate::algorithms::flood_fill::{connected_component, fill_holes};
use crate::error::{RegionError, Result, ensure_same_size};
use crate::types::{BoundingBox, Line, RegionId};

/// A flat-colored closed region of one view.
///
/// The mask (`map`) is authoritative. Boundary, bounding box, area, feature
/// points and lines are derived from it and rebuilt whenever it changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    id: RegionId,
    color: Rgb,
    map: Grid<Rgba>,
    boundary: Vec<IVec2>,
    bbox: BoundingBox,
    area: usize,
    feature_points: Vec<usize>,
    lines: Vec<Line>,
    pos3d: Vec3,
}

fn paint(mask: &Grid<bool>, color: Rgb) -> Grid<Rgba> {
    let fill = color.opaque();
    mask.map(|set| if *set { fill } else { Rgba::TRANSPARENT })
}

impl Region {
    /// Create a new region covering the set cells of `mask`
    pub fn from_mask(id: RegionId, color: Rgb, mask: &Grid<bool>) -> Result<Self> {
        let boundary = trace_boundary(mask).ok_or(RegionError::EmptyBoundary(id))?;
        let mut region = Self {
            id,
            color,
            map: paint(mask, color),
            boundary: boundary.pixels,
            bbox: boundary.bbox,
            area: mask.count(|set| *set),
            feature_points: vec![0],
            lines: Vec::new(),
            pos3d: Vec3::ZERO,
        };
        region.rebuild_lines();
        Ok(region)
    }

    /// Create a new region from the cells of an id map carrying `id`
    pub fn from_ids(id: RegionId, color: Rgb, ids: &Grid<RegionId>) -> Result<Self> {
        Self::from_mask(id, color, &ids.map(|v| *v == id))
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// RGBA mask: region color inside, transparent outside
    pub fn map(&self) -> &Grid<Rgba> {
        &self.map
    }

    pub fn boundary(&self) -> &[IVec2] {
        &self.boundary
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// Number of covered pixels
    pub fn area(&self) -> usize {
        self.area
    }

    pub fn feature_points(&self) -> &[usize] {
        &self.feature_points
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn pos3d(&self) -> Vec3 {
        self.pos3d
    }

    pub fn set_pos3d(&mut self, pos: Vec3) {
        self.pos3d = pos;
    }

    pub fn center(&self) -> Vec2 {
        self.bbox.center()
    }

    pub fn width(&self) -> u32 {
        self.map.width()
    }

    pub fn height(&self) -> u32 {
        self.map.height()
    }

    #[inline]
    pub fn contains(&self, p: IVec2) -> bool {
        self.map.get(p.x, p.y).is_some_and(|px| px.is_painted())
    }

    pub fn mask(&self) -> Grid<bool> {
        self.map.map(|px| px.is_painted())
    }

    /// Length of the closed boundary polygon
    pub fn perimeter(&self) -> f32 {
        let n = self.boundary.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| self.boundary[i].as_vec2().distance(self.boundary[(i + 1) % n].as_vec2()))
            .sum()
    }

    /// Replace the shape and re-trace. Fails without changes if the mask is
    /// empty or has the wrong size. Feature points are reset.
    pub fn set_shape(&mut self, mask: &Grid<bool>) -> Result<()> {
        ensure_same_size(&self.map, mask)?;
        let boundary = trace_boundary(mask).ok_or(RegionError::EmptyBoundary(self.id))?;
        self.map = paint(mask, self.color);
        self.boundary = boundary.pixels;
        self.bbox = boundary.bbox;
        self.area = mask.count(|set| *set);
        self.reset_feature_points();
        debug!(id = self.id, area = self.area, boundary = self.boundary.len(), "region re-traced");
        Ok(())
    }

    /// Close interior holes; returns the number of pixels added
    pub fn fill_holes(&mut self) -> Result<usize> {
        let filled = fill_holes(&self.mask());
        let added = filled.count(|set| *set) - self.area;
        if added > 0 {
            self.set_shape(&filled)?;
        }
        Ok(added)
    }

    /// Paint the scribble's covered pixels into the region, keep only the
    /// part connected to the first boundary pixel and close holes
    pub fn modify(&mut self, scribble: &Grid<Rgba>) -> Result<()> {
        ensure_same_size(&self.map, scribble)?;
        let seed = *self.boundary.first().ok_or(RegionError::EmptyBoundary(self.id))?;

        let mut mask = self.mask();
        for (p, px) in scribble.enumerate() {
            if px.is_painted() {
                mask.set(p.x, p.y, true);
            }
        }
        let kept = fill_holes(&connected_component(&mask, seed));
        self.set_shape(&kept)
    }

    /// Insert a feature point at boundary index `pixel`; returns its position
    /// in the feature point list
    pub fn add_feature_point(&mut self, pixel: usize) -> Result<usize> {
        let len = self.boundary.len();
        if pixel == 0 || pixel >= len {
            return Err(RegionError::FeaturePointOutOfRange { index: pixel, len });
        }
        match self.feature_points.binary_search(&pixel) {
            Ok(_) => Err(RegionError::DuplicateFeaturePoint(pixel)),
            Err(position) => {
                self.feature_points.insert(position, pixel);
                self.rebuild_lines();
                Ok(position)
            }
        }
    }

    /// Insert a feature point at list `position`, placed at `ratio` of the
    /// boundary when that falls between its neighbors and halfway between
    /// them otherwise; returns the chosen boundary index
    pub fn insert_feature_point_at_ratio(&mut self, position: usize, ratio: f32) -> Result<usize> {
        if position == 0 || position > self.feature_points.len() {
            return Err(RegionError::FeaturePointOutOfRange {
                index: position,
                len: self.feature_points.len(),
            });
        }
        let (lower, upper) = self.neighbors(position - 1, position);
        let pixel = self.ratio_pixel(lower, upper, ratio)?;
        self.feature_points.insert(position, pixel);
        self.rebuild_lines();
        Ok(pixel)
    }

    /// Move the feature point at list `position` to boundary index `pixel`
    pub fn set_feature_point(&mut self, position: usize, pixel: usize) -> Result<()> {
        self.check_movable(position)?;
        let (lower, upper) = self.neighbors(position - 1, position + 1);
        if pixel <= lower || pixel >= upper {
            return Err(RegionError::FeaturePointOrder {
                index: pixel,
                lower,
                upper,
            });
        }
        self.feature_points[position] = pixel;
        self.rebuild_lines();
        Ok(())
    }

    /// Move the feature point at list `position` to `ratio` of the boundary,
    /// halfway between its neighbors if that would break the ordering
    pub fn move_feature_point_to_ratio(&mut self, position: usize, ratio: f32) -> Result<usize> {
        self.check_movable(position)?;
        let (lower, upper) = self.neighbors(position - 1, position + 1);
        let pixel = self.ratio_pixel(lower, upper, ratio)?;
        self.feature_points[position] = pixel;
        self.rebuild_lines();
        Ok(pixel)
    }

    pub fn remove_feature_point(&mut self, position: usize) -> Result<usize> {
        self.check_movable(position)?;
        let pixel = self.feature_points.remove(position);
        self.rebuild_lines();
        Ok(pixel)
    }

    pub fn reset_feature_points(&mut self) {
        self.feature_points = vec![0];
        self.rebuild_lines();
    }

    /// Rotate the boundary so that `index` becomes its first pixel
    pub fn set_boundary_start(&mut self, index: usize) -> Result<()> {
        let len = self.boundary.len();
        if index >= len {
            return Err(RegionError::FeaturePointOutOfRange { index, len });
        }
        self.boundary.rotate_left(index);
        self.reset_feature_points();
        Ok(())
    }

    fn check_movable(&self, position: usize) -> Result<()> {
        // the first feature point is pinned to boundary index 0
        if position == 0 || position >= self.feature_points.len() {
            return Err(RegionError::FeaturePointOutOfRange {
                index: position,
                len: self.feature_points.len(),
            });
        }
        Ok(())
    }

    /// Boundary indices of the feature points at list positions `below` and
    /// `above`, with the boundary length standing in past the end
    fn neighbors(&self, below: usize, above: usize) -> (usize, usize) {
        let lower = self.feature_points[below];
        let upper = self
            .feature_points
            .get(above)
            .copied()
            .unwrap_or(self.boundary.len());
        (lower, upper)
    }

    fn ratio_pixel(&self, lower: usize, upper: usize, ratio: f32) -> Result<usize> {
        let candidate = (self.boundary.len() as f32 * ratio.clamp(0.0, 1.0)) as usize;
        let pixel = if lower < candidate && candidate < upper {
            candidate
        } else {
            (lower + upper) / 2
        };
        if pixel <= lower || pixel >= upper {
            return Err(RegionError::FeaturePointOrder {
                index: pixel,
                lower,
                upper,
            });
        }
        Ok(pixel)
    }

    /// One line per feature point, from it to the next one inclusive; the
    /// last wraps around to boundary index 0
    fn rebuild_lines(&mut self) {
        let n = self.boundary.len();
        if n == 0 {
            self.lines.clear();
            return;
        }
        self.lines = self
            .feature_points
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let end = self.feature_points.get(i + 1).copied().unwrap_or(n);
                Line::new((start..=end).map(|k| self.boundary[k % n].as_vec2()).collect())
            })
            .collect();
    }
}
