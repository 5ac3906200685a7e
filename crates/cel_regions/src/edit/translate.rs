use cel_raster::orientation::{flip_row, gray_from_grid, grid_from_gray};
use cel_raster::{Grid, IVec2};
use image::Luma;
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use tracing::{debug, info_span};

use crate::error::Result;
use crate::frame::Frame;
use crate::types::RegionId;

/// Boundary polygon of a region shifted by `offset`
pub fn offset_polygon(boundary: &[IVec2], offset: IVec2) -> Vec<IVec2> {
    boundary.iter().map(|p| *p + offset).collect()
}

/// Fill a closed polygon into a mask of the given size
pub fn rasterize_polygon(polygon: &[IVec2], width: u32, height: u32) -> Result<Grid<bool>> {
    let mut mask = Grid::new(width, height, false)?;
    let drawable = polygon.len() >= 3 && polygon.first() != polygon.last();
    if !drawable {
        for p in polygon {
            mask.set(p.x, p.y, true);
        }
        return Ok(mask);
    }

    let mut canvas = gray_from_grid(&mask, |_| 0);
    let to_image = |p: &IVec2| Point::new(p.x, flip_row(p.y, height));
    let points: Vec<Point<i32>> = polygon.iter().map(to_image).collect();
    draw_polygon_mut(&mut canvas, &points, Luma([255u8]));

    let drawn = grid_from_gray(&canvas)?;
    Ok(drawn.map(|v| *v != 0))
}

/// Move a region by `offset`: its boundary polygon is shifted, filled back
/// into the mask and re-traced. Fails without changes if nothing of the
/// region would remain on the image.
pub fn translate(frame: &mut Frame, id: RegionId, offset: IVec2) -> Result<()> {
    let _span = info_span!("translate", view = %frame.view(), id).entered();
    let (width, height) = (frame.width(), frame.height());
    let polygon = offset_polygon(frame.get(id)?.boundary(), offset);
    let mask = rasterize_polygon(&polygon, width, height)?;

    frame.get_mut(id)?.set_shape(&mask)?;
    frame.refresh_id_map();
    debug!(offset = %offset, "translated region");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rasterize_rectangle_outline() {
        let polygon = vec![
            IVec2::new(2, 1),
            IVec2::new(2, 4),
            IVec2::new(6, 4),
            IVec2::new(6, 1),
        ];
        let mask = rasterize_polygon(&polygon, 10, 8).expect("Should rasterize");
        assert_eq!(mask.count(|v| *v), 5 * 4);
        assert!(*mask.at(2, 1));
        assert!(*mask.at(6, 4));
        assert!(!*mask.at(7, 4));
    }

    #[test]
    fn test_rasterize_degenerate_polygon() {
        let mask = rasterize_polygon(&[IVec2::new(1, 1), IVec2::new(2, 1)], 4, 4).expect("Should rasterize");
        assert_eq!(mask.count(|v| *v), 2);
    }

    #[test]
    fn test_offset_polygon() {
        let moved = offset_polygon(&[IVec2::new(1, 2)], IVec2::new(3, -1));
        assert_eq!(moved, vec![IVec2::new(4, 1)]);
    }
}
