//! Conversions between [`Grid`] and `image` buffers.
//!
//! A [`Grid`] stores row 0 at the bottom of the picture; `image` buffers store
//! row 0 at the top. [`flip_row`] is the only place that maps one onto the
//! other, and every conversion in this module goes through it.

use image::{GrayImage, Luma, RgbImage, RgbaImage};

use crate::color::{Rgb, Rgba};
use crate::error::Result;
use crate::grid::Grid;

/// Map a row index between bottom-up grids and top-down images.
///
/// The mapping is its own inverse. Rows outside `0..height` are mirrored
/// the same way, which keeps off-image geometry consistent.
#[inline]
pub fn flip_row(y: i32, height: u32) -> i32 {
    height as i32 - 1 - y
}

fn from_image<P, T, F>(image: &image::ImageBuffer<P, Vec<u8>>, convert: F) -> Result<Grid<T>>
where
    P: image::Pixel<Subpixel = u8>,
    F: Fn(&P) -> T,
{
    let (w, h) = image.dimensions();
    let mut data = Vec::with_capacity(w as usize * h as usize);
    for gy in 0..h {
        let iy = flip_row(gy as i32, h) as u32;
        for x in 0..w {
            data.push(convert(image.get_pixel(x, iy)));
        }
    }
    Grid::from_vec(w, h, data)
}

fn to_image<P, T, F>(grid: &Grid<T>, convert: F) -> image::ImageBuffer<P, Vec<u8>>
where
    P: image::Pixel<Subpixel = u8>,
    F: Fn(&T) -> P,
{
    let (w, h) = (grid.width(), grid.height());
    image::ImageBuffer::from_fn(w, h, |x, iy| {
        let gy = flip_row(iy as i32, h);
        convert(grid.at(x as i32, gy))
    })
}

/// Read an RGB image into a bottom-up color grid
pub fn rgb_grid_from_image(image: &RgbImage) -> Result<Grid<Rgb>> {
    from_image(image, |p| Rgb::from(*p))
}

pub fn rgb_grid_to_image(grid: &Grid<Rgb>) -> RgbImage {
    to_image(grid, |c| image::Rgb::from(*c))
}

/// Read an RGBA image (e.g. a scribble layer) into a bottom-up grid
pub fn rgba_grid_from_image(image: &RgbaImage) -> Result<Grid<Rgba>> {
    from_image(image, |p| Rgba::from(*p))
}

pub fn rgba_grid_to_image(grid: &Grid<Rgba>) -> RgbaImage {
    to_image(grid, |c| image::Rgba::from(*c))
}

/// Render any grid as an 8-bit grayscale image through `to_gray`
pub fn gray_from_grid<T, F>(grid: &Grid<T>, to_gray: F) -> GrayImage
where
    F: Fn(&T) -> u8,
{
    to_image(grid, |v| Luma([to_gray(v)]))
}

/// Read a grayscale image back into a bottom-up grid
pub fn grid_from_gray(image: &GrayImage) -> Result<Grid<u8>> {
    from_image(image, |p| p.0[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_row_is_involution() {
        for y in 0..7 {
            assert_eq!(flip_row(flip_row(y, 7), 7), y);
        }
        assert_eq!(flip_row(0, 7), 6);
    }

    #[test]
    fn test_bottom_row_is_last_image_row() {
        let mut img = RgbImage::new(2, 3);
        img.put_pixel(1, 2, image::Rgb([255, 0, 0]));

        let grid = rgb_grid_from_image(&img).expect("Should convert image");
        assert_eq!(*grid.at(1, 0), Rgb::new(255, 0, 0));
        assert_eq!(*grid.at(1, 2), Rgb::BLACK);

        let back = rgb_grid_to_image(&grid);
        assert_eq!(back, img);
    }

    #[test]
    fn test_gray_round_trip_keeps_orientation() {
        let grid = Grid::from_vec(1, 2, vec![10u8, 20]).expect("Should build grid");
        let gray = gray_from_grid(&grid, |v| *v);
        assert_eq!(gray.get_pixel(0, 0).0[0], 20);
        let back = grid_from_gray(&gray).expect("Should convert image");
        assert_eq!(back, grid);
    }

    #[test]
    fn test_rgba_conversion() {
        let mut img = RgbaImage::new(1, 1);
        img.put_pixel(0, 0, image::Rgba([1, 2, 3, 4]));
        let grid = rgba_grid_from_image(&img).expect("Should convert image");
        assert_eq!(*grid.at(0, 0), Rgba::new(1, 2, 3, 4));
        assert_eq!(rgba_grid_to_image(&grid), img);
    }
}
