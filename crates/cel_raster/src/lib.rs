//! # Cel Raster - Grids, Colors and Orientation
//!
//! The small raster layer shared by the cel region crates: a dense 2D grid
//! with clamped addressing and bilinear sampling, 8-bit color types, and the
//! conversions to and from `image` buffers.
//!
//! ## Orientation
//!
//! Grids are bottom-up: row 0 is the bottom of the picture and y grows
//! upward. `image` buffers are top-down. [`orientation::flip_row`] is the one
//! function that converts between the two.
//!
//! ## Example
//!
//! ```rust
//! use cel_raster::{Grid, Rgb};
//!
//! let mut grid = Grid::new(4, 4, Rgb::WHITE)?;
//! grid.set(1, 2, Rgb::new(255, 0, 0));
//!
//! let image = cel_raster::orientation::rgb_grid_to_image(&grid);
//! // grid row 2 of 4 is image row 1
//! assert_eq!(image.get_pixel(1, 1).0, [255, 0, 0]);
//! # Ok::<(), cel_raster::RasterError>(())
//! ```

pub mod color;
pub mod error;
pub mod grid;
pub mod orientation;

pub use color::{Lerp, Rgb, Rgba};
pub use error::{RasterError, Result};
pub use grid::Grid;

pub use glam::{IVec2, Mat3, Vec2, Vec3};

/// The 4-connected neighbor offsets: left, right, down, up
pub const NEIGHBORS_4: [IVec2; 4] = [
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(0, -1),
    IVec2::new(0, 1),
];
