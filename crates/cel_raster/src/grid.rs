use glam::IVec2;

use crate::color::Lerp;
use crate::error::{RasterError, Result};

/// Dense row-major 2D container.
///
/// Row 0 is the bottom of the picture (y grows upward). Conversions to and
/// from top-down `image` buffers go through [`crate::orientation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a new grid filled with `value`
    pub fn new(width: u32, height: u32, value: T) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::EmptyGrid { width, height });
        }
        Ok(Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        })
    }

    /// Create a grid with the same dimensions as `other`, filled with `value`
    pub fn like<U>(other: &Grid<U>, value: T) -> Self {
        Self {
            width: other.width,
            height: other.height,
            data: vec![value; other.data.len()],
        }
    }

    /// Overwrite every cell with `value`
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Grid<T> {
    /// Wrap an existing row-major buffer (bottom row first)
    pub fn from_vec(width: u32, height: u32, data: Vec<T>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::EmptyGrid { width, height });
        }
        if data.len() != width as usize * height as usize {
            return Err(RasterError::BufferLength {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Checked access; `None` outside the grid
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<&T> {
        if self.in_bounds(x, y) {
            Some(&self.data[self.index(x as u32, y as u32)])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut T> {
        if self.in_bounds(x, y) {
            let i = self.index(x as u32, y as u32);
            Some(&mut self.data[i])
        } else {
            None
        }
    }

    /// Clamped access: coordinates outside the grid read the nearest edge cell
    #[inline]
    pub fn at(&self, x: i32, y: i32) -> &T {
        let cx = x.clamp(0, self.width as i32 - 1) as u32;
        let cy = y.clamp(0, self.height as i32 - 1) as u32;
        &self.data[self.index(cx, cy)]
    }

    /// Write a cell; writes outside the grid are ignored and return `false`
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, value: T) -> bool {
        match self.get_mut(x, y) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn same_size<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Iterate `(position, value)` in scan order, bottom row first
    pub fn enumerate(&self) -> impl Iterator<Item = (IVec2, &T)> + '_ {
        let w = self.width as usize;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (IVec2::new((i % w) as i32, (i / w) as i32), v))
    }

    /// Positions of all cells matching `pred`, in scan order
    pub fn positions<F: Fn(&T) -> bool>(&self, pred: F) -> Vec<IVec2> {
        self.enumerate()
            .filter(|(_, v)| pred(v))
            .map(|(p, _)| p)
            .collect()
    }

    pub fn count<F: Fn(&T) -> bool>(&self, pred: F) -> usize {
        self.data.iter().filter(|v| pred(v)).count()
    }
}

impl<T: Lerp> Grid<T> {
    /// Bilinear sample at a fractional position, with clamped addressing
    pub fn bilinear(&self, x: f32, y: f32) -> T {
        let x0 = x.floor();
        let y0 = y.floor();
        let tx = x - x0;
        let ty = y - y0;
        let (x0, y0) = (x0 as i32, y0 as i32);

        let bottom = T::lerp(*self.at(x0, y0), *self.at(x0 + 1, y0), tx);
        let top = T::lerp(*self.at(x0, y0 + 1), *self.at(x0 + 1, y0 + 1), tx);
        T::lerp(bottom, top, ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_grid() {
        assert!(matches!(
            Grid::new(0, 4, 0u8),
            Err(RasterError::EmptyGrid { .. })
        ));
        assert!(matches!(
            Grid::from_vec(2, 2, vec![0u8; 3]),
            Err(RasterError::BufferLength { len: 3, .. })
        ));
    }

    #[test]
    fn test_clamped_and_checked_access() {
        let grid = Grid::from_vec(3, 2, vec![1, 2, 3, 4, 5, 6]).expect("Should build grid");
        assert_eq!(grid.get(2, 1), Some(&6));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(-1, 0), None);
        assert_eq!(*grid.at(-5, -5), 1);
        assert_eq!(*grid.at(10, 10), 6);
        assert_eq!(*grid.at(1, 7), 5);
    }

    #[test]
    fn test_set_out_of_bounds_is_ignored() {
        let mut grid = Grid::new(2, 2, 0u8).expect("Should build grid");
        assert!(grid.set(1, 1, 9));
        assert!(!grid.set(2, 1, 9));
        assert_eq!(grid.count(|v| *v == 9), 1);
    }

    #[test]
    fn test_bilinear_sampling() {
        let grid = Grid::from_vec(2, 2, vec![0.0f32, 1.0, 2.0, 3.0]).expect("Should build grid");
        assert!((grid.bilinear(0.5, 0.5) - 1.5).abs() < 1e-6);
        assert!((grid.bilinear(1.0, 0.0) - 1.0).abs() < 1e-6);
        // clamped past the edge
        assert!((grid.bilinear(5.0, 5.0) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_enumerate_scan_order() {
        let grid = Grid::from_vec(2, 2, vec!['a', 'b', 'c', 'd']).expect("Should build grid");
        let positions = grid.positions(|c| *c == 'c' || *c == 'b');
        assert_eq!(positions, vec![IVec2::new(1, 0), IVec2::new(0, 1)]);
    }
}
