#![allow(dead_code)]

use cel_regions::{Grid, Pipeline, Rgb, Rgba, Session};
use tracing_subscriber::EnvFilter;

pub const RED: Rgb = Rgb::new(220, 30, 30);
pub const BLUE: Rgb = Rgb::new(30, 30, 220);
pub const GREEN: Rgb = Rgb::new(30, 200, 30);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// White canvas
pub fn canvas(width: u32, height: u32) -> Grid<Rgb> {
    Grid::new(width, height, Rgb::WHITE).expect("Should build canvas")
}

/// Fill the inclusive rectangle `min..=max`
pub fn fill_rect(grid: &mut Grid<Rgb>, min: (i32, i32), max: (i32, i32), color: Rgb) {
    for y in min.1..=max.1 {
        for x in min.0..=max.0 {
            grid.set(x, y, color);
        }
    }
}

/// Scribble layer painted over the inclusive rectangle `min..=max`
pub fn scribble_rect(width: u32, height: u32, min: (i32, i32), max: (i32, i32)) -> Grid<Rgba> {
    let mut layer = Grid::new(width, height, Rgba::TRANSPARENT).expect("Should build layer");
    for y in min.1..=max.1 {
        for x in min.0..=max.0 {
            layer.set(x, y, Rgba::new(255, 0, 0, 255));
        }
    }
    layer
}

pub fn session(front: Grid<Rgb>, side: Grid<Rgb>) -> Session {
    init_tracing();
    Pipeline::builder()
        .build()
        .process(front, side)
        .expect("Should process both views")
}
