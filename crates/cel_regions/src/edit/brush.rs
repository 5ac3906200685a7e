use cel_raster::{Grid, Rgba, Vec2};

/// Round brush that paints pointer strokes into a scribble layer.
///
/// Successive samples of a stroke are joined by stamping discs every
/// `0.9 * radius` pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ScribbleBrush {
    radius: u32,
    color: Rgba,
    last: Option<Vec2>,
}

impl ScribbleBrush {
    /// Create a new brush; a zero radius is raised to 1
    pub fn new(radius: u32, color: Rgba) -> Self {
        Self {
            radius: radius.max(1),
            color,
            last: None,
        }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: u32) {
        self.radius = radius.max(1);
    }

    /// Stamp one filled disc centered on `center`
    pub fn stamp(&self, layer: &mut Grid<Rgba>, center: Vec2) {
        let r = self.radius as f32;
        let (cx, cy) = (center.x.round() as i32, center.y.round() as i32);
        let ri = self.radius as i32;
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                if ((dx * dx + dy * dy) as f32) <= r * r {
                    layer.set(cx + dx, cy + dy, self.color);
                }
            }
        }
    }

    /// Continue the current stroke to `point`
    pub fn stroke_to(&mut self, layer: &mut Grid<Rgba>, point: Vec2) {
        match self.last {
            None => self.stamp(layer, point),
            Some(from) => {
                let step = 0.9 * self.radius as f32;
                let length = from.distance(point);
                let steps = (length / step).ceil().max(1.0) as usize;
                for i in 1..=steps {
                    let t = i as f32 / steps as f32;
                    self.stamp(layer, from.lerp(point, t));
                }
            }
        }
        self.last = Some(point);
    }

    pub fn end_stroke(&mut self) {
        self.last = None;
    }
}
