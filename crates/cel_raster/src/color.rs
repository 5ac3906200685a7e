use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Create a new color
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels scaled to the 0-1 range
    pub fn normalized(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Euclidean distance between two colors on the normalized 0-1 scale
    pub fn distance(self, other: Self) -> f32 {
        let a = self.normalized();
        let b = other.normalized();
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt()
    }

    /// Rec. 601 luma, the same weighting grayscale conversion uses
    pub fn luma(self) -> u8 {
        let l = 0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32;
        l.round().clamp(0.0, 255.0) as u8
    }

    /// Opaque RGBA version of this color
    pub fn opaque(self) -> Rgba {
        Rgba::new(self.r, self.g, self.b, 255)
    }

    /// Hex string such as `#ff8000`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<image::Rgb<u8>> for Rgb {
    fn from(p: image::Rgb<u8>) -> Self {
        Self::new(p.0[0], p.0[1], p.0[2])
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(c: Rgb) -> Self {
        image::Rgb([c.r, c.g, c.b])
    }
}

/// 8-bit RGBA color. Alpha 0 means "not painted" in masks and scribbles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Create a new color
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Whether the pixel carries any coverage
    #[inline]
    pub fn is_painted(self) -> bool {
        self.a != 0
    }

    /// Drop the alpha channel
    pub fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

impl From<image::Rgba<u8>> for Rgba {
    fn from(p: image::Rgba<u8>) -> Self {
        Self::new(p.0[0], p.0[1], p.0[2], p.0[3])
    }
}

impl From<Rgba> for image::Rgba<u8> {
    fn from(c: Rgba) -> Self {
        image::Rgba([c.r, c.g, c.b, c.a])
    }
}

/// Linear interpolation between two pixel values, used by bilinear sampling
pub trait Lerp: Copy {
    fn lerp(a: Self, b: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

#[inline]
fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    f32::lerp(a as f32, b as f32, t).round().clamp(0.0, 255.0) as u8
}

impl Lerp for Rgb {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self::new(lerp_u8(a.r, b.r, t), lerp_u8(a.g, b.g, t), lerp_u8(a.b, b.b, t))
    }
}

impl Lerp for Rgba {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self::new(
            lerp_u8(a.r, b.r, t),
            lerp_u8(a.g, b.g, t),
            lerp_u8(a.b, b.b, t),
            lerp_u8(a.a, b.a, t),
        )
    }
}
