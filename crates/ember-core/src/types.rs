//! Common value types

use serde::{Deserialize, Serialize};

/// Linear RGB color, each channel nominally in [0, 1].
///
/// Serialized as a plain `[r, g, b]` array.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const RED: Self = Self::new(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// Clamp every channel into [0, 1]; NaN channels become 0.
    pub fn saturate(&self) -> Self {
        let c = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self::new(c(self.r), c(self.g), c(self.b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f32; 3]> for Color {
    fn from(arr: [f32; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

impl From<Color> for [f32; 3] {
    fn from(c: Color) -> Self {
        c.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex() {
        let c = Color::from_hex(0xFF8800);
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!((c.g - 0.533).abs() < 0.01);
        assert!(c.b.abs() < 1e-6);
    }

    #[test]
    fn lerp_midpoint() {
        let mid = Color::WHITE.lerp(&Color::BLACK, 0.5);
        for c in mid.to_array() {
            assert!((c - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn saturate_clamps_and_scrubs_nan() {
        let c = Color::new(f32::NAN, 2.0, -1.0).saturate();
        assert_eq!(c, Color::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn toml_array_form() {
        #[derive(Deserialize)]
        struct Wrap {
            color: Color,
        }
        let w: Wrap = toml::from_str("color = [0.25, 0.5, 1.0]").unwrap();
        assert_eq!(w.color, Color::new(0.25, 0.5, 1.0));
    }
}
