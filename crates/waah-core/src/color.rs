//! Colors

use crate::Alpha;

/// Non-premultiplied color with channels in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// From 0-255 channels and an optional alpha (opaque when omitted)
    pub fn from_channels(r: i64, g: i64, b: i64, alpha: Option<Alpha>) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: alpha.unwrap_or_default().normalized(),
        }
    }

    /// Rasterizer color, channels clamped to [0, 1]
    pub fn to_skia(self) -> tiny_skia::Color {
        let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) as f32 };
        tiny_skia::Color::from_rgba(clamp(self.r), clamp(self.g), clamp(self.b), clamp(self.a))
            .unwrap_or(tiny_skia::Color::BLACK)
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_channels() {
        let c = Rgba::from_channels(255, 0, 51, None);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 0.2).abs() < 1e-9);
        assert_eq!(c.a, 1.0);

        let c = Rgba::from_channels(0, 0, 0, Some(Alpha::Int(102)));
        assert!((c.a - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_to_skia_clamps() {
        let c = Rgba::new(2.0, -1.0, 0.5, 1.5).to_skia();
        assert_eq!(c.red(), 1.0);
        assert_eq!(c.green(), 0.0);
        assert_eq!(c.blue(), 0.5);
        assert_eq!(c.alpha(), 1.0);
    }
}
