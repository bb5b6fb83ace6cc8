//! Color types and conversion utilities.
//!
//! Class colors are generated in HSL space and converted to RGBA for the
//! drawing backends.

use std::fmt;

/// RGBA color with components in 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build an opaque color from 8-bit components.
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Color from HSL, hue in degrees, saturation and lightness in 0.0-1.0.
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let (r, g, b) = hsl_to_rgb(h, s, l);
        Self::rgb(r, g, b)
    }

    /// 8-bit RGB components, rounded.
    pub fn to_rgb8(self) -> [u8; 3] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }

    /// `#rrggbb` form, alpha dropped.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_rgb8();
        write!(f, "rgba({}, {}, {}, {})", r, g, b, self.a)
    }
}

/// Convert HSL to RGB.
///
/// # Arguments
/// * `h` - Hue in degrees (any value, wrapped into 0-360)
/// * `s` - Saturation (0.0-1.0)
/// * `l` - Lightness (0.0-1.0)
///
/// # Returns
/// RGB tuple with values in range 0.0-1.0
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    hue_sector(h.rem_euclid(360.0), c, l - c / 2.0)
}

fn hue_sector(h: f32, c: f32, m: f32) -> (f32, f32, f32) {
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsl_to_rgb_class_color() {
        // 70% saturation, 50% lightness at hue 0 -> rgb(217, 38, 38)
        let c = Color::from_hsl(0.0, 0.7, 0.5);
        assert_eq!(c.to_rgb8(), [217, 38, 38]);
    }

    #[test]
    fn test_hsl_to_rgb_blue() {
        let (r, g, b) = hsl_to_rgb(240.0, 1.0, 0.5);
        assert!(r.abs() < 0.01);
        assert!(g.abs() < 0.01);
        assert!((b - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_hue_wraps() {
        assert_eq!(
            Color::from_hsl(360.0, 0.7, 0.5).to_rgb8(),
            Color::from_hsl(0.0, 0.7, 0.5).to_rgb8()
        );
    }

    #[test]
    fn test_hex_and_display() {
        let c = Color::from_rgb8(0, 191, 255).with_alpha(0.25);
        assert_eq!(c.to_hex(), "#00bfff");
        assert_eq!(c.to_string(), "rgba(0, 191, 255, 0.25)");
    }
}
