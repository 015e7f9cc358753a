//! Color types and utilities

use serde::{Deserialize, Serialize};

/// Packed RGBA color with u8 components
///
/// An alpha of 0 marks a paint as disabled: the tessellator skips fill or
/// stroke geometry entirely when its color is fully transparent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a grayscale color
    pub const fn gray(value: u8) -> Self {
        Self::rgb(value, value, value)
    }

    /// Create from a packed `0xAARRGGBB` integer
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Pack into `0xAARRGGBB`
    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Create an opaque color from `0xRRGGBB`; the top byte is ignored
    pub const fn from_rgb_hex(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Create from `0xRRGGBBAA`
    pub const fn from_rgba_hex(hex: u32) -> Self {
        Self::rgba((hex >> 24) as u8, (hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Set alpha and return new color
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self { a: alpha, ..self }
    }

    /// Fully transparent colors disable the paint they are assigned to
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Interpolate every channel, `t` is clamped to `[0, 1]`
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Hue in degrees, saturation and lightness in percent
    pub fn to_hsl(&self) -> (f32, f32, f32) {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;

        let cmin = r.min(g).min(b);
        let cmax = r.max(g).max(b);
        let delta = cmax - cmin;

        let mut h = if delta == 0.0 {
            0.0
        } else if cmax == r {
            ((g - b) / delta) % 6.0
        } else if cmax == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        h = (h * 60.0).round();
        if h < 0.0 {
            h += 360.0;
        }

        let l = (cmax + cmin) / 2.0;
        let s = if delta == 0.0 {
            0.0
        } else {
            delta / (1.0 - (2.0 * l - 1.0).abs())
        };

        let round1 = |v: f64| (v * 1000.0).round() / 10.0;
        (h as f32, round1(s) as f32, round1(l) as f32)
    }

    /// Normalized `[r, g, b, a]` for vertex upload
    pub fn to_array(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

impl From<u32> for Color {
    fn from(argb: u32) -> Self {
        Color::from_argb(argb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argb_roundtrip_preserves_channels() {
        let c = Color::from_argb(0x80FF4020);
        assert_eq!(c, Color::rgba(0xFF, 0x40, 0x20, 0x80));
        assert_eq!(c.to_argb(), 0x80FF4020);
    }

    #[test]
    fn test_from_hex_formats() {
        assert_eq!(Color::from_rgb_hex(0x00FF00), Color::GREEN);
        assert_eq!(Color::from_rgba_hex(0xFF000080), Color::RED.with_alpha(0x80));
        // a zero red channel must not change how the value is read
        assert_eq!(
            Color::from_rgba_hex(0x00FF0080),
            Color::GREEN.with_alpha(0x80)
        );
        assert_eq!(Color::from_rgb_hex(0x0000FF), Color::BLUE);
    }

    #[test]
    fn test_hsl() {
        assert_eq!(Color::RED.to_hsl(), (0.0, 100.0, 50.0));
        assert_eq!(Color::BLUE.to_hsl(), (240.0, 100.0, 50.0));
        assert_eq!(Color::gray(255).to_hsl(), (0.0, 0.0, 100.0));
        // magenta-ish red: red is max and g < b, hue wraps past 360
        let (h, _, _) = Color::rgb(255, 0, 128).to_hsl();
        assert_eq!(h, 330.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 0.0), Color::BLACK);
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 1.0), Color::WHITE);
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 0.5), Color::gray(128));
    }

    #[test]
    fn test_transparent_disables() {
        assert!(Color::TRANSPARENT.is_transparent());
        assert!(!Color::BLACK.is_transparent());
    }
}
