//! RGBA color support for toolpath rendering

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};

/// Default extruder palette as hex strings (cyan, magenta, yellow, black,
/// white). Matches the palette handed out to fresh installs.
pub const DEFAULT_PALETTE_HEX: [&str; 5] =
    ["#00FFFF", "#FF00FF", "#FFFF00", "#000000", "#FFFFFF"];

/// 4-channel color with `f32` components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color4 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color4 {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional). A missing
    /// alpha component defaults to `FF`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        // Byte-indexed slicing below requires single-byte characters.
        if !digits.is_ascii() {
            return Err(ViewerError::InvalidColor {
                value: hex.to_string(),
            });
        }
        let (rgb, alpha) = match digits.len() {
            6 => (digits, "FF"),
            8 => (&digits[..6], &digits[6..]),
            _ => {
                return Err(ViewerError::InvalidColor {
                    value: hex.to_string(),
                })
            }
        };
        let channel = |s: &str| -> Result<f32> {
            u8::from_str_radix(s, 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| ViewerError::InvalidColor {
                    value: hex.to_string(),
                })
        };
        Ok(Self {
            r: channel(&rgb[0..2])?,
            g: channel(&rgb[2..4])?,
            b: channel(&rgb[4..6])?,
            a: channel(alpha)?,
        })
    }

    /// Channelwise linear interpolation with `t` clamped to `[0, 1]`.
    pub fn lerp(from: Color4, to: Color4, t: f32) -> Color4 {
        let t = t.clamp(0.0, 1.0);
        Color4 {
            r: from.r + (to.r - from.r) * t,
            g: from.g + (to.g - from.g) * t,
            b: from.b + (to.b - from.b) * t,
            a: from.a + (to.a - from.a) * t,
        }
    }

    /// Same color with a replacement alpha channel.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// The built-in 5-extruder palette.
pub fn default_palette() -> Vec<Color4> {
    vec![
        Color4::new(0.0, 1.0, 1.0, 1.0), // cyan
        Color4::new(1.0, 0.0, 1.0, 1.0), // magenta
        Color4::new(1.0, 1.0, 0.0, 1.0), // yellow
        Color4::new(0.0, 0.0, 0.0, 1.0), // black
        Color4::new(1.0, 1.0, 1.0, 1.0), // white
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_with_default_alpha() {
        let c = Color4::from_hex("#FFFF00").unwrap();
        assert_eq!(c, Color4::new(1.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn parses_rgba_and_bare_digits() {
        let c = Color4::from_hex("00FF0080").unwrap();
        assert_eq!(c.g, 1.0);
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(Color4::from_hex("#12345").is_err());
        assert!(Color4::from_hex("#GGGGGG").is_err());
    }

    #[test]
    fn rejects_multibyte_input_without_panicking() {
        // Six bytes but not six single-byte characters.
        assert!(Color4::from_hex("a\u{e9}aaa").is_err());
        assert!(Color4::from_hex("#ééé").is_err());
        assert!(Color4::from_hex("αβγδεζ").is_err());
    }

    #[test]
    fn lerp_clamps_outside_range() {
        let black = Color4::new(0.0, 0.0, 0.0, 1.0);
        let white = Color4::new(1.0, 1.0, 1.0, 1.0);
        assert_eq!(Color4::lerp(black, white, -0.5), black);
        assert_eq!(Color4::lerp(black, white, 2.0), white);
        assert_eq!(Color4::lerp(black, white, 0.5).r, 0.5);
    }

    #[test]
    fn default_palette_matches_hex_constants() {
        let palette = default_palette();
        assert_eq!(palette.len(), DEFAULT_PALETTE_HEX.len());
        for (color, hex) in palette.iter().zip(DEFAULT_PALETTE_HEX) {
            assert_eq!(*color, Color4::from_hex(hex).unwrap());
        }
    }
}
