use std::fmt;

use glam::Vec3;

/// 8-bit sRGB color, the same precision the color pickers in the outliner work with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::from_hex(0x000000);
    pub const WHITE: Color = Color::from_hex(0xffffff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        u32::from_str_radix(digits, 16).ok().map(Self::from_hex)
    }

    pub fn to_srgb_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    pub fn from_srgb_f32(rgb: [f32; 3]) -> Self {
        let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]))
    }

    /// Linear-space RGB for shading. The surface format is sRGB, so colors are
    /// converted once here instead of in the shader.
    pub fn to_linear(self) -> Vec3 {
        fn decode(channel: u8) -> f32 {
            let c = channel as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }

        Vec3::new(decode(self.r), decode(self.g), decode(self.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_string_matches_display() {
        let color = Color::from_hex(0x1a2b3c);
        assert_eq!(color.to_string(), "#1a2b3c");
        assert_eq!(Color::parse_hex("#1a2b3c"), Some(color));
        assert_eq!(Color::parse_hex("1a2b3c"), Some(color));
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert_eq!(Color::parse_hex("#12345"), None);
        assert_eq!(Color::parse_hex("#gg0000"), None);
        assert_eq!(Color::parse_hex(""), None);
    }

    #[test]
    fn linear_conversion_keeps_extremes() {
        assert_eq!(Color::BLACK.to_linear(), Vec3::ZERO);
        assert!((Color::WHITE.to_linear() - Vec3::ONE).abs().max_element() < 1e-6);
    }

    #[test]
    fn float_conversion_clamps() {
        assert_eq!(Color::from_srgb_f32([2.0, -1.0, 0.5]), Color::new(255, 0, 128));
    }
}
