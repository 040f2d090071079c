//! Color representation

use std::fmt;

/// Standard 56-entry indexed palette
const PALETTE: [(u8, u8, u8); 56] = [
    (0, 0, 0),
    (255, 255, 255),
    (255, 0, 0),
    (0, 255, 0),
    (0, 0, 255),
    (255, 255, 0),
    (255, 0, 255),
    (0, 255, 255),
    (0, 0, 0),
    (255, 255, 255),
    (255, 0, 0),
    (0, 255, 0),
    (0, 0, 255),
    (255, 255, 0),
    (255, 0, 255),
    (0, 255, 255),
    (128, 0, 0),
    (0, 128, 0),
    (0, 0, 128),
    (128, 128, 0),
    (128, 0, 128),
    (0, 128, 128),
    (192, 192, 192),
    (128, 128, 128),
    (153, 153, 255),
    (153, 51, 102),
    (255, 255, 204),
    (204, 255, 255),
    (102, 0, 102),
    (255, 128, 128),
    (0, 102, 204),
    (204, 204, 255),
    (0, 0, 128),
    (255, 0, 255),
    (255, 255, 0),
    (0, 255, 255),
    (128, 0, 128),
    (128, 0, 0),
    (0, 128, 128),
    (0, 0, 255),
    (0, 204, 255),
    (204, 255, 255),
    (204, 255, 204),
    (255, 255, 153),
    (153, 204, 255),
    (255, 153, 204),
    (204, 153, 255),
    (255, 204, 153),
    (51, 102, 255),
    (51, 204, 204),
    (153, 204, 0),
    (255, 204, 0),
    (255, 153, 0),
    (255, 102, 0),
    (102, 102, 153),
    (150, 150, 150),
];

/// Default Office theme: background 1, text 1, background 2, text 2, accents 1-6
const THEME: [(u8, u8, u8); 10] = [
    (255, 255, 255),
    (0, 0, 0),
    (238, 236, 225),
    (31, 73, 125),
    (79, 129, 189),
    (192, 80, 77),
    (155, 187, 89),
    (128, 100, 162),
    (75, 172, 198),
    (247, 150, 70),
];

/// Color representation
///
/// Colors set through the API are exact RGB values and survive XLSX round-trips
/// unchanged. Theme and indexed colors only arise when reading files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    /// Automatic/default color
    #[default]
    Auto,
    Rgb { r: u8, g: u8, b: u8 },
    /// RGB with an alpha channel other than fully opaque
    Argb { a: u8, r: u8, g: u8, b: u8 },
    /// Theme color with tint in percent (-100 to 100)
    Theme { index: u8, tint: i8 },
    /// Legacy palette entry
    Indexed(u8),
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const LIGHT_GRAY: Color = Color::rgb(192, 192, 192);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// ARGB color; a fully opaque alpha collapses to [`Color::Rgb`]
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        if a == 0xFF {
            Color::Rgb { r, g, b }
        } else {
            Color::Argb { a, r, g, b }
        }
    }

    /// Parse "#RRGGBB", "RRGGBB" or "AARRGGBB"
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color::argb(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// 8-character ARGB hex string as used in XLSX, e.g. "FFFF0000"
    pub fn to_argb_hex(&self) -> String {
        match self {
            Color::Argb { a, r, g, b } => format!("{:02X}{:02X}{:02X}{:02X}", a, r, g, b),
            _ => {
                let (r, g, b) = self.to_rgb();
                format!("FF{:02X}{:02X}{:02X}", r, g, b)
            }
        }
    }

    /// Resolve to an RGB triple, applying theme tint and palette lookup
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match self {
            Color::Auto => (0, 0, 0),
            Color::Rgb { r, g, b } | Color::Argb { r, g, b, .. } => (*r, *g, *b),
            Color::Theme { index, tint } => {
                let base = THEME.get(*index as usize).copied().unwrap_or((0, 0, 0));
                apply_tint(base, *tint)
            }
            Color::Indexed(i) => PALETTE.get(*i as usize).copied().unwrap_or((0, 0, 0)),
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Color::Auto)
    }
}

fn apply_tint(color: (u8, u8, u8), tint: i8) -> (u8, u8, u8) {
    let tint = tint as f64 / 100.0;
    let apply = |c: u8| -> u8 {
        let c = c as f64;
        let result = if tint < 0.0 {
            c * (1.0 + tint)
        } else {
            c + (255.0 - c) * tint
        };
        result.round().clamp(0.0, 255.0) as u8
    };
    (apply(color.0), apply(color.1), apply(color.2))
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Auto => write!(f, "auto"),
            Color::Rgb { r, g, b } => write!(f, "#{:02X}{:02X}{:02X}", r, g, b),
            Color::Argb { a, r, g, b } => write!(f, "#{:02X}{:02X}{:02X}{:02X}", a, r, g, b),
            Color::Theme { index, tint } => write!(f, "theme({}, {}%)", index, tint),
            Color::Indexed(i) => write!(f, "indexed({})", i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#FF0000"), Some(Color::RED));
        assert_eq!(Color::from_hex("FF00FF00"), Some(Color::GREEN));
        assert_eq!(
            Color::from_hex("80FFFFFF"),
            Some(Color::Argb { a: 128, r: 255, g: 255, b: 255 })
        );
        assert_eq!(Color::from_hex("12345"), None);
        assert_eq!(Color::from_hex("GG0000"), None);
    }

    #[test]
    fn test_to_argb_hex() {
        assert_eq!(Color::rgb(0x12, 0x34, 0x56).to_argb_hex(), "FF123456");
        assert_eq!(Color::Indexed(2).to_argb_hex(), "FFFF0000");
        assert_eq!(Color::argb(0x80, 1, 2, 3).to_argb_hex(), "80010203");
    }

    #[test]
    fn test_to_rgb() {
        assert_eq!(Color::Indexed(17).to_rgb(), (0, 128, 0));
        assert_eq!(Color::Theme { index: 1, tint: 0 }.to_rgb(), (0, 0, 0));
        assert_eq!(Color::Theme { index: 1, tint: 50 }.to_rgb(), (128, 128, 128));
    }
}
