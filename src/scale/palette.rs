//! Palette colors.

use std::fmt;

use crate::error::{AppError, ErrorKind};

/// 8-bit RGB color. Displays as CSS hex (`#rrggbb`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(hex: &str) -> Result<Self, AppError> {
        let digits = hex.trim().trim_start_matches('#');
        let bad = || AppError::new(ErrorKind::Usage, format!("Invalid hex color '{hex}'."));
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(bad());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| bad());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// d3 `schemeGreens[7]`, light to dark.
pub const GREENS_7: [Rgb; 7] = [
    Rgb::new(0xed, 0xf8, 0xe9),
    Rgb::new(0xc7, 0xe9, 0xc0),
    Rgb::new(0xa1, 0xd9, 0x9b),
    Rgb::new(0x74, 0xc4, 0x76),
    Rgb::new(0x41, 0xab, 0x5d),
    Rgb::new(0x23, 0x8b, 0x45),
    Rgb::new(0x00, 0x5a, 0x32),
];

/// Fill for counties rendered under `JoinPolicy::Mark`.
pub const MISSING_FILL: Rgb = Rgb::new(0xcc, 0xcc, 0xcc);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_display_and_parse_agree() {
        assert_eq!(GREENS_7[0].to_string(), "#edf8e9");
        assert_eq!(GREENS_7[6].to_string(), "#005a32");
        assert_eq!(Rgb::from_hex("#238b45").unwrap(), GREENS_7[5]);
        assert_eq!(Rgb::from_hex("cccccc").unwrap(), MISSING_FILL);
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#zzzzzz").is_err());
        assert!(Rgb::from_hex("#ééé").is_err());
    }

    #[test]
    fn palette_entries_are_distinct() {
        for i in 0..GREENS_7.len() {
            for j in (i + 1)..GREENS_7.len() {
                assert_ne!(GREENS_7[i], GREENS_7[j]);
            }
        }
    }
}
