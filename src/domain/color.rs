//! Journal colors and their hex encoding
//!
//! Colors are stored as six uppercase hex digits in RRGGBB order with no
//! alpha channel and no leading '#'.

use crate::error::{JotbookError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Default journal color, RGB(0, 122, 255)
    pub const BLUE: Color = Color::rgb(0, 122, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Build from float channels in [0.0, 1.0], rounding to the nearest 8-bit step
    pub fn from_rgb_f32(r: f32, g: f32, b: f32) -> Self {
        fn channel(v: f32) -> u8 {
            if v.is_nan() {
                return 0;
            }
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Color::rgb(channel(r), channel(g), channel(b))
    }

    /// Float channels in [0.0, 1.0]
    pub fn to_rgb_f32(self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }

    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Parse "RRGGBB" or "#RRGGBB", either case
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(JotbookError::InvalidColor(hex.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| JotbookError::InvalidColor(hex.to_string()))
        };

        Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLUE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = JotbookError;

    fn from_str(s: &str) -> Result<Self> {
        Color::from_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Color::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blue_encodes_to_007aff() {
        assert_eq!(Color::rgb(0, 122, 255).to_hex(), "007AFF");
        assert_eq!(Color::BLUE.to_string(), "007AFF");
    }

    #[test]
    fn test_hex_round_trip() {
        let decoded = Color::from_hex("007AFF").unwrap();
        assert_eq!(decoded, Color::rgb(0, 122, 255));

        for color in [
            Color::rgb(0, 0, 0),
            Color::rgb(255, 255, 255),
            Color::rgb(18, 52, 86),
        ] {
            assert_eq!(Color::from_hex(&color.to_hex()).unwrap(), color);
        }
    }

    #[test]
    fn test_from_hex_accepts_prefix_and_lowercase() {
        assert_eq!(Color::from_hex("#007aff").unwrap(), Color::BLUE);
        assert_eq!("#007AFF".parse::<Color>().unwrap(), Color::BLUE);
    }

    #[test]
    fn test_from_hex_rejects_malformed() {
        for bad in ["", "#", "007AF", "007AFFFF", "GG7AFF", "#12345", "+7AFF0"] {
            match Color::from_hex(bad) {
                Err(JotbookError::InvalidColor(v)) => assert_eq!(v, bad),
                other => panic!("Expected InvalidColor for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_float_conversion() {
        let color = Color::from_rgb_f32(0.0, 122.0 / 255.0, 1.0);
        assert_eq!(color, Color::BLUE);

        let clamped = Color::from_rgb_f32(-1.0, 2.0, f32::NAN);
        assert_eq!(clamped, Color::rgb(0, 255, 0));

        let (r, g, b) = Color::BLUE.to_rgb_f32();
        assert_eq!(Color::from_rgb_f32(r, g, b), Color::BLUE);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Color::BLUE).unwrap();
        assert_eq!(json, "\"007AFF\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::BLUE);
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }
}
