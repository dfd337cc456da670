//! Annotation colors
//!
//! Colors cross the host boundary in three shapes: a native value, a hex
//! string (`#RRGGBB` or `#AARRGGBB`) and a packed 32-bit ARGB integer.
//! This module owns the conversions between them.

use std::fmt;
use std::str::FromStr;

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Unpack a 32-bit `0xAARRGGBB` value
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Pack into a 32-bit `0xAARRGGBB` value
    pub const fn to_argb(&self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Parse a hex color string
    ///
    /// A single leading `#` is optional. Six digits are read as `RRGGBB`
    /// (fully opaque), eight as `AARRGGBB`. Any other length, or a
    /// non-hex digit, yields `None`.
    pub fn from_hex(input: &str) -> Option<Self> {
        let digits = input.strip_prefix('#').unwrap_or(input);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        match digits.len() {
            6 => u32::from_str_radix(digits, 16)
                .ok()
                .map(|rgb| Self::from_argb(0xFF00_0000 | rgb)),
            8 => u32::from_str_radix(digits, 16).ok().map(Self::from_argb),
            _ => None,
        }
    }

    /// Format as upper-case `#RRGGBB`, dropping alpha
    pub fn to_hex_rgb(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Format as upper-case `#AARRGGBB`
    pub fn to_hex_argb(&self) -> String {
        format!("#{:08X}", self.to_argb())
    }

    /// Alpha channel as a normalized opacity (0.0 to 1.0)
    pub fn opacity(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// Same color with a different alpha channel
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Convert to normalized RGBA values (0.0 to 1.0)
    pub fn to_normalized(&self) -> (f64, f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
            self.opacity(),
        )
    }
}

/// Common annotation colors
impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            f.write_str(&self.to_hex_rgb())
        } else {
            f.write_str(&self.to_hex_argb())
        }
    }
}

/// Error returned when a string is not a 6 or 8 digit hex color
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex color: {0:?}")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or_else(|| ParseColorError(s.to_string()))
    }
}
