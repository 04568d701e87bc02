//! RGBA colors and the `transparent` sentinel.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    #[error("Color must start with '#' or be \"transparent\": {0}")]
    MissingHash(String),
    #[error("Unsupported hex color length {len}: {input}")]
    InvalidLength { input: String, len: usize },
    #[error("Invalid hex digit in color: {0}")]
    InvalidDigit(String),
}

/// An RGBA8 color.
///
/// Any color with zero alpha is the `transparent` sentinel. The pixel store
/// never materializes it, so comparisons should go through [`Color::normalized`]
/// when a color comes from outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// The reserved "no pixel here" color.
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Collapse every zero-alpha color onto [`Color::TRANSPARENT`].
    pub fn normalized(self) -> Self {
        if self.is_transparent() {
            Self::TRANSPARENT
        } else {
            self
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_transparent() {
            f.write_str("transparent")
        } else if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("transparent") {
            return Ok(Color::TRANSPARENT);
        }
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ParseColorError::MissingHash(s.to_string()))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError::InvalidDigit(s.to_string()));
        }

        let byte = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| ParseColorError::InvalidDigit(s.to_string()))
        };

        let color = match hex.len() {
            // #rgb -> #rrggbb
            3 => Color::rgb(byte(0..1)? * 17, byte(1..2)? * 17, byte(2..3)? * 17),
            6 => Color::rgb(byte(0..2)?, byte(2..4)?, byte(4..6)?),
            8 => Color::new(byte(0..2)?, byte(2..4)?, byte(4..6)?, byte(6..8)?),
            len => {
                return Err(ParseColorError::InvalidLength {
                    input: s.to_string(),
                    len,
                });
            }
        };
        Ok(color.normalized())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
