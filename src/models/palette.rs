use serde::{Deserialize, Serialize};
use std::num::ParseIntError;

/// One suggested paint color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSwatch {
    pub name: String,
    /// CSS hex color, `#RRGGBB`
    pub hex: String,
    /// Why this color fits the photo
    pub reason: String,
}

/// Response from the inference service: a palette plus painting advice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteResult {
    pub colors: Vec<ColorSwatch>,
    pub advice: String,
}

impl PaletteResult {
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseColorError {
    #[error("invalid hex color length (expected 3 or 6 characters)")]
    InvalidLength,

    #[error("invalid hex character: {0}")]
    InvalidHex(#[from] ParseIntError),
}

impl ColorSwatch {
    /// Parse `hex` into 8-bit RGB.
    ///
    /// Accepts `#RRGGBB`, `RRGGBB` and the `#RGB` shorthand, case-insensitive,
    /// surrounding whitespace ignored.
    pub fn rgb(&self) -> Result<(u8, u8, u8), ParseColorError> {
        parse_hex(&self.hex)
    }
}

fn parse_hex(s: &str) -> Result<(u8, u8, u8), ParseColorError> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if !s.is_ascii() {
        return Err(ParseColorError::InvalidLength);
    }

    match s.len() {
        3 => {
            // Shorthand: 0xF -> 0xFF
            let r = u8::from_str_radix(&s[0..1], 16)? * 17;
            let g = u8::from_str_radix(&s[1..2], 16)? * 17;
            let b = u8::from_str_radix(&s[2..3], 16)? * 17;
            Ok((r, g, b))
        }
        6 => {
            let r = u8::from_str_radix(&s[0..2], 16)?;
            let g = u8::from_str_radix(&s[2..4], 16)?;
            let b = u8::from_str_radix(&s[4..6], 16)?;
            Ok((r, g, b))
        }
        _ => Err(ParseColorError::InvalidLength),
    }
}
