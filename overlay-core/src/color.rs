//! Hex color helpers used to normalize text fills.

use serde::{Deserialize, Serialize};

/// An 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

/// Parse a `#rrggbb` or `rrggbb` hex string.
///
/// Returns `None` for anything that is not exactly six hex digits
/// (shorthand `#rgb` and alpha forms are rejected).
#[must_use]
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let clean = hex.strip_prefix('#').unwrap_or(hex);
    if clean.len() != 6 || !clean.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&clean[range], 16).ok();
    Some(Rgb {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}

/// Format channel values as a lowercase `#rrggbb` string.
///
/// Channels are rounded and clamped to `0..=255`; NaN maps to 0.
#[must_use]
pub fn rgb_to_hex(r: f32, g: f32, b: f32) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let to_u8 = |v: f32| -> u8 {
        if v.is_nan() {
            0
        } else {
            v.round().clamp(0.0, 255.0) as u8
        }
    };
    format!("#{:02x}{:02x}{:02x}", to_u8(r), to_u8(g), to_u8(b))
}

/// Normalize a fill color.
///
/// Six-digit hex colors (with or without `#`) are rewritten to lowercase
/// `#rrggbb`. Any other CSS color string is passed through untouched.
#[must_use]
pub fn normalize_fill(fill: &str) -> String {
    match hex_to_rgb(fill) {
        Some(rgb) => rgb_to_hex(f32::from(rgb.r), f32::from(rgb.g), f32::from(rgb.b)),
        None => fill.to_string(),
    }
}
