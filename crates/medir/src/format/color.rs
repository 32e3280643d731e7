//! Color-string parsing for the lag test signal path.
//!
//! Publisher pages cycle a solid fill color; subscribers sample the decoded
//! frame. Both ends log colors either as `#rrggbb` hex or `rgb(r, g, b)`.

use serde::{Deserialize, Serialize};

/// An RGB color triple.
///
/// Channels are `f64` because subscriber-side values are averaged over a
/// sampled pixel region and need not be integral.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel, 0-255
    pub r: f64,
    /// Green channel, 0-255
    pub g: f64,
    /// Blue channel, 0-255
    pub b: f64,
}

/// Parse a color string.
///
/// Accepts the empty string (pass-through, `Ok(None)`), `#rrggbb` hex, or
/// `rgb(r, g, b)` with each channel in 0-255. Anything else yields a
/// descriptive error message.
pub fn parse_color(input: &str) -> Result<Option<Rgb>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Some(rgb) = match_hex(trimmed) {
        return Ok(Some(rgb));
    }
    let re = regex::Regex::new(r"^rgb\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*\)$")
        .unwrap();
    if let Some(caps) = re.captures(trimmed) {
        let channel = |i: usize| caps[i].parse::<u32>().unwrap_or(u32::MAX);
        let (r, g, b) = (channel(1), channel(2), channel(3));
        if r > 255 || g > 255 || b > 255 {
            return Err(format!("color channel out of range in '{trimmed}'"));
        }
        return Ok(Some(Rgb {
            r: f64::from(r),
            g: f64::from(g),
            b: f64::from(b),
        }));
    }
    Err(format!(
        "unrecognized color format '{trimmed}', expected #rrggbb or rgb(r, g, b)"
    ))
}

/// Normalize a `#rrggbb` or `rrggbb` hex string to `rgb(r, g, b)` form.
///
/// Returns an empty string when the input does not match the pattern.
#[must_use]
pub fn hex_to_rgb(hex: &str) -> String {
    match_hex(hex.trim()).map_or_else(String::new, |rgb| {
        format!("rgb({}, {}, {})", rgb.r, rgb.g, rgb.b)
    })
}

fn match_hex(input: &str) -> Option<Rgb> {
    let re = regex::Regex::new(r"^#?([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$").unwrap();
    let caps = re.captures(input)?;
    let channel = |i: usize| u8::from_str_radix(&caps[i], 16).ok().map(f64::from);
    Some(Rgb {
        r: channel(1)?,
        g: channel(2)?,
        b: channel(3)?,
    })
}
