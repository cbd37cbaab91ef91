//! Color parsing and RGB/HSV conversion.
//!
//! HSV is quantized to 8 bits per channel: hue is stored in half-degrees
//! (0..=179), saturation and value in 0..=255. Every conversion rounds to
//! the nearest integer.
//!
//! The quantization is lossy. A hex -> HSV -> hex round trip reproduces greys
//! and the primary and secondary colors exactly, but one half-degree hue step
//! spans several RGB units on saturated colors, so other colors may come back
//! up to 4 units off per channel (`#FF0200` returns as `#FF0000`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{EngineError, Result};

/// Largest hue value in the quantized HSV space.
pub const HUE_MAX: u8 = 179;

/// An opaque 8-bit RGB color.
///
/// Serializes as a `#RRGGBB` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Format as upper-case `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// ITU-R 601 luma, the same weights used for an "L" grayscale conversion.
    pub fn luma(self) -> u8 {
        let weighted = u32::from(self.r) * 299 + u32::from(self.g) * 587 + u32::from(self.b) * 114;
        ((weighted + 500) / 1000) as u8
    }

    pub fn to_hsv(self) -> Hsv {
        rgb_to_hsv(self)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_hex()
    }
}

impl TryFrom<String> for Rgb {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        parse_hex(&value)
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(c: Rgb) -> Self {
        image::Rgb([c.r, c.g, c.b])
    }
}

impl From<image::Rgb<u8>> for Rgb {
    fn from(p: image::Rgb<u8>) -> Self {
        Rgb::new(p[0], p[1], p[2])
    }
}

/// A quantized HSV color (hue 0..=179, saturation and value 0..=255).
///
/// Deserialization goes through [`Hsv::new`], so out-of-range hues are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawHsv")]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    /// Build an HSV triple, rejecting hues above [`HUE_MAX`].
    pub fn new(h: u8, s: u8, v: u8) -> Result<Self> {
        if h > HUE_MAX {
            return Err(EngineError::InvalidColorFormat(format!(
                "hue {h} is outside 0..={HUE_MAX}"
            )));
        }
        Ok(Self { h, s, v })
    }

    pub fn to_rgb(self) -> Rgb {
        hsv_to_rgb(self)
    }
}

#[derive(Deserialize)]
struct RawHsv {
    h: u8,
    s: u8,
    v: u8,
}

impl TryFrom<RawHsv> for Hsv {
    type Error = EngineError;

    fn try_from(raw: RawHsv) -> Result<Self> {
        Hsv::new(raw.h, raw.s, raw.v)
    }
}

/// Parse a `#RRGGBB` (or `RRGGBB`) color, case-insensitive.
pub fn parse_hex(hex: &str) -> Result<Rgb> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let invalid = || EngineError::InvalidColorFormat(format!("{hex:?} (expected #RRGGBB)"));
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Parse a hex color and convert it to quantized HSV.
pub fn hex_to_hsv(hex: &str) -> Result<Hsv> {
    parse_hex(hex).map(rgb_to_hsv)
}

/// Convert quantized HSV back to an upper-case `#RRGGBB` string.
///
/// Not an exact inverse of [`hex_to_hsv`]: channels may drift by up to 4
/// units, except for greys and primary/secondary colors.
pub fn hsv_to_hex(hsv: Hsv) -> String {
    hsv_to_rgb(hsv).to_hex()
}

/// Convert RGB to quantized HSV.
pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let max = rgb.r.max(rgb.g).max(rgb.b);
    let min = rgb.r.min(rgb.g).min(rgb.b);
    let delta = f32::from(max - min);

    let (r, g, b) = (f32::from(rgb.r), f32::from(rgb.g), f32::from(rgb.b));

    let degrees = if max == min {
        0.0
    } else if max == rgb.r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == rgb.g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let saturation = if max == 0 { 0.0 } else { delta / f32::from(max) };

    // Half-degrees; 360 degrees is the same hue as 0.
    let h = ((degrees / 2.0).round() as u16 % 180) as u8;

    Hsv {
        h,
        s: (saturation * 255.0).round() as u8,
        v: max,
    }
}

/// Convert quantized HSV to RGB.
pub fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let v = f32::from(hsv.v) / 255.0;
    let s = f32::from(hsv.s) / 255.0;

    if hsv.s == 0 {
        return Rgb::new(hsv.v, hsv.v, hsv.v);
    }

    let sector = (f32::from(hsv.h.min(HUE_MAX)) * 2.0 / 60.0) % 6.0;
    let i = sector.floor();
    let f = sector - i;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match i as u8 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    let to_u8 = |c: f32| (c * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb::new(to_u8(r), to_u8(g), to_u8(b))
}
