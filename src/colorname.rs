//! Color-name resolution.
//!
//! Resolves a user-supplied color specification to an RGB triple in
//! `[0, 1]^3`, independent of any image's sample depth. Accepted forms:
//!
//! - a name from the built-in dictionary (`white`, `cornflowerblue`, ...),
//!   case-insensitive, spaces ignored;
//! - `#rgb`, `#rrggbb`, `#rrrrggggbbbb` hex;
//! - `rgb:r/g/b` — X11 style, each component 1–4 hex digits scaled by the
//!   width it was written with (`rgb:f/f/f` is white, so is `rgb:ffff/...`);
//! - `rgbi:r/g/b` — decimal fractions in `[0, 1]`.
//!
//! The dictionary is compiled in rather than read from an `rgb.txt` file:
//! a single binary with no system dependencies is the point.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ColorNameError {
    #[error("Unknown color name '{0}'")]
    Unknown(String),
    #[error("Invalid color specification '{spec}': {reason}")]
    Syntax { spec: String, reason: String },
}

/// A device-independent color, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    const fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Rgb {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }
}

/// CSS color values for the names users actually reach for.
const DICTIONARY: &[(&str, Rgb)] = &[
    ("aqua", Rgb::from_u8(0, 255, 255)),
    ("beige", Rgb::from_u8(245, 245, 220)),
    ("black", Rgb::from_u8(0, 0, 0)),
    ("blue", Rgb::from_u8(0, 0, 255)),
    ("brown", Rgb::from_u8(165, 42, 42)),
    ("cornflowerblue", Rgb::from_u8(100, 149, 237)),
    ("cyan", Rgb::from_u8(0, 255, 255)),
    ("darkgray", Rgb::from_u8(169, 169, 169)),
    ("darkgreen", Rgb::from_u8(0, 100, 0)),
    ("darkgrey", Rgb::from_u8(169, 169, 169)),
    ("fuchsia", Rgb::from_u8(255, 0, 255)),
    ("gold", Rgb::from_u8(255, 215, 0)),
    ("gray", Rgb::from_u8(128, 128, 128)),
    ("green", Rgb::from_u8(0, 128, 0)),
    ("grey", Rgb::from_u8(128, 128, 128)),
    ("indigo", Rgb::from_u8(75, 0, 130)),
    ("ivory", Rgb::from_u8(255, 255, 240)),
    ("lightgray", Rgb::from_u8(211, 211, 211)),
    ("lightgrey", Rgb::from_u8(211, 211, 211)),
    ("lime", Rgb::from_u8(0, 255, 0)),
    ("magenta", Rgb::from_u8(255, 0, 255)),
    ("maroon", Rgb::from_u8(128, 0, 0)),
    ("navy", Rgb::from_u8(0, 0, 128)),
    ("olive", Rgb::from_u8(128, 128, 0)),
    ("orange", Rgb::from_u8(255, 165, 0)),
    ("pink", Rgb::from_u8(255, 192, 203)),
    ("purple", Rgb::from_u8(128, 0, 128)),
    ("red", Rgb::from_u8(255, 0, 0)),
    ("silver", Rgb::from_u8(192, 192, 192)),
    ("snow", Rgb::from_u8(255, 250, 250)),
    ("teal", Rgb::from_u8(0, 128, 128)),
    ("violet", Rgb::from_u8(238, 130, 238)),
    ("white", Rgb::from_u8(255, 255, 255)),
    ("yellow", Rgb::from_u8(255, 255, 0)),
];

/// Resolve a color specification to an RGB triple in `[0, 1]^3`.
pub fn resolve(spec: &str) -> Result<Rgb, ColorNameError> {
    if let Some(hex) = spec.strip_prefix('#') {
        return parse_hex(spec, hex);
    }
    if let Some(rest) = spec.strip_prefix("rgb:") {
        return parse_x11(spec, rest);
    }
    if let Some(rest) = spec.strip_prefix("rgbi:") {
        return parse_fractions(spec, rest);
    }

    let canonical: String = spec
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    DICTIONARY
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, rgb)| *rgb)
        .ok_or_else(|| ColorNameError::Unknown(spec.to_string()))
}

/// Reverse lookup: the dictionary name for an exact triple, if any.
/// Used only for diagnostics.
pub fn name_of(rgb: Rgb) -> Option<&'static str> {
    const EPS: f64 = 1.0 / 512.0;
    DICTIONARY
        .iter()
        .find(|(_, c)| {
            (c.r - rgb.r).abs() < EPS && (c.g - rgb.g).abs() < EPS && (c.b - rgb.b).abs() < EPS
        })
        .map(|(name, _)| *name)
}

fn syntax(spec: &str, reason: impl Into<String>) -> ColorNameError {
    ColorNameError::Syntax {
        spec: spec.to_string(),
        reason: reason.into(),
    }
}

fn parse_hex(spec: &str, hex: &str) -> Result<Rgb, ColorNameError> {
    let per = match hex.len() {
        3 => 1,
        6 => 2,
        12 => 4,
        n => {
            return Err(syntax(spec, format!("{n} hex digits; expected 3, 6, or 12")));
        }
    };
    let mut chan = [0.0f64; 3];
    let max = (16u64.pow(per as u32) - 1) as f64;
    for (i, slot) in chan.iter_mut().enumerate() {
        let digits = &hex[i * per..(i + 1) * per];
        let v = u64::from_str_radix(digits, 16).map_err(|_| syntax(spec, "not hexadecimal"))?;
        *slot = v as f64 / max;
    }
    Ok(Rgb {
        r: chan[0],
        g: chan[1],
        b: chan[2],
    })
}

fn parse_x11(spec: &str, rest: &str) -> Result<Rgb, ColorNameError> {
    let parts: Vec<&str> = rest.split('/').collect();
    if parts.len() != 3 {
        return Err(syntax(spec, "expected rgb:r/g/b"));
    }
    let mut chan = [0.0f64; 3];
    for (slot, digits) in chan.iter_mut().zip(&parts) {
        if digits.is_empty() || digits.len() > 4 {
            return Err(syntax(spec, "each component needs 1-4 hex digits"));
        }
        let v =
            u64::from_str_radix(digits, 16).map_err(|_| syntax(spec, "not hexadecimal"))?;
        // Scaled by the written width: "f" and "ffff" both mean full
        let max = (16u64.pow(digits.len() as u32) - 1) as f64;
        *slot = v as f64 / max;
    }
    Ok(Rgb {
        r: chan[0],
        g: chan[1],
        b: chan[2],
    })
}

fn parse_fractions(spec: &str, rest: &str) -> Result<Rgb, ColorNameError> {
    let parts: Vec<&str> = rest.split('/').collect();
    if parts.len() != 3 {
        return Err(syntax(spec, "expected rgbi:r/g/b"));
    }
    let mut chan = [0.0f64; 3];
    for (slot, part) in chan.iter_mut().zip(&parts) {
        let v: f64 = part
            .parse()
            .map_err(|_| syntax(spec, "component is not a number"))?;
        if !(0.0..=1.0).contains(&v) {
            return Err(syntax(spec, "component outside [0, 1]"));
        }
        *slot = v;
    }
    Ok(Rgb {
        r: chan[0],
        g: chan[1],
        b: chan[2],
    })
}
