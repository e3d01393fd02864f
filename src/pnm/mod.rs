//! Streaming Netpbm (PBM/PGM/PPM) raster I/O.
//!
//! The rest of the crate never parses image bytes itself; it consumes this
//! module's narrow surface: read a header, then read/skip/write rows one at a
//! time. Two row shapes exist:
//!
//! - **Unpacked rows** of [`Pixel`]s, uniform across all three formats.
//!   Single-channel formats replicate their sample across the three channels
//!   so color comparisons need no per-format cases.
//! - **Packed rows** for bilevel images: one bit per pixel, MSB first, the
//!   Netpbm packing. The packed entry points can deposit and extract rows at
//!   arbitrary *bit* offsets inside a caller buffer, which is what lets the
//!   rewriter shift a row left or right without a second pass (see
//!   [`bits`] for the span primitives).
//!
//! Input accepts both plain (`P1`–`P3`) and raw (`P4`–`P6`) variants, maxval
//! up to 65535 (two-byte big-endian samples), `#` comments in headers and
//! plain rasters, and multiple concatenated images per stream. Output is
//! always the raw variant of the input's representation, matching Netpbm's
//! default.

pub mod bits;
mod reader;
mod writer;

pub use reader::PnmReader;
pub use writer::PnmWriter;

use thiserror::Error;

/// Largest maxval a PNM header may carry.
pub const MAX_MAXVAL: u16 = 65535;

#[derive(Error, Debug)]
pub enum PnmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not a PNM image: {0}")]
    BadMagic(String),
    #[error("Malformed PNM image: {0}")]
    Syntax(String),
    #[error("Unexpected end of image data")]
    Truncated,
}

/// A sample value; channels range over `0..=maxval`.
pub type Sample = u16;

/// One pixel, always three channels.
///
/// Gray and bilevel images replicate their single sample into all three
/// channels. A bilevel pixel is `gray(0)` (black) or `gray(1)` (white) at
/// maxval 1 — Netpbm's convention, where a raster bit of 1 means black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    pub r: Sample,
    pub g: Sample,
    pub b: Sample,
}

impl Pixel {
    pub const fn new(r: Sample, g: Sample, b: Sample) -> Self {
        Pixel { r, g, b }
    }

    /// A single-channel value replicated across all channels.
    pub const fn gray(v: Sample) -> Self {
        Pixel { r: v, g: v, b: v }
    }

    /// Squared Euclidean distance between two pixels' channel tuples.
    pub fn distance_sq(self, other: Pixel) -> u64 {
        let dr = self.r as i64 - other.r as i64;
        let dg = self.g as i64 - other.g as i64;
        let db = self.b as i64 - other.b as i64;
        (dr * dr + dg * dg + db * db) as u64
    }
}

/// Pixel representation of an image, independent of plain/raw encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One bit per pixel (PBM).
    Bilevel,
    /// One sample per pixel (PGM).
    Gray,
    /// Three samples per pixel (PPM).
    Rgb,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Bilevel | PixelFormat::Gray => 1,
            PixelFormat::Rgb => 3,
        }
    }
}

/// Parsed image header: dimensions, sample depth, representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub cols: u32,
    pub rows: u32,
    pub maxval: Sample,
    pub format: PixelFormat,
    /// Whether the *input* encoding was raw. Output is always raw.
    pub raw: bool,
}

impl Header {
    /// The white pixel for this image's depth.
    pub fn white(&self) -> Pixel {
        Pixel::gray(self.maxval)
    }

    /// The black pixel (always zero, any depth).
    pub fn black(&self) -> Pixel {
        Pixel::gray(0)
    }
}
