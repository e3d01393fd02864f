//! Border detection: one forward pass over the raster.
//!
//! For every row the scanner finds the first and last pixel that fail the
//! background match, narrowing the running bounding box. A row entirely
//! made of background contributes nothing; an image where *every* row is
//! background has no detectable borders at all, which the caller handles
//! under its blank-image policy.
//!
//! Closeness is a percentage of the longest possible distance in the color
//! cube (the black-to-white diagonal, `sqrt(3) * maxval`), turned into an
//! allowable Euclidean distance and compared in squared form.

use std::io::{Read, Seek};

use crate::config::Edge;
use crate::pnm::{Header, Pixel, PnmError, PnmReader, Sample};

const SQRT3: f64 = 1.732_050_807_568_877_2;

/// Background thickness at each edge, indexed by [`Edge`].
///
/// Only meaningful for an image with at least one foreground pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderSet {
    pub size: [u32; 4],
}

impl BorderSet {
    pub fn at(&self, edge: Edge) -> u32 {
        self.size[edge.index()]
    }
}

/// The allowable color distance for a closeness percentage at a depth.
pub fn allowable_diff(maxval: Sample, closeness: f32) -> u32 {
    (SQRT3 * maxval as f64 * closeness as f64 / 100.0).round() as u32
}

/// Whether two pixels are within `allowable` color levels of each other.
/// Zero means exact equality; the test is symmetric in its operands.
pub fn matches(a: Pixel, b: Pixel, allowable: u32) -> bool {
    if allowable == 0 {
        a == b
    } else {
        a.distance_sq(b) <= (allowable as u64) * (allowable as u64)
    }
}

/// Scan the raster for its background borders.
///
/// Expects `rdr` positioned at the raster start; consumes the entire
/// raster, leaving the stream just past it. Returns `None` when the image
/// is entirely background.
pub fn find_borders<R: Read + Seek>(
    rdr: &mut PnmReader<R>,
    hdr: &Header,
    background: Pixel,
    closeness: f32,
) -> Result<Option<BorderSet>, PnmError> {
    let allowable = allowable_diff(hdr.maxval, closeness);
    let cols = hdr.cols as usize;
    let mut row_buf = vec![Pixel::default(); cols];

    let mut left = cols;
    let mut right = 0usize;
    let mut top = 0u32;
    let mut bottom = 0u32;
    let mut got_top = false;

    for row in 0..hdr.rows {
        rdr.read_row(hdr, &mut row_buf)?;

        let mut row_left = 0;
        while row_left < cols && matches(row_buf[row_left], background, allowable) {
            row_left += 1;
        }
        if row_left == cols {
            continue; // row is entirely background
        }
        let mut row_right = cols;
        while row_right > row_left && matches(row_buf[row_right - 1], background, allowable) {
            row_right -= 1;
        }

        left = left.min(row_left);
        right = right.max(row_right);
        if !got_top {
            top = row;
            got_top = true;
        }
        bottom = row + 1;
    }

    if !got_top {
        return Ok(None);
    }
    Ok(Some(BorderSet {
        size: [
            left as u32,
            hdr.cols - right as u32,
            top,
            hdr.rows - bottom,
        ],
    }))
}
