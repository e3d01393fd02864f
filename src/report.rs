//! Report formatting and stderr diagnostics.
//!
//! Report lines go to the same sink the raster would have gone to; verbose
//! diagnostics always go to stderr so they never contaminate a piped
//! raster.
//!
//! A size report line is four edge tokens in [`Edge::ALL`] order — `-N`
//! (remove), `+N` (pad), or `0` — followed by the output width and height:
//!
//! ```text
//! -4 -4 -4 -4 2 2
//! ```
//!
//! The full report appends the background color at the image's depth and
//! the closeness percentage:
//!
//! ```text
//! -4 -4 -4 -4 2 2 rgb-255:255/255/255 0.000000
//! ```

use crate::colorname::{self, Rgb};
use crate::config::Edge;
use crate::plan::CropSet;
use crate::pnm::{Pixel, Sample};

/// Reported output dimensions.
///
/// A maxcrop plan claims the full extent on each selected edge, which is
/// informational rather than executable; in that case the input dimension
/// is reported unchanged rather than a meaningless negative.
fn reported_dimensions(crop: &CropSet, cols: u32, rows: u32) -> (u32, u32) {
    let out_cols = if crop.at(Edge::Left).remove == cols || crop.at(Edge::Right).remove == cols {
        cols
    } else {
        crop.output_cols(cols)
    };
    let out_rows = if crop.at(Edge::Top).remove == rows || crop.at(Edge::Bottom).remove == rows {
        rows
    } else {
        crop.output_rows(rows)
    };
    (out_cols, out_rows)
}

fn edge_tokens(crop: &CropSet) -> String {
    let mut line = String::new();
    for edge in Edge::ALL {
        let op = crop.at(edge);
        if op.remove > 0 {
            line.push_str(&format!("-{} ", op.remove));
        } else if op.pad > 0 {
            line.push_str(&format!("+{} ", op.pad));
        } else {
            line.push_str("0 ");
        }
    }
    line
}

/// The report-size line for one image (no trailing newline).
pub fn size_line(crop: &CropSet, cols: u32, rows: u32) -> String {
    let (out_cols, out_rows) = reported_dimensions(crop, cols, rows);
    format!("{}{} {}", edge_tokens(crop), out_cols, out_rows)
}

/// The report-full line: size report plus background color and closeness.
pub fn full_line(
    crop: &CropSet,
    cols: u32,
    rows: u32,
    maxval: Sample,
    background: Pixel,
    closeness: f32,
) -> String {
    format!(
        "{} rgb-{}:{}/{}/{} {:.6}",
        size_line(crop, cols, rows),
        maxval,
        background.r,
        background.g,
        background.b,
        closeness
    )
}

/// Human name for a background color, for --verbose: a dictionary name
/// when one matches exactly, otherwise the rgb spec at the image's depth.
pub fn describe_color(background: Pixel, maxval: Sample) -> String {
    let rgb = Rgb {
        r: background.r as f64 / maxval as f64,
        g: background.g as f64 / maxval as f64,
        b: background.b as f64 / maxval as f64,
    };
    match colorname::name_of(rgb) {
        Some(name) => name.to_string(),
        None => format!(
            "rgb-{}:{}/{}/{}",
            maxval, background.r, background.g, background.b
        ),
    }
}

/// Per-edge narration of a plan, for --verbose.
pub fn print_crop_parameters(crop: &CropSet) {
    for edge in Edge::ALL {
        let op = crop.at(edge);
        if op.remove == 0 && op.pad == 0 {
            eprintln!("Not cropping {} edge", edge.name());
            continue;
        }
        if op.pad > 0 {
            eprintln!(
                "Adding {} pixel{} to the {} border",
                op.pad,
                plural(op.pad),
                edge.name()
            );
        }
        if op.remove > 0 {
            eprintln!(
                "Cropping {} pixel{} from the {} border",
                op.remove,
                plural(op.remove),
                edge.name()
            );
        }
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::CropOp;

    fn crop_set(ops: [(u32, u32); 4]) -> CropSet {
        CropSet {
            op: ops.map(|(remove, pad)| CropOp { remove, pad }),
        }
    }

    #[test]
    fn size_line_mixes_all_token_kinds() {
        let crop = crop_set([(4, 0), (0, 2), (0, 0), (1, 0)]);
        assert_eq!(size_line(&crop, 10, 8), "-4 +2 0 -1 8 7");
    }

    #[test]
    fn size_line_identity() {
        assert_eq!(size_line(&CropSet::default(), 5, 6), "0 0 0 0 5 6");
    }

    #[test]
    fn maxcrop_reports_input_dimensions() {
        let crop = crop_set([(10, 0), (10, 0), (8, 0), (8, 0)]);
        assert_eq!(size_line(&crop, 10, 8), "-10 -10 -8 -8 10 8");
    }

    #[test]
    fn full_line_appends_color_and_closeness() {
        let crop = crop_set([(4, 0), (4, 0), (4, 0), (4, 0)]);
        assert_eq!(
            full_line(&crop, 10, 10, 255, Pixel::gray(255), 0.0),
            "-4 -4 -4 -4 2 2 rgb-255:255/255/255 0.000000"
        );
    }

    #[test]
    fn describe_color_prefers_names() {
        assert_eq!(describe_color(Pixel::gray(255), 255), "white");
        assert_eq!(describe_color(Pixel::gray(1), 1), "white");
        assert_eq!(describe_color(Pixel::new(255, 0, 0), 255), "red");
        assert_eq!(describe_color(Pixel::new(3, 7, 9), 255), "rgb-255:3/7/9");
    }
}
