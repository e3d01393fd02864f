//! Reference background color resolution.
//!
//! Each strategy consumes the analysis stream differently — from nothing at
//! all (fixed black/white, named colors) to the entire raster (the
//! four-corner "sides" strategy, the only one with a full-image memory
//! footprint). All strategies expect the stream positioned at the raster
//! start and leave it at an arbitrary position; the caller rewinds before
//! scanning for borders.
//!
//! When the two corners of the top row disagree, the heuristic is
//! deterministic: bilevel images take the majority shade of that whole row
//! (ties go to white), deeper images take the per-channel mean of the two
//! corners. The four-corner strategy prefers any value occurring three or
//! more times, then the first value occurring twice in reading order
//! (top-left, top-right, bottom-left, bottom-right), and otherwise averages.

use std::io::{Read, Seek};

use thiserror::Error;

use crate::colorname::{self, ColorNameError};
use crate::config::{BackgroundChoice, Corner};
use crate::pnm::{Header, Pixel, PixelFormat, PnmError, PnmReader, Sample};

#[derive(Error, Debug)]
pub enum BackgroundError {
    #[error("{0}")]
    Pnm(#[from] PnmError),
    #[error("{0}")]
    ColorName(#[from] ColorNameError),
    #[error("Invalid color specified: '{spec}'. Image does not have color.")]
    NoColor { spec: String },
    #[error("Invalid color specified: '{spec}'. Image has no intermediate levels of gray.")]
    NoGray { spec: String },
}

/// Determine the reference background color for one image.
///
/// Expects `rdr` positioned at the raster start; leaves it positioned
/// arbitrarily.
pub fn resolve<R: Read + Seek>(
    rdr: &mut PnmReader<R>,
    hdr: &Header,
    choice: &BackgroundChoice,
) -> Result<Pixel, BackgroundError> {
    match choice {
        BackgroundChoice::White => Ok(hdr.white()),
        BackgroundChoice::Black => Ok(hdr.black()),
        BackgroundChoice::Color(spec) => from_color_spec(spec, hdr),
        BackgroundChoice::Corner(corner) => from_one_corner(rdr, hdr, *corner),
        BackgroundChoice::TopCorners => from_top_corners(rdr, hdr),
        BackgroundChoice::Sides => from_four_corners(rdr, hdr),
    }
}

/// Resolve a named color against the image's representation.
///
/// Representability is judged at full 16-bit precision, so a color that
/// merely *rounds* to gray at a low maxval is still rejected for
/// single-channel images.
fn from_color_spec(spec: &str, hdr: &Header) -> Result<Pixel, BackgroundError> {
    let rgb = colorname::resolve(spec)?;

    let full = |f: f64| (f * 65535.0).round() as u32;
    let has_color = full(rgb.r) != full(rgb.g) || full(rgb.r) != full(rgb.b);
    let has_gray = !has_color && full(rgb.r) != 0 && full(rgb.r) != 65535;

    let scale = |f: f64| (f * hdr.maxval as f64).round() as Sample;

    match hdr.format {
        PixelFormat::Rgb => Ok(Pixel::new(scale(rgb.r), scale(rgb.g), scale(rgb.b))),
        PixelFormat::Gray | PixelFormat::Bilevel if has_color => Err(BackgroundError::NoColor {
            spec: spec.to_string(),
        }),
        PixelFormat::Bilevel if has_gray => Err(BackgroundError::NoGray {
            spec: spec.to_string(),
        }),
        PixelFormat::Gray | PixelFormat::Bilevel => Ok(Pixel::gray(scale(rgb.r))),
    }
}

/// The pixel at one designated corner. Reads and discards everything above
/// the corner's row; O(rows) worst case, one row of memory.
fn from_one_corner<R: Read + Seek>(
    rdr: &mut PnmReader<R>,
    hdr: &Header,
    corner: Corner,
) -> Result<Pixel, BackgroundError> {
    if corner.on_bottom() {
        for _ in 0..hdr.rows - 1 {
            rdr.skip_row(hdr)?;
        }
    }
    let mut row = vec![Pixel::default(); hdr.cols as usize];
    rdr.read_row(hdr, &mut row)?;
    Ok(if corner.on_right() {
        row[hdr.cols as usize - 1]
    } else {
        row[0]
    })
}

/// The default heuristic: one row read, two corner samples.
fn from_top_corners<R: Read + Seek>(
    rdr: &mut PnmReader<R>,
    hdr: &Header,
) -> Result<Pixel, BackgroundError> {
    let mut row = vec![Pixel::default(); hdr.cols as usize];
    rdr.read_row(hdr, &mut row)?;
    Ok(row_background(hdr, &row))
}

/// Derive a representative background from one row's two end pixels.
fn row_background(hdr: &Header, row: &[Pixel]) -> Pixel {
    let left = row[0];
    let right = row[row.len() - 1];
    if left == right {
        return left;
    }
    match hdr.format {
        // Majority shade of the whole row; ties are white
        PixelFormat::Bilevel => {
            let black = row.iter().filter(|px| px.r == 0).count();
            if black * 2 > row.len() {
                hdr.black()
            } else {
                hdr.white()
            }
        }
        _ => mean(&[left, right]),
    }
}

/// The robust strategy: read the whole raster into memory and sample all
/// four corners. The only strategy with a full-image footprint; the CLI
/// warns about the cost under --verbose.
fn from_four_corners<R: Read + Seek>(
    rdr: &mut PnmReader<R>,
    hdr: &Header,
) -> Result<Pixel, BackgroundError> {
    let cols = hdr.cols as usize;
    let mut raster = vec![Pixel::default(); cols * hdr.rows as usize];
    for row in raster.chunks_exact_mut(cols) {
        rdr.read_row(hdr, row)?;
    }
    let last = (hdr.rows as usize - 1) * cols;
    let corners = [
        raster[0],
        raster[cols - 1],
        raster[last],
        raster[last + cols - 1],
    ];
    Ok(corners_background(hdr, &corners))
}

/// Pick the most representative of the four corner pixels.
fn corners_background(hdr: &Header, corners: &[Pixel; 4]) -> Pixel {
    for candidate in corners {
        let count = corners.iter().filter(|c| *c == candidate).count();
        if count >= 3 {
            return *candidate;
        }
    }
    for candidate in corners {
        let count = corners.iter().filter(|c| *c == candidate).count();
        if count >= 2 {
            return *candidate;
        }
    }
    match hdr.format {
        PixelFormat::Bilevel => {
            let black = corners.iter().filter(|px| px.r == 0).count();
            if black * 2 > corners.len() {
                hdr.black()
            } else {
                hdr.white()
            }
        }
        _ => mean(corners),
    }
}

fn mean(pixels: &[Pixel]) -> Pixel {
    let n = pixels.len() as u32;
    let sum = |f: fn(&Pixel) -> Sample| {
        (pixels.iter().map(|px| f(px) as u32).sum::<u32>() / n) as Sample
    };
    Pixel::new(sum(|px| px.r), sum(|px| px.g), sum(|px| px.b))
}

/// Rescale a reference color between sample depths, for the case where the
/// analysis image's maxval differs from the primary image's.
pub fn rescale(px: Pixel, from: Sample, to: Sample) -> Pixel {
    if from == to {
        return px;
    }
    let s = |v: Sample| ((v as u64 * to as u64 + from as u64 / 2) / from as u64) as Sample;
    Pixel::new(s(px.r), s(px.g), s(px.b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pnm::PnmWriter;
    use std::io::Cursor;

    fn gray_image(rows: &[&[u16]], maxval: u16) -> (PnmReader<Cursor<Vec<u8>>>, Header) {
        let hdr = Header {
            cols: rows[0].len() as u32,
            rows: rows.len() as u32,
            maxval,
            format: PixelFormat::Gray,
            raw: true,
        };
        let mut bytes = Vec::new();
        let mut w = PnmWriter::new(&mut bytes);
        w.write_header(&hdr).unwrap();
        for row in rows {
            let pixels: Vec<Pixel> = row.iter().map(|&v| Pixel::gray(v)).collect();
            w.write_row(&hdr, &pixels).unwrap();
        }
        let mut rdr = PnmReader::new(Cursor::new(bytes));
        let parsed = rdr.read_header().unwrap();
        (rdr, parsed)
    }

    #[test]
    fn fixed_strategies_touch_no_io() {
        let hdr = Header {
            cols: 1,
            rows: 1,
            maxval: 255,
            format: PixelFormat::Gray,
            raw: true,
        };
        let mut rdr = PnmReader::new(Cursor::new(Vec::new()));
        assert_eq!(
            resolve(&mut rdr, &hdr, &BackgroundChoice::White).unwrap(),
            Pixel::gray(255)
        );
        assert_eq!(
            resolve(&mut rdr, &hdr, &BackgroundChoice::Black).unwrap(),
            Pixel::gray(0)
        );
    }

    #[test]
    fn top_corners_agreeing_win() {
        let (mut rdr, hdr) = gray_image(&[&[7, 1, 2, 7], &[9, 9, 9, 9]], 255);
        let bg = resolve(&mut rdr, &hdr, &BackgroundChoice::TopCorners).unwrap();
        assert_eq!(bg, Pixel::gray(7));
    }

    #[test]
    fn top_corners_disagreeing_average() {
        let (mut rdr, hdr) = gray_image(&[&[10, 1, 2, 20], &[9, 9, 9, 9]], 255);
        let bg = resolve(&mut rdr, &hdr, &BackgroundChoice::TopCorners).unwrap();
        assert_eq!(bg, Pixel::gray(15));
    }

    #[test]
    fn bilevel_tie_break_is_row_majority() {
        let hdr = Header {
            cols: 5,
            rows: 1,
            maxval: 1,
            format: PixelFormat::Bilevel,
            raw: true,
        };
        // black, white, black, black, white → majority black
        let row = [0u16, 1, 0, 0, 1].map(Pixel::gray);
        assert_eq!(row_background(&hdr, &row), Pixel::gray(0));
        // Even split ties to white
        let row = [0u16, 1, 0, 1].map(Pixel::gray);
        assert_eq!(row_background(&hdr, &row), Pixel::gray(1));
    }

    #[test]
    fn one_corner_bottom_right() {
        let (mut rdr, hdr) = gray_image(&[&[1, 2], &[3, 4]], 255);
        let bg = resolve(
            &mut rdr,
            &hdr,
            &BackgroundChoice::Corner(Corner::BottomRight),
        )
        .unwrap();
        assert_eq!(bg, Pixel::gray(4));
    }

    #[test]
    fn four_corner_majority() {
        let hdr = Header {
            cols: 2,
            rows: 2,
            maxval: 255,
            format: PixelFormat::Gray,
            raw: true,
        };
        let three = [Pixel::gray(5), Pixel::gray(5), Pixel::gray(5), Pixel::gray(9)];
        assert_eq!(corners_background(&hdr, &three), Pixel::gray(5));
        let pair = [Pixel::gray(9), Pixel::gray(5), Pixel::gray(1), Pixel::gray(9)];
        assert_eq!(corners_background(&hdr, &pair), Pixel::gray(9));
        let none = [Pixel::gray(0), Pixel::gray(10), Pixel::gray(20), Pixel::gray(30)];
        assert_eq!(corners_background(&hdr, &none), Pixel::gray(15));
    }

    #[test]
    fn sides_reads_full_raster() {
        let (mut rdr, hdr) = gray_image(&[&[1, 2, 2], &[8, 8, 8], &[2, 9, 2]], 255);
        let bg = resolve(&mut rdr, &hdr, &BackgroundChoice::Sides).unwrap();
        // Corners 1, 2, 2, 2 → three 2s win
        assert_eq!(bg, Pixel::gray(2));
    }

    #[test]
    fn named_color_against_rgb_image() {
        let hdr = Header {
            cols: 1,
            rows: 1,
            maxval: 255,
            format: PixelFormat::Rgb,
            raw: true,
        };
        let mut rdr = PnmReader::new(Cursor::new(Vec::new()));
        let bg = resolve(&mut rdr, &hdr, &BackgroundChoice::Color("red".into())).unwrap();
        assert_eq!(bg, Pixel::new(255, 0, 0));
    }

    #[test]
    fn chromatic_color_unrepresentable_in_gray() {
        let hdr = Header {
            cols: 1,
            rows: 1,
            maxval: 255,
            format: PixelFormat::Gray,
            raw: true,
        };
        let mut rdr = PnmReader::new(Cursor::new(Vec::new()));
        let err = resolve(&mut rdr, &hdr, &BackgroundChoice::Color("red".into())).unwrap_err();
        assert!(matches!(err, BackgroundError::NoColor { .. }));
    }

    #[test]
    fn gray_color_unrepresentable_in_bilevel_but_extremes_ok() {
        let hdr = Header {
            cols: 1,
            rows: 1,
            maxval: 1,
            format: PixelFormat::Bilevel,
            raw: true,
        };
        let mut rdr = PnmReader::new(Cursor::new(Vec::new()));
        let err = resolve(&mut rdr, &hdr, &BackgroundChoice::Color("gray".into())).unwrap_err();
        assert!(matches!(err, BackgroundError::NoGray { .. }));

        let white = resolve(&mut rdr, &hdr, &BackgroundChoice::Color("white".into())).unwrap();
        assert_eq!(white, Pixel::gray(1));
        let black = resolve(&mut rdr, &hdr, &BackgroundChoice::Color("black".into())).unwrap();
        assert_eq!(black, Pixel::gray(0));
    }

    #[test]
    fn unknown_color_name_propagates() {
        let hdr = Header {
            cols: 1,
            rows: 1,
            maxval: 255,
            format: PixelFormat::Rgb,
            raw: true,
        };
        let mut rdr = PnmReader::new(Cursor::new(Vec::new()));
        let err = resolve(&mut rdr, &hdr, &BackgroundChoice::Color("blurple".into())).unwrap_err();
        assert!(matches!(err, BackgroundError::ColorName(_)));
    }

    #[test]
    fn rescale_between_maxvals() {
        assert_eq!(rescale(Pixel::gray(1), 1, 255), Pixel::gray(255));
        assert_eq!(rescale(Pixel::gray(127), 255, 255), Pixel::gray(127));
        assert_eq!(rescale(Pixel::new(255, 0, 128), 255, 65535).r, 65535);
    }
}
