//! Per-image orchestration and the multi-image loop.
//!
//! One image goes through four stages: resolve the background color, scan
//! for borders, turn borders into a plan, then either materialize the
//! trimmed raster or print a report line. [`run`] repeats that for every
//! image in the stream, keeping an optional border-analysis stream in
//! lockstep with the primary one.
//!
//! Analysis needs two passes over a raster (one for the background color,
//! one for the border scan) and materializing needs a third, which is why
//! the reader is seekable rather than purely sequential.

use std::io::{Read, Seek, Write};

use thiserror::Error;

use crate::background::{self, BackgroundError};
use crate::border::{self, BorderSet};
use crate::config::{BlankPolicy, ConfigError, OutputMode, TrimConfig};
use crate::plan::{self, CropSet, PlanError};
use crate::pnm::{Header, Pixel, PnmError, PnmReader, PnmWriter};
use crate::report;
use crate::rewrite;

#[derive(Error, Debug)]
pub enum TrimError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Pnm(#[from] PnmError),
    #[error("{0}")]
    Background(#[from] BackgroundError),
    #[error("{0}")]
    Plan(#[from] PlanError),
    #[error("Write error: {0}")]
    Io(#[from] std::io::Error),
    #[error("The image is entirely background; there is nothing to crop")]
    BlankImage,
    #[error(
        "Border file image is {border_cols}x{border_rows}, \
         but the input image is {cols}x{rows}. They must match"
    )]
    DimensionMismatch {
        border_cols: u32,
        border_rows: u32,
        cols: u32,
        rows: u32,
    },
    #[error("The {exhausted} stream ended before the {continuing} stream")]
    StreamCountMismatch {
        exhausted: &'static str,
        continuing: &'static str,
    },
}

/// Background color and detected borders for one raster. `borders` is
/// `None` when the image is entirely background.
struct Analysis {
    background: Pixel,
    borders: Option<BorderSet>,
}

/// Analyze one raster: background color, then borders.
///
/// Expects `rdr` at the raster start and leaves it just past the raster.
fn analyze<R: Read + Seek>(
    rdr: &mut PnmReader<R>,
    hdr: &Header,
    cfg: &TrimConfig,
) -> Result<Analysis, TrimError> {
    let raster_start = rdr.position()?;
    let background = background::resolve(rdr, hdr, &cfg.background)?;
    if cfg.verbose {
        eprintln!(
            "Background color is {}",
            report::describe_color(background, hdr.maxval)
        );
    }
    rdr.seek_to(raster_start)?;
    let borders = border::find_borders(rdr, hdr, background, cfg.closeness)?;
    Ok(Analysis { background, borders })
}

/// Plan for an image with no foreground at all, per the configured policy.
fn plan_blank(cfg: &TrimConfig, hdr: &Header) -> Result<CropSet, TrimError> {
    if cfg.margin > 0 {
        eprintln!("Warning: ignoring margin; the image is entirely background");
    }
    match cfg.blank_policy {
        BlankPolicy::Abort => Err(TrimError::BlankImage),
        BlankPolicy::Pass => {
            if cfg.verbose {
                eprintln!("The image is entirely background; copying through unchanged");
            }
            Ok(plan::pass_through())
        }
        BlankPolicy::Minimize => Ok(plan::minimize(cfg, hdr.cols, hdr.rows)),
        BlankPolicy::Maxcrop => Ok(plan::maxcrop(cfg, hdr.cols, hdr.rows)),
    }
}

/// Process the image whose header has just been read from `input`.
///
/// With a border stream present, its current image supplies the analysis
/// (its own header was just read too) and `input` supplies the pixels.
fn trim_one<R, B, W>(
    cfg: &TrimConfig,
    input: &mut PnmReader<R>,
    hdr: &Header,
    border: Option<(&mut PnmReader<B>, &Header)>,
    out: &mut W,
) -> Result<(), TrimError>
where
    R: Read + Seek,
    B: Read + Seek,
    W: Write,
{
    let analysis = match border {
        Some((border_rdr, border_hdr)) => {
            if (border_hdr.cols, border_hdr.rows) != (hdr.cols, hdr.rows) {
                return Err(TrimError::DimensionMismatch {
                    border_cols: border_hdr.cols,
                    border_rows: border_hdr.rows,
                    cols: hdr.cols,
                    rows: hdr.rows,
                });
            }
            let mut analysis = analyze(border_rdr, border_hdr, cfg)?;
            // The reference color lives at the border image's depth
            analysis.background =
                background::rescale(analysis.background, border_hdr.maxval, hdr.maxval);
            analysis
        }
        None => {
            let raster_start = input.position()?;
            let analysis = analyze(input, hdr, cfg)?;
            if cfg.output == OutputMode::Materialize {
                input.seek_to(raster_start)?;
            }
            analysis
        }
    };

    let crop = match &analysis.borders {
        Some(borders) => plan::from_borders(cfg, borders),
        None => plan_blank(cfg, hdr)?,
    };
    crop.validate(hdr.cols, hdr.rows)?;
    if cfg.verbose {
        report::print_crop_parameters(&crop);
    }

    match cfg.output {
        OutputMode::ReportSize => {
            writeln!(out, "{}", report::size_line(&crop, hdr.cols, hdr.rows))?;
        }
        OutputMode::ReportFull => {
            writeln!(
                out,
                "{}",
                report::full_line(
                    &crop,
                    hdr.cols,
                    hdr.rows,
                    hdr.maxval,
                    analysis.background,
                    cfg.closeness,
                )
            )?;
        }
        OutputMode::Materialize => {
            let mut writer = PnmWriter::new(&mut *out);
            rewrite::write_trimmed(input, hdr, &crop, analysis.background, &mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}

/// Process every image in the input stream.
///
/// A PNM stream may hold several concatenated images; each is trimmed
/// independently. When a border stream is given it must hold exactly as
/// many images as the input, consumed in lockstep. The configuration's
/// cross-option rules are enforced here, so a combination
/// [`TrimConfig::validate`] rejects (such as a border stream under a
/// report mode, whose input rasters would never be consumed) fails before
/// any image is touched.
pub fn run<R, B, W>(
    cfg: &TrimConfig,
    input: &mut PnmReader<R>,
    mut border: Option<&mut PnmReader<B>>,
    out: &mut W,
) -> Result<(), TrimError>
where
    R: Read + Seek,
    B: Read + Seek,
    W: Write,
{
    cfg.validate(border.is_some())?;
    let mut image_index = 0u32;
    loop {
        let hdr = input.read_header()?;
        if cfg.verbose && image_index > 0 {
            eprintln!("Trimming image {}", image_index + 1);
        }
        match border.as_deref_mut() {
            Some(border_rdr) => {
                let border_hdr = border_rdr.read_header()?;
                trim_one(cfg, input, &hdr, Some((border_rdr, &border_hdr)), out)?;
            }
            None => {
                trim_one::<R, B, W>(cfg, input, &hdr, None, out)?;
            }
        }
        image_index += 1;

        let more_input = input.next_image()?;
        if let Some(border_rdr) = border.as_deref_mut() {
            let more_border = border_rdr.next_image()?;
            if more_input != more_border {
                let (exhausted, continuing) = if more_input {
                    ("border file", "input")
                } else {
                    ("input", "border file")
                };
                return Err(TrimError::StreamCountMismatch {
                    exhausted,
                    continuing,
                });
            }
        }
        if !more_input {
            return Ok(());
        }
    }
}
