//! Generate a PPM image of two colors with a ragged border between them.
//!
//! The companion test-image generator for `pnmtrim`: its output is exactly
//! the kind of image border trimming exists for. Each requested edge gets a
//! border whose boundary is drawn by recursive midpoint displacement — the
//! midpoint of each span is offset by a uniform random amount scaled by
//! `--var`, then both halves are subdivided the same way.

use std::io::{self, BufWriter};

use clap::Parser;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use pnmtrim::colorname;
use pnmtrim::pnm::{Header, Pixel, PixelFormat, PnmWriter, Sample};

const MAXVAL: Sample = 255;

#[derive(Parser)]
#[command(name = "pnmrough")]
#[command(about = "Generate a PPM image with ragged borders")]
#[command(version)]
struct Cli {
    /// Image width in pixels
    #[arg(long, default_value_t = 100)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 100)]
    height: u32,

    /// Mean left border width; omit for no left border
    #[arg(long)]
    left: Option<u32>,

    /// Mean right border width; omit for no right border
    #[arg(long)]
    right: Option<u32>,

    /// Mean top border height; omit for no top border
    #[arg(long)]
    top: Option<u32>,

    /// Mean bottom border height; omit for no bottom border
    #[arg(long)]
    bottom: Option<u32>,

    /// Border color, by name or rgb spec
    #[arg(long, value_name = "COLOR")]
    bg: Option<String>,

    /// Interior color, by name or rgb spec
    #[arg(long, value_name = "COLOR")]
    fg: Option<String>,

    /// Maximum midpoint displacement; larger is more ragged
    #[arg(long, default_value_t = 10)]
    var: u32,

    /// Seed the random generator for reproducible output
    #[arg(long, value_name = "SEED")]
    randomseed: Option<u64>,

    /// Narrate parameters on standard error
    #[arg(long, short)]
    verbose: bool,
}

/// A full-frame RGB raster. Out-of-range stores are ignored, since a
/// displaced boundary may wander past the image.
struct Raster {
    cols: u32,
    rows: u32,
    pix: Vec<Pixel>,
}

impl Raster {
    fn new(cols: u32, rows: u32, fill: Pixel) -> Self {
        Raster {
            cols,
            rows,
            pix: vec![fill; cols as usize * rows as usize],
        }
    }

    fn set(&mut self, row: i64, col: i64, color: Pixel) {
        if row >= 0 && row < self.rows as i64 && col >= 0 && col < self.cols as i64 {
            self.pix[row as usize * self.cols as usize + col as usize] = color;
        }
    }

    fn row(&self, row: u32) -> &[Pixel] {
        let start = row as usize * self.cols as usize;
        &self.pix[start..start + self.cols as usize]
    }
}

fn displaced_mid(rng: &mut StdRng, a: i64, b: i64, var: u32) -> i64 {
    ((a + b) >> 1) + ((rng.random::<f64>() - 0.5) * var as f64 + 0.5).floor() as i64
}

/// Draw the left boundary between rows r1 and r2, whose border widths are
/// c1 and c2: paint the midpoint row up to a displaced width, recurse on
/// both halves.
fn ragged_left(raster: &mut Raster, rng: &mut StdRng, r1: i64, r2: i64, c1: i64, c2: i64, var: u32, bg: Pixel) {
    if r1 + 1 >= r2 {
        return;
    }
    let rm = (r1 + r2) >> 1;
    let cm = displaced_mid(rng, c1, c2, var);
    for c in 0..cm.max(0).min(raster.cols as i64) {
        raster.set(rm, c, bg);
    }
    ragged_left(raster, rng, r1, rm, c1, cm, var, bg);
    ragged_left(raster, rng, rm, r2, cm, c2, var, bg);
}

fn ragged_right(raster: &mut Raster, rng: &mut StdRng, r1: i64, r2: i64, c1: i64, c2: i64, var: u32, bg: Pixel) {
    if r1 + 1 >= r2 {
        return;
    }
    let rm = (r1 + r2) >> 1;
    let cm = displaced_mid(rng, c1, c2, var);
    for c in cm.max(0)..raster.cols as i64 {
        raster.set(rm, c, bg);
    }
    ragged_right(raster, rng, r1, rm, c1, cm, var, bg);
    ragged_right(raster, rng, rm, r2, cm, c2, var, bg);
}

fn ragged_top(raster: &mut Raster, rng: &mut StdRng, c1: i64, c2: i64, r1: i64, r2: i64, var: u32, bg: Pixel) {
    if c1 + 1 >= c2 {
        return;
    }
    let cm = (c1 + c2) >> 1;
    let rm = displaced_mid(rng, r1, r2, var);
    for r in 0..rm.max(0).min(raster.rows as i64) {
        raster.set(r, cm, bg);
    }
    ragged_top(raster, rng, c1, cm, r1, rm, var, bg);
    ragged_top(raster, rng, cm, c2, rm, r2, var, bg);
}

fn ragged_bottom(raster: &mut Raster, rng: &mut StdRng, c1: i64, c2: i64, r1: i64, r2: i64, var: u32, bg: Pixel) {
    if c1 + 1 >= c2 {
        return;
    }
    let cm = (c1 + c2) >> 1;
    let rm = displaced_mid(rng, r1, r2, var);
    for r in rm.max(0)..raster.rows as i64 {
        raster.set(r, cm, bg);
    }
    ragged_bottom(raster, rng, c1, cm, r1, rm, var, bg);
    ragged_bottom(raster, rng, cm, c2, rm, r2, var, bg);
}

fn resolve_color(spec: Option<&str>, fallback: Pixel) -> Result<Pixel, colorname::ColorNameError> {
    match spec {
        Some(spec) => {
            let rgb = colorname::resolve(spec)?;
            let scale = |f: f64| (f * MAXVAL as f64).round() as Sample;
            Ok(Pixel::new(scale(rgb.r), scale(rgb.g), scale(rgb.b)))
        }
        None => Ok(fallback),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let bg = resolve_color(cli.bg.as_deref(), Pixel::gray(0))?;
    let fg = resolve_color(cli.fg.as_deref(), Pixel::gray(MAXVAL))?;
    let mut rng = match cli.randomseed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    if cli.verbose {
        eprintln!(
            "width is {}, height is {}, variance is {}",
            cli.width, cli.height, cli.var
        );
        for (name, requested) in [
            ("left", cli.left),
            ("right", cli.right),
            ("top", cli.top),
            ("bottom", cli.bottom),
        ] {
            if requested.is_some() {
                eprintln!("ragged {name} border is required");
            }
        }
        if let Some(seed) = cli.randomseed {
            eprintln!("random generator initialized with seed {seed}");
        }
    }

    let cols = cli.width as i64;
    let rows = cli.height as i64;
    let mut raster = Raster::new(cli.width, cli.height, fg);

    if let Some(left) = cli.left {
        let width = left as i64;
        for c in 0..width {
            raster.set(0, c, bg);
            raster.set(rows - 1, c, bg);
        }
        ragged_left(&mut raster, &mut rng, 0, rows - 1, width, width, cli.var, bg);
    }
    if let Some(right) = cli.right {
        let start = cols - right as i64 - 1;
        for c in start..cols {
            raster.set(0, c, bg);
            raster.set(rows - 1, c, bg);
        }
        ragged_right(&mut raster, &mut rng, 0, rows - 1, start, start, cli.var, bg);
    }
    if let Some(top) = cli.top {
        let height = top as i64;
        for r in 0..height {
            raster.set(r, 0, bg);
            raster.set(r, cols - 1, bg);
        }
        ragged_top(&mut raster, &mut rng, 0, cols - 1, height, height, cli.var, bg);
    }
    if let Some(bottom) = cli.bottom {
        let start = rows - bottom as i64 - 1;
        for r in start..rows {
            raster.set(r, 0, bg);
            raster.set(r, cols - 1, bg);
        }
        ragged_bottom(&mut raster, &mut rng, 0, cols - 1, start, start, cli.var, bg);
    }

    let hdr = Header {
        cols: cli.width,
        rows: cli.height,
        maxval: MAXVAL,
        format: PixelFormat::Rgb,
        raw: true,
    };
    let stdout = io::stdout().lock();
    let mut out = PnmWriter::new(BufWriter::new(stdout));
    out.write_header(&hdr)?;
    for row in 0..cli.height {
        out.write_row(&hdr, raster.row(row))?;
    }
    out.flush()?;
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("pnmrough: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displacement_is_deterministic_for_a_seed() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            assert_eq!(
                displaced_mid(&mut a, 0, 10, 10),
                displaced_mid(&mut b, 0, 10, 10)
            );
        }
    }

    #[test]
    fn displacement_stays_within_the_variance_window() {
        // floor((u - 0.5) * 4 + 0.5) for u in [0, 1) spans [-2, 2]
        let mut rng = StdRng::from_rng(&mut rand::rng());
        for _ in 0..256 {
            let m = displaced_mid(&mut rng, 0, 10, 4);
            assert!((3..=7).contains(&m), "midpoint {m} out of range");
        }
    }
}
