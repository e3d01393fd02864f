use std::fs::File;
use std::io::{self, BufWriter, Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use pnmtrim::config::{BackgroundChoice, BlankPolicy, Corner, Edge, OutputMode, TrimConfig};
use pnmtrim::driver;
use pnmtrim::pnm::PnmReader;

/// Anything the reader can analyze in multiple passes. Files qualify
/// directly; standard input is slurped into a cursor first.
trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "pnmtrim")]
#[command(about = "Crop background borders off PNM images")]
#[command(long_about = "\
Crop background borders off PNM images

Reads a PBM, PGM, or PPM stream, determines the background color, measures
how thick the background border is on each edge, and writes the image back
out without it. A stream may hold several concatenated images; each is
trimmed independently.

Background determination (first match wins):

  --black / --white      fixed black or white
  --bg-color COLOR       a named color or rgb spec (e.g. '#ff8000',
                         'rgb:ff/80/00', 'rgbi:1/.5/0')
  --bg-corner CORNER     the pixel at one corner
  --sides                all four corners, majority vote (most robust,
                         reads each image fully into memory)
  (default)              the two top corners; if they disagree, bilevel
                         images take the top row's majority shade, deeper
                         images average the two corners

With --reportsize or --reportfull nothing is cropped; one line per image
describes the plan: a token per edge in left, right, top, bottom order
(-N crop, +N add, 0 leave), then the output width and height.")]
#[command(version = version_string())]
struct Cli {
    /// Input file ('-' for standard input)
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Assume a black background
    #[arg(long, group = "background")]
    black: bool,

    /// Assume a white background
    #[arg(long, group = "background")]
    white: bool,

    /// Determine the background from all four corners
    #[arg(long, group = "background")]
    sides: bool,

    /// Background color, by name or rgb spec
    #[arg(long, value_name = "COLOR", group = "background")]
    bg_color: Option<String>,

    /// Take the background color from one corner pixel
    #[arg(long, value_name = "CORNER", value_enum, group = "background")]
    bg_corner: Option<Corner>,

    /// Crop the left edge (edge flags combine; default is all four)
    #[arg(long)]
    left: bool,

    /// Crop the right edge
    #[arg(long)]
    right: bool,

    /// Crop the top edge
    #[arg(long)]
    top: bool,

    /// Crop the bottom edge
    #[arg(long)]
    bottom: bool,

    /// Leave (or add) this many pixels of background on each cropped edge
    #[arg(long, value_name = "PIXELS", default_value_t = 0)]
    margin: u32,

    /// Measure borders on this image instead of the input
    #[arg(long, value_name = "FILE")]
    borderfile: Option<PathBuf>,

    /// Count colors within this percentage of the background as background
    #[arg(long, value_name = "PERCENT", default_value_t = 0.0)]
    closeness: f32,

    /// What to do with an image that is entirely background
    #[arg(long, value_enum, value_name = "POLICY", default_value = "abort")]
    blank_image: BlankPolicy,

    /// Report the crop plan and output size instead of cropping
    #[arg(long, conflicts_with = "reportfull")]
    reportsize: bool,

    /// Like --reportsize, plus the background color and closeness
    #[arg(long)]
    reportfull: bool,

    /// Narrate decisions on standard error
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn background(&self) -> BackgroundChoice {
        if self.black {
            BackgroundChoice::Black
        } else if self.white {
            BackgroundChoice::White
        } else if self.sides {
            BackgroundChoice::Sides
        } else if let Some(spec) = &self.bg_color {
            BackgroundChoice::Color(spec.clone())
        } else if let Some(corner) = self.bg_corner {
            BackgroundChoice::Corner(corner)
        } else {
            BackgroundChoice::TopCorners
        }
    }

    fn want_crop(&self) -> [bool; 4] {
        let picked = [self.left, self.right, self.top, self.bottom];
        if picked.iter().any(|&p| p) {
            picked
        } else {
            [true; 4]
        }
    }

    fn output_mode(&self) -> OutputMode {
        if self.reportfull {
            OutputMode::ReportFull
        } else if self.reportsize {
            OutputMode::ReportSize
        } else {
            OutputMode::Materialize
        }
    }
}

/// Open a path as a seekable stream; '-' means standard input, which is
/// read to the end up front so analysis can rewind over it.
fn open_input(path: &Path) -> io::Result<PnmReader<Box<dyn ReadSeek>>> {
    let source: Box<dyn ReadSeek> = if path == Path::new("-") {
        let mut bytes = Vec::new();
        io::stdin().lock().read_to_end(&mut bytes)?;
        Box::new(Cursor::new(bytes))
    } else {
        Box::new(File::open(path)?)
    };
    Ok(PnmReader::new(source))
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let cfg = TrimConfig {
        background: cli.background(),
        want_crop: cli.want_crop(),
        margin: cli.margin,
        closeness: cli.closeness,
        blank_policy: cli.blank_image,
        output: cli.output_mode(),
        verbose: cli.verbose,
    };
    cfg.validate(cli.borderfile.is_some())?;

    if cfg.verbose {
        let edges: Vec<&str> = Edge::ALL
            .iter()
            .filter(|&&e| cfg.wants(e))
            .map(|e| e.name())
            .collect();
        eprintln!("Cropping edges: {}", edges.join(", "));
        if cfg.background == BackgroundChoice::Sides {
            eprintln!("Examining all four corners; each image is read fully into memory");
        }
    }

    let mut input = open_input(&cli.input)?;
    let mut border = match &cli.borderfile {
        Some(path) => Some(open_input(path)?),
        None => None,
    };

    let stdout = io::stdout().lock();
    let mut out = BufWriter::new(stdout);
    driver::run(&cfg, &mut input, border.as_mut(), &mut out)?;
    out.flush()?;
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("pnmtrim: {err}");
        std::process::exit(1);
    }
}
