//! The run configuration surface and its cross-option rules.
//!
//! [`TrimConfig`] is everything the user decided, in a form the rest of the
//! crate consumes read-only; it is built once by the CLI layer and shared by
//! reference for the whole run. Option *combinations* that clap's
//! per-argument machinery cannot express (maxcrop needs a report mode, a
//! border file excludes report modes, closeness is a percentage) are
//! validated here and surfaced as [`ConfigError`].

use clap::ValueEnum;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// The four image edges. The order is load-bearing: report lines emit one
/// token per edge in exactly this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left = 0,
    Right = 1,
    Top = 2,
    Bottom = 3,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Right => "right",
            Edge::Top => "top",
            Edge::Bottom => "bottom",
        }
    }
}

/// A corner of the image, for the single-corner background strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Corner {
    #[value(name = "topleft")]
    TopLeft,
    #[value(name = "topright")]
    TopRight,
    #[value(name = "bottomleft")]
    BottomLeft,
    #[value(name = "bottomright")]
    BottomRight,
}

impl Corner {
    pub fn on_bottom(self) -> bool {
        matches!(self, Corner::BottomLeft | Corner::BottomRight)
    }

    pub fn on_right(self) -> bool {
        matches!(self, Corner::TopRight | Corner::BottomRight)
    }
}

/// How the reference background color is chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundChoice {
    /// Two-corner heuristic over the first row. The default.
    TopCorners,
    /// All four corners, full-raster read. Most robust, most expensive.
    Sides,
    Black,
    White,
    /// The pixel at one designated corner.
    Corner(Corner),
    /// A named or spec'd color, resolved against the image's depth.
    Color(String),
}

/// What to do when an image turns out to be entirely background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BlankPolicy {
    /// Fail the run. The default.
    Abort,
    /// Copy the image through unchanged.
    Pass,
    /// Collapse each selected axis to a single row/column.
    Minimize,
    /// Report the full dimension as removable. Report modes only.
    Maxcrop,
}

/// What the run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// An actual transformed raster.
    Materialize,
    /// One line per image: edge tokens plus output dimensions.
    ReportSize,
    /// The size report plus background color and closeness.
    ReportFull,
}

impl OutputMode {
    pub fn is_report(self) -> bool {
        !matches!(self, OutputMode::Materialize)
    }
}

/// Everything the user decided, resolved from the command line.
#[derive(Debug, Clone)]
pub struct TrimConfig {
    pub background: BackgroundChoice,
    /// Which edges to crop, indexed by [`Edge`]. Default: all four.
    pub want_crop: [bool; 4],
    /// Background thickness to keep (or create) on each cropped edge.
    pub margin: u32,
    /// Percentage of the color-cube diagonal within which a pixel still
    /// counts as background. 0 means exact match.
    pub closeness: f32,
    pub blank_policy: BlankPolicy,
    pub output: OutputMode,
    pub verbose: bool,
}

impl Default for TrimConfig {
    fn default() -> Self {
        TrimConfig {
            background: BackgroundChoice::TopCorners,
            want_crop: [true; 4],
            margin: 0,
            closeness: 0.0,
            blank_policy: BlankPolicy::Abort,
            output: OutputMode::Materialize,
            verbose: false,
        }
    }
}

impl TrimConfig {
    pub fn wants(&self, edge: Edge) -> bool {
        self.want_crop[edge.index()]
    }

    /// Check option combinations. `has_border_file` comes from the CLI
    /// layer since the config itself does not carry paths.
    pub fn validate(&self, has_border_file: bool) -> Result<(), ConfigError> {
        if self.closeness < 0.0 {
            return Err(ConfigError::Validation(format!(
                "closeness value {} is negative",
                self.closeness
            )));
        }
        if self.closeness > 100.0 {
            return Err(ConfigError::Validation(format!(
                "closeness value {} is more than 100%",
                self.closeness
            )));
        }
        if self.blank_policy == BlankPolicy::Maxcrop && !self.output.is_report() {
            return Err(ConfigError::Validation(
                "--blank-image=maxcrop requires --reportfull or --reportsize".into(),
            ));
        }
        if has_border_file && self.output.is_report() {
            return Err(ConfigError::Validation(
                "--reportfull and --reportsize cannot be used with --borderfile".into(),
            ));
        }
        Ok(())
    }
}
