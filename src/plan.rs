//! Turning detected borders into a per-edge remove/pad plan.
//!
//! A [`CropOp`] never removes and pads on the same edge: an edge whose
//! detected border is thicker than the requested margin loses the excess,
//! one thinner than the margin gains the difference. The blank-image
//! planners cover the degenerate case where no borders exist at all;
//! which one runs is the driver's policy decision.
//!
//! Every plan is validated before use: the remove/pad exclusivity is a
//! programming invariant (violations are bugs, not user errors), and padded
//! output dimensions must stay representable.

use crate::border::BorderSet;
use crate::config::{Edge, TrimConfig};
use thiserror::Error;

/// Largest output dimension a PNM header may declare.
const MAX_DIMENSION: u64 = i32::MAX as u64;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Output {axis} too large: {size}")]
    SizeOverflow { axis: &'static str, size: u64 },
    #[error(
        "Attempt to add {pad} and crop {remove} on {edge} edge. \
         Simultaneous pad and crop is not allowed"
    )]
    Invariant {
        edge: &'static str,
        remove: u32,
        pad: u32,
    },
}

/// One edge's operation: remove pixels, add pixels, or neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CropOp {
    pub remove: u32,
    pub pad: u32,
}

/// One [`CropOp`] per edge, indexed by [`Edge`]. Computed fresh per image
/// and discarded after the rewrite; nothing survives across images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CropSet {
    pub op: [CropOp; 4],
}

impl CropSet {
    pub fn at(&self, edge: Edge) -> CropOp {
        self.op[edge.index()]
    }

    /// Whether this plan changes nothing (the pass-through plan).
    pub fn is_identity(&self) -> bool {
        self.op.iter().all(|op| op.remove == 0 && op.pad == 0)
    }

    /// Enforce the per-edge remove/pad exclusivity and the representable
    /// output size bound.
    pub fn validate(&self, cols: u32, rows: u32) -> Result<(), PlanError> {
        for edge in Edge::ALL {
            let op = self.at(edge);
            if op.remove > 0 && op.pad > 0 {
                return Err(PlanError::Invariant {
                    edge: edge.name(),
                    remove: op.remove,
                    pad: op.pad,
                });
            }
        }
        let width = cols as u64 + self.at(Edge::Left).pad as u64 + self.at(Edge::Right).pad as u64;
        if width > MAX_DIMENSION {
            return Err(PlanError::SizeOverflow {
                axis: "width",
                size: width,
            });
        }
        let height = rows as u64 + self.at(Edge::Top).pad as u64 + self.at(Edge::Bottom).pad as u64;
        if height > MAX_DIMENSION {
            return Err(PlanError::SizeOverflow {
                axis: "height",
                size: height,
            });
        }
        Ok(())
    }

    /// Executable output width (cols − removes + pads). Only valid for a
    /// plan that passed [`validate`](Self::validate).
    pub fn output_cols(&self, cols: u32) -> u32 {
        cols - self.at(Edge::Left).remove - self.at(Edge::Right).remove
            + self.at(Edge::Left).pad
            + self.at(Edge::Right).pad
    }

    pub fn output_rows(&self, rows: u32) -> u32 {
        rows - self.at(Edge::Top).remove - self.at(Edge::Bottom).remove
            + self.at(Edge::Top).pad
            + self.at(Edge::Bottom).pad
    }
}

/// The normal plan: per wanted edge, remove down to the margin or pad up
/// to it. Unwanted edges are untouched.
pub fn from_borders(cfg: &TrimConfig, borders: &BorderSet) -> CropSet {
    let mut crop = CropSet::default();
    for edge in Edge::ALL {
        let op = &mut crop.op[edge.index()];
        if cfg.wants(edge) {
            let thickness = borders.at(edge);
            if thickness > cfg.margin {
                op.remove = thickness - cfg.margin;
            } else {
                op.pad = cfg.margin - thickness;
            }
        }
    }
    crop
}

/// Blank image, pass policy: the identity plan.
pub fn pass_through() -> CropSet {
    CropSet::default()
}

/// Blank image, minimize policy: collapse each selected axis toward one
/// surviving row/column. With both opposite edges selected the axis is
/// split (floor on the left/top side); with one, everything but the last
/// pixel on that side goes.
pub fn minimize(cfg: &TrimConfig, cols: u32, rows: u32) -> CropSet {
    let mut crop = CropSet::default();
    let mut split = |low: Edge, high: Edge, extent: u32| {
        let (a, b) = match (cfg.wants(low), cfg.wants(high)) {
            (true, true) => (extent / 2, extent - extent / 2 - 1),
            (true, false) => (extent - 1, 0),
            (false, true) => (0, extent - 1),
            (false, false) => (0, 0),
        };
        crop.op[low.index()].remove = a;
        crop.op[high.index()].remove = b;
    };
    split(Edge::Left, Edge::Right, cols);
    split(Edge::Top, Edge::Bottom, rows);
    crop
}

/// Blank image, maxcrop policy: report the full dimension as removable on
/// every selected edge. Informational only — both edges of an axis may
/// claim the whole extent — so this plan is never materialized.
pub fn maxcrop(cfg: &TrimConfig, cols: u32, rows: u32) -> CropSet {
    let mut crop = CropSet::default();
    for edge in Edge::ALL {
        if cfg.wants(edge) {
            let extent = match edge {
                Edge::Left | Edge::Right => cols,
                Edge::Top | Edge::Bottom => rows,
            };
            crop.op[edge.index()].remove = extent;
        }
    }
    crop
}
