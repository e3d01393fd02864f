//! # pnmtrim
//!
//! Remove (or normalize) the background borders of PNM images. Point it at
//! a PBM, PGM, or PPM stream and it figures out which color the border is,
//! measures how thick it is on each edge, and writes the image back out
//! without it — or just tells you what it *would* cut.
//!
//! # Architecture: Analyze, Plan, Rewrite
//!
//! Each image goes through three independent stages:
//!
//! ```text
//! 1. Analyze   raster  →  background color + border thicknesses
//! 2. Plan      borders →  per-edge remove/pad operations
//! 3. Rewrite   raster  →  trimmed raster (or a report line)
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Bounded memory**: analysis and rewriting are row-streaming; only the
//!   four-corner background strategy ever holds a full raster.
//! - **Reports for free**: the plan is a plain value, so report modes print
//!   it instead of executing it — no second code path through the raster.
//! - **Testability**: each stage is a function from values to values, so
//!   the planner's arithmetic is tested without synthesizing images.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pnm`] | PNM container I/O — headers, rows, packed bit rows, multi-image streams |
//! | [`colorname`] | Color-spec parsing: dictionary names, `#rgb`, `rgb:r/g/b`, `rgbi:` |
//! | [`config`] | The resolved run configuration and its cross-option rules |
//! | [`background`] | Reference background color resolution (corners, fixed, named) |
//! | [`border`] | Single-pass border thickness detection with closeness tolerance |
//! | [`plan`] | [`plan::CropSet`] — per-edge remove/pad plans and blank-image planners |
//! | [`rewrite`] | Streaming raster rewrite, including the packed-bit PBM path |
//! | [`report`] | Report-line formatting and verbose diagnostics |
//! | [`driver`] | Per-image orchestration and the multi-image loop |
//!
//! # Design Decisions
//!
//! ## Seekable Input Instead of Buffered Rasters
//!
//! Trimming needs the raster twice (three times when materializing without
//! a border file). Rather than buffer every raster in memory, the reader
//! requires `Read + Seek` and the driver rewinds between passes; stdin is
//! slurped into a seekable cursor by the CLI. Memory stays at a few rows
//! regardless of image size.
//!
//! ## PBM Rows Stay Packed
//!
//! Bilevel rasters are processed as packed bit rows. A horizontal crop or
//! pad is a bit-span extraction at an offset, done byte-at-a-time with a
//! shift; rows are never unpacked into one-byte-per-pixel form. The fill
//! bits beyond the retained span are prepared before the row is read, so a
//! partial final byte comes out clean without a post-write fixup.
//!
//! ## The Plan Is the Contract
//!
//! A [`plan::CropSet`] never removes and pads on the same edge, and every
//! plan is validated before use. The rewrite stage trusts it completely,
//! which keeps the row arithmetic free of policy.

pub mod background;
pub mod border;
pub mod colorname;
pub mod config;
pub mod driver;
pub mod plan;
pub mod pnm;
pub mod report;
pub mod rewrite;
