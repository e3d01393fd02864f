//! Re-streaming the raster under a crop/pad plan, in one forward pass.
//!
//! One working row buffer serves both reading and writing. Its layout,
//! described by [`RowLayout`], centers the *retained* pixels (everything
//! not removed or padded — which can include original border kept as
//! margin) at a fixed offset:
//!
//! ```text
//!               retained_offset
//!                     v
//! [ . . . . . . . . . R R R R R R R R R R . . . . . ]
//!   <-- left slack --> <--- retained ---> <- right ->
//! ```
//!
//! The left slack is the larger of the left remove and left pad, so an
//! input row lands with its retained span in place when read at
//! `retained_offset - remove_left`, and an output row starts at
//! `retained_offset - pad_left`. Pad cells are filled with the background
//! color once, before the row loop; reads never touch them.
//!
//! The packed bilevel path uses the same layout in bit units. Reads
//! deposit exactly `cols` bits and writes *extract* the output span into
//! fresh bytes, so the buffer's fill bits survive every iteration and the
//! trailing partial byte of a right-padded row comes out as clean
//! background fill with no post-write repair.
//!
//! Only strictly forward reads are issued: once the plan is known, this
//! works on a non-seekable source.

use std::io::{Read, Seek, Write};

use crate::config::Edge;
use crate::plan::CropSet;
use crate::pnm::{Header, Pixel, PixelFormat, PnmError, PnmReader, PnmWriter, bits};

/// Index arithmetic for the shared row buffer, in pixel (or bit) units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RowLayout {
    /// Start of the retained span within the buffer.
    pub retained_offset: usize,
    /// Pixels kept from each input row.
    pub retained_cols: usize,
    /// Rows kept from the input raster.
    pub retained_rows: u32,
    pub output_cols: u32,
    pub output_rows: u32,
    /// Total buffer extent.
    pub total_cols: usize,
    /// Where an input row starts so its retained span lines up.
    pub read_offset: usize,
    /// Where an output row starts so its left pad precedes the span.
    pub write_offset: usize,
}

impl RowLayout {
    pub fn new(cols: u32, rows: u32, crop: &CropSet) -> Self {
        let left = crop.at(Edge::Left);
        let right = crop.at(Edge::Right);
        let retained_cols = (cols - left.remove - right.remove) as usize;
        let retained_offset = left.remove.max(left.pad) as usize;
        let retained_end = retained_offset + retained_cols;
        RowLayout {
            retained_offset,
            retained_cols,
            retained_rows: rows - crop.at(Edge::Top).remove - crop.at(Edge::Bottom).remove,
            output_cols: crop.output_cols(cols),
            output_rows: crop.output_rows(rows),
            total_cols: retained_end + right.remove.max(right.pad) as usize,
            read_offset: (retained_offset as u32 - left.remove) as usize,
            write_offset: (retained_offset as u32 - left.pad) as usize,
        }
    }
}

/// Stream the raster at `rdr` through the plan in `crop`, writing one
/// complete output image (header included) to `out`.
///
/// `background` is the fill for padded cells. Expects `rdr` positioned at
/// the raster start; consumes exactly the raster.
pub fn write_trimmed<R: Read + Seek, W: Write>(
    rdr: &mut PnmReader<R>,
    hdr: &Header,
    crop: &CropSet,
    background: Pixel,
    out: &mut PnmWriter<W>,
) -> Result<(), PnmError> {
    let layout = RowLayout::new(hdr.cols, hdr.rows, crop);
    let out_hdr = Header {
        cols: layout.output_cols,
        rows: layout.output_rows,
        maxval: hdr.maxval,
        format: hdr.format,
        raw: true,
    };
    out.write_header(&out_hdr)?;

    if hdr.format == PixelFormat::Bilevel {
        write_rows_packed(rdr, hdr, crop, &layout, background, &out_hdr, out)?;
    } else {
        write_rows_unpacked(rdr, hdr, crop, &layout, background, &out_hdr, out)?;
    }
    out.flush()
}

fn write_rows_unpacked<R: Read + Seek, W: Write>(
    rdr: &mut PnmReader<R>,
    hdr: &Header,
    crop: &CropSet,
    layout: &RowLayout,
    background: Pixel,
    out_hdr: &Header,
    out: &mut PnmWriter<W>,
) -> Result<(), PnmError> {
    let cols = hdr.cols as usize;
    let out_cols = layout.output_cols as usize;

    for _ in 0..crop.at(Edge::Top).remove {
        rdr.skip_row(hdr)?;
    }
    let pad_row = vec![background; out_cols];
    for _ in 0..crop.at(Edge::Top).pad {
        out.write_row(out_hdr, &pad_row)?;
    }

    let mut buf = vec![background; layout.total_cols];
    for _ in 0..layout.retained_rows {
        rdr.read_row(hdr, &mut buf[layout.read_offset..layout.read_offset + cols])?;
        out.write_row(
            out_hdr,
            &buf[layout.write_offset..layout.write_offset + out_cols],
        )?;
    }

    for _ in 0..crop.at(Edge::Bottom).remove {
        rdr.skip_row(hdr)?;
    }
    for _ in 0..crop.at(Edge::Bottom).pad {
        out.write_row(out_hdr, &pad_row)?;
    }
    Ok(())
}

fn write_rows_packed<R: Read + Seek, W: Write>(
    rdr: &mut PnmReader<R>,
    hdr: &Header,
    crop: &CropSet,
    layout: &RowLayout,
    background: Pixel,
    out_hdr: &Header,
    out: &mut PnmWriter<W>,
) -> Result<(), PnmError> {
    // Bit 1 is black; a white background fills with zero bits
    let fill: u8 = if background == hdr.white() { 0x00 } else { 0xFF };

    for _ in 0..crop.at(Edge::Top).remove {
        rdr.skip_row(hdr)?;
    }
    let pad_row = filled_packed_row(layout.output_cols, fill);
    for _ in 0..crop.at(Edge::Top).pad {
        out.write_row_packed(layout.output_cols, &pad_row)?;
    }

    // One spare byte so span extraction may run to the next byte boundary
    let mut buf = vec![fill; bits::bytes_for(layout.total_cols as u32) + 1];
    for _ in 0..layout.retained_rows {
        rdr.read_row_packed_offset(hdr, &mut buf, layout.read_offset)?;
        out.write_row_packed_offset(layout.output_cols, &buf, layout.write_offset)?;
    }

    for _ in 0..crop.at(Edge::Bottom).remove {
        rdr.skip_row(hdr)?;
    }
    for _ in 0..crop.at(Edge::Bottom).pad {
        out.write_row_packed(layout.output_cols, &pad_row)?;
    }
    Ok(())
}

/// A packed row of `cols` pixels in the fill shade. Bits of the final
/// partial byte beyond the row are cleared, the Netpbm convention for
/// freshly built packed rows.
fn filled_packed_row(cols: u32, fill: u8) -> Vec<u8> {
    let mut row = vec![fill; bits::bytes_for(cols)];
    if cols % 8 != 0 {
        let last = row.len() - 1;
        row[last] <<= 8 - cols % 8;
    }
    row
}
