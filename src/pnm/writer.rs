//! Streaming PNM writer.
//!
//! Always emits the raw variant (`P4`/`P5`/`P6`) of the image's
//! representation. The packed-offset entry point extracts the output span
//! from the caller's buffer instead of shifting it in place, so the buffer
//! survives the write intact and no trailing-byte repair is ever needed.

use std::io::Write;

use super::bits;
use super::{Header, Pixel, PixelFormat, PnmError};

pub struct PnmWriter<W: Write> {
    inner: W,
    /// Scratch for packing rows before they hit the stream.
    scratch: Vec<u8>,
}

impl<W: Write> PnmWriter<W> {
    pub fn new(sink: W) -> Self {
        PnmWriter {
            inner: sink,
            scratch: Vec::new(),
        }
    }

    pub fn write_header(&mut self, hdr: &Header) -> Result<(), PnmError> {
        match hdr.format {
            PixelFormat::Bilevel => {
                write!(self.inner, "P4\n{} {}\n", hdr.cols, hdr.rows)?;
            }
            PixelFormat::Gray => {
                write!(self.inner, "P5\n{} {}\n{}\n", hdr.cols, hdr.rows, hdr.maxval)?;
            }
            PixelFormat::Rgb => {
                write!(self.inner, "P6\n{} {}\n{}\n", hdr.cols, hdr.rows, hdr.maxval)?;
            }
        }
        Ok(())
    }

    /// Write one row of unpacked pixels. Single-channel formats take each
    /// pixel's first channel; bilevel maps sample 0 to a black (set) bit.
    pub fn write_row(&mut self, hdr: &Header, row: &[Pixel]) -> Result<(), PnmError> {
        debug_assert_eq!(row.len(), hdr.cols as usize);
        self.scratch.clear();
        match hdr.format {
            PixelFormat::Bilevel => {
                self.scratch.resize(bits::bytes_for(hdr.cols), 0);
                for (col, px) in row.iter().enumerate() {
                    if px.r == 0 {
                        self.scratch[col / 8] |= 0x80 >> (col % 8);
                    }
                }
            }
            PixelFormat::Gray => {
                if hdr.maxval > 255 {
                    for px in row {
                        self.scratch.extend_from_slice(&px.r.to_be_bytes());
                    }
                } else {
                    self.scratch.extend(row.iter().map(|px| px.r as u8));
                }
            }
            PixelFormat::Rgb => {
                if hdr.maxval > 255 {
                    for px in row {
                        self.scratch.extend_from_slice(&px.r.to_be_bytes());
                        self.scratch.extend_from_slice(&px.g.to_be_bytes());
                        self.scratch.extend_from_slice(&px.b.to_be_bytes());
                    }
                } else {
                    for px in row {
                        self.scratch
                            .extend_from_slice(&[px.r as u8, px.g as u8, px.b as u8]);
                    }
                }
            }
        }
        self.inner.write_all(&self.scratch)?;
        Ok(())
    }

    /// Write one packed bilevel row from the start of `buf`.
    pub fn write_row_packed(&mut self, cols: u32, buf: &[u8]) -> Result<(), PnmError> {
        self.inner.write_all(&buf[..bits::bytes_for(cols)])?;
        Ok(())
    }

    /// Write a packed bilevel row of `cols` pixels taken from bit offset
    /// `bit_off` of `buf`, emitting exactly `ceil(cols / 8)` bytes.
    ///
    /// Trailing bits of the final byte beyond `cols` are whatever follows
    /// the span in `buf`; the rewriter pre-fills that region with the
    /// background pattern, so padded output rows end in clean fill bytes.
    /// `buf` must extend to the last byte boundary past the span.
    pub fn write_row_packed_offset(
        &mut self,
        cols: u32,
        buf: &[u8],
        bit_off: usize,
    ) -> Result<(), PnmError> {
        let nbytes = bits::bytes_for(cols);
        self.scratch.resize(nbytes, 0);
        bits::read_bytes_at(buf, bit_off, &mut self.scratch);
        self.inner.write_all(&self.scratch)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), PnmError> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pnm::PnmReader;
    use std::io::Cursor;

    fn gray_header(cols: u32, rows: u32, maxval: u16) -> Header {
        Header {
            cols,
            rows,
            maxval,
            format: PixelFormat::Gray,
            raw: true,
        }
    }

    #[test]
    fn header_round_trips_through_reader() {
        let hdr = Header {
            cols: 7,
            rows: 3,
            maxval: 255,
            format: PixelFormat::Rgb,
            raw: true,
        };
        let mut out = Vec::new();
        let mut w = PnmWriter::new(&mut out);
        w.write_header(&hdr).unwrap();
        for _ in 0..3 {
            w.write_row(&hdr, &vec![Pixel::new(1, 2, 3); 7]).unwrap();
        }
        let mut r = PnmReader::new(Cursor::new(out));
        assert_eq!(r.read_header().unwrap(), hdr);
    }

    #[test]
    fn gray_row_uses_first_channel() {
        let hdr = gray_header(2, 1, 255);
        let mut out = Vec::new();
        let mut w = PnmWriter::new(&mut out);
        w.write_header(&hdr).unwrap();
        w.write_row(&hdr, &[Pixel::gray(10), Pixel::gray(250)]).unwrap();
        assert!(out.ends_with(&[10, 250]));
    }

    #[test]
    fn wide_samples_are_big_endian() {
        let hdr = gray_header(1, 1, 65535);
        let mut out = Vec::new();
        let mut w = PnmWriter::new(&mut out);
        w.write_row(&hdr, &[Pixel::gray(0x1234)]).unwrap();
        assert_eq!(out, vec![0x12, 0x34]);
    }

    #[test]
    fn bilevel_row_packs_black_as_set_bits() {
        let hdr = Header {
            cols: 10,
            rows: 1,
            maxval: 1,
            format: PixelFormat::Bilevel,
            raw: true,
        };
        let mut out = Vec::new();
        let mut w = PnmWriter::new(&mut out);
        let mut row = vec![Pixel::gray(1); 10];
        row[0] = Pixel::gray(0);
        row[9] = Pixel::gray(0);
        w.write_row(&hdr, &row).unwrap();
        assert_eq!(out, vec![0x80, 0x40]);
    }

    #[test]
    fn packed_offset_extracts_without_mutating_source() {
        let buf = [0b0001_1111u8, 0b1000_0000, 0xFF];
        let before = buf;
        let mut out = Vec::new();
        let mut w = PnmWriter::new(&mut out);
        w.write_row_packed_offset(9, &buf, 3).unwrap();
        assert_eq!(out, vec![0b1111_1100, 0b0000_0111]);
        assert_eq!(buf, before);
    }
}
