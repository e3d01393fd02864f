//! Streaming PNM reader.
//!
//! One `PnmReader` wraps one input stream for its whole lifetime and hands
//! out images in order: `read_header`, then exactly `rows` row reads (or
//! skips), then `next_image` to probe for a following image. The stream must
//! be seekable — border analysis reads the raster once and rewinds before
//! the rewrite pass — but all reads are strictly forward.

use std::io::{BufReader, Read, Seek, SeekFrom};

use super::bits;
use super::{Header, MAX_MAXVAL, Pixel, PixelFormat, PnmError, Sample};

pub struct PnmReader<R: Read + Seek> {
    inner: BufReader<R>,
    /// Scratch for raw row bytes and packed plain rows.
    scratch: Vec<u8>,
}

impl<R: Read + Seek> PnmReader<R> {
    pub fn new(source: R) -> Self {
        PnmReader {
            inner: BufReader::new(source),
            scratch: Vec::new(),
        }
    }

    /// Current byte position, for rewinding to the raster start later.
    pub fn position(&mut self) -> Result<u64, PnmError> {
        Ok(self.inner.stream_position()?)
    }

    pub fn seek_to(&mut self, pos: u64) -> Result<(), PnmError> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    /// Parse the header of the image the stream is positioned at.
    ///
    /// Leaves the stream at the first byte of the raster.
    pub fn read_header(&mut self) -> Result<Header, PnmError> {
        let magic = [self.require_byte()?, self.require_byte()?];
        if magic[0] != b'P' {
            return Err(PnmError::BadMagic(format!(
                "expected magic 'P1'..'P6', got {:?}",
                magic.map(|b| b as char)
            )));
        }
        let (format, raw, has_maxval) = match magic[1] {
            b'1' => (PixelFormat::Bilevel, false, false),
            b'2' => (PixelFormat::Gray, false, true),
            b'3' => (PixelFormat::Rgb, false, true),
            b'4' => (PixelFormat::Bilevel, true, false),
            b'5' => (PixelFormat::Gray, true, true),
            b'6' => (PixelFormat::Rgb, true, true),
            other => {
                return Err(PnmError::BadMagic(format!(
                    "unknown format 'P{}'",
                    other as char
                )));
            }
        };

        let cols = self.read_number()?;
        let rows = self.read_number()?;
        if cols == 0 || rows == 0 {
            return Err(PnmError::Syntax(format!("degenerate size {cols}x{rows}")));
        }
        let maxval = if has_maxval {
            let v = self.read_number()?;
            if v == 0 || v > MAX_MAXVAL as u32 {
                return Err(PnmError::Syntax(format!("invalid maxval {v}")));
            }
            v as Sample
        } else {
            1
        };

        Ok(Header {
            cols,
            rows,
            maxval,
            format,
            raw,
        })
    }

    /// Read one row as unpacked pixels. `out` must hold exactly `cols`
    /// pixels. Single-channel samples are replicated across channels.
    pub fn read_row(&mut self, hdr: &Header, out: &mut [Pixel]) -> Result<(), PnmError> {
        debug_assert_eq!(out.len(), hdr.cols as usize);
        match (hdr.format, hdr.raw) {
            (PixelFormat::Bilevel, _) => {
                let nbytes = bits::bytes_for(hdr.cols);
                self.scratch.resize(nbytes, 0);
                let mut packed = std::mem::take(&mut self.scratch);
                let res = self.read_row_packed_into(hdr, &mut packed);
                self.scratch = packed;
                res?;
                for (col, px) in out.iter_mut().enumerate() {
                    // Bit 1 is black, which unpacks to sample 0
                    *px = Pixel::gray(if bits::get(&self.scratch, col) { 0 } else { 1 });
                }
            }
            (PixelFormat::Gray, true) => {
                let wide = hdr.maxval > 255;
                let nbytes = hdr.cols as usize * if wide { 2 } else { 1 };
                self.scratch.resize(nbytes, 0);
                self.inner.read_exact(&mut self.scratch)?;
                for (col, px) in out.iter_mut().enumerate() {
                    let v = if wide {
                        u16::from_be_bytes([self.scratch[col * 2], self.scratch[col * 2 + 1]])
                    } else {
                        self.scratch[col] as u16
                    };
                    *px = Pixel::gray(self.check_sample(v, hdr)?);
                }
            }
            (PixelFormat::Rgb, true) => {
                let wide = hdr.maxval > 255;
                let per = if wide { 6 } else { 3 };
                self.scratch.resize(hdr.cols as usize * per, 0);
                self.inner.read_exact(&mut self.scratch)?;
                for (col, px) in out.iter_mut().enumerate() {
                    let at = |i: usize| -> u16 {
                        let base = col * per;
                        if wide {
                            u16::from_be_bytes([
                                self.scratch[base + i * 2],
                                self.scratch[base + i * 2 + 1],
                            ])
                        } else {
                            self.scratch[base + i] as u16
                        }
                    };
                    *px = Pixel::new(
                        self.check_sample(at(0), hdr)?,
                        self.check_sample(at(1), hdr)?,
                        self.check_sample(at(2), hdr)?,
                    );
                }
            }
            (PixelFormat::Gray, false) => {
                for px in out.iter_mut() {
                    let v = self.read_plain_sample(hdr)?;
                    *px = Pixel::gray(v);
                }
            }
            (PixelFormat::Rgb, false) => {
                for px in out.iter_mut() {
                    *px = Pixel::new(
                        self.read_plain_sample(hdr)?,
                        self.read_plain_sample(hdr)?,
                        self.read_plain_sample(hdr)?,
                    );
                }
            }
        }
        Ok(())
    }

    /// Read one bilevel row in packed form into the start of `out`.
    pub fn read_row_packed(&mut self, hdr: &Header, out: &mut [u8]) -> Result<(), PnmError> {
        self.read_row_packed_into(hdr, out)
    }

    /// Read one bilevel row in packed form, depositing it at bit offset
    /// `bit_off` of `buf`. Bits outside the deposited span are untouched.
    pub fn read_row_packed_offset(
        &mut self,
        hdr: &Header,
        buf: &mut [u8],
        bit_off: usize,
    ) -> Result<(), PnmError> {
        let nbytes = bits::bytes_for(hdr.cols);
        self.scratch.resize(nbytes, 0);
        let mut packed = std::mem::take(&mut self.scratch);
        let res = self.read_row_packed_into(hdr, &mut packed);
        self.scratch = packed;
        res?;
        bits::copy(buf, bit_off, &self.scratch, 0, hdr.cols as usize);
        Ok(())
    }

    fn read_row_packed_into(&mut self, hdr: &Header, out: &mut [u8]) -> Result<(), PnmError> {
        debug_assert_eq!(hdr.format, PixelFormat::Bilevel);
        let nbytes = bits::bytes_for(hdr.cols);
        if hdr.raw {
            self.inner.read_exact(&mut out[..nbytes])?;
        } else {
            out[..nbytes].fill(0);
            for col in 0..hdr.cols as usize {
                if self.read_plain_bit()? {
                    out[col / 8] |= 0x80 >> (col % 8);
                }
            }
        }
        Ok(())
    }

    /// Advance past one row without decoding it. The row's bytes are still
    /// consumed, so a raster truncated inside a skipped row is an error
    /// rather than a silent success.
    pub fn skip_row(&mut self, hdr: &Header) -> Result<(), PnmError> {
        if hdr.raw {
            let nbytes = match hdr.format {
                PixelFormat::Bilevel => bits::bytes_for(hdr.cols),
                _ => {
                    let per = if hdr.maxval > 255 { 2 } else { 1 };
                    hdr.cols as usize * hdr.format.channels() * per
                }
            };
            self.scratch.resize(nbytes, 0);
            self.inner.read_exact(&mut self.scratch)?;
        } else {
            match hdr.format {
                PixelFormat::Bilevel => {
                    for _ in 0..hdr.cols {
                        self.read_plain_bit()?;
                    }
                }
                _ => {
                    let samples = hdr.cols as usize * hdr.format.channels();
                    for _ in 0..samples {
                        self.read_plain_sample(hdr)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// After a raster has been fully consumed, report whether another image
    /// follows in the stream. Skips inter-image whitespace and leaves the
    /// stream positioned at the next image's magic number.
    pub fn next_image(&mut self) -> Result<bool, PnmError> {
        loop {
            match self.read_byte()? {
                None => return Ok(false),
                Some(b) if b.is_ascii_whitespace() => continue,
                Some(_) => {
                    self.inner.seek_relative(-1)?;
                    return Ok(true);
                }
            }
        }
    }

    fn check_sample(&self, v: u16, hdr: &Header) -> Result<Sample, PnmError> {
        if v > hdr.maxval {
            Err(PnmError::Syntax(format!(
                "sample value {v} exceeds maxval {}",
                hdr.maxval
            )))
        } else {
            Ok(v)
        }
    }

    fn read_byte(&mut self) -> Result<Option<u8>, PnmError> {
        let mut b = [0u8; 1];
        let n = self.inner.read(&mut b)?;
        Ok(if n == 0 { None } else { Some(b[0]) })
    }

    fn require_byte(&mut self) -> Result<u8, PnmError> {
        self.read_byte()?.ok_or(PnmError::Truncated)
    }

    /// Skip whitespace and `#` comments, then return the first content byte.
    fn skip_space(&mut self) -> Result<u8, PnmError> {
        loop {
            let b = self.require_byte()?;
            if b == b'#' {
                loop {
                    let c = self.require_byte()?;
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                }
            } else if !b.is_ascii_whitespace() {
                return Ok(b);
            }
        }
    }

    /// Whitespace-delimited decimal, used for header fields and plain
    /// samples. Consumes the single delimiter that terminates the number,
    /// which for headers is exactly the byte separating header from raster.
    fn read_number(&mut self) -> Result<u32, PnmError> {
        let first = self.skip_space()?;
        if !first.is_ascii_digit() {
            return Err(PnmError::Syntax(format!(
                "expected digit, got {:?}",
                first as char
            )));
        }
        let mut value: u64 = (first - b'0') as u64;
        loop {
            match self.read_byte()? {
                None => break,
                Some(b) if b.is_ascii_digit() => {
                    value = value * 10 + (b - b'0') as u64;
                    if value > u32::MAX as u64 {
                        return Err(PnmError::Syntax("number too large".into()));
                    }
                }
                Some(b) if b.is_ascii_whitespace() => break,
                Some(b) => {
                    return Err(PnmError::Syntax(format!(
                        "unexpected byte {:?} in number",
                        b as char
                    )));
                }
            }
        }
        Ok(value as u32)
    }

    fn read_plain_sample(&mut self, hdr: &Header) -> Result<Sample, PnmError> {
        let v = self.read_number()?;
        if v > hdr.maxval as u32 {
            return Err(PnmError::Syntax(format!(
                "sample value {v} exceeds maxval {}",
                hdr.maxval
            )));
        }
        Ok(v as Sample)
    }

    /// P1 bits need no separators: `0110` is four pixels.
    fn read_plain_bit(&mut self) -> Result<bool, PnmError> {
        let b = self.skip_space()?;
        match b {
            b'0' => Ok(false),
            b'1' => Ok(true),
            other => Err(PnmError::Syntax(format!(
                "expected '0' or '1' in plain bitmap, got {:?}",
                other as char
            ))),
        }
    }
}
