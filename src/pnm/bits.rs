//! Bit-span primitives for packed bilevel rows.
//!
//! All indexing is MSB-first within a byte: bit 0 of a row is the high bit
//! of byte 0, which is how Netpbm packs PBM rasters. These helpers let the
//! rewriter place an input row at one bit offset and emit an output row from
//! another, so shifting a row never needs an in-place pass that could
//! corrupt neighboring bits.

/// Bytes needed to hold `cols` packed bits.
pub fn bytes_for(cols: u32) -> usize {
    (cols as usize).div_ceil(8)
}

/// Read one bit at absolute bit index `idx`.
pub fn get(buf: &[u8], idx: usize) -> bool {
    buf[idx / 8] & (0x80 >> (idx % 8)) != 0
}

/// Write one bit at absolute bit index `idx`.
pub fn set(buf: &mut [u8], idx: usize, bit: bool) {
    let mask = 0x80 >> (idx % 8);
    if bit {
        buf[idx / 8] |= mask;
    } else {
        buf[idx / 8] &= !mask;
    }
}

/// Copy `len` bits from `src` starting at bit `src_off` into `dst` starting
/// at bit `dst_off`. Bits of `dst` outside the destination span are left
/// untouched.
pub fn copy(dst: &mut [u8], dst_off: usize, src: &[u8], src_off: usize, len: usize) {
    if len == 0 {
        return;
    }
    if dst_off % 8 == src_off % 8 {
        copy_aligned(dst, dst_off, src, src_off, len);
    } else {
        for i in 0..len {
            set(dst, dst_off + i, get(src, src_off + i));
        }
    }
}

/// Fast path: both spans share the same phase within their bytes, so the
/// middle is a plain byte copy and only the edge bytes need masking.
fn copy_aligned(dst: &mut [u8], dst_off: usize, src: &[u8], src_off: usize, len: usize) {
    let phase = dst_off % 8;
    let mut remaining = len;
    let mut d = dst_off;
    let mut s = src_off;

    // Leading partial byte
    if phase != 0 {
        let head = (8 - phase).min(remaining);
        for i in 0..head {
            set(dst, d + i, get(src, s + i));
        }
        d += head;
        s += head;
        remaining -= head;
    }

    let whole = remaining / 8;
    dst[d / 8..d / 8 + whole].copy_from_slice(&src[s / 8..s / 8 + whole]);
    d += whole * 8;
    s += whole * 8;
    remaining %= 8;

    // Trailing partial byte
    for i in 0..remaining {
        set(dst, d + i, get(src, s + i));
    }
}

/// Extract `out.len()` whole bytes from `src` starting at bit `src_off`.
///
/// `src` must hold at least `src_off + 8 * out.len()` bits. The caller gets
/// exactly the bytes a reader positioned at that bit offset would see; `src`
/// is never modified, which is what makes the packed-row writer repair-free.
pub fn read_bytes_at(src: &[u8], src_off: usize, out: &mut [u8]) {
    let byte = src_off / 8;
    let shift = src_off % 8;
    if shift == 0 {
        out.copy_from_slice(&src[byte..byte + out.len()]);
    } else {
        for (i, slot) in out.iter_mut().enumerate() {
            let hi = src[byte + i] << shift;
            let lo = src[byte + i + 1] >> (8 - shift);
            *slot = hi | lo;
        }
    }
}
