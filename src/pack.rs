//! Monochrome bit packing.
//!
//! Antialiased glyph coverage is reduced to one bit per pixel. The packed
//! layout matches a raster-position bitmap blit:
//!
//! - rows are stored bottom to top, so the first row lands on the raster
//!   position and later rows go upward;
//! - every row starts on a byte boundary (`stride = ceil(width / 8)`);
//! - bits are most-significant first, a set bit paints the pixel;
//! - unused bits at the end of a row are always zero.

/// A rectangle of a coverage image, in top-down pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// A 1-bit-per-pixel bitmap, stored bottom row first.
#[derive(Clone, PartialEq, Eq)]
pub struct MonoBitmap {
    width: u32,
    height: u32,
    stride: usize,
    bits: Vec<u8>,
}

impl MonoBitmap {
    /// A bitmap of the given size with no pixels set.
    pub fn empty(width: u32, height: u32) -> Self {
        let stride = (width as usize).div_ceil(8);
        Self {
            width,
            height,
            stride,
            bits: vec![0u8; stride * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Packed rows, bottom row first.
    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    /// Packed bytes of row `row`, counted from the bottom.
    pub fn row(&self, row: u32) -> &[u8] {
        let start = row as usize * self.stride;
        &self.bits[start..start + self.stride]
    }

    /// Reads pixel `(x, y)` with `y` counted from the top. Out of range is unset.
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let row = (self.height - 1 - y) as usize;
        self.bits[row * self.stride + x as usize / 8] & (0x80 >> (x % 8)) != 0
    }

    /// Sets pixel `(x, y)` with `y` counted from the top.
    pub fn set(&mut self, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let row = (self.height - 1 - y) as usize;
        self.bits[row * self.stride + x as usize / 8] |= 0x80 >> (x % 8);
    }

    /// Number of painted pixels.
    pub fn set_pixels(&self) -> u32 {
        self.bits.iter().map(|b| b.count_ones()).sum()
    }

    pub fn is_blank(&self) -> bool {
        self.bits.iter().all(|b| *b == 0)
    }
}

impl std::fmt::Debug for MonoBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonoBitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("set", &self.set_pixels())
            .finish()
    }
}

/// Packs `region` of a row-major 8-bit coverage image into a [`MonoBitmap`].
///
/// A pixel is set when its coverage is at least `threshold`. Parts of the
/// region outside the `src_width` x `src_height` source count as empty.
pub fn pack_coverage(
    src: &[u8],
    src_width: u32,
    src_height: u32,
    region: Region,
    threshold: u8,
) -> MonoBitmap {
    let mut out = MonoBitmap::empty(region.width, region.height);
    let threshold = threshold.max(1);

    for y in 0..region.height {
        let sy = region.y as i64 + y as i64;
        if sy < 0 || sy >= src_height as i64 {
            continue;
        }
        let line = sy as usize * src_width as usize;
        for x in 0..region.width {
            let sx = region.x as i64 + x as i64;
            if sx < 0 || sx >= src_width as i64 {
                continue;
            }
            let coverage = src.get(line + sx as usize).copied().unwrap_or(0);
            if coverage >= threshold {
                out.set(x, y);
            }
        }
    }

    out
}
