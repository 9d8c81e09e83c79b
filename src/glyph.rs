//! Glyph descriptors and character sets.
//!
//! A [`Glyph`] tells which area of a glyph sheet holds a glyph and how far the
//! pen moves after drawing it. A [`FontConfig`] maps a contiguous rune range
//! onto a [`Charset`], so glyph `i` always describes rune `low + i`.

use crate::errors::FontError;
use crate::pack::Region;

/// Metrics for a single font glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Glyph {
    /// Left edge of the glyph cell on the sheet.
    pub x: i32,
    /// Top edge of the glyph cell on the sheet.
    pub y: i32,
    /// Width of the glyph cell.
    pub width: i32,
    /// Height of the glyph cell.
    pub height: i32,
    /// Distance to the next glyph. Used to lay out non-monospaced fonts.
    pub advance: i32,
}

impl Glyph {
    /// Sheet area covered by this glyph. Negative sizes collapse to zero.
    pub fn region(&self) -> Region {
        Region {
            x: self.x,
            y: self.y,
            width: self.width.max(0) as u32,
            height: self.height.max(0) as u32,
        }
    }
}

/// Glyph descriptors for a font, indexed by `rune - low`.
pub type Charset = Vec<Glyph>;

/// Raster font metadata: the rune range and its glyph descriptors.
#[derive(Clone, Debug, PartialEq)]
pub struct FontConfig {
    /// Lower rune boundary.
    pub low: char,
    /// Upper rune boundary.
    pub high: char,
    pub glyphs: Charset,
}

impl FontConfig {
    /// Creates a config with one default glyph per rune in `low..=high`.
    pub fn new(low: char, high: char) -> Result<Self, FontError> {
        if low > high {
            return Err(FontError::InvalidRange { low, high });
        }
        let count = (high as u32 - low as u32 + 1) as usize;
        Ok(Self {
            low,
            high,
            glyphs: vec![Glyph::default(); count],
        })
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Glyph index for `ch`, if the rune is covered by this charset.
    pub fn index_of(&self, ch: char) -> Option<usize> {
        if ch < self.low || ch > self.high {
            return None;
        }
        let index = (ch as u32 - self.low as u32) as usize;
        (index < self.glyphs.len()).then_some(index)
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.index_of(ch).map(|i| &self.glyphs[i])
    }
}
