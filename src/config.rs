//! Font load configuration.
//!
//! `LoadConfig` controls how a TrueType font is turned into a glyph sheet and
//! packed monochrome bitmaps: the pixel scale, which runes get loaded, how the
//! sheet is laid out and at which coverage a pixel counts as painted.
//!
//! `LoadConfig` provides defaults via [`Default`] and a fluent
//! [`LoadConfig::builder()`] that validates on `build()`.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use glyphblit::LoadConfig;
//! let cfg = LoadConfig::default();
//! assert_eq!(cfg.scale, 16);
//! assert_eq!((cfg.low, cfg.high), (' ', '\u{7f}'));
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use glyphblit::{Direction, LoadConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = LoadConfig::builder()
//!     .scale(24)
//!     .range('A', 'Z')
//!     .threshold(128)
//!     .direction(Direction::TopToBottom)
//!     .build()?;
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `scale`: font size in pixels per em (default: 16, valid `1..=512`).
//! - `low` / `high`: inclusive rune range to load (default: `' '..='\u{7f}'`).
//! - `glyphs_per_row`: glyph cells per sheet row (default: 16).
//! - `cell_padding`: extra pixel rows added to every cell (default: 5).
//! - `threshold`: minimum 8-bit coverage for a pixel to be set (default: 1).
//! - `direction`: rendering direction of the loaded font.

use crate::font::Direction;
use std::fmt;

/// Largest number of runes a single font may cover.
pub const MAX_RANGE: u32 = 65_536;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadConfig {
    pub scale: u32,
    pub low: char,
    pub high: char,
    pub glyphs_per_row: u32,
    pub cell_padding: u32,
    pub threshold: u8,
    pub direction: Direction,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            scale: 16,
            low: ' ',
            high: '\u{7f}',
            glyphs_per_row: 16,
            cell_padding: 5,
            threshold: 1,
            direction: Direction::LeftToRight,
        }
    }
}

impl LoadConfig {
    pub fn builder() -> LoadConfigBuilder {
        LoadConfigBuilder::default()
    }

    /// Checks an already constructed config, e.g. one built with struct syntax.
    pub fn validate(&self) -> Result<(), LoadConfigError> {
        validate(self)
    }

    /// Number of glyph slots for the configured range.
    pub fn glyph_count(&self) -> u32 {
        (self.high as u32).saturating_sub(self.low as u32) + 1
    }
}

/// Builder for [`LoadConfig`].
#[derive(Debug, Clone, Default)]
pub struct LoadConfigBuilder {
    inner: LoadConfig,
}

impl LoadConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut LoadConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn scale(self, px: u32) -> Self { self.map(|c| c.scale = px) }
    pub fn low(self, low: char) -> Self { self.map(|c| c.low = low) }
    pub fn high(self, high: char) -> Self { self.map(|c| c.high = high) }
    pub fn range(self, low: char, high: char) -> Self { self.map(|c| { c.low = low; c.high = high; }) }
    pub fn glyphs_per_row(self, n: u32) -> Self { self.map(|c| c.glyphs_per_row = n) }
    pub fn cell_padding(self, rows: u32) -> Self { self.map(|c| c.cell_padding = rows) }
    pub fn threshold(self, coverage: u8) -> Self { self.map(|c| c.threshold = coverage) }
    pub fn direction(self, dir: Direction) -> Self { self.map(|c| c.direction = dir) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<LoadConfig, LoadConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadConfigError {
    InvalidScale(u32),
    InvertedRange { low: char, high: char },
    RangeTooLarge(u32),
    ZeroGlyphsPerRow,
    ZeroThreshold,
}

impl fmt::Display for LoadConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadConfigError::InvalidScale(s) =>
                write!(f, "scale {s} is out of range (expected 1..=512)"),
            LoadConfigError::InvertedRange { low, high } =>
                write!(f, "low rune {low:?} is above high rune {high:?}"),
            LoadConfigError::RangeTooLarge(n) =>
                write!(f, "rune range covers {n} runes (at most {MAX_RANGE} allowed)"),
            LoadConfigError::ZeroGlyphsPerRow =>
                write!(f, "glyphs_per_row must be at least 1"),
            LoadConfigError::ZeroThreshold =>
                write!(f, "threshold must be at least 1"),
        }
    }
}
impl std::error::Error for LoadConfigError {}

fn validate(c: &LoadConfig) -> Result<(), LoadConfigError> {
    if !(1..=512).contains(&c.scale) {
        return Err(LoadConfigError::InvalidScale(c.scale));
    }
    if c.low > c.high {
        return Err(LoadConfigError::InvertedRange { low: c.low, high: c.high });
    }
    let count = c.glyph_count();
    if count > MAX_RANGE {
        return Err(LoadConfigError::RangeTooLarge(count));
    }
    if c.glyphs_per_row == 0 {
        return Err(LoadConfigError::ZeroGlyphsPerRow);
    }
    // A zero threshold would paint every pixel of every cell.
    if c.threshold == 0 {
        return Err(LoadConfigError::ZeroThreshold);
    }
    Ok(())
}
