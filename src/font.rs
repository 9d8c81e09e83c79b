//! Fonts that render through a [`RenderBackend`].
//!
//! A [`Font`] is built from a glyph sheet plus a [`FontConfig`] describing
//! where each glyph lives on it. Every glyph cell is packed into a
//! [`MonoBitmap`]; drawing compiles those bitmaps once on the backend and
//! then blits them by id.
//!
//! TrueType fonts are rasterized into a sheet first (see
//! [`Font::load_truetype`]); raster fonts are read from a PNG sprite sheet
//! (see [`Font::load_bitmap`]).

mod truetype;

use crate::config::LoadConfig;
use crate::errors::FontError;
use crate::glyph::FontConfig;
use crate::pack::{pack_coverage, MonoBitmap};
use crate::render::{GlyphBlit, GlyphHandles, RenderBackend};
use crate::sheet::GlyphSheet;
use std::io::Read;
use std::path::Path;

/// DejaVu Sans Mono, bundled so there is always a font to draw with.
const DEFAULT_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSansMono.ttf");

/// Direction in which consecutive glyphs are laid out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    LeftToRight,
    /// The first rune ends up rightmost, the pen moves left from the start point.
    RightToLeft,
    /// The pen moves down from the start point.
    TopToBottom,
}

/// A loaded font.
pub struct Font {
    config: FontConfig,
    bitmaps: Vec<MonoBitmap>,
    max_glyph_width: i32,
    max_glyph_height: i32,
    direction: Direction,
    handles: Option<GlyphHandles>,
}

/// Builds a font from a glyph sheet and its charset.
///
/// This does not deal with scaling: `sheet` and `config` are expected to be
/// at the final size already. Only `threshold` and `direction` of `options`
/// are used.
///
/// Cells may hang off the edge of the sheet, but no cell may be wider or
/// taller than the sheet itself.
pub fn load_font(sheet: &GlyphSheet, config: FontConfig, options: &LoadConfig) -> Result<Font, FontError> {
    let mut max_glyph_width = 0;
    let mut max_glyph_height = 0;
    let mut bitmaps = Vec::with_capacity(config.len());

    for (index, glyph) in config.glyphs.iter().enumerate() {
        if glyph.width as i64 > sheet.width() as i64 || glyph.height as i64 > sheet.height() as i64 {
            return Err(FontError::InvalidCell {
                index,
                width: glyph.width,
                height: glyph.height,
                sheet_width: sheet.width(),
                sheet_height: sheet.height(),
            });
        }
        max_glyph_width = max_glyph_width.max(glyph.width);
        max_glyph_height = max_glyph_height.max(glyph.height);

        bitmaps.push(pack_coverage(
            sheet.pixels(),
            sheet.width(),
            sheet.height(),
            glyph.region(),
            options.threshold,
        ));
    }

    log::debug!(
        "packed {} glyphs {:?}..={:?}, max bounds {}x{}",
        bitmaps.len(),
        config.low,
        config.high,
        max_glyph_width,
        max_glyph_height
    );

    Ok(Font {
        config,
        bitmaps,
        max_glyph_width,
        max_glyph_height,
        direction: options.direction,
        handles: None,
    })
}

impl Font {
    /// Loads a TrueType font from `reader` at `scale` pixels per em, covering
    /// the runes `low..=high`. For standard ASCII this would be `' '..='\u{7f}'`.
    pub fn load_truetype<R: Read>(reader: R, scale: u32, low: char, high: char) -> Result<Font, FontError> {
        let options = LoadConfig {
            scale,
            low,
            high,
            ..LoadConfig::default()
        };
        Self::load_truetype_with(reader, &options)
    }

    /// Loads a TrueType font from `reader` with full control over the load options.
    pub fn load_truetype_with<R: Read>(mut reader: R, options: &LoadConfig) -> Result<Font, FontError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data, options)
    }

    /// Loads a TrueType font from memory.
    pub fn from_bytes(data: &[u8], options: &LoadConfig) -> Result<Font, FontError> {
        options.validate()?;
        let (sheet, config) = truetype::rasterize(data, options)?;
        load_font(&sheet, config, options)
    }

    /// Loads a TrueType font file.
    pub fn from_path<P: AsRef<Path>>(path: P, options: &LoadConfig) -> Result<Font, FontError> {
        let data = std::fs::read(path.as_ref())?;
        log::debug!("loading font {} ({} bytes)", path.as_ref().display(), data.len());
        Self::from_bytes(&data, options)
    }

    /// The bundled monospace font at 16 pixels, covering printable ASCII.
    pub fn default_font() -> Result<Font, FontError> {
        Self::from_bytes(DEFAULT_FONT, &LoadConfig::default())
    }

    /// Loads a raster font from a PNG sprite sheet described by `config`.
    pub fn load_bitmap<R: Read>(reader: R, config: FontConfig, options: &LoadConfig) -> Result<Font, FontError> {
        let sheet = GlyphSheet::from_png(reader)?;
        load_font(&sheet, config, options)
    }

    pub fn config(&self) -> &FontConfig {
        &self.config
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn max_glyph_width(&self) -> i32 {
        self.max_glyph_width
    }

    pub fn max_glyph_height(&self) -> i32 {
        self.max_glyph_height
    }

    /// Largest width and height of any glyph, i.e. the largest bounding box
    /// a single glyph can have.
    pub fn glyph_bounds(&self) -> (i32, i32) {
        (self.max_glyph_width, self.max_glyph_height)
    }

    /// Packed bitmap for `ch`, if the rune is covered.
    pub fn bitmap(&self, ch: char) -> Option<&MonoBitmap> {
        self.config.index_of(ch).map(|i| &self.bitmaps[i])
    }

    /// Backend handles, once the glyphs have been uploaded.
    pub fn handles(&self) -> Option<GlyphHandles> {
        self.handles
    }

    /// Pixel width and height of `text`, taking the direction into account.
    ///
    /// Unknown runes count as the largest glyph bound along the advancing axis.
    pub fn metrics(&self, text: &str) -> (i32, i32) {
        if text.is_empty() {
            return (0, 0);
        }
        match self.direction {
            Direction::LeftToRight | Direction::RightToLeft => {
                (self.advance_size(text), self.max_glyph_height)
            }
            Direction::TopToBottom => (self.max_glyph_width, self.advance_size(text)),
        }
    }

    /// Sum of the advances of every rune of a single line.
    fn advance_size(&self, line: &str) -> i32 {
        line.chars()
            .map(|ch| match self.config.glyph(ch) {
                Some(g) => self.step(g.advance, g.height),
                None => self.step(self.max_glyph_width, self.max_glyph_height),
            })
            .sum()
    }

    fn step(&self, advance: i32, height: i32) -> i32 {
        match self.direction {
            Direction::TopToBottom => height,
            _ => advance,
        }
    }

    /// Compiles one blit per glyph on `backend`. Does nothing if already uploaded.
    pub fn upload(&mut self, backend: &mut dyn RenderBackend) -> Result<GlyphHandles, FontError> {
        if let Some(handles) = self.handles {
            return Ok(handles);
        }

        let blits: Vec<GlyphBlit> = self
            .config
            .glyphs
            .iter()
            .zip(self.bitmaps.iter())
            .map(|(glyph, bitmap)| {
                let (xorig, yorig, xmove, ymove) = match self.direction {
                    Direction::LeftToRight => (0.0, 0.0, glyph.advance as f32, 0.0),
                    Direction::RightToLeft => (glyph.advance as f32, 0.0, -(glyph.advance as f32), 0.0),
                    Direction::TopToBottom => (0.0, glyph.height as f32, 0.0, -(glyph.height as f32)),
                };
                GlyphBlit { bitmap: bitmap.clone(), xorig, yorig, xmove, ymove }
            })
            .collect();

        let handles = backend.compile_glyphs(&blits).map_err(FontError::render)?;
        log::debug!("uploaded {} glyphs to {} as {:?}", blits.len(), backend.name(), handles);
        self.handles = Some(handles);
        Ok(handles)
    }

    /// Draws `text` starting at `(x, y)`, in viewport pixels with `y` growing
    /// upward.
    ///
    /// Where the first glyph lands depends on the direction:
    /// - [`Direction::LeftToRight`]: `(x, y)` is the bottom-left of its cell.
    /// - [`Direction::RightToLeft`]: `(x, y)` is the bottom-right of its
    ///   advance, so the cell starts at `x - advance`.
    /// - [`Direction::TopToBottom`]: `(x, y)` is the top-left of its cell, so
    ///   the cell's bottom row sits at `y - height`.
    ///
    /// The text is a single line: line breaks are not handled and render as
    /// glyphs. Multi-line text has to be split by the caller and drawn line by
    /// line. Runes outside the font move the pen by the largest glyph bound
    /// and draw nothing.
    pub fn printf(&mut self, backend: &mut dyn RenderBackend, x: f32, y: f32, text: &str) -> Result<(), FontError> {
        if text.is_empty() {
            return Ok(());
        }
        let handles = self.upload(backend)?;

        let (skip_x, skip_y) = match self.direction {
            Direction::LeftToRight => (self.max_glyph_width as f32, 0.0),
            Direction::RightToLeft => (-(self.max_glyph_width as f32), 0.0),
            Direction::TopToBottom => (0.0, -(self.max_glyph_height as f32)),
        };

        backend.raster_pos(x, y);

        // Known runes are batched into a single call until an unknown one shows up.
        let mut run: Vec<u32> = Vec::with_capacity(text.len());
        for ch in text.chars() {
            match self.config.index_of(ch) {
                Some(index) => run.push(index as u32),
                None => {
                    if !run.is_empty() {
                        backend.call_glyphs(handles, &run).map_err(FontError::render)?;
                        run.clear();
                    }
                    log::trace!("no glyph for {:?}, skipping", ch);
                    backend.advance(skip_x, skip_y);
                }
            }
        }
        if !run.is_empty() {
            backend.call_glyphs(handles, &run).map_err(FontError::render)?;
        }
        Ok(())
    }

    /// Releases the backend resources of this font. The font can no longer be
    /// used for rendering afterwards.
    pub fn release(self, backend: &mut dyn RenderBackend) -> Result<(), FontError> {
        if let Some(handles) = self.handles {
            backend.delete_glyphs(handles).map_err(FontError::render)?;
            log::debug!("released {:?} on {}", handles, backend.name());
        }
        Ok(())
    }
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("low", &self.config.low)
            .field("high", &self.config.high)
            .field("max_glyph_width", &self.max_glyph_width)
            .field("max_glyph_height", &self.max_glyph_height)
            .field("direction", &self.direction)
            .field("handles", &self.handles)
            .finish()
    }
}
