use crate::pack::MonoBitmap;
use crate::render::backend::{GlyphBlit, GlyphHandles, GlyphStore, PixelFormat, RenderBackend, RgbaImage};
use crate::render::{Color, Viewport};
use anyhow::{anyhow, Result};
use std::io::Write;

/// Software backend that blits glyph bitmaps into an RGBA8 framebuffer.
///
/// Raster positions use the viewport origin and grow upward, the framebuffer
/// itself is stored top row first. Set bits are painted with the current
/// color using source-over blending; everything outside the framebuffer is
/// clipped.
pub struct CpuBackend {
    fb: Framebuffer,
    viewport: Viewport,
    color: Color,
    raster: (f32, f32),
    glyphs: GlyphStore<GlyphBlit>,
}

impl CpuBackend {
    /// Creates a backend with a cleared `width` x `height` framebuffer and a
    /// viewport covering all of it.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!("framebuffer must not be empty ({width}x{height})"));
        }

        Ok(Self {
            fb: Framebuffer::new(width, height),
            viewport: Viewport::new(0, 0, width, height),
            color: Color::WHITE,
            raster: (0.0, 0.0),
            glyphs: GlyphStore::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.fb.width
    }

    pub fn height(&self) -> u32 {
        self.fb.height
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Fills the whole framebuffer with `color`.
    pub fn clear(&mut self, color: Color) {
        let px = color.to_rgba8();
        for chunk in self.fb.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// RGBA value of a framebuffer pixel, `y` counted from the top.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.fb.get(x, y)
    }

    /// Number of live glyph ranges.
    pub fn live_ranges(&self) -> usize {
        self.glyphs.len()
    }

    /// Copies the framebuffer into an owned image.
    pub fn snapshot(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(
            self.fb.pixels.clone(),
            self.fb.width,
            self.fb.height,
            self.fb.width * 4,
            PixelFormat::Rgba8,
        )
    }

    /// Encodes the framebuffer as PNG.
    pub fn write_png<W: Write>(&self, writer: W) -> Result<()> {
        self.snapshot()?.write_png(writer)
    }
}

impl RenderBackend for CpuBackend {
    fn name(&self) -> &str {
        "CpuBackend"
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn compile_glyphs(&mut self, glyphs: &[GlyphBlit]) -> Result<GlyphHandles> {
        let handles = self.glyphs.insert(glyphs.to_vec())?;
        log::trace!("{}: compiled {} glyphs as {:?}", self.name(), glyphs.len(), handles);
        Ok(handles)
    }

    fn raster_pos(&mut self, x: f32, y: f32) {
        self.raster = (x, y);
    }

    fn advance(&mut self, dx: f32, dy: f32) {
        self.raster.0 += dx;
        self.raster.1 += dy;
    }

    fn call_glyphs(&mut self, handles: GlyphHandles, indices: &[u32]) -> Result<()> {
        let blits = self.glyphs.get(handles)?;
        let color = self.color.to_rgba8();

        for &index in indices {
            let blit = blits
                .get(index as usize)
                .ok_or_else(|| anyhow!("glyph index {index} outside {:?}", handles))?;

            // Bottom-left corner of the bitmap in target coordinates (y up).
            // Float casts saturate, so far-off positions stay far off instead of wrapping.
            let left = (self.viewport.x as i64).saturating_add((self.raster.0 - blit.xorig).floor() as i64);
            let bottom = (self.viewport.y as i64).saturating_add((self.raster.1 - blit.yorig).floor() as i64);
            self.fb.draw_bitmap(&blit.bitmap, left, bottom, color);

            self.raster.0 += blit.xmove;
            self.raster.1 += blit.ymove;
        }
        Ok(())
    }

    fn delete_glyphs(&mut self, handles: GlyphHandles) -> Result<()> {
        self.glyphs.remove(handles)
    }
}

struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Framebuffer {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 4],
        }
    }

    fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    /// Paints the set bits of `bitmap` with its bottom-left corner at
    /// `(left, bottom)`, measured from the bottom-left of the framebuffer.
    fn draw_bitmap(&mut self, bitmap: &MonoBitmap, left: i64, bottom: i64, color: [u8; 4]) {
        for row in 0..bitmap.height() {
            let y_up = bottom.saturating_add(row as i64);
            if y_up < 0 || y_up >= self.height as i64 {
                continue;
            }
            let fb_row = (self.height as i64 - 1 - y_up) as usize;
            let bits = bitmap.row(row);

            for col in 0..bitmap.width() {
                if bits[col as usize / 8] & (0x80 >> (col % 8)) == 0 {
                    continue;
                }
                let x = left.saturating_add(col as i64);
                if x < 0 || x >= self.width as i64 {
                    continue;
                }
                let i = (fb_row * self.width as usize + x as usize) * 4;
                blend(&mut self.pixels[i..i + 4], color);
            }
        }
    }
}

/// Source-over blend of a straight-alpha color onto a straight-alpha pixel.
fn blend(dst: &mut [u8], src: [u8; 4]) {
    let sa = src[3] as f32 / 255.0;
    if sa >= 1.0 {
        dst.copy_from_slice(&src);
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let oa = sa + da * (1.0 - sa);
    if oa <= 0.0 {
        dst.copy_from_slice(&[0, 0, 0, 0]);
        return;
    }
    for c in 0..3 {
        let s = src[c] as f32 / 255.0;
        let d = dst[c] as f32 / 255.0;
        let o = (s * sa + d * da * (1.0 - sa)) / oa;
        dst[c] = (o * 255.0).round() as u8;
    }
    dst[3] = (oa * 255.0).round() as u8;
}
