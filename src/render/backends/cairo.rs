use crate::pack::MonoBitmap;
use crate::render::backend::{GlyphBlit, GlyphHandles, GlyphStore, PixelFormat, RenderBackend, RgbaImage};
use crate::render::{Color, Viewport};
use anyhow::{anyhow, Result};

/// Cairo backend. Every glyph becomes an A1 mask surface; drawing masks the
/// current color through it onto an ARGB32 image surface.
pub struct CairoBackend {
    surface: cairo::ImageSurface,
    viewport: Viewport,
    color: Color,
    raster: (f32, f32),
    glyphs: GlyphStore<CairoGlyph>,
}

struct CairoGlyph {
    // Empty bitmaps have no mask, they only move the raster position.
    mask: Option<cairo::ImageSurface>,
    height: u32,
    xorig: f32,
    yorig: f32,
    xmove: f32,
    ymove: f32,
}

impl CairoBackend {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width as i32, height as i32)?;
        Ok(Self {
            surface,
            viewport: Viewport::new(0, 0, width, height),
            color: Color::WHITE,
            raster: (0.0, 0.0),
            glyphs: GlyphStore::new(),
        })
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn surface(&self) -> &cairo::ImageSurface {
        &self.surface
    }

    /// Fills the surface with `color`.
    pub fn clear(&mut self, color: Color) -> Result<()> {
        let cr = cairo::Context::new(&self.surface)?;
        cr.set_operator(cairo::Operator::Source);
        cr.set_source_rgba(color.r as f64, color.g as f64, color.b as f64, color.a as f64);
        cr.paint()?;
        Ok(())
    }

    /// Copies the surface into a straight-alpha RGBA image.
    pub fn snapshot(&mut self) -> Result<RgbaImage> {
        self.surface.flush();
        let width = self.surface.width() as u32;
        let height = self.surface.height() as u32;
        let stride = self.surface.stride() as usize;

        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        self.surface
            .with_data(|data| {
                for y in 0..height as usize {
                    for x in 0..width as usize {
                        let s = y * stride + x * 4;
                        let argb = u32::from_ne_bytes([data[s], data[s + 1], data[s + 2], data[s + 3]]);
                        let d = (y * width as usize + x) * 4;
                        pixels[d..d + 4].copy_from_slice(&unpremultiply(argb));
                    }
                }
            })
            .map_err(|e| anyhow!("cannot read cairo surface: {e}"))?;

        RgbaImage::from_raw(pixels, width, height, width * 4, PixelFormat::Rgba8)
    }
}

impl RenderBackend for CairoBackend {
    fn name(&self) -> &str {
        "CairoBackend"
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn compile_glyphs(&mut self, glyphs: &[GlyphBlit]) -> Result<GlyphHandles> {
        let compiled = glyphs
            .iter()
            .map(|g| {
                Ok(CairoGlyph {
                    mask: a1_mask(&g.bitmap)?,
                    height: g.bitmap.height(),
                    xorig: g.xorig,
                    yorig: g.yorig,
                    xmove: g.xmove,
                    ymove: g.ymove,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.glyphs.insert(compiled)
    }

    fn raster_pos(&mut self, x: f32, y: f32) {
        self.raster = (x, y);
    }

    fn advance(&mut self, dx: f32, dy: f32) {
        self.raster.0 += dx;
        self.raster.1 += dy;
    }

    fn call_glyphs(&mut self, handles: GlyphHandles, indices: &[u32]) -> Result<()> {
        let glyphs = self.glyphs.get(handles)?;
        let cr = cairo::Context::new(&self.surface)?;
        let c = self.color;
        cr.set_source_rgba(c.r as f64, c.g as f64, c.b as f64, c.a as f64);
        let surface_height = self.surface.height() as f64;

        for &index in indices {
            let glyph = glyphs
                .get(index as usize)
                .ok_or_else(|| anyhow!("glyph index {index} outside {:?}", handles))?;

            if let Some(mask) = &glyph.mask {
                let left = self.viewport.x as f64 + (self.raster.0 - glyph.xorig).floor() as f64;
                let bottom = self.viewport.y as f64 + (self.raster.1 - glyph.yorig).floor() as f64;
                // Cairo's y axis points down.
                let top = surface_height - bottom - glyph.height as f64;
                cr.mask_surface(mask, left, top)?;
            }

            self.raster.0 += glyph.xmove;
            self.raster.1 += glyph.ymove;
        }
        Ok(())
    }

    fn delete_glyphs(&mut self, handles: GlyphHandles) -> Result<()> {
        self.glyphs.remove(handles)
    }
}

/// Converts a bottom-up MSB-first bitmap into a top-down cairo A1 surface.
///
/// A1 pixels are packed into native-endian 32-bit words, so on little-endian
/// hosts the first pixel of a byte is its least significant bit.
fn a1_mask(bitmap: &MonoBitmap) -> Result<Option<cairo::ImageSurface>> {
    if bitmap.width() == 0 || bitmap.height() == 0 {
        return Ok(None);
    }

    let stride = cairo::Format::A1.stride_for_width(bitmap.width())?;
    let mut data = vec![0u8; stride as usize * bitmap.height() as usize];
    for y in 0..bitmap.height() {
        let line = &mut data[y as usize * stride as usize..(y as usize + 1) * stride as usize];
        for x in 0..bitmap.width() {
            if !bitmap.get(x, y) {
                continue;
            }
            let bit = if cfg!(target_endian = "little") { 1u8 << (x % 8) } else { 0x80u8 >> (x % 8) };
            line[x as usize / 8] |= bit;
        }
    }

    let surface = cairo::ImageSurface::create_for_data(
        data,
        cairo::Format::A1,
        bitmap.width() as i32,
        bitmap.height() as i32,
        stride,
    )?;
    Ok(Some(surface))
}

fn unpremultiply(argb: u32) -> [u8; 4] {
    let a = (argb >> 24) & 0xff;
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let ch = |shift: u32| (((argb >> shift) & 0xff) * 255 / a).min(255) as u8;
    [ch(16), ch(8), ch(0), a as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpremultiply_restores_straight_alpha() {
        assert_eq!(unpremultiply(0x0000_0000), [0, 0, 0, 0]);
        assert_eq!(unpremultiply(0xff10_2030), [0x10, 0x20, 0x30, 0xff]);
        assert_eq!(unpremultiply(0x8080_0000), [255, 0, 0, 0x80]);
    }

    #[test]
    fn empty_bitmaps_have_no_mask() {
        assert!(a1_mask(&MonoBitmap::empty(0, 4)).unwrap().is_none());
        assert!(a1_mask(&MonoBitmap::empty(3, 3)).unwrap().is_some());
    }

    #[test]
    fn blit_paints_through_mask() {
        let mut bitmap = MonoBitmap::empty(2, 2);
        bitmap.set(0, 0);
        bitmap.set(1, 1);

        let mut be = CairoBackend::new(4, 4).unwrap();
        be.clear(Color::BLACK).unwrap();
        let handles = be
            .compile_glyphs(&[GlyphBlit { bitmap, xorig: 0.0, yorig: 0.0, xmove: 2.0, ymove: 0.0 }])
            .unwrap();
        be.set_color(Color::WHITE);
        be.raster_pos(0.0, 0.0);
        be.call_glyphs(handles, &[0]).unwrap();

        let img = be.snapshot().unwrap();
        // The bitmap sits in the bottom-left corner of the surface.
        assert_eq!(img.pixel(0, 2), Some([255, 255, 255, 255]));
        assert_eq!(img.pixel(1, 3), Some([255, 255, 255, 255]));
        assert_eq!(img.pixel(1, 2), Some([0, 0, 0, 255]));
        assert_eq!(img.pixel(0, 3), Some([0, 0, 0, 255]));

        be.delete_glyphs(handles).unwrap();
        assert!(be.call_glyphs(handles, &[0]).is_err());
    }
}
