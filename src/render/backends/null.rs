use crate::render::backend::{GlyphBlit, GlyphHandles, GlyphStore, RenderBackend};
use crate::render::{Color, CommandLog, DrawCommand, Viewport};
use anyhow::{anyhow, Result};

/// Null backend that does not rasterize anything.
///
/// It tracks the raster position and records every command in a
/// [`CommandLog`], which is handy for tests and for measuring draw calls.
pub struct NullBackend {
    viewport: Viewport,
    raster: (f32, f32),
    glyphs: GlyphStore<(f32, f32, f32, f32)>,
    log: CommandLog,
}

impl NullBackend {
    /// Creates a new instance of the null backend.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            raster: (0.0, 0.0),
            glyphs: GlyphStore::new(),
            log: CommandLog::new(),
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    /// Current raster position.
    pub fn raster(&self) -> (f32, f32) {
        self.raster
    }

    /// Number of glyph ranges that are compiled and not yet deleted.
    pub fn live_ranges(&self) -> usize {
        self.glyphs.len()
    }
}

impl RenderBackend for NullBackend {
    fn name(&self) -> &str {
        "NullBackend"
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_color(&mut self, color: Color) {
        self.log.push(DrawCommand::SetColor { color });
    }

    fn compile_glyphs(&mut self, glyphs: &[GlyphBlit]) -> Result<GlyphHandles> {
        // Only the placement is needed to replay a blit.
        let moves = glyphs
            .iter()
            .map(|g| (g.xorig, g.yorig, g.xmove, g.ymove))
            .collect();
        self.glyphs.insert(moves)
    }

    fn raster_pos(&mut self, x: f32, y: f32) {
        self.raster = (x, y);
        self.log.push(DrawCommand::RasterPos { x, y });
    }

    fn advance(&mut self, dx: f32, dy: f32) {
        self.raster.0 += dx;
        self.raster.1 += dy;
        self.log.push(DrawCommand::Advance { dx, dy });
    }

    fn call_glyphs(&mut self, handles: GlyphHandles, indices: &[u32]) -> Result<()> {
        let moves = self.glyphs.get(handles)?;
        for &index in indices {
            let (xorig, yorig, xmove, ymove) = *moves
                .get(index as usize)
                .ok_or_else(|| anyhow!("glyph index {index} outside {:?}", handles))?;
            let id = handles.base + index;

            self.log.push(DrawCommand::Blit {
                id,
                x: self.raster.0 - xorig,
                y: self.raster.1 - yorig,
            });
            self.raster.0 += xmove;
            self.raster.1 += ymove;
        }
        Ok(())
    }

    fn delete_glyphs(&mut self, handles: GlyphHandles) -> Result<()> {
        self.glyphs.remove(handles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::MonoBitmap;

    fn blit(xmove: f32) -> GlyphBlit {
        GlyphBlit {
            bitmap: MonoBitmap::empty(4, 4),
            xorig: 0.0,
            yorig: 0.0,
            xmove,
            ymove: 0.0,
        }
    }

    #[test]
    fn call_glyphs_records_blits_and_moves_raster() {
        let mut be = NullBackend::new(Viewport::new(0, 0, 100, 100));
        let handles = be.compile_glyphs(&[blit(5.0), blit(7.0)]).unwrap();

        be.raster_pos(10.0, 20.0);
        be.call_glyphs(handles, &[1, 0, 1]).unwrap();

        let blits: Vec<_> = be.log().blits().collect();
        assert_eq!(
            blits,
            vec![
                (handles.base + 1, 10.0, 20.0),
                (handles.base, 17.0, 20.0),
                (handles.base + 1, 22.0, 20.0),
            ]
        );
        assert_eq!(be.raster(), (29.0, 20.0));
    }

    #[test]
    fn call_glyphs_rejects_out_of_range_index() {
        let mut be = NullBackend::new(Viewport::default());
        let handles = be.compile_glyphs(&[blit(1.0)]).unwrap();
        assert!(be.call_glyphs(handles, &[1]).is_err());
    }

    #[test]
    fn deleted_handles_cannot_be_called() {
        let mut be = NullBackend::new(Viewport::default());
        let handles = be.compile_glyphs(&[blit(1.0)]).unwrap();
        assert_eq!(be.live_ranges(), 1);

        be.delete_glyphs(handles).unwrap();
        assert_eq!(be.live_ranges(), 0);
        assert!(be.call_glyphs(handles, &[0]).is_err());
        assert!(be.delete_glyphs(handles).is_err());
    }
}
