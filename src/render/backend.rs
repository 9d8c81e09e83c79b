use crate::pack::MonoBitmap;
use crate::render::{Color, Viewport};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};

/// Next free glyph id. Shared by every store, so a range handed out by one
/// backend is unknown to all others. Id 0 is never handed out, like display
/// list names.
static NEXT_GLYPH_ID: AtomicU32 = AtomicU32::new(1);

fn allocate_ids(count: u32) -> Result<u32> {
    NEXT_GLYPH_ID
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| next.checked_add(count.max(1)))
        .map_err(|_| anyhow!("glyph id space exhausted"))
}

/// A contiguous range of glyph ids allocated by a backend.
///
/// Index `i` of the compiled glyph slice is drawn with id `base + i`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlyphHandles {
    pub base: u32,
    pub count: u32,
}

impl GlyphHandles {
    /// Backend id of glyph `index`, if it is inside the range.
    pub fn id(&self, index: u32) -> Option<u32> {
        (index < self.count).then(|| self.base + index)
    }
}

/// A bitmap blit compiled on the backend.
///
/// The bitmap's lower-left corner is drawn at `raster - (xorig, yorig)`,
/// after which the raster position moves by `(xmove, ymove)`.
#[derive(Clone, Debug)]
pub struct GlyphBlit {
    pub bitmap: MonoBitmap,
    pub xorig: f32,
    pub yorig: f32,
    pub xmove: f32,
    pub ymove: f32,
}

/// Immediate-mode backend interface. Calls occur on the backend's owning thread.
pub trait RenderBackend {
    /// Human readable backend name, for logging.
    fn name(&self) -> &str;

    /// The viewport raster positions are relative to.
    fn viewport(&self) -> Viewport;

    /// Sets the color subsequent blits paint with.
    fn set_color(&mut self, color: Color);

    /// Compiles a blit per glyph and returns the id range that addresses them.
    fn compile_glyphs(&mut self, glyphs: &[GlyphBlit]) -> Result<GlyphHandles>;

    /// Sets the raster position, relative to the viewport origin with `y` up.
    fn raster_pos(&mut self, x: f32, y: f32);

    /// Moves the raster position without drawing anything.
    fn advance(&mut self, dx: f32, dy: f32);

    /// Draws the glyphs at `indices` of `handles`, in order, starting at the
    /// current raster position.
    fn call_glyphs(&mut self, handles: GlyphHandles, indices: &[u32]) -> Result<()>;

    /// Frees a range returned by [`compile_glyphs`](Self::compile_glyphs).
    fn delete_glyphs(&mut self, handles: GlyphHandles) -> Result<()>;
}

/// Id allocator and storage for compiled glyphs, shared by the backends.
#[derive(Debug)]
pub struct GlyphStore<T> {
    ranges: HashMap<u32, (GlyphHandles, Vec<T>)>,
}

impl<T> Default for GlyphStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GlyphStore<T> {
    pub fn new() -> Self {
        Self { ranges: HashMap::new() }
    }

    /// Stores `items` under a fresh id range.
    pub fn insert(&mut self, items: Vec<T>) -> Result<GlyphHandles> {
        let count = u32::try_from(items.len()).map_err(|_| anyhow!("too many glyphs: {}", items.len()))?;
        let base = allocate_ids(count)?;

        let handles = GlyphHandles { base, count };
        self.ranges.insert(base, (handles, items));
        Ok(handles)
    }

    /// Items of a live range. Fails for unknown or deleted handles.
    pub fn get(&self, handles: GlyphHandles) -> Result<&[T]> {
        match self.ranges.get(&handles.base) {
            Some((h, items)) if *h == handles => Ok(items),
            _ => Err(anyhow!("unknown glyph handles {:?}", handles)),
        }
    }

    pub fn remove(&mut self, handles: GlyphHandles) -> Result<()> {
        match self.ranges.get(&handles.base) {
            Some((h, _)) if *h == handles => {
                self.ranges.remove(&handles.base);
                Ok(())
            }
            _ => Err(anyhow!("cannot delete unknown glyph handles {:?}", handles)),
        }
    }

    /// Number of live ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// Straight (non-premultiplied) RGBA, one byte per channel.
    Rgba8,
}

/// RGBA snapshot of a render target, top row first.
#[derive(Clone)]
pub struct RgbaImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub format: PixelFormat,
}

impl RgbaImage {
    pub fn from_raw(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        stride: u32,
        format: PixelFormat,
    ) -> Result<Self> {
        if stride < width * 4 || pixels.len() < (height as usize) * (stride as usize) {
            return Err(anyhow!("pixel buffer too small for {width}x{height} image"));
        }

        Ok(Self {
            pixels,
            width,
            height,
            stride,
            format,
        })
    }

    /// RGBA value at `(x, y)`, top-down.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = y as usize * self.stride as usize + x as usize * 4;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    /// Encodes the snapshot as an RGBA PNG.
    pub fn write_png<W: Write>(&self, writer: W) -> Result<()> {
        let mut encoder = png::Encoder::new(writer, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;

        let row = self.width as usize * 4;
        let mut data = Vec::with_capacity(row * self.height as usize);
        for line in self.pixels.chunks(self.stride.max(1) as usize).take(self.height as usize) {
            data.extend_from_slice(&line[..row]);
        }
        writer.write_image_data(&data)?;
        Ok(())
    }
}

impl std::fmt::Debug for RgbaImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RgbaImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_map_indices_to_ids() {
        let h = GlyphHandles { base: 10, count: 3 };
        assert_eq!(h.id(0), Some(10));
        assert_eq!(h.id(2), Some(12));
        assert_eq!(h.id(3), None);
    }

    #[test]
    fn store_allocates_disjoint_ranges() {
        let mut store = GlyphStore::new();
        let a = store.insert(vec!['a', 'b', 'c']).unwrap();
        let b = store.insert(vec!['d']).unwrap();
        let empty = store.insert(Vec::new()).unwrap();

        assert!(a.base >= 1);
        assert_eq!(a.count, 3);
        assert!(b.base >= a.base + 3);
        assert_eq!(b.count, 1);
        assert_eq!(empty.count, 0);
        assert!(empty.base > b.base);
        assert_eq!(store.get(a).unwrap(), &['a', 'b', 'c']);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn store_rejects_deleted_and_foreign_handles() {
        let mut store = GlyphStore::new();
        let a = store.insert(vec![1u8, 2]).unwrap();

        assert!(store.get(GlyphHandles { base: a.base, count: 1 }).is_err());
        store.remove(a).unwrap();
        assert!(store.get(a).is_err());
        assert!(store.remove(a).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn stores_never_share_ids() {
        let mut first = GlyphStore::new();
        let mut second = GlyphStore::new();
        let a = first.insert(vec![1u8, 2]).unwrap();
        let b = second.insert(vec![3u8, 4]).unwrap();

        assert_ne!(a.base, b.base);
        assert!(second.get(a).is_err());
        assert!(second.remove(a).is_err());
        assert_eq!(second.get(b).unwrap(), &[3, 4]);
    }

    #[test]
    fn rgba_image_validates_buffer_size() {
        assert!(RgbaImage::from_raw(vec![0; 15], 2, 2, 8, PixelFormat::Rgba8).is_err());
        assert!(RgbaImage::from_raw(vec![0; 16], 2, 2, 4, PixelFormat::Rgba8).is_err());
        let img = RgbaImage::from_raw(vec![7; 16], 2, 2, 8, PixelFormat::Rgba8).unwrap();
        assert_eq!(img.pixel(1, 1), Some([7, 7, 7, 7]));
        assert_eq!(img.pixel(2, 0), None);
    }
}
