//! Glyph sheets.
//!
//! A [`GlyphSheet`] is an 8-bit coverage image that holds every glyph of a
//! font in its own cell. TrueType fonts are rasterized into one; raster fonts
//! are decoded into one from a PNG sprite sheet.

use crate::errors::FontError;
use std::io::{Read, Write};

/// Row-major 8-bit coverage image.
#[derive(Clone, PartialEq, Eq)]
pub struct GlyphSheet {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl GlyphSheet {
    /// Creates an empty (fully transparent) sheet.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize],
        }
    }

    /// Wraps existing coverage data. Returns `None` when the length does not match.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize).then_some(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Coverage at `(x, y)`; zero outside the sheet.
    pub fn get(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0;
        }
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Raises the coverage at `(x, y)` to `value`. Writes outside the sheet are clipped.
    pub fn put_max(&mut self, x: i32, y: i32, value: u8) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let px = &mut self.pixels[y as usize * self.width as usize + x as usize];
        *px = (*px).max(value);
    }

    /// Decodes a PNG sprite sheet.
    ///
    /// Coverage is taken from the red channel of colour images and from the
    /// luma channel of grayscale images, so glyphs are expected to be light
    /// on a dark background.
    pub fn from_png<R: Read>(reader: R) -> Result<Self, FontError> {
        let mut decoder = png::Decoder::new(reader);
        decoder.set_transformations(png::Transformations::normalize_to_color8());
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0u8; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;

        let channels = match info.color_type {
            png::ColorType::Grayscale => 1,
            png::ColorType::GrayscaleAlpha => 2,
            png::ColorType::Rgb => 3,
            png::ColorType::Rgba => 4,
            png::ColorType::Indexed => {
                return Err(FontError::UnsupportedImage("indexed colour was not expanded".into()));
            }
        };
        if info.bit_depth != png::BitDepth::Eight {
            return Err(FontError::UnsupportedImage(format!("bit depth {:?}", info.bit_depth)));
        }

        let mut sheet = GlyphSheet::new(info.width, info.height);
        for (y, line) in buf.chunks(info.line_size).take(info.height as usize).enumerate() {
            for (x, px) in line.chunks(channels).take(info.width as usize).enumerate() {
                sheet.pixels[y * info.width as usize + x] = px[0];
            }
        }

        log::debug!("decoded {}x{} sprite sheet ({:?})", info.width, info.height, info.color_type);
        Ok(sheet)
    }

    /// Encodes the sheet as an 8-bit grayscale PNG.
    pub fn write_png<W: Write>(&self, writer: W) -> Result<(), FontError> {
        let mut encoder = png::Encoder::new(writer, self.width, self.height);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.pixels)?;
        Ok(())
    }
}

impl std::fmt::Debug for GlyphSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphSheet")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.pixels.len())
            .finish()
    }
}

/// Returns the first power of two `>= x`.
///
/// Zero (and anything above `2^31`) wraps around to zero.
pub fn pow2(x: u32) -> u32 {
    let mut x = x.wrapping_sub(1);
    x |= x >> 1;
    x |= x >> 2;
    x |= x >> 4;
    x |= x >> 8;
    x |= x >> 16;
    x.wrapping_add(1)
}

/// True if `x` is a power of two. Zero counts as one.
pub fn is_pow2(x: u32) -> bool {
    x & x.wrapping_sub(1) == 0
}

/// Returns `sheet` grown to the smallest power-of-two dimensions that fit it.
///
/// Contents keep their position at the top-left; new area is empty.
pub fn pow2_sheet(sheet: GlyphSheet) -> GlyphSheet {
    if is_pow2(sheet.width) && is_pow2(sheet.height) {
        return sheet;
    }

    let mut out = GlyphSheet::new(pow2(sheet.width), pow2(sheet.height));
    let src_w = sheet.width as usize;
    let dst_w = out.width as usize;
    for (y, line) in sheet.pixels.chunks(src_w.max(1)).enumerate() {
        out.pixels[y * dst_w..y * dst_w + src_w].copy_from_slice(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pow2_rounds_up() {
        assert_eq!(pow2(1), 1);
        assert_eq!(pow2(2), 2);
        assert_eq!(pow2(3), 4);
        assert_eq!(pow2(16), 16);
        assert_eq!(pow2(17), 32);
        assert_eq!(pow2(1000), 1024);
        assert_eq!(pow2(1 << 31), 1 << 31);
    }

    #[test]
    fn pow2_wraps_for_zero_and_huge_values() {
        assert_eq!(pow2(0), 0);
        assert_eq!(pow2((1 << 31) + 1), 0);
    }

    #[test]
    fn is_pow2_matches_definition() {
        assert!(is_pow2(0));
        assert!(is_pow2(1));
        assert!(is_pow2(64));
        assert!(!is_pow2(3));
        assert!(!is_pow2(96));
    }

    #[test]
    fn pow2_sheet_keeps_power_of_two_sheets() {
        let mut sheet = GlyphSheet::new(4, 8);
        sheet.put_max(1, 1, 9);
        let out = pow2_sheet(sheet.clone());
        assert_eq!(out, sheet);
    }

    #[test]
    fn pow2_sheet_pads_to_the_right_and_bottom() {
        let mut sheet = GlyphSheet::new(3, 5);
        sheet.put_max(0, 0, 10);
        sheet.put_max(2, 4, 20);

        let out = pow2_sheet(sheet);
        assert_eq!((out.width(), out.height()), (4, 8));
        assert_eq!(out.get(0, 0), 10);
        assert_eq!(out.get(2, 4), 20);
        assert_eq!(out.get(3, 4), 0);
        assert_eq!(out.get(2, 7), 0);
    }

    #[test]
    fn put_max_keeps_brightest_value_and_clips() {
        let mut sheet = GlyphSheet::new(2, 2);
        sheet.put_max(0, 0, 100);
        sheet.put_max(0, 0, 50);
        sheet.put_max(-1, 0, 255);
        sheet.put_max(0, 2, 255);
        assert_eq!(sheet.get(0, 0), 100);
        assert_eq!(sheet.pixels().iter().filter(|p| **p != 0).count(), 1);
        assert_eq!(sheet.get(5, 5), 0);
    }

    #[test]
    fn png_encoding_is_read_back_as_coverage() {
        let mut sheet = GlyphSheet::new(5, 3);
        sheet.put_max(4, 2, 200);
        sheet.put_max(0, 1, 17);

        let mut encoded = Vec::new();
        sheet.write_png(&mut encoded).unwrap();
        let decoded = GlyphSheet::from_png(encoded.as_slice()).unwrap();

        assert_eq!(decoded, sheet);
    }

    #[test]
    fn rgba_png_uses_red_channel() {
        let mut encoded = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut encoded, 2, 1);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer
                .write_image_data(&[255, 0, 0, 255, 0, 255, 255, 255])
                .unwrap();
        }

        let sheet = GlyphSheet::from_png(encoded.as_slice()).unwrap();
        assert_eq!(sheet.get(0, 0), 255);
        assert_eq!(sheet.get(1, 0), 0);
    }

    #[test]
    fn garbage_png_is_a_decode_error() {
        let res = GlyphSheet::from_png(&b"not a png"[..]);
        assert!(matches!(res, Err(FontError::Decode(_))));
    }
}
