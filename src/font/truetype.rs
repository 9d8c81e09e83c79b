//! TrueType rasterization into a glyph sheet.
//!
//! Font-wide metrics and per-glyph advances are read with `skrifa`, glyph
//! coverage is rendered with `fontdue`. Every rune gets a cell of the same
//! size, derived from the font's bounding box, so that any glyph fits. Cells
//! are laid out `glyphs_per_row` to a row and the sheet is rounded up to
//! power-of-two dimensions.

use crate::config::LoadConfig;
use crate::errors::FontError;
use crate::glyph::FontConfig;
use crate::pack::Region;
use crate::sheet::{pow2, GlyphSheet};
use skrifa::instance::Size;
use skrifa::raw::FileRef;
use skrifa::{FontRef, MetadataProvider};

/// Upper bound for sheet allocations, in pixels.
const MAX_SHEET_PIXELS: u64 = 1 << 28;

/// Renders all runes of `options` into a sheet and describes their cells.
pub(crate) fn rasterize(data: &[u8], options: &LoadConfig) -> Result<(GlyphSheet, FontConfig), FontError> {
    let face = to_font_ref(data)?;
    let px = options.scale as f32;
    let size = Size::new(px);
    let var_loc = face.axes().location(std::iter::empty::<(&str, f32)>());
    let metrics = face.metrics(size, &var_loc);
    let charmap = face.charmap();
    let glyph_metrics = face.glyph_metrics(size, &var_loc);

    let settings = fontdue::FontSettings {
        scale: px,
        ..fontdue::FontSettings::default()
    };
    let raster = fontdue::Font::from_bytes(data, settings).map_err(|e| FontError::Parse(e.to_string()))?;

    let bounds = match metrics.bounds {
        Some(b) => (b.x_min, b.y_min, b.x_max, b.y_max),
        None => {
            log::warn!("font has no bounding box, falling back to ascent/descent");
            (0.0, metrics.descent, metrics.max_width.unwrap_or(px), metrics.ascent)
        }
    };
    let CellLayout { left, top, width: cell_w, height: cell_h } = CellLayout::new(bounds, options.cell_padding);

    let count = options.glyph_count();
    let per_row = options.glyphs_per_row;
    let rows = count / per_row + 1;

    let raw_w = cell_w as u64 * per_row as u64;
    let raw_h = cell_h as u64 * rows as u64;
    if raw_w > 1 << 31 || raw_h > 1 << 31 || raw_w * raw_h > MAX_SHEET_PIXELS {
        return Err(FontError::SheetTooLarge { width: raw_w, height: raw_h });
    }
    let sheet_w = pow2(raw_w as u32);
    let sheet_h = pow2(raw_h as u32);
    if sheet_w as u64 * sheet_h as u64 > MAX_SHEET_PIXELS {
        return Err(FontError::SheetTooLarge { width: sheet_w as u64, height: sheet_h as u64 });
    }

    log::debug!(
        "rasterizing {} runes at {}px: cell {}x{}, sheet {}x{}",
        count,
        options.scale,
        cell_w,
        cell_h,
        sheet_w,
        sheet_h
    );

    let mut config = FontConfig::new(options.low, options.high)?;
    let mut sheet = GlyphSheet::new(sheet_w, sheet_h);

    for (gi, cp) in (options.low as u32..=options.high as u32).enumerate() {
        let gx = (gi as u32 % per_row * cell_w) as i32;
        let gy = (gi as u32 / per_row * cell_h) as i32;

        let glyph = &mut config.glyphs[gi];
        glyph.x = gx;
        glyph.y = gy;
        glyph.width = cell_w as i32;
        glyph.height = cell_h as i32;

        // Surrogate code points keep an empty cell.
        let Some(ch) = char::from_u32(cp) else { continue };

        let gid = charmap.map(ch).unwrap_or_default();
        glyph.advance = glyph_metrics.advance_width(gid).unwrap_or_default().round() as i32;

        let (m, coverage) = raster.rasterize(ch, px);
        let origin_x = gx - left + m.xmin;
        let origin_y = gy + top - (m.ymin + m.height as i32);
        draw_clipped(&mut sheet, glyph.region(), origin_x, origin_y, m.width, &coverage);
    }

    Ok((sheet, config))
}

/// Size of every glyph cell, plus the pen offset and baseline inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CellLayout {
    left: i32,
    top: i32,
    width: u32,
    height: u32,
}

impl CellLayout {
    /// Derives the cell from the scaled font bounding box `(x_min, y_min, x_max, y_max)`.
    /// Both sides are at least one pixel, before `padding` rows are added.
    fn new((x_min, y_min, x_max, y_max): (f32, f32, f32, f32), padding: u32) -> Self {
        let left = x_min.floor() as i32;
        let top = y_max.ceil() as i32;
        let width = (x_max.ceil() as i32).saturating_sub(left).max(1) as u32;
        let height = (top.saturating_sub(y_min.floor() as i32).max(1) as u32).saturating_add(padding);
        Self { left, top, width, height }
    }
}

/// Draws a coverage bitmap at `(x, y)`, dropping everything outside `cell`.
fn draw_clipped(sheet: &mut GlyphSheet, cell: Region, x: i32, y: i32, width: usize, coverage: &[u8]) {
    if width == 0 {
        return;
    }
    let (cx0, cy0) = (cell.x, cell.y);
    let (cx1, cy1) = (cell.x + cell.width as i32, cell.y + cell.height as i32);

    for (row, line) in coverage.chunks(width).enumerate() {
        let py = y + row as i32;
        if py < cy0 || py >= cy1 {
            continue;
        }
        for (col, value) in line.iter().enumerate() {
            let px = x + col as i32;
            if *value != 0 && px >= cx0 && px < cx1 {
                sheet.put_max(px, py, *value);
            }
        }
    }
}

fn to_font_ref(data: &[u8]) -> Result<FontRef<'_>, FontError> {
    let file_ref = FileRef::new(data).map_err(|e| FontError::Parse(e.to_string()))?;
    match file_ref {
        FileRef::Font(font) => Ok(font),
        FileRef::Collection(collection) => collection.get(0).map_err(|e| FontError::Parse(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{Font, DEFAULT_FONT};
    use crate::render::backends::cpu::CpuBackend;
    use crate::render::{Color, RenderBackend};
    use crate::sheet::is_pow2;
    use std::io::Write;

    fn default_options() -> LoadConfig {
        LoadConfig::default()
    }

    #[test]
    fn sheet_has_power_of_two_dimensions_and_holds_all_cells() {
        let (sheet, config) = rasterize(DEFAULT_FONT, &default_options()).unwrap();
        assert!(is_pow2(sheet.width()));
        assert!(is_pow2(sheet.height()));
        assert_eq!(config.len(), 96);

        for g in config.glyphs.iter() {
            assert!(g.width > 0 && g.height > 0);
            assert!(g.x >= 0 && g.y >= 0);
            assert!(g.x + g.width <= sheet.width() as i32);
            assert!(g.y + g.height <= sheet.height() as i32);
        }
    }

    #[test]
    fn cell_layout_rounds_bounds_outward() {
        let cell = CellLayout::new((-0.5, -3.2, 8.1, 11.7), 5);
        assert_eq!(cell, CellLayout { left: -1, top: 12, width: 10, height: 16 + 5 });
    }

    #[test]
    fn cell_layout_is_at_least_one_pixel() {
        let empty = CellLayout::new((0.0, 0.0, 0.0, 0.0), 0);
        assert_eq!((empty.width, empty.height), (1, 1));

        let inverted = CellLayout::new((4.0, 6.0, 1.0, 2.0), 5);
        assert_eq!((inverted.width, inverted.height), (1, 1 + 5));
    }

    #[test]
    fn coverage_is_clipped_to_its_cell() {
        let mut sheet = GlyphSheet::new(8, 8);
        let cell = Region { x: 2, y: 2, width: 3, height: 3 };
        // 5x5 fully lit coverage starting one pixel up and left of the cell.
        draw_clipped(&mut sheet, cell, 1, 1, 5, &[255; 25]);

        for y in 0..8 {
            for x in 0..8 {
                let inside = (2..5).contains(&x) && (2..5).contains(&y);
                assert_eq!(sheet.get(x, y) != 0, inside, "pixel {x},{y}");
            }
        }
    }

    #[test]
    fn oversized_sheet_is_rejected() {
        let options = LoadConfig::builder().scale(512).range('\0', '\u{ffff}').build().unwrap();
        let res = rasterize(DEFAULT_FONT, &options);
        assert!(matches!(res, Err(FontError::SheetTooLarge { .. })));
        assert!(matches!(Font::from_bytes(DEFAULT_FONT, &options), Err(FontError::SheetTooLarge { .. })));
    }

    #[test]
    fn cells_wrap_after_a_full_row() {
        let (_, config) = rasterize(DEFAULT_FONT, &default_options()).unwrap();
        let g = &config.glyphs;
        let (w, h) = (g[0].width, g[0].height);

        assert_eq!((g[0].x, g[0].y), (0, 0));
        assert_eq!((g[1].x, g[1].y), (w, 0));
        assert_eq!((g[15].x, g[15].y), (15 * w, 0));
        assert_eq!((g[16].x, g[16].y), (0, h));
        assert_eq!((g[33].x, g[33].y), (w, 2 * h));
    }

    #[test]
    fn cell_height_includes_padding() {
        let padded = rasterize(DEFAULT_FONT, &default_options()).unwrap().1;
        let tight = LoadConfig { cell_padding: 0, ..default_options() };
        let tight = rasterize(DEFAULT_FONT, &tight).unwrap().1;
        assert_eq!(padded.glyphs[0].height, tight.glyphs[0].height + 5);
        assert_eq!(padded.glyphs[0].width, tight.glyphs[0].width);
    }

    #[test]
    fn monospace_font_has_uniform_advances() {
        let font = Font::default_font().unwrap();
        let adv = |ch| font.config().glyph(ch).unwrap().advance;

        assert!(adv('A') > 0);
        assert_eq!(adv('A'), adv('i'));
        assert_eq!(adv('A'), adv('W'));
        assert_eq!(adv('A'), adv(' '));
        assert!(adv('A') <= font.max_glyph_width());
    }

    #[test]
    fn metrics_follow_advances() {
        let font = Font::default_font().unwrap();
        let adv = font.config().glyph('H').unwrap().advance;

        assert_eq!(font.metrics(""), (0, 0));
        assert_eq!(font.metrics("Hello"), (5 * adv, font.max_glyph_height()));
        // 'é' is outside 32..=127 and counts as the widest glyph.
        assert_eq!(font.metrics("H\u{e9}"), (adv + font.max_glyph_width(), font.max_glyph_height()));
    }

    #[test]
    fn visible_glyphs_have_pixels_and_space_has_none() {
        let font = Font::default_font().unwrap();
        assert!(font.bitmap('A').unwrap().set_pixels() > 10);
        assert!(font.bitmap('.').unwrap().set_pixels() > 0);
        assert!(font.bitmap(' ').unwrap().is_blank());
    }

    #[test]
    fn higher_threshold_sets_fewer_pixels() {
        let soft = Font::default_font().unwrap();
        let hard = Font::from_bytes(DEFAULT_FONT, &LoadConfig { threshold: 200, ..default_options() }).unwrap();

        let soft_px = soft.bitmap('O').unwrap().set_pixels();
        let hard_px = hard.bitmap('O').unwrap().set_pixels();
        assert!(hard_px > 0);
        assert!(hard_px < soft_px, "{hard_px} >= {soft_px}");
    }

    #[test]
    fn larger_scale_gives_larger_glyphs() {
        let small = Font::load_truetype(DEFAULT_FONT, 16, 'A', 'Z').unwrap();
        let large = Font::load_truetype(DEFAULT_FONT, 40, 'A', 'Z').unwrap();

        assert_eq!(small.config().len(), 26);
        assert!(large.max_glyph_width() > small.max_glyph_width());
        assert!(large.max_glyph_height() > small.max_glyph_height());
        assert!(large.metrics("ABC").0 > small.metrics("ABC").0);
    }

    #[test]
    fn range_across_surrogates_keeps_slot_layout() {
        let opts = LoadConfig::builder().range('\u{d7ff}', '\u{e000}').build().unwrap();
        let font = Font::from_bytes(DEFAULT_FONT, &opts).unwrap();

        assert_eq!(font.config().len(), 0xe000 - 0xd7ff + 1);
        assert_eq!(font.config().index_of('\u{e000}'), Some(font.config().len() - 1));
    }

    #[test]
    fn garbage_data_is_a_parse_error() {
        let res = Font::from_bytes(b"definitely not a font", &default_options());
        assert!(matches!(res, Err(FontError::Parse(_))), "got {:?}", res);
    }

    #[test]
    fn invalid_options_are_rejected_before_parsing() {
        let res = Font::load_truetype(DEFAULT_FONT, 0, ' ', '~');
        assert!(matches!(res, Err(FontError::Config(_))));

        let res = Font::load_truetype(DEFAULT_FONT, 16, '~', ' ');
        assert!(matches!(res, Err(FontError::Config(_))));
    }

    #[test]
    fn from_path_reads_font_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DEFAULT_FONT).unwrap();

        let font = Font::from_path(file.path(), &default_options()).unwrap();
        assert_eq!(font.config().len(), 96);

        let missing = Font::from_path(file.path().with_extension("missing"), &default_options());
        assert!(matches!(missing, Err(FontError::Io(_))));
    }

    #[test]
    fn printf_draws_text_on_cpu_backend() {
        let mut font = Font::default_font().unwrap();
        let mut be = CpuBackend::new(128, 64).unwrap();
        be.clear(Color::BLACK);
        be.set_color(Color::from_u8(255, 255, 0, 255));

        font.printf(&mut be, 10.0, 20.0, "Hello world").unwrap();

        let snapshot = be.snapshot().unwrap();
        let lit = snapshot
            .pixels
            .chunks(4)
            .filter(|px| *px == [255, 255, 0, 255])
            .count();
        assert!(lit > 50, "only {lit} pixels painted");

        font.release(&mut be).unwrap();
        assert_eq!(be.live_ranges(), 0);
    }

    #[test]
    fn printf_of_spaces_paints_nothing() {
        let mut font = Font::default_font().unwrap();
        let mut be = CpuBackend::new(64, 32).unwrap();
        be.clear(Color::BLACK);
        font.printf(&mut be, 0.0, 0.0, "   ").unwrap();

        let snapshot = be.snapshot().unwrap();
        assert!(snapshot.pixels.chunks(4).all(|px| px == [0, 0, 0, 255]));
    }
}
