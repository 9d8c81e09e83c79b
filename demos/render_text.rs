//! Renders "Hello world" at several scales and writes the result to a PNG.
//!
//! Usage: `cargo run --example render_text [font.ttf] [out.png]`

use glyphblit::render::backends::cpu::CpuBackend;
use glyphblit::render::{Color, RenderBackend};
use glyphblit::{Font, LoadConfig};
use std::fs::File;
use std::io::BufWriter;

const SAMPLE: &str = "Hello world";
const FONT_COUNT: u32 = 6;
const LINES: u32 = 4;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let font_path = args.next();
    let out_path = args.next().unwrap_or_else(|| "render_text.png".to_string());

    // Load the same face at growing scales.
    let mut fonts = Vec::new();
    for id in 0..FONT_COUNT {
        let cfg = LoadConfig::builder().scale(16 + id * 3).build()?;
        let font = match &font_path {
            Some(path) => Font::from_path(path, &cfg)?,
            None => Font::from_bytes(include_bytes!("../assets/fonts/DejaVuSansMono.ttf"), &cfg)?,
        };
        log::info!("font {id}: scale {}, bounds {:?}", cfg.scale, font.glyph_bounds());
        fonts.push(font);
    }

    let width = fonts.iter().map(|f| f.metrics(SAMPLE).0).max().unwrap_or(0) as u32 + 20;
    let height = fonts.iter().map(|f| f.max_glyph_height() as u32 * LINES).sum::<u32>() + 20;

    let mut target = CpuBackend::new(width, height)?;
    target.clear(Color::BLACK);

    // Draw from the bottom up, each font gets LINES lines with a colour ramp.
    let mut y = 10.0;
    for font in fonts.iter_mut() {
        for i in 0..LINES {
            let v = i as f32 / LINES as f32;
            target.set_color(Color::new(v, 1.0 - v, 0.0, 1.0));
            font.printf(&mut target, 10.0, y, SAMPLE)?;
            y += font.max_glyph_height() as f32;
        }
    }

    let file = BufWriter::new(File::create(&out_path)?);
    target.write_png(file)?;
    println!("wrote {out_path} ({width}x{height})");

    for font in fonts {
        font.release(&mut target)?;
    }
    Ok(())
}
