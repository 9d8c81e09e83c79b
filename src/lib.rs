//! Bitmap and TrueType text rendering for immediate-mode targets.
//!
//! Glyphs are rasterized into a sheet, packed into 1-bit-per-pixel bitmaps
//! and drawn with the target's bitmap-blit primitive:
//!
//! ```
//! use glyphblit::render::backends::cpu::CpuBackend;
//! use glyphblit::render::{Color, RenderBackend};
//! use glyphblit::Font;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut font = Font::default_font()?;
//! let mut target = CpuBackend::new(200, 40)?;
//! target.set_color(Color::WHITE);
//!
//! font.printf(&mut target, 10.0, 10.0, "Hello world")?;
//! assert_eq!(font.metrics("Hi").1, font.max_glyph_height());
//!
//! font.release(&mut target)?;
//! # Ok(()) }
//! ```

pub mod config;
pub mod errors;
pub mod font;
pub mod glyph;
pub mod pack;
pub mod render;
pub mod sheet;

pub use config::{LoadConfig, LoadConfigBuilder, LoadConfigError};
pub use errors::FontError;
pub use font::{load_font, Direction, Font};
pub use glyph::{Charset, FontConfig, Glyph};
pub use pack::MonoBitmap;
pub use sheet::{is_pow2, pow2, pow2_sheet, GlyphSheet};
