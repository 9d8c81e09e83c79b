//! Immediate-mode render targets.
//!
//! Fonts talk to a target through [`RenderBackend`], which models a classic
//! raster-position API: glyph bitmaps are compiled once into a contiguous
//! range of ids, then drawn by id at the current raster position.

pub mod backend;
pub mod backends;

mod command;
pub use command::*;

mod viewport;
pub use viewport::Viewport;

pub use backend::{GlyphBlit, GlyphHandles, RenderBackend};
