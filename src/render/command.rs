//! Colors and recorded draw commands.
//!
//! [`DrawCommand`]s describe what a font asked a backend to do, one entry per
//! state change or blit. The [`NullBackend`](crate::render::backends::null::NullBackend)
//! keeps them in a [`CommandLog`] instead of rasterizing, which makes the
//! draw path observable without a framebuffer.
//!
//! # Example
//!
//! ```rust
//! use glyphblit::render::{Color, CommandLog, DrawCommand};
//!
//! let mut log = CommandLog::new();
//! log.push(DrawCommand::SetColor { color: Color::from_u8(255, 255, 0, 255) });
//! log.push(DrawCommand::RasterPos { x: 10.0, y: 20.0 });
//! assert_eq!(log.blits().count(), 0);
//! ```

/// RGBA color used for drawing commands.
///
/// Channels are represented as `f32` in the range `0.0 ..= 1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel (opacity)
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

    /// Creates a new color from `f32` channel values in the range `0.0 ..= 1.0`.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Color {
        Color { r, g, b, a }
    }

    /// Creates a new color from `u8` channel values in the range `0 ..= 255`.
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Returns the channels as clamped `u8` values.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [c(self.r), c(self.g), c(self.b), c(self.a)]
    }
}

/// A single recorded drawing command.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// The current drawing color changed.
    SetColor { color: Color },

    /// The raster position was set, relative to the viewport origin.
    RasterPos { x: f32, y: f32 },

    /// Glyph `id` was drawn with its bitmap origin at `(x, y)`.
    Blit { id: u32, x: f32, y: f32 },

    /// The raster position moved without drawing.
    Advance { dx: f32, dy: f32 },
}

/// Ordered list of recorded commands.
#[derive(Clone, Debug, Default)]
pub struct CommandLog {
    pub items: Vec<DrawCommand>,
}

impl CommandLog {
    pub fn new() -> Self {
        CommandLog { items: Vec::new() }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.items.push(command);
    }

    /// Clears all recorded commands.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Blits in draw order as `(id, x, y)`.
    pub fn blits(&self) -> impl Iterator<Item = (u32, f32, f32)> + '_ {
        self.items.iter().filter_map(|c| match c {
            DrawCommand::Blit { id, x, y } => Some((*id, *x, *y)),
            _ => None,
        })
    }
}
