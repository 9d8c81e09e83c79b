//! Viewport definition for rendering.
//!
//! A [`Viewport`] is the window area a backend draws into. Raster positions
//! passed to [`RenderBackend::raster_pos`](crate::render::RenderBackend::raster_pos)
//! are relative to the viewport's origin, with `y` growing upward, like an
//! orthographic projection set up from the viewport rectangle.
//!
//! # Examples
//!
//! ```
//! use glyphblit::render::Viewport;
//!
//! let mut vp = Viewport::new(0, 0, 800, 600);
//! vp.resize(1024, 768);
//! vp.translate(10, 20);
//! assert_eq!(vp.width, 1024);
//! assert_eq!(vp.x, 10);
//! ```

/// Represents the viewport for rendering.
#[derive(Clone, Eq, PartialEq, Copy, Default)]
pub struct Viewport {
    /// Horizontal offset in pixels from the left edge of the target.
    pub x: i32,

    /// Vertical offset in pixels from the bottom edge of the target.
    pub y: i32,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Viewport {{ x: {}, y: {}, width: {}, height: {} }}",
            self.x, self.y, self.width, self.height
        )
    }
}

impl Viewport {
    /// Creates a new [`Viewport`] with the given position and size.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Resizes the viewport to the given width and height.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Moves the viewport’s origin to `(x, y)` in pixels.
    pub fn translate(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Returns the aspect ratio (`width / height`) as `f32`.
    ///
    /// Returns `0.0` if `height` is `0` to avoid division by zero.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_handles_zero_height() {
        assert_eq!(Viewport::new(0, 0, 1920, 1080).aspect_ratio(), 1920.0 / 1080.0);
        assert_eq!(Viewport::default().aspect_ratio(), 0.0);
    }
}
