use crate::config::LoadConfigError;

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Font parse error: {0}")]
    Parse(String),

    #[error("Invalid rune range {low:?}..={high:?}")]
    InvalidRange { low: char, high: char },

    #[error("Invalid load configuration: {0}")]
    Config(#[from] LoadConfigError),

    #[error("Glyph sheet of {width}x{height} pixels is too large")]
    SheetTooLarge { width: u64, height: u64 },

    #[error("Glyph {index} has a {width}x{height} cell, larger than its {sheet_width}x{sheet_height} sheet")]
    InvalidCell { index: usize, width: i32, height: i32, sheet_width: u32, sheet_height: u32 },

    #[error("Image decode error: {0}")]
    Decode(#[from] png::DecodingError),

    #[error("Image encode error: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("Unsupported sprite sheet format: {0}")]
    UnsupportedImage(String),

    #[error("Renderer error: {0}")]
    Render(String),
}

impl FontError {
    pub(crate) fn render(err: anyhow::Error) -> Self {
        FontError::Render(format!("{err:#}"))
    }
}
