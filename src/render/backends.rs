pub mod cpu;
pub mod null;

/// Cairo rendering backend
#[cfg(feature = "backend_cairo")]
pub mod cairo;
