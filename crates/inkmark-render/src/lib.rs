//! inkmark render library
//!
//! Compositors that flatten an annotated scene into the image handed back to
//! callers. The default implementation rasterizes on the CPU with tiny-skia.

mod renderer;
mod skia;

pub use renderer::{RenderError, RenderResult};
pub use skia::SkiaCompositor;
