//! Render errors and raster conversions shared by compositors.

use image::RgbaImage;
use inkmark_core::AnnotateError;
use std::path::PathBuf;
use thiserror::Error;
use tiny_skia::{ColorU8, Pixmap};

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot allocate a {width}x{height} pixmap")]
    PixmapAllocation { width: u32, height: u32 },
    #[error("Pixmap data does not fit a {width}x{height} image")]
    ImageSize { width: u32, height: u32 },
    #[error("Cannot read font {}: {source}", path.display())]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a usable font", path.display())]
    InvalidFont { path: PathBuf },
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

impl From<RenderError> for AnnotateError {
    fn from(err: RenderError) -> Self {
        AnnotateError::Composite(err.to_string())
    }
}

/// Copy an image into a premultiplied pixmap.
pub(crate) fn pixmap_from_image(image: &RgbaImage) -> RenderResult<Pixmap> {
    let (width, height) = image.dimensions();
    let mut pixmap =
        Pixmap::new(width, height).ok_or(RenderError::PixmapAllocation { width, height })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Copy a pixmap back into a straight-alpha image.
pub(crate) fn image_from_pixmap(pixmap: &Pixmap) -> RenderResult<RgbaImage> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let mut data = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(width, height, data).ok_or(RenderError::ImageSize { width, height })
}
