//! Cut-out: remove a full-span band from the background and close the gap.

use crate::error::{AnnotateError, AnnotateResult};
use crate::scene::Scene;
use image::RgbaImage;
use kurbo::Rect;

const BYTES_PER_PIXEL: usize = 4;

/// Which way a cut-out runs through the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutOrientation {
    /// The band spans the full height; columns are removed and the image gets narrower.
    Vertical,
    /// The band spans the full width; rows are removed and the image gets shorter.
    Horizontal,
}

/// Removed band in whole pixels, half-open on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    /// Clamp a rectangle in image coordinates to a `width`×`height` image and
    /// snap it to pixel edges.
    pub fn clamped(rect: Rect, width: u32, height: u32) -> AnnotateResult<Self> {
        let rect = rect.abs();
        let snap = |v: f64, max: u32| v.round().clamp(0.0, max as f64) as u32;
        let clamped = Self {
            x0: snap(rect.x0, width),
            y0: snap(rect.y0, height),
            x1: snap(rect.x1, width),
            y1: snap(rect.y1, height),
        };
        if clamped.x1 <= clamped.x0 || clamped.y1 <= clamped.y0 {
            return Err(AnnotateError::DegenerateCutOut);
        }
        Ok(clamped)
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

/// Classify a clamped band against a `width`×`height` image.
pub fn classify(rect: PixelRect, width: u32, height: u32) -> AnnotateResult<CutOrientation> {
    let full_height = rect.y0 == 0 && rect.y1 == height;
    let full_width = rect.x0 == 0 && rect.x1 == width;
    match (full_height, full_width) {
        (true, true) => Err(AnnotateError::CutOutRemovesImage),
        (true, false) => Ok(CutOrientation::Vertical),
        (false, true) => Ok(CutOrientation::Horizontal),
        (false, false) => Err(AnnotateError::CutOutNotSpanning {
            rect: Rect::new(
                rect.x0 as f64,
                rect.y0 as f64,
                rect.x1 as f64,
                rect.y1 as f64,
            ),
            width,
            height,
        }),
    }
}

fn try_alloc(bytes: usize) -> AnnotateResult<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(bytes)
        .map_err(|_| AnnotateError::ImageAllocation { bytes })?;
    Ok(buffer)
}

fn into_image(width: u32, height: u32, raw: Vec<u8>) -> AnnotateResult<RgbaImage> {
    let bytes = raw.len();
    RgbaImage::from_raw(width, height, raw).ok_or(AnnotateError::ImageAllocation { bytes })
}

/// Copy an image without aborting on allocation failure.
pub fn try_copy(image: &RgbaImage) -> AnnotateResult<RgbaImage> {
    let mut raw = try_alloc(image.as_raw().len())?;
    raw.extend_from_slice(image.as_raw());
    into_image(image.width(), image.height(), raw)
}

/// Join the two pieces on either side of `rect` with no gap.
pub fn splice(
    image: &RgbaImage,
    rect: PixelRect,
    orientation: CutOrientation,
) -> AnnotateResult<RgbaImage> {
    let (width, height) = image.dimensions();
    let raw = image.as_raw();
    let stride = width as usize * BYTES_PER_PIXEL;

    match orientation {
        CutOrientation::Vertical => {
            let new_width = width - rect.width();
            let mut out = try_alloc(new_width as usize * height as usize * BYTES_PER_PIXEL)?;
            let left = rect.x0 as usize * BYTES_PER_PIXEL;
            let right = rect.x1 as usize * BYTES_PER_PIXEL;
            for row in raw.chunks_exact(stride) {
                out.extend_from_slice(&row[..left]);
                out.extend_from_slice(&row[right..]);
            }
            into_image(new_width, height, out)
        }
        CutOrientation::Horizontal => {
            let new_height = height - rect.height();
            let mut out = try_alloc(width as usize * new_height as usize * BYTES_PER_PIXEL)?;
            out.extend_from_slice(&raw[..rect.y0 as usize * stride]);
            out.extend_from_slice(&raw[rect.y1 as usize * stride..]);
            into_image(width, new_height, out)
        }
    }
}

/// Reversible removal of a band from the background image.
///
/// Owns a private copy of the pre-cut image. The spliced result is computed
/// once at construction, so redo never fails for lack of memory midway.
#[derive(Debug, Clone)]
pub struct CutOutCommand {
    original: RgbaImage,
    cut_out: RgbaImage,
    rect: PixelRect,
    orientation: CutOrientation,
}

impl CutOutCommand {
    /// Validate `rect` against `image` and prepare both images.
    ///
    /// Fails before anything is allocated when the rectangle is degenerate or
    /// does not span one full dimension.
    pub fn new(image: &RgbaImage, rect: Rect) -> AnnotateResult<Self> {
        let (width, height) = image.dimensions();
        let rect = PixelRect::clamped(rect, width, height)?;
        let orientation = classify(rect, width, height)?;
        let cut_out = splice(image, rect, orientation)?;
        let original = try_copy(image)?;
        log::debug!(
            "Prepared {:?} cut-out {:?}: {}x{} -> {}x{}",
            orientation,
            rect,
            width,
            height,
            cut_out.width(),
            cut_out.height()
        );
        Ok(Self {
            original,
            cut_out,
            rect,
            orientation,
        })
    }

    /// Band removed from the image.
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    pub fn orientation(&self) -> CutOrientation {
        self.orientation
    }

    /// Image before the cut.
    pub fn original(&self) -> &RgbaImage {
        &self.original
    }

    /// Image after the cut.
    pub fn cut_out_image(&self) -> &RgbaImage {
        &self.cut_out
    }

    pub(crate) fn redo(&self, scene: &mut Scene) -> AnnotateResult<()> {
        let image = try_copy(&self.cut_out)?;
        scene.replace_background(Some(image));
        Ok(())
    }

    pub(crate) fn undo(&self, scene: &mut Scene) -> AnnotateResult<()> {
        let image = try_copy(&self.original)?;
        scene.replace_background(Some(image));
        Ok(())
    }
}
