//! Compositor abstraction.

use crate::error::AnnotateResult;
use crate::scene::Scene;
use image::RgbaImage;

/// Trait for backends that flatten a scene into a raster image.
///
/// Implementations draw every item in z-order over the background and return
/// an image the size of the background.
pub trait Compositor {
    /// Render the scene into a new image.
    fn composite(&self, scene: &Scene) -> AnnotateResult<RgbaImage>;
}
