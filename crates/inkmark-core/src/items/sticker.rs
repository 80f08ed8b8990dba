//! Raster sticker placed on the image.

use super::{ItemId, ItemProperties, ItemTrait};
use crate::selection::{Corner, HandleKind};
use image::RgbaImage;
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Size, Vec2};
use std::sync::Arc;
use uuid::Uuid;

/// A bitmap drawn at a position and display size.
///
/// The pixel data is shared between undo snapshots; only the placement is
/// copied.
#[derive(Debug, Clone, PartialEq)]
pub struct StickerItem {
    id: ItemId,
    image: Arc<RgbaImage>,
    rect: Rect,
    properties: ItemProperties,
    visual_revision: u64,
}

impl StickerItem {
    /// Place `image` at its natural size, centered on `center`.
    pub fn new(center: Point, image: RgbaImage, properties: ItemProperties) -> Self {
        Self::from_shared(center, Arc::new(image), properties)
    }

    /// Place an already shared image, centered on `center`.
    pub fn from_shared(center: Point, image: Arc<RgbaImage>, properties: ItemProperties) -> Self {
        let size = Size::new(image.width() as f64, image.height() as f64);
        Self {
            id: Uuid::new_v4(),
            image,
            rect: Rect::from_center_size(center, size),
            properties,
            visual_revision: 0,
        }
    }

    /// Place `image` with its top-left corner at `position`.
    pub fn at_position(position: Point, image: RgbaImage, properties: ItemProperties) -> Self {
        let mut sticker = Self::new(Point::ZERO, image, properties);
        sticker.move_to(position);
        sticker
    }

    /// Pixel data.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Display rectangle in image coordinates.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    fn natural_size(&self) -> Size {
        Size::new(
            (self.image.width() as f64).max(1.0),
            (self.image.height() as f64).max(1.0),
        )
    }
}

impl ItemTrait for StickerItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn bounding_region(&self) -> Rect {
        self.rect
    }

    fn shape(&self) -> BezPath {
        self.rect.to_path(0.1)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.rect.inflate(tolerance, tolerance).contains(point)
    }

    /// Stickers are placed with a single click.
    fn add_point(&mut self, _position: Point) {}

    fn move_to(&mut self, new_position: Point) {
        self.rect = Rect::from_origin_size(new_position, self.rect.size());
    }

    fn translate(&mut self, delta: Vec2) {
        self.rect = self.rect + delta;
    }

    /// Corner drags scale the sticker around the opposite corner and keep the
    /// aspect ratio of the bitmap.
    fn resize(&mut self, handle: HandleKind, position: Point) {
        let HandleKind::Corner(corner) = handle else {
            return;
        };
        let r = self.rect;
        let (opposite, sx, sy) = match corner {
            Corner::TopLeft => (Point::new(r.x1, r.y1), -1.0, -1.0),
            Corner::TopRight => (Point::new(r.x0, r.y1), 1.0, -1.0),
            Corner::BottomLeft => (Point::new(r.x1, r.y0), -1.0, 1.0),
            Corner::BottomRight => (Point::new(r.x0, r.y0), 1.0, 1.0),
        };
        let natural = self.natural_size();
        let scale = ((position.x - opposite.x).abs() / natural.width)
            .max((position.y - opposite.y).abs() / natural.height)
            .max(1.0 / natural.width.min(natural.height));
        let far = Point::new(
            opposite.x + sx * natural.width * scale,
            opposite.y + sy * natural.height * scale,
        );
        self.rect = Rect::from_points(opposite, far);
    }

    fn properties(&self) -> &ItemProperties {
        &self.properties
    }

    fn set_properties(&mut self, properties: ItemProperties) {
        self.properties = properties;
        self.visual_revision += 1;
    }

    fn visual_revision(&self) -> u64 {
        self.visual_revision
    }

    fn is_degenerate(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }
}
