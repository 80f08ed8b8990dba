//! Preview band shown while dragging out a cut-out.

use super::{ItemId, ItemProperties, ItemTrait};
use crate::commands::CutOrientation;
use crate::selection::HandleKind;
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use uuid::Uuid;

/// A band spanning the whole image across the drag direction.
///
/// Dragging mostly horizontally selects a band of columns (a vertical cut),
/// dragging mostly vertically selects a band of rows (a horizontal cut). The
/// marker only lives for the duration of the gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct CutOutMarker {
    id: ItemId,
    start: Point,
    current: Point,
    image_rect: Rect,
    properties: ItemProperties,
    visual_revision: u64,
}

impl CutOutMarker {
    /// Start a marker at `start` over an image occupying `image_rect`.
    pub fn new(start: Point, image_rect: Rect, properties: ItemProperties) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            current: start,
            image_rect,
            properties,
            visual_revision: 0,
        }
    }

    /// Direction of the cut implied by the drag so far.
    pub fn orientation(&self) -> CutOrientation {
        let drag = self.current - self.start;
        if drag.x.abs() >= drag.y.abs() {
            CutOrientation::Vertical
        } else {
            CutOrientation::Horizontal
        }
    }

    /// Rectangle that will be removed, spanning the image across the cut.
    pub fn cut_rect(&self) -> Rect {
        let image = self.image_rect;
        match self.orientation() {
            CutOrientation::Vertical => Rect::new(
                self.start.x.min(self.current.x),
                image.y0,
                self.start.x.max(self.current.x),
                image.y1,
            ),
            CutOrientation::Horizontal => Rect::new(
                image.x0,
                self.start.y.min(self.current.y),
                image.x1,
                self.start.y.max(self.current.y),
            ),
        }
    }
}

impl ItemTrait for CutOutMarker {
    fn id(&self) -> ItemId {
        self.id
    }

    fn bounding_region(&self) -> Rect {
        self.cut_rect()
    }

    fn shape(&self) -> BezPath {
        self.cut_rect().to_path(0.1)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.cut_rect().inflate(tolerance, tolerance).contains(point)
    }

    fn add_point(&mut self, position: Point) {
        self.current = position;
    }

    fn move_to(&mut self, new_position: Point) {
        let delta = new_position - self.cut_rect().origin();
        self.translate(delta);
    }

    fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.current += delta;
    }

    fn resize(&mut self, _handle: HandleKind, _position: Point) {}

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
        let rect = self.cut_rect().intersect(self.image_rect);
        rect.width() < f64::EPSILON || rect.height() < f64::EPSILON
    }
}
