//! Ellipse annotation inscribed in a dragged rectangle.

use super::rectangle::resize_rect;
use super::{ItemId, ItemProperties, ItemTrait};
use crate::geometry::RectGeometry;
use crate::selection::HandleKind;
use kurbo::{BezPath, Ellipse, Point, Rect, Shape as KurboShape, Vec2};
use uuid::Uuid;

/// An ellipse filling the rectangle spanned while drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseItem {
    id: ItemId,
    geometry: RectGeometry,
    properties: ItemProperties,
    visual_revision: u64,
}

impl EllipseItem {
    /// Start an ellipse at `start`.
    pub fn new(start: Point, properties: ItemProperties) -> Self {
        Self {
            id: Uuid::new_v4(),
            geometry: RectGeometry::new(start),
            properties,
            visual_revision: 0,
        }
    }

    /// The ellipse as a kurbo shape.
    pub fn as_kurbo(&self) -> Ellipse {
        Ellipse::from_rect(self.geometry.rect())
    }
}

impl ItemTrait for EllipseItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn bounding_region(&self) -> Rect {
        self.geometry.rect()
    }

    fn shape(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let rect = self.geometry.rect();
        let center = rect.center();
        let (rx, ry) = (rect.width() / 2.0, rect.height() / 2.0);
        let reach = tolerance + self.properties.stroke_width / 2.0;

        let dx = (point.x - center.x) / (rx + reach);
        let dy = (point.y - center.y) / (ry + reach);
        if dx * dx + dy * dy > 1.0 {
            return false;
        }
        if self.properties.fill_color.is_some() {
            return true;
        }
        let inner_rx = (rx - reach).max(0.0);
        let inner_ry = (ry - reach).max(0.0);
        if inner_rx < f64::EPSILON || inner_ry < f64::EPSILON {
            return true;
        }
        let dx = (point.x - center.x) / inner_rx;
        let dy = (point.y - center.y) / inner_ry;
        dx * dx + dy * dy > 1.0
    }

    fn add_point(&mut self, position: Point) {
        self.geometry.add_point(position);
    }

    fn move_to(&mut self, new_position: Point) {
        self.geometry.move_to(new_position);
    }

    fn translate(&mut self, delta: Vec2) {
        self.geometry.translate(delta);
    }

    fn resize(&mut self, handle: HandleKind, position: Point) {
        resize_rect(&mut self.geometry, handle, position);
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
        self.geometry.is_degenerate()
    }
}
