//! Rectangle annotation.

use super::{ItemId, ItemProperties, ItemTrait};
use crate::geometry::RectGeometry;
use crate::selection::HandleKind;
use kurbo::{BezPath, Point, Rect, Vec2};
use uuid::Uuid;

/// An axis-aligned rectangle, optionally filled.
#[derive(Debug, Clone, PartialEq)]
pub struct RectangleItem {
    id: ItemId,
    geometry: RectGeometry,
    properties: ItemProperties,
    visual_revision: u64,
}

impl RectangleItem {
    /// Start a rectangle at `start`.
    pub fn new(start: Point, properties: ItemProperties) -> Self {
        Self {
            id: Uuid::new_v4(),
            geometry: RectGeometry::new(start),
            properties,
            visual_revision: 0,
        }
    }

    /// Normalized rectangle.
    pub fn rect(&self) -> Rect {
        self.geometry.rect()
    }
}

/// Hit test shared by rectangle-shaped items: filled items hit anywhere
/// inside, outlined ones only near the border.
pub(super) fn hit_test_rect(rect: Rect, filled: bool, point: Point, reach: f64) -> bool {
    if filled {
        return rect.inflate(reach, reach).contains(point);
    }
    let outer = rect.inflate(reach, reach);
    let inner = rect.inflate(-reach, -reach);
    outer.contains(point) && !inner.contains(point)
}

/// Apply a corner or edge handle to a rectangle geometry.
pub(super) fn resize_rect(geometry: &mut RectGeometry, handle: HandleKind, position: Point) {
    match handle {
        HandleKind::Corner(corner) => geometry.resize_corner(corner, position),
        HandleKind::Edge(edge) => geometry.resize_edge(edge, position),
        HandleKind::Endpoint(_) => {}
    }
}

impl ItemTrait for RectangleItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn bounding_region(&self) -> Rect {
        self.geometry.rect()
    }

    fn shape(&self) -> BezPath {
        self.geometry.outline()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        hit_test_rect(
            self.geometry.rect(),
            self.properties.fill_color.is_some(),
            point,
            tolerance + self.properties.stroke_width / 2.0,
        )
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
