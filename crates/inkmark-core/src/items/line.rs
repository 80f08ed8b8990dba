//! Straight line annotation.

use super::{ItemId, ItemProperties, ItemTrait};
use crate::geometry::{LineGeometry, point_to_segment_dist};
use crate::selection::HandleKind;
use kurbo::{BezPath, Point, Rect, Vec2};
use uuid::Uuid;

/// A straight line between two endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    id: ItemId,
    geometry: LineGeometry,
    properties: ItemProperties,
    visual_revision: u64,
}

impl LineItem {
    /// Start a line at `start`; both endpoints coincide until the first `add_point`.
    pub fn new(start: Point, properties: ItemProperties) -> Self {
        Self {
            id: Uuid::new_v4(),
            geometry: LineGeometry::new(start),
            properties,
            visual_revision: 0,
        }
    }

    /// Underlying line geometry.
    pub fn geometry(&self) -> &LineGeometry {
        &self.geometry
    }
}

impl ItemTrait for LineItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn bounding_region(&self) -> Rect {
        self.geometry.bounds()
    }

    fn shape(&self) -> BezPath {
        self.geometry.outline()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dist = point_to_segment_dist(point, self.geometry.p1(), self.geometry.p2());
        dist <= tolerance + self.properties.stroke_width / 2.0
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
        match handle {
            HandleKind::Endpoint(0) => self.geometry.set_p1(position),
            HandleKind::Endpoint(1) => self.geometry.set_p2(position),
            _ => {}
        }
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
