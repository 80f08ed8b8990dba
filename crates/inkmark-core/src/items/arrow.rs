//! Arrow annotation: a line with an open head at its second endpoint.

use super::{ItemId, ItemProperties, ItemTrait};
use crate::geometry::{LineGeometry, point_to_segment_dist};
use crate::selection::HandleKind;
use kurbo::{BezPath, Point, Rect, Vec2};
use uuid::Uuid;

/// Angle between the shaft and each head stroke (35 degrees).
const HEAD_ANGLE: f64 = 0.610_865_238;
/// Smallest head length in image pixels.
const MIN_HEAD_SIZE: f64 = 12.0;

/// An arrow from `p1` to `p2`, the head sits at `p2`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowItem {
    id: ItemId,
    geometry: LineGeometry,
    properties: ItemProperties,
    visual_revision: u64,
}

impl ArrowItem {
    /// Start an arrow at `start`.
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

    /// Length of each head stroke, scaled with the stroke width.
    pub fn head_size(&self) -> f64 {
        (self.properties.stroke_width * 4.0).max(MIN_HEAD_SIZE)
    }

    /// Outer ends of the two head strokes, or None for a zero-length arrow.
    pub fn head_points(&self) -> Option<(Point, Point)> {
        let (start, end) = (self.geometry.p1(), self.geometry.p2());
        let length = self.geometry.length();
        if length < f64::EPSILON {
            return None;
        }
        let back = (start - end) / length;
        let (sin, cos) = HEAD_ANGLE.sin_cos();
        let rotate = |v: Vec2, sin: f64| Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos);
        let size = self.head_size();
        Some((
            end + rotate(back, sin) * size,
            end + rotate(back, -sin) * size,
        ))
    }
}

impl ItemTrait for ArrowItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn bounding_region(&self) -> Rect {
        let bounds = self.geometry.bounds();
        match self.head_points() {
            Some((left, right)) => bounds.union_pt(left).union_pt(right),
            None => bounds,
        }
    }

    fn shape(&self) -> BezPath {
        let mut path = self.geometry.outline();
        if let Some((left, right)) = self.head_points() {
            path.move_to(left);
            path.line_to(self.geometry.p2());
            path.line_to(right);
        }
        path
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let reach = tolerance + self.properties.stroke_width / 2.0;
        let end = self.geometry.p2();
        if point_to_segment_dist(point, self.geometry.p1(), end) <= reach {
            return true;
        }
        match self.head_points() {
            Some((left, right)) => {
                point_to_segment_dist(point, end, left) <= reach
                    || point_to_segment_dist(point, end, right) <= reach
            }
            None => false,
        }
    }

    fn add_point(&mut self, position: Point) {
        self.geometry.add_point(position);
    }

    fn move_to(&mut self, new_position: Point) {
        let delta = new_position - self.bounding_region().origin();
        self.geometry.translate(delta);
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
