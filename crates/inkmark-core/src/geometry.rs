//! Geometry primitives backing the annotation items.
//!
//! Both primitives keep a cached bounding rectangle and outline path. Every
//! mutation drops the cache before touching coordinates and rebuilds it right
//! after, so a reader never sees old bounds paired with new coordinates.

use crate::selection::{Corner, Edge};
use kurbo::{BezPath, Line, Point, Rect, Shape as KurboShape, Vec2};

/// Cached derived shape of a primitive.
#[derive(Debug, Clone, PartialEq)]
struct GeometryCache {
    bounds: Rect,
    outline: BezPath,
}

/// A two-endpoint line used by line-based annotations.
///
/// `p1` is fixed at creation and only changes on an explicit move or
/// endpoint edit. `p2` follows the cursor while the line is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct LineGeometry {
    line: Line,
    cache: Option<GeometryCache>,
    revision: u64,
}

impl LineGeometry {
    /// Start a new line with both endpoints at `start`.
    pub fn new(start: Point) -> Self {
        Self::from_line(Line::new(start, start))
    }

    /// Create a line from existing endpoints.
    pub fn from_line(line: Line) -> Self {
        let mut geometry = Self {
            line,
            cache: None,
            revision: 0,
        };
        geometry.update_shape();
        geometry
    }

    /// Current line.
    pub fn line(&self) -> Line {
        self.line
    }

    /// First endpoint.
    pub fn p1(&self) -> Point {
        self.line.p0
    }

    /// Second endpoint.
    pub fn p2(&self) -> Point {
        self.line.p1
    }

    /// Number of times the derived shape was rebuilt.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Length of the line.
    pub fn length(&self) -> f64 {
        (self.line.p1 - self.line.p0).hypot()
    }

    /// A line whose endpoints coincide.
    pub fn is_degenerate(&self) -> bool {
        self.length() < f64::EPSILON
    }

    /// Extend the line while drawing: moves the second endpoint.
    pub fn add_point(&mut self, position: Point) {
        self.prepare_geometry_change();
        self.line.p1 = position;
        self.update_shape();
    }

    /// Move the whole line so its bounding box top-left lands on `new_position`.
    pub fn move_to(&mut self, new_position: Point) {
        let delta = new_position - self.bounds().origin();
        self.translate(delta);
    }

    /// Translate both endpoints by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.prepare_geometry_change();
        self.line = Line::new(self.line.p0 + delta, self.line.p1 + delta);
        self.update_shape();
    }

    /// Replace both endpoints.
    pub fn set_line(&mut self, line: Line) {
        self.prepare_geometry_change();
        self.line.p0 = line.p0;
        self.line.p1 = line.p1;
        self.update_shape();
    }

    /// Replace the first endpoint.
    pub fn set_p1(&mut self, point: Point) {
        self.prepare_geometry_change();
        self.line.p0 = point;
        self.update_shape();
    }

    /// Replace the second endpoint.
    pub fn set_p2(&mut self, point: Point) {
        self.prepare_geometry_change();
        self.line.p1 = point;
        self.update_shape();
    }

    /// Smallest rectangle enclosing both endpoints.
    pub fn bounds(&self) -> Rect {
        match &self.cache {
            Some(cache) => cache.bounds,
            None => Rect::from_points(self.line.p0, self.line.p1),
        }
    }

    /// Outline path used for hit-testing and rendering.
    pub fn outline(&self) -> BezPath {
        match &self.cache {
            Some(cache) => cache.outline.clone(),
            None => line_path(self.line),
        }
    }

    fn prepare_geometry_change(&mut self) {
        self.cache = None;
    }

    fn update_shape(&mut self) {
        self.cache = Some(GeometryCache {
            bounds: Rect::from_points(self.line.p0, self.line.p1),
            outline: line_path(self.line),
        });
        self.revision += 1;
    }
}

fn line_path(line: Line) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(line.p0);
    path.line_to(line.p1);
    path
}

/// A rectangle spanned by a fixed anchor and a moving corner.
///
/// Used by rectangle, ellipse and highlight annotations. The anchor is the
/// pointer-down position, the corner follows the cursor while drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct RectGeometry {
    anchor: Point,
    corner: Point,
    cache: Option<GeometryCache>,
    revision: u64,
}

impl RectGeometry {
    /// Start an empty rectangle at `start`.
    pub fn new(start: Point) -> Self {
        Self::from_corners(start, start)
    }

    /// Create a rectangle from two opposite corners.
    pub fn from_corners(anchor: Point, corner: Point) -> Self {
        let mut geometry = Self {
            anchor,
            corner,
            cache: None,
            revision: 0,
        };
        geometry.update_shape();
        geometry
    }

    /// Create a rectangle from a normalized rect.
    pub fn from_rect(rect: Rect) -> Self {
        Self::from_corners(Point::new(rect.x0, rect.y0), Point::new(rect.x1, rect.y1))
    }

    /// Normalized rectangle.
    pub fn rect(&self) -> Rect {
        match &self.cache {
            Some(cache) => cache.bounds,
            None => Rect::from_points(self.anchor, self.corner),
        }
    }

    /// Number of times the derived shape was rebuilt.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// A rectangle without area.
    pub fn is_degenerate(&self) -> bool {
        Rect::from_points(self.anchor, self.corner).area() < f64::EPSILON
    }

    /// Extend the rectangle while drawing: moves the free corner.
    pub fn add_point(&mut self, position: Point) {
        self.prepare_geometry_change();
        self.corner = position;
        self.update_shape();
    }

    /// Move the rectangle so its top-left lands on `new_position`.
    pub fn move_to(&mut self, new_position: Point) {
        let delta = new_position - self.rect().origin();
        self.translate(delta);
    }

    /// Translate by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.prepare_geometry_change();
        self.anchor += delta;
        self.corner += delta;
        self.update_shape();
    }

    /// Replace the rectangle.
    pub fn set_rect(&mut self, rect: Rect) {
        self.prepare_geometry_change();
        self.anchor = Point::new(rect.x0, rect.y0);
        self.corner = Point::new(rect.x1, rect.y1);
        self.update_shape();
    }

    /// Drag one corner to `position`, keeping the opposite corner fixed.
    pub fn resize_corner(&mut self, corner: Corner, position: Point) {
        let rect = self.rect();
        let opposite = match corner {
            Corner::TopLeft => Point::new(rect.x1, rect.y1),
            Corner::TopRight => Point::new(rect.x0, rect.y1),
            Corner::BottomLeft => Point::new(rect.x1, rect.y0),
            Corner::BottomRight => Point::new(rect.x0, rect.y0),
        };
        self.prepare_geometry_change();
        self.anchor = opposite;
        self.corner = position;
        self.update_shape();
    }

    /// Drag one edge to `position`; only the coordinate across the edge changes.
    pub fn resize_edge(&mut self, edge: Edge, position: Point) {
        let mut rect = self.rect();
        match edge {
            Edge::Top => rect.y0 = position.y,
            Edge::Bottom => rect.y1 = position.y,
            Edge::Left => rect.x0 = position.x,
            Edge::Right => rect.x1 = position.x,
        }
        self.set_rect(rect);
    }

    /// Outline path of the rectangle.
    pub fn outline(&self) -> BezPath {
        match &self.cache {
            Some(cache) => cache.outline.clone(),
            None => Rect::from_points(self.anchor, self.corner).to_path(0.1),
        }
    }

    fn prepare_geometry_change(&mut self) {
        self.cache = None;
    }

    fn update_shape(&mut self) {
        let bounds = Rect::from_points(self.anchor, self.corner);
        self.cache = Some(GeometryCache {
            bounds,
            outline: bounds.to_path(0.1),
        });
        self.revision += 1;
    }
}

/// Distance from a point to the segment `a`→`b`.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_encloses(bounds: Rect, points: &[Point]) {
        for p in points {
            assert!(bounds.x0 <= p.x && p.x <= bounds.x1, "{p:?} outside {bounds:?}");
            assert!(bounds.y0 <= p.y && p.y <= bounds.y1, "{p:?} outside {bounds:?}");
        }
    }

    #[test]
    fn test_add_point_extends_second_endpoint() {
        let mut geometry = LineGeometry::new(Point::new(10.0, 10.0));
        assert!(geometry.is_degenerate());

        geometry.add_point(Point::new(50.0, 10.0));
        assert_eq!(geometry.p1(), Point::new(10.0, 10.0));
        assert_eq!(geometry.p2(), Point::new(50.0, 10.0));
        assert_eq!(geometry.bounds(), Rect::new(10.0, 10.0, 50.0, 10.0));
    }

    #[test]
    fn test_move_to_translates_by_top_left_delta() {
        let mut geometry = LineGeometry::new(Point::new(10.0, 10.0));
        geometry.add_point(Point::new(50.0, 10.0));

        let target = geometry.bounds().origin() + Vec2::new(5.0, 5.0);
        geometry.move_to(target);

        assert_eq!(geometry.p1(), Point::new(15.0, 15.0));
        assert_eq!(geometry.p2(), Point::new(55.0, 15.0));
    }

    #[test]
    fn test_move_to_with_reversed_endpoints() {
        let mut geometry = LineGeometry::from_line(Line::new(
            Point::new(40.0, 30.0),
            Point::new(0.0, 10.0),
        ));
        geometry.move_to(Point::new(100.0, 100.0));
        assert_eq!(geometry.p1(), Point::new(140.0, 120.0));
        assert_eq!(geometry.p2(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_bounds_never_stale() {
        let mut geometry = LineGeometry::new(Point::new(0.0, 0.0));
        let edits: [fn(&mut LineGeometry); 4] = [
            |g| g.add_point(Point::new(-20.0, 35.0)),
            |g| g.set_p1(Point::new(80.0, -5.0)),
            |g| g.set_p2(Point::new(3.0, 3.0)),
            |g| g.set_line(Line::new(Point::new(7.0, 9.0), Point::new(-1.0, 2.0))),
        ];
        for edit in edits {
            let before = geometry.revision();
            edit(&mut geometry);
            assert_eq!(geometry.revision(), before + 1);
            assert_encloses(geometry.bounds(), &[geometry.p1(), geometry.p2()]);
            assert_eq!(
                geometry.bounds(),
                Rect::from_points(geometry.p1(), geometry.p2())
            );
        }
    }

    #[test]
    fn test_rect_geometry_drawing_and_resize() {
        let mut geometry = RectGeometry::new(Point::new(50.0, 50.0));
        assert!(geometry.is_degenerate());

        geometry.add_point(Point::new(10.0, 20.0));
        assert_eq!(geometry.rect(), Rect::new(10.0, 20.0, 50.0, 50.0));

        geometry.resize_corner(Corner::BottomRight, Point::new(80.0, 90.0));
        assert_eq!(geometry.rect(), Rect::new(10.0, 20.0, 80.0, 90.0));

        geometry.resize_edge(Edge::Left, Point::new(0.0, 500.0));
        assert_eq!(geometry.rect(), Rect::new(0.0, 20.0, 80.0, 90.0));

        geometry.move_to(Point::new(100.0, 100.0));
        assert_eq!(geometry.rect(), Rect::new(100.0, 100.0, 180.0, 170.0));
    }

    #[test]
    fn test_point_to_segment_dist() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-12);
        assert!((point_to_segment_dist(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-12);
        assert!((point_to_segment_dist(Point::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-12);
    }
}
