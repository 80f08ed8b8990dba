//! Selection handles and drag gesture state.

use crate::items::{AnnotationItem, ItemId, ItemTrait};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in image pixels at 100% zoom.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Endpoint handle for lines/arrows (index 0 = p1, 1 = p2).
    Endpoint(usize),
    /// Corner handle for rectangle-like items.
    Corner(Corner),
    /// Edge midpoint handle for rectangle-like items.
    Edge(Edge),
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in image coordinates.
    pub position: Point,
    /// Handle type.
    pub kind: HandleKind,
}

impl Handle {
    /// Create a new handle.
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point hits this handle.
    /// `tolerance` should already be adjusted for the camera zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// Get the selection handles for an item.
pub fn get_handles(item: &AnnotationItem) -> Vec<Handle> {
    match item {
        AnnotationItem::Line(line) => endpoint_handles(line.geometry().p1(), line.geometry().p2()),
        AnnotationItem::Arrow(arrow) => {
            endpoint_handles(arrow.geometry().p1(), arrow.geometry().p2())
        }
        AnnotationItem::Rectangle(_)
        | AnnotationItem::Ellipse(_)
        | AnnotationItem::Highlight(_) => {
            let bounds = item.bounding_region();
            let mut handles = corner_handles(bounds);
            handles.extend(edge_handles(bounds));
            handles
        }
        // Stickers only resize from the corners so the aspect ratio survives.
        AnnotationItem::Sticker(_) => corner_handles(item.bounding_region()),
        AnnotationItem::Text(_) | AnnotationItem::CutOutMarker(_) => Vec::new(),
    }
}

fn endpoint_handles(p1: Point, p2: Point) -> Vec<Handle> {
    vec![
        Handle::new(p1, HandleKind::Endpoint(0)),
        Handle::new(p2, HandleKind::Endpoint(1)),
    ]
}

fn corner_handles(bounds: Rect) -> Vec<Handle> {
    vec![
        Handle::new(
            Point::new(bounds.x0, bounds.y0),
            HandleKind::Corner(Corner::TopLeft),
        ),
        Handle::new(
            Point::new(bounds.x1, bounds.y0),
            HandleKind::Corner(Corner::TopRight),
        ),
        Handle::new(
            Point::new(bounds.x0, bounds.y1),
            HandleKind::Corner(Corner::BottomLeft),
        ),
        Handle::new(
            Point::new(bounds.x1, bounds.y1),
            HandleKind::Corner(Corner::BottomRight),
        ),
    ]
}

fn edge_handles(bounds: Rect) -> Vec<Handle> {
    let center = bounds.center();
    vec![
        Handle::new(Point::new(center.x, bounds.y0), HandleKind::Edge(Edge::Top)),
        Handle::new(Point::new(bounds.x1, center.y), HandleKind::Edge(Edge::Right)),
        Handle::new(Point::new(center.x, bounds.y1), HandleKind::Edge(Edge::Bottom)),
        Handle::new(Point::new(bounds.x0, center.y), HandleKind::Edge(Edge::Left)),
    ]
}

/// Find which handle (if any) is hit at the given point.
pub fn hit_test_handles(item: &AnnotationItem, point: Point, tolerance: f64) -> Option<HandleKind> {
    get_handles(item)
        .into_iter()
        .find(|handle| handle.hit_test(point, tolerance))
        .map(|handle| handle.kind)
}

/// State of an active drag gesture on the selection.
///
/// Holds untouched copies of every affected item so the live items can be
/// rebuilt from scratch on each pointer move, and so the finished gesture can
/// be recorded as one command.
#[derive(Debug, Clone)]
pub struct DragState {
    /// Handle being dragged (None = moving the whole selection).
    pub handle: Option<(ItemId, HandleKind)>,
    /// Starting point of the drag.
    pub start_point: Point,
    /// Current point of the drag.
    pub current_point: Point,
    /// Items as they were at pointer-down.
    pub originals: Vec<AnnotationItem>,
}

impl DragState {
    /// Start moving `originals` as a group.
    pub fn moving(start_point: Point, originals: Vec<AnnotationItem>) -> Self {
        Self {
            handle: None,
            start_point,
            current_point: start_point,
            originals,
        }
    }

    /// Start dragging one handle of `original`.
    pub fn resizing(start_point: Point, handle: HandleKind, original: AnnotationItem) -> Self {
        Self {
            handle: Some((original.id(), handle)),
            start_point,
            current_point: start_point,
            originals: vec![original],
        }
    }

    /// Get the drag delta.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// Build the live state of every dragged item for the current pointer position.
    pub fn apply(&self) -> Vec<AnnotationItem> {
        self.originals
            .iter()
            .map(|original| {
                let mut item = original.clone_for_undo();
                match self.handle {
                    Some((_, handle)) => item.resize(handle, self.current_point),
                    None => item.translate(self.delta()),
                }
                item
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{ItemProperties, LineItem, RectangleItem};

    #[test]
    fn test_line_handles_are_endpoints() {
        let mut line = LineItem::new(Point::new(0.0, 0.0), ItemProperties::default());
        line.add_point(Point::new(100.0, 50.0));
        let item = AnnotationItem::Line(line);

        let handles = get_handles(&item);
        assert_eq!(handles.len(), 2);
        assert_eq!(
            hit_test_handles(&item, Point::new(99.0, 51.0), 4.0),
            Some(HandleKind::Endpoint(1))
        );
        assert_eq!(hit_test_handles(&item, Point::new(50.0, 0.0), 4.0), None);
    }

    #[test]
    fn test_rectangle_handles_corners_and_edges() {
        let mut rect = RectangleItem::new(Point::new(10.0, 10.0), ItemProperties::default());
        rect.add_point(Point::new(30.0, 50.0));
        let item = AnnotationItem::Rectangle(rect);

        assert_eq!(get_handles(&item).len(), 8);
        assert_eq!(
            hit_test_handles(&item, Point::new(10.0, 30.0), 2.0),
            Some(HandleKind::Edge(Edge::Left))
        );
        assert_eq!(
            hit_test_handles(&item, Point::new(30.0, 50.0), 2.0),
            Some(HandleKind::Corner(Corner::BottomRight))
        );
    }

    #[test]
    fn test_drag_state_rebuilds_from_originals() {
        let mut line = LineItem::new(Point::new(0.0, 0.0), ItemProperties::default());
        line.add_point(Point::new(10.0, 0.0));
        let original = AnnotationItem::Line(line);

        let mut drag = DragState::moving(Point::new(5.0, 0.0), vec![original.clone()]);
        drag.current_point = Point::new(8.0, 4.0);
        drag.current_point = Point::new(7.0, 2.0);
        let moved = drag.apply();

        assert_eq!(drag.delta(), Vec2::new(2.0, 2.0));
        assert_eq!(moved[0].bounding_region(), kurbo::Rect::new(2.0, 2.0, 12.0, 2.0));
        assert_eq!(drag.originals[0], original);
    }
}
