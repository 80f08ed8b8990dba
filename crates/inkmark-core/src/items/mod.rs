//! Annotation items drawn on top of the background image.

mod arrow;
mod cutout_marker;
mod ellipse;
mod highlight;
mod line;
mod rectangle;
mod sticker;
mod text;

pub use arrow::ArrowItem;
pub use cutout_marker::CutOutMarker;
pub use ellipse::EllipseItem;
pub use highlight::HighlightItem;
pub use line::LineItem;
pub use rectangle::RectangleItem;
pub use sticker::StickerItem;
pub use text::TextItem;

use crate::selection::HandleKind;
use kurbo::{BezPath, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of an item, preserved across undo/redo.
pub type ItemId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn red() -> Self {
        Self::new(255, 0, 0, 255)
    }

    pub fn yellow() -> Self {
        Self::new(255, 255, 0, 255)
    }

    /// Alpha after multiplying with an opacity in `0.0..=1.0`.
    pub fn alpha_with_opacity(&self, opacity: f64) -> u8 {
        (self.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Visual properties of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemProperties {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width in image pixels.
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    pub opacity: f64,
}

impl Default for ItemProperties {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 3.0,
            fill_color: None,
            opacity: 1.0,
        }
    }
}

impl ItemProperties {
    /// Set the stroke color.
    pub fn with_stroke_color(mut self, color: SerializableColor) -> Self {
        self.stroke_color = color;
        self
    }

    /// Set the stroke width.
    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    /// Set the fill color.
    pub fn with_fill(mut self, color: Option<SerializableColor>) -> Self {
        self.fill_color = color;
        self
    }

    /// Set the opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Stroke color with opacity applied.
    pub fn stroke_with_opacity(&self) -> Color {
        let c = self.stroke_color;
        Color::from_rgba8(c.r, c.g, c.b, c.alpha_with_opacity(self.opacity))
    }

    /// Fill color with opacity applied.
    pub fn fill_with_opacity(&self) -> Option<Color> {
        self.fill_color
            .map(|c| Color::from_rgba8(c.r, c.g, c.b, c.alpha_with_opacity(self.opacity)))
    }
}

/// Capability set shared by every annotation variant.
pub trait ItemTrait {
    /// Get the unique identifier.
    fn id(&self) -> ItemId;

    /// Smallest rectangle enclosing the current geometry.
    fn bounding_region(&self) -> Rect;

    /// Outline path for hit-testing and rendering.
    fn shape(&self) -> BezPath;

    /// Check if a point hits this item.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Feed the live cursor position while the item is being drawn.
    fn add_point(&mut self, position: Point);

    /// Move the item so its bounding region's top-left lands on `new_position`.
    fn move_to(&mut self, new_position: Point);

    /// Move the item by `delta`.
    fn translate(&mut self, delta: Vec2);

    /// Drag a handle to `position`. Handles the item does not have are ignored.
    fn resize(&mut self, handle: HandleKind, position: Point);

    /// Visual properties.
    fn properties(&self) -> &ItemProperties;

    /// Replace the visual properties. Geometry is left alone.
    fn set_properties(&mut self, properties: ItemProperties);

    /// Incremented whenever the item needs a repaint without a geometry change.
    fn visual_revision(&self) -> u64;

    /// True when the geometry has nothing to show (zero length or zero area).
    fn is_degenerate(&self) -> bool;
}

/// Tagged variant over all annotation kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationItem {
    Line(LineItem),
    Arrow(ArrowItem),
    Highlight(HighlightItem),
    Rectangle(RectangleItem),
    Ellipse(EllipseItem),
    Text(TextItem),
    Sticker(StickerItem),
    CutOutMarker(CutOutMarker),
}

macro_rules! dispatch {
    ($self:expr, $item:ident => $body:expr) => {
        match $self {
            AnnotationItem::Line($item) => $body,
            AnnotationItem::Arrow($item) => $body,
            AnnotationItem::Highlight($item) => $body,
            AnnotationItem::Rectangle($item) => $body,
            AnnotationItem::Ellipse($item) => $body,
            AnnotationItem::Text($item) => $body,
            AnnotationItem::Sticker($item) => $body,
            AnnotationItem::CutOutMarker($item) => $body,
        }
    };
}

impl AnnotationItem {
    /// Human-readable kind, used in logs and command labels.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AnnotationItem::Line(_) => "line",
            AnnotationItem::Arrow(_) => "arrow",
            AnnotationItem::Highlight(_) => "highlight",
            AnnotationItem::Rectangle(_) => "rectangle",
            AnnotationItem::Ellipse(_) => "ellipse",
            AnnotationItem::Text(_) => "text",
            AnnotationItem::Sticker(_) => "sticker",
            AnnotationItem::CutOutMarker(_) => "cut-out marker",
        }
    }

    /// Independent deep copy for undo snapshots.
    pub fn clone_for_undo(&self) -> AnnotationItem {
        self.clone()
    }

    /// Check if this item only previews a cut-out.
    pub fn is_cut_out_marker(&self) -> bool {
        matches!(self, AnnotationItem::CutOutMarker(_))
    }
}

impl ItemTrait for AnnotationItem {
    fn id(&self) -> ItemId {
        dispatch!(self, item => item.id())
    }

    fn bounding_region(&self) -> Rect {
        dispatch!(self, item => item.bounding_region())
    }

    fn shape(&self) -> BezPath {
        dispatch!(self, item => item.shape())
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        dispatch!(self, item => item.hit_test(point, tolerance))
    }

    fn add_point(&mut self, position: Point) {
        dispatch!(self, item => item.add_point(position))
    }

    fn move_to(&mut self, new_position: Point) {
        dispatch!(self, item => item.move_to(new_position))
    }

    fn translate(&mut self, delta: Vec2) {
        dispatch!(self, item => item.translate(delta))
    }

    fn resize(&mut self, handle: HandleKind, position: Point) {
        dispatch!(self, item => item.resize(handle, position))
    }

    fn properties(&self) -> &ItemProperties {
        dispatch!(self, item => item.properties())
    }

    fn set_properties(&mut self, properties: ItemProperties) {
        dispatch!(self, item => item.set_properties(properties))
    }

    fn visual_revision(&self) -> u64 {
        dispatch!(self, item => item.visual_revision())
    }

    fn is_degenerate(&self) -> bool {
        dispatch!(self, item => item.is_degenerate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{Corner, Edge};
    use image::{Rgba, RgbaImage};

    fn sample_items() -> Vec<AnnotationItem> {
        let props = ItemProperties::default();
        let start = Point::new(20.0, 30.0);
        let image_rect = Rect::new(0.0, 0.0, 200.0, 200.0);
        vec![
            AnnotationItem::Line(LineItem::new(start, props.clone())),
            AnnotationItem::Arrow(ArrowItem::new(start, props.clone())),
            AnnotationItem::Highlight(HighlightItem::new(start, props.clone(), 0.4)),
            AnnotationItem::Rectangle(RectangleItem::new(start, props.clone())),
            AnnotationItem::Ellipse(EllipseItem::new(start, props.clone())),
            AnnotationItem::Text(TextItem::new(start, props.clone())),
            AnnotationItem::Sticker(StickerItem::new(
                start,
                RgbaImage::from_pixel(8, 4, Rgba([0, 0, 255, 255])),
                props.clone(),
            )),
            AnnotationItem::CutOutMarker(CutOutMarker::new(start, image_rect, props)),
        ]
    }

    fn assert_encloses(item: &AnnotationItem, points: &[Point]) {
        let bounds = item.bounding_region();
        for p in points {
            assert!(
                bounds.x0 <= p.x && p.x <= bounds.x1 && bounds.y0 <= p.y && p.y <= bounds.y1,
                "{} bounds {bounds:?} miss {p:?}",
                item.kind_name()
            );
        }
    }

    #[test]
    fn test_bounding_region_follows_every_mutation() {
        // Cut-out markers always span the image and are excluded here.
        for mut item in sample_items().into_iter().filter(|i| !i.is_cut_out_marker()) {
            item.add_point(Point::new(90.0, 70.0));
            let after_draw = item.bounding_region();

            item.translate(Vec2::new(10.0, -5.0));
            let moved = item.bounding_region();
            assert!((moved.x0 - after_draw.x0 - 10.0).abs() < 1e-9, "{}", item.kind_name());
            assert!((moved.y0 - after_draw.y0 + 5.0).abs() < 1e-9, "{}", item.kind_name());

            item.move_to(Point::new(0.0, 0.0));
            let origin = item.bounding_region().origin();
            assert!(origin.x.abs() < 1e-9 && origin.y.abs() < 1e-9, "{}", item.kind_name());
        }
    }

    #[test]
    fn test_resize_keeps_bounds_current() {
        let mut line = AnnotationItem::Line(LineItem::new(Point::ZERO, ItemProperties::default()));
        line.add_point(Point::new(10.0, 10.0));
        line.resize(HandleKind::Endpoint(0), Point::new(-5.0, 40.0));
        assert_encloses(&line, &[Point::new(-5.0, 40.0), Point::new(10.0, 10.0)]);
        assert_eq!(line.bounding_region(), Rect::new(-5.0, 10.0, 10.0, 40.0));

        let mut rect =
            AnnotationItem::Rectangle(RectangleItem::new(Point::ZERO, ItemProperties::default()));
        rect.add_point(Point::new(10.0, 10.0));
        rect.resize(HandleKind::Corner(Corner::TopLeft), Point::new(-10.0, -20.0));
        assert_eq!(rect.bounding_region(), Rect::new(-10.0, -20.0, 10.0, 10.0));
        rect.resize(HandleKind::Edge(Edge::Bottom), Point::new(0.0, 50.0));
        assert_eq!(rect.bounding_region(), Rect::new(-10.0, -20.0, 10.0, 50.0));
    }

    #[test]
    fn test_properties_do_not_touch_geometry() {
        for mut item in sample_items() {
            item.add_point(Point::new(60.0, 60.0));
            let bounds = item.bounding_region();
            let revision = item.visual_revision();

            let props = item
                .properties()
                .clone()
                .with_stroke_color(SerializableColor::black())
                .with_opacity(0.5);
            item.set_properties(props.clone());

            assert_eq!(item.properties(), &props);
            assert_eq!(item.bounding_region(), bounds);
            assert_eq!(item.visual_revision(), revision + 1);
        }
    }

    #[test]
    fn test_clone_for_undo_is_independent() {
        let mut item = AnnotationItem::Line(LineItem::new(Point::ZERO, ItemProperties::default()));
        item.add_point(Point::new(5.0, 5.0));
        let snapshot = item.clone_for_undo();

        item.translate(Vec2::new(100.0, 0.0));
        assert_ne!(item, snapshot);
        assert_eq!(snapshot.bounding_region(), Rect::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(snapshot.id(), item.id());
    }

    #[test]
    fn test_opacity_applies_to_colors() {
        let props = ItemProperties::default()
            .with_fill(Some(SerializableColor::yellow()))
            .with_opacity(0.5);
        let stroke = SerializableColor::from(props.stroke_with_opacity());
        assert_eq!(stroke.a, 128);
        let fill = props.fill_with_opacity().map(SerializableColor::from);
        assert_eq!(fill, Some(SerializableColor::new(255, 255, 0, 128)));
    }
}
