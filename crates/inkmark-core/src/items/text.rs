//! Text annotation.

use super::{ItemId, ItemProperties, ItemTrait};
use crate::selection::HandleKind;
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use uuid::Uuid;

/// Average glyph advance relative to the font size.
const CHAR_WIDTH_FACTOR: f64 = 0.55;
/// Line height relative to the font size.
const LINE_HEIGHT_FACTOR: f64 = 1.2;
/// Minimum width so an empty text box can still be clicked.
const MIN_WIDTH: f64 = 20.0;

/// A block of text anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    id: ItemId,
    position: Point,
    content: String,
    font_size: f64,
    properties: ItemProperties,
    visual_revision: u64,
}

impl TextItem {
    /// Default font size in image pixels.
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    /// Create an empty text box at `position`.
    pub fn new(position: Point, properties: ItemProperties) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content: String::new(),
            font_size: Self::DEFAULT_FONT_SIZE,
            properties,
            visual_revision: 0,
        }
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size.max(1.0);
        self
    }

    /// Top-left corner.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Font size in image pixels.
    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    /// Distance between consecutive baselines.
    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_HEIGHT_FACTOR
    }

    /// Replace the text content.
    pub fn set_text(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.visual_revision += 1;
    }

    fn approximate_size(&self) -> (f64, f64) {
        let widest = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let mut lines = self.content.lines().count().max(1);
        if self.content.ends_with('\n') {
            lines += 1;
        }
        (
            (widest as f64 * self.font_size * CHAR_WIDTH_FACTOR).max(MIN_WIDTH),
            lines as f64 * self.line_height(),
        )
    }
}

impl ItemTrait for TextItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn bounding_region(&self) -> Rect {
        let (width, height) = self.approximate_size();
        Rect::from_origin_size(self.position, (width, height))
    }

    fn shape(&self) -> BezPath {
        self.bounding_region().to_path(0.1)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounding_region()
            .inflate(tolerance, tolerance)
            .contains(point)
    }

    /// Text is placed with a single click; cursor movement does not reshape it.
    fn add_point(&mut self, _position: Point) {}

    fn move_to(&mut self, new_position: Point) {
        self.position = new_position;
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
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
        self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_grow_with_content() {
        let mut text = TextItem::new(Point::new(10.0, 10.0), ItemProperties::default());
        assert!(text.is_degenerate());
        let empty = text.bounding_region();
        assert_eq!(empty.width(), MIN_WIDTH);

        text.set_text("Hello world\nsecond");
        let filled = text.bounding_region();
        assert!(filled.width() > empty.width());
        assert!((filled.height() - 2.0 * 20.0 * 1.2).abs() < 1e-9);
        assert!(!text.is_degenerate());
    }

    #[test]
    fn test_move_to_sets_position() {
        let mut text = TextItem::new(Point::new(10.0, 10.0), ItemProperties::default());
        text.move_to(Point::new(3.0, 4.0));
        assert_eq!(text.bounding_region().origin(), Point::new(3.0, 4.0));
    }
}
