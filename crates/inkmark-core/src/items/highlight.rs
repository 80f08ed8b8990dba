//! Translucent marker-style highlight over a rectangular area.

use super::rectangle::{hit_test_rect, resize_rect};
use super::{ItemId, ItemProperties, ItemTrait};
use crate::geometry::RectGeometry;
use crate::selection::HandleKind;
use kurbo::{BezPath, Point, Rect, Vec2};
use peniko::Color;
use uuid::Uuid;

/// A filled rectangle painted in the stroke color with capped opacity.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightItem {
    id: ItemId,
    geometry: RectGeometry,
    properties: ItemProperties,
    opacity_cap: f64,
    visual_revision: u64,
}

impl HighlightItem {
    /// Start a highlight at `start`. `opacity_cap` bounds the painted opacity.
    pub fn new(start: Point, properties: ItemProperties, opacity_cap: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            geometry: RectGeometry::new(start),
            properties,
            opacity_cap: opacity_cap.clamp(0.0, 1.0),
            visual_revision: 0,
        }
    }

    /// Opacity used when painting.
    pub fn effective_opacity(&self) -> f64 {
        self.properties.opacity.min(self.opacity_cap)
    }

    /// Paint color: the stroke color at the effective opacity.
    pub fn paint_color(&self) -> Color {
        let c = self.properties.stroke_color;
        Color::from_rgba8(c.r, c.g, c.b, c.alpha_with_opacity(self.effective_opacity()))
    }

    /// Highlighted area.
    pub fn rect(&self) -> Rect {
        self.geometry.rect()
    }
}

impl ItemTrait for HighlightItem {
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
        hit_test_rect(self.geometry.rect(), true, point, tolerance)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::SerializableColor;

    #[test]
    fn test_opacity_is_capped() {
        let props = ItemProperties::default().with_stroke_color(SerializableColor::yellow());
        let highlight = HighlightItem::new(Point::ZERO, props, 0.4);
        assert!((highlight.effective_opacity() - 0.4).abs() < 1e-12);
        assert_eq!(SerializableColor::from(highlight.paint_color()).a, 102);

        let faint = ItemProperties::default().with_opacity(0.2);
        let highlight = HighlightItem::new(Point::ZERO, faint, 0.4);
        assert!((highlight.effective_opacity() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_hits_inside() {
        let mut highlight = HighlightItem::new(Point::ZERO, ItemProperties::default(), 0.4);
        highlight.add_point(Point::new(50.0, 20.0));
        assert!(highlight.hit_test(Point::new(25.0, 10.0), 0.0));
    }
}
