//! Tool selection and item construction.

use crate::error::{AnnotateError, AnnotateResult};
use crate::items::{
    AnnotationItem, ArrowItem, CutOutMarker, EllipseItem, HighlightItem, ItemProperties, LineItem,
    RectangleItem, StickerItem, TextItem,
};
use image::RgbaImage;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Line,
    Arrow,
    Highlight,
    Rectangle,
    Ellipse,
    Text,
    Sticker,
    CutOut,
}

impl ToolKind {
    /// Check if the tool creates an item on pointer-down.
    pub fn is_drawing_tool(&self) -> bool {
        !matches!(self, ToolKind::Select)
    }
}

/// Manages the current tool and the settings applied to new items.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Properties given to new items.
    pub current_properties: ItemProperties,
    /// Upper bound on highlight opacity.
    pub highlight_opacity: f64,
    /// Stickers supplied by the host application.
    default_stickers: Vec<Arc<RgbaImage>>,
    /// Stickers loaded from user settings.
    custom_stickers: Vec<Arc<RgbaImage>>,
    keep_default_stickers: bool,
    /// Defaults (when kept) followed by the custom stickers.
    stickers: Vec<Arc<RgbaImage>>,
    selected_sticker: Option<usize>,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            current_properties: ItemProperties::default(),
            highlight_opacity: 0.4,
            default_stickers: Vec::new(),
            custom_stickers: Vec::new(),
            keep_default_stickers: true,
            stickers: Vec::new(),
            selected_sticker: None,
        }
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        log::debug!("Tool changed: {:?} -> {:?}", self.current_tool, tool);
        self.current_tool = tool;
    }

    /// Replace the built-in sticker set offered alongside the custom ones.
    pub fn set_default_stickers(&mut self, stickers: Vec<Arc<RgbaImage>>) {
        self.default_stickers = stickers;
        self.rebuild_stickers();
    }

    /// Replace the custom stickers. With `keep_default` false the built-in
    /// set is hidden.
    pub fn set_stickers(&mut self, stickers: Vec<Arc<RgbaImage>>, keep_default: bool) {
        self.custom_stickers = stickers;
        self.keep_default_stickers = keep_default;
        self.rebuild_stickers();
    }

    fn rebuild_stickers(&mut self) {
        let defaults = if self.keep_default_stickers {
            self.default_stickers.as_slice()
        } else {
            &[]
        };
        self.stickers = defaults
            .iter()
            .chain(&self.custom_stickers)
            .cloned()
            .collect();
        self.selected_sticker = match self.selected_sticker {
            _ if self.stickers.is_empty() => None,
            Some(index) => Some(index.min(self.stickers.len() - 1)),
            None => Some(0),
        };
        log::debug!("{} stickers available", self.stickers.len());
    }

    /// Stickers the sticker tool can place, in display order.
    pub fn stickers(&self) -> &[Arc<RgbaImage>] {
        &self.stickers
    }

    /// Choose the sticker placed by the sticker tool.
    pub fn select_sticker(&mut self, index: usize) -> AnnotateResult<()> {
        if index >= self.stickers.len() {
            return Err(AnnotateError::StickerOutOfRange {
                index,
                count: self.stickers.len(),
            });
        }
        self.selected_sticker = Some(index);
        Ok(())
    }

    /// Index of the sticker placed by the sticker tool.
    pub fn selected_sticker(&self) -> Option<usize> {
        self.selected_sticker
    }

    /// Bitmap placed by the sticker tool.
    pub fn current_sticker(&self) -> Option<&Arc<RgbaImage>> {
        self.selected_sticker.and_then(|index| self.stickers.get(index))
    }

    /// Construct the item for the current tool in its "being drawn" state.
    ///
    /// `image_rect` bounds the cut-out preview band.
    pub fn create_item(
        &self,
        start: Point,
        properties: ItemProperties,
        image_rect: Rect,
    ) -> AnnotateResult<AnnotationItem> {
        let item = match self.current_tool {
            ToolKind::Select => return Err(AnnotateError::NotADrawingTool(ToolKind::Select)),
            ToolKind::Line => AnnotationItem::Line(LineItem::new(start, properties)),
            ToolKind::Arrow => AnnotationItem::Arrow(ArrowItem::new(start, properties)),
            ToolKind::Highlight => AnnotationItem::Highlight(HighlightItem::new(
                start,
                properties,
                self.highlight_opacity,
            )),
            ToolKind::Rectangle => AnnotationItem::Rectangle(RectangleItem::new(start, properties)),
            ToolKind::Ellipse => AnnotationItem::Ellipse(EllipseItem::new(start, properties)),
            ToolKind::Text => AnnotationItem::Text(
                TextItem::new(start, properties.clone())
                    .with_font_size(TextItem::DEFAULT_FONT_SIZE.max(properties.stroke_width * 5.0)),
            ),
            ToolKind::Sticker => {
                let image = self.current_sticker().cloned().ok_or(AnnotateError::NoSticker)?;
                AnnotationItem::Sticker(StickerItem::from_shared(start, image, properties))
            }
            ToolKind::CutOut => {
                AnnotationItem::CutOutMarker(CutOutMarker::new(start, image_rect, properties))
            }
        };
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemTrait;
    use image::Rgba;

    const IMAGE: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

    fn sticker(size: u32, shade: u8) -> Arc<RgbaImage> {
        Arc::new(RgbaImage::from_pixel(size, size, Rgba([shade, 0, 0, 255])))
    }

    #[test]
    fn test_select_tool_does_not_draw() {
        let tools = ToolManager::new();
        let result = tools.create_item(Point::ZERO, ItemProperties::default(), IMAGE);
        assert!(matches!(result, Err(AnnotateError::NotADrawingTool(ToolKind::Select))));
    }

    #[test]
    fn test_create_item_per_tool() {
        let mut tools = ToolManager::new();
        tools.set_stickers(vec![sticker(4, 0)], true);
        let cases = [
            (ToolKind::Line, "line"),
            (ToolKind::Arrow, "arrow"),
            (ToolKind::Highlight, "highlight"),
            (ToolKind::Rectangle, "rectangle"),
            (ToolKind::Ellipse, "ellipse"),
            (ToolKind::Text, "text"),
            (ToolKind::Sticker, "sticker"),
            (ToolKind::CutOut, "cut-out marker"),
        ];
        for (tool, name) in cases {
            tools.set_tool(tool);
            let props = ItemProperties::default().with_stroke_width(2.0);
            let item = tools
                .create_item(Point::new(10.0, 10.0), props.clone(), IMAGE)
                .expect("drawing tool");
            assert_eq!(item.kind_name(), name);
            assert_eq!(item.properties(), &props);
        }
    }

    #[test]
    fn test_sticker_tool_needs_image() {
        let mut tools = ToolManager::new();
        tools.set_tool(ToolKind::Sticker);
        let result = tools.create_item(Point::ZERO, ItemProperties::default(), IMAGE);
        assert!(matches!(result, Err(AnnotateError::NoSticker)));
    }

    #[test]
    fn test_sticker_list_keeps_or_hides_defaults() {
        let mut tools = ToolManager::new();
        tools.set_default_stickers(vec![sticker(2, 1), sticker(2, 2)]);
        assert_eq!(tools.stickers().len(), 2);
        assert_eq!(tools.selected_sticker(), Some(0));

        tools.set_stickers(vec![sticker(3, 3)], true);
        assert_eq!(tools.stickers().len(), 3);
        tools.select_sticker(2).unwrap();
        assert_eq!(tools.current_sticker().map(|s| s.width()), Some(3));

        tools.set_stickers(vec![sticker(3, 3)], false);
        assert_eq!(tools.stickers().len(), 1);
        assert_eq!(tools.selected_sticker(), Some(0));
        assert!(matches!(
            tools.select_sticker(1),
            Err(AnnotateError::StickerOutOfRange { index: 1, count: 1 })
        ));

        tools.set_stickers(Vec::new(), false);
        assert!(tools.current_sticker().is_none());
    }

    #[test]
    fn test_sticker_tool_places_selected_sticker() {
        let mut tools = ToolManager::new();
        tools.set_stickers(vec![sticker(2, 10), sticker(6, 20)], true);
        tools.select_sticker(1).unwrap();
        tools.set_tool(ToolKind::Sticker);

        let item = tools
            .create_item(Point::new(50.0, 50.0), ItemProperties::default(), IMAGE)
            .unwrap();
        match item {
            AnnotationItem::Sticker(sticker) => {
                assert_eq!(sticker.image().get_pixel(0, 0), &Rgba([20, 0, 0, 255]));
                assert_eq!(sticker.rect(), Rect::new(47.0, 47.0, 53.0, 53.0));
            }
            other => panic!("expected a sticker, got {}", other.kind_name()),
        }
    }
}
