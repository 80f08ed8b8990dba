//! CPU compositor built on tiny-skia.

use crate::renderer::{RenderError, RenderResult, image_from_pixmap, pixmap_from_image};
use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use image::RgbaImage;
use inkmark_core::items::{
    ArrowItem, EllipseItem, HighlightItem, LineItem, RectangleItem, StickerItem, TextItem,
};
use inkmark_core::{
    AnnotateError, AnnotateResult, AnnotationItem, Compositor, ItemProperties, ItemTrait, Scene,
    SerializableColor,
};
use kurbo::Point;
use std::fmt;
use std::path::Path as FsPath;
use tiny_skia::{
    FillRule, FilterQuality, LineCap, LineJoin, Mask, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Stroke, Transform,
};

/// Fonts tried in order when no font is supplied.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Flattens a scene onto its background using tiny-skia.
///
/// Text items are drawn with `font`. Without one, only their fill box is
/// painted.
#[derive(Clone, Default)]
pub struct SkiaCompositor {
    /// Disable anti-aliasing for pixel-exact output.
    pub aliased: bool,
    font: Option<FontArc>,
}

impl fmt::Debug for SkiaCompositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkiaCompositor")
            .field("aliased", &self.aliased)
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl SkiaCompositor {
    /// Anti-aliased compositor using the first system font found.
    pub fn new() -> Self {
        Self {
            aliased: false,
            font: system_font(),
        }
    }

    /// Compositor that draws text with the font file at `path`.
    pub fn from_font_file(path: impl AsRef<FsPath>) -> RenderResult<Self> {
        Ok(Self::default().with_font(load_font(path.as_ref())?))
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_aliasing(mut self, aliased: bool) -> Self {
        self.aliased = aliased;
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Render every item in z-order onto a copy of the background.
    pub fn render(&self, background: &RgbaImage, scene: &Scene) -> RenderResult<RgbaImage> {
        let mut pixmap = pixmap_from_image(background)?;
        for item in scene.items_ordered() {
            self.draw_item(&mut pixmap, item)?;
        }
        log::trace!(
            "Composited {} items onto {}x{}",
            scene.len(),
            background.width(),
            background.height()
        );
        image_from_pixmap(&pixmap)
    }

    fn draw_item(&self, pixmap: &mut Pixmap, item: &AnnotationItem) -> RenderResult<()> {
        match item {
            AnnotationItem::Line(line) => self.draw_line(pixmap, line),
            AnnotationItem::Arrow(arrow) => self.draw_arrow(pixmap, arrow),
            AnnotationItem::Highlight(highlight) => self.draw_highlight(pixmap, highlight),
            AnnotationItem::Rectangle(rect) => self.draw_rectangle(pixmap, rect),
            AnnotationItem::Ellipse(ellipse) => self.draw_ellipse(pixmap, ellipse),
            AnnotationItem::Text(text) => self.draw_text(pixmap, text),
            AnnotationItem::Sticker(sticker) => return draw_sticker(pixmap, sticker),
            AnnotationItem::CutOutMarker(_) => {}
        }
        Ok(())
    }

    fn paint(&self, color: SerializableColor) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = !self.aliased;
        paint
    }

    fn stroke_path(&self, pixmap: &mut Pixmap, path: &Path, properties: &ItemProperties) {
        let paint = self.paint(properties.stroke_with_opacity().into());
        let stroke = Stroke {
            width: properties.stroke_width as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        pixmap.stroke_path(path, &paint, &stroke, Transform::identity(), None);
    }

    fn fill_path(&self, pixmap: &mut Pixmap, path: &Path, properties: &ItemProperties) {
        if let Some(fill) = properties.fill_with_opacity() {
            let paint = self.paint(fill.into());
            pixmap.fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    fn draw_line(&self, pixmap: &mut Pixmap, line: &LineItem) {
        let geometry = line.geometry();
        if let Some(path) = segments(&[(geometry.p1(), geometry.p2())]) {
            self.stroke_path(pixmap, &path, line.properties());
        }
    }

    fn draw_arrow(&self, pixmap: &mut Pixmap, arrow: &ArrowItem) {
        let geometry = arrow.geometry();
        let (start, end) = (geometry.p1(), geometry.p2());
        let mut parts = vec![(start, end)];
        if let Some((left, right)) = arrow.head_points() {
            parts.push((end, left));
            parts.push((end, right));
        }
        if let Some(path) = segments(&parts) {
            self.stroke_path(pixmap, &path, arrow.properties());
        }
    }

    fn draw_rectangle(&self, pixmap: &mut Pixmap, item: &RectangleItem) {
        let Some(rect) = skia_rect(item.rect()) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        self.fill_path(pixmap, &path, item.properties());
        self.stroke_path(pixmap, &path, item.properties());
    }

    fn draw_ellipse(&self, pixmap: &mut Pixmap, item: &EllipseItem) {
        let Some(path) = skia_rect(item.bounding_region()).and_then(PathBuilder::from_oval) else {
            return;
        };
        self.fill_path(pixmap, &path, item.properties());
        self.stroke_path(pixmap, &path, item.properties());
    }

    fn draw_highlight(&self, pixmap: &mut Pixmap, item: &HighlightItem) {
        if let Some(rect) = skia_rect(item.rect()) {
            let paint = self.paint(item.paint_color().into());
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
    }

    fn draw_text(&self, pixmap: &mut Pixmap, item: &TextItem) {
        if let (Some(fill), Some(rect)) = (
            item.properties().fill_with_opacity(),
            skia_rect(item.bounding_region()),
        ) {
            pixmap.fill_rect(rect, &self.paint(fill.into()), Transform::identity(), None);
        }
        let Some(font) = &self.font else {
            return;
        };
        let Some(mask) = self.glyph_mask(font, item, pixmap.width(), pixmap.height()) else {
            return;
        };
        let (width, height) = (pixmap.width() as f32, pixmap.height() as f32);
        if let Some(area) = tiny_skia::Rect::from_xywh(0.0, 0.0, width, height) {
            let paint = self.paint(item.properties().stroke_with_opacity().into());
            pixmap.fill_rect(area, &paint, Transform::identity(), Some(&mask));
        }
    }

    /// Coverage of every glyph in `item`, or `None` when nothing lands on the
    /// canvas.
    fn glyph_mask(
        &self,
        font: &FontArc,
        item: &TextItem,
        width: u32,
        height: u32,
    ) -> Option<Mask> {
        let mut mask = Mask::new(width, height)?;
        let scale = PxScale::from(item.font_size() as f32);
        let scaled = font.as_scaled(scale);
        let origin = item.position();
        let line_height = item.line_height() as f32;
        let aliased = self.aliased;
        let mut covered = false;

        let data = mask.data_mut();
        for (row, line) in item.content().lines().enumerate() {
            let baseline = origin.y as f32 + scaled.ascent() + row as f32 * line_height;
            let mut pen_x = origin.x as f32;
            let mut previous = None;
            for ch in line.chars() {
                let id = scaled.glyph_id(ch);
                if let Some(previous) = previous {
                    pen_x += scaled.kern(previous, id);
                }
                previous = Some(id);
                let glyph = id.with_scale_and_position(scale, point(pen_x, baseline));
                pen_x += scaled.h_advance(id);

                let Some(outline) = font.outline_glyph(glyph) else {
                    continue;
                };
                let bounds = outline.px_bounds();
                outline.draw(|x, y, coverage| {
                    let px = bounds.min.x as i64 + x as i64;
                    let py = bounds.min.y as i64 + y as i64;
                    if px < 0 || py < 0 || px >= width as i64 || py >= height as i64 {
                        return;
                    }
                    let value = if aliased {
                        if coverage >= 0.5 { 255 } else { 0 }
                    } else {
                        (coverage.clamp(0.0, 1.0) * 255.0).round() as u8
                    };
                    let index = py as usize * width as usize + px as usize;
                    if value > data[index] {
                        data[index] = value;
                        covered = true;
                    }
                });
            }
        }
        covered.then_some(mask)
    }
}

impl Compositor for SkiaCompositor {
    fn composite(&self, scene: &Scene) -> AnnotateResult<RgbaImage> {
        let background = scene.background().ok_or(AnnotateError::NoImage)?;
        Ok(self.render(background, scene)?)
    }
}

/// First font from the usual system locations that parses.
fn system_font() -> Option<FontArc> {
    SYSTEM_FONTS.iter().find_map(|path| match load_font(FsPath::new(path)) {
        Ok(font) => {
            log::debug!("Using font {}", path);
            Some(font)
        }
        Err(_) => None,
    })
}

fn load_font(path: &FsPath) -> RenderResult<FontArc> {
    let data = std::fs::read(path).map_err(|source| RenderError::FontRead {
        path: path.to_path_buf(),
        source,
    })?;
    FontArc::try_from_vec(data).map_err(|_| RenderError::InvalidFont {
        path: path.to_path_buf(),
    })
}

fn draw_sticker(pixmap: &mut Pixmap, item: &StickerItem) -> RenderResult<()> {
    let image = item.image();
    let rect = item.rect();
    if image.width() == 0 || image.height() == 0 || rect.area() <= 0.0 {
        return Ok(());
    }
    let sticker = pixmap_from_image(image)?;
    let sx = rect.width() / image.width() as f64;
    let sy = rect.height() / image.height() as f64;
    let transform =
        Transform::from_row(sx as f32, 0.0, 0.0, sy as f32, rect.x0 as f32, rect.y0 as f32);
    let paint = PixmapPaint {
        opacity: item.properties().opacity as f32,
        quality: FilterQuality::Bilinear,
        ..Default::default()
    };
    pixmap.draw_pixmap(0, 0, sticker.as_ref(), &paint, transform, None);
    Ok(())
}

/// Open path made of independent segments.
fn segments(parts: &[(Point, Point)]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for (from, to) in parts {
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
    }
    pb.finish()
}

fn skia_rect(rect: kurbo::Rect) -> Option<tiny_skia::Rect> {
    let rect = rect.abs();
    tiny_skia::Rect::from_ltrb(rect.x0 as f32, rect.y0 as f32, rect.x1 as f32, rect.y1 as f32)
}
