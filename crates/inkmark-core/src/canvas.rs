//! Annotation canvas: one image, its items, history and interaction state.

use crate::camera::Camera;
use crate::commands::{Command, CutOutCommand, PixelRect};
use crate::compose::Compositor;
use crate::config::AnnotatorConfig;
use crate::error::{AnnotateError, AnnotateResult};
use crate::items::{AnnotationItem, ItemId, ItemProperties, ItemTrait, StickerItem};
use crate::scene::Scene;
use crate::selection::{DragState, HANDLE_HIT_TOLERANCE, hit_test_handles};
use crate::tools::{ToolKind, ToolManager};
use crate::undo::UndoStack;
use image::RgbaImage;
use kurbo::{Point, Rect, Vec2};
use std::fmt;
use std::sync::Arc;

/// Notifications sent to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// The composited image changed (items or background).
    ImageChanged,
    /// The selection changed; carries the new selection.
    SelectionChanged(Vec<ItemId>),
}

type Listener = Box<dyn FnMut(&CanvasEvent)>;

/// Pointer gesture in progress.
#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    /// A new item is being drawn; it is not part of the scene yet.
    Drawing(AnnotationItem),
    /// Selected items are being moved or one of them resized.
    Dragging(DragState),
}

/// A single annotated image.
pub struct AnnotationCanvas {
    scene: Scene,
    undo_stack: UndoStack,
    /// Tool manager.
    pub tools: ToolManager,
    /// Camera for view transform.
    pub camera: Camera,
    selection: Vec<ItemId>,
    gesture: Gesture,
    hit_tolerance: f64,
    listeners: Vec<Listener>,
}

impl fmt::Debug for AnnotationCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationCanvas")
            .field("scene", &self.scene)
            .field("undo_stack", &self.undo_stack)
            .field("tools", &self.tools)
            .field("camera", &self.camera)
            .field("selection", &self.selection)
            .field("gesture", &self.gesture)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for AnnotationCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationCanvas {
    /// Create an empty canvas with default settings.
    pub fn new() -> Self {
        Self::with_config(&AnnotatorConfig::default())
    }

    /// Create an empty canvas configured by `config`.
    pub fn with_config(config: &AnnotatorConfig) -> Self {
        let mut canvas = Self {
            scene: Scene::new(),
            undo_stack: UndoStack::default(),
            tools: ToolManager::new(),
            camera: Camera::new(),
            selection: Vec::new(),
            gesture: Gesture::Idle,
            hit_tolerance: config.hit_tolerance,
            listeners: Vec::new(),
        };
        canvas.apply_config(config);
        canvas
    }

    /// Re-read settings and decode the configured stickers. Items already
    /// drawn keep their properties.
    pub fn apply_config(&mut self, config: &AnnotatorConfig) {
        self.apply_config_with_stickers(config, shared_stickers(config));
    }

    /// Apply settings with sticker bitmaps that are already decoded.
    pub(crate) fn apply_config_with_stickers(
        &mut self,
        config: &AnnotatorConfig,
        stickers: Vec<Arc<RgbaImage>>,
    ) {
        self.tools.set_stickers(stickers, config.keep_default_stickers);
        self.undo_stack.set_limit(config.undo_limit);
        self.undo_stack.set_enabled(config.undo_enabled);
        self.camera.set_limits(config.min_zoom, config.max_zoom);
        self.tools.current_properties = config.default_properties.clone();
        self.tools.highlight_opacity = config.highlight_opacity;
        self.hit_tolerance = config.hit_tolerance;
    }

    /// Register a callback for canvas notifications.
    pub fn subscribe(&mut self, listener: impl FnMut(&CanvasEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: CanvasEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    fn emit_selection(&mut self) {
        let selection = self.selection.clone();
        self.emit(CanvasEvent::SelectionChanged(selection));
    }

    fn push(&mut self, command: Command) -> AnnotateResult<()> {
        self.undo_stack.push(command, &mut self.scene)?;
        self.emit(CanvasEvent::ImageChanged);
        Ok(())
    }

    /// Items and background.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Command history.
    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo_stack
    }

    /// Replace the background and start over: items, history and selection are dropped.
    pub fn load_image(&mut self, image: RgbaImage) {
        log::info!("Loading {}x{} image", image.width(), image.height());
        self.gesture = Gesture::Idle;
        self.scene.clear_items();
        self.scene.replace_background(Some(image));
        self.undo_stack.clear();
        self.emit(CanvasEvent::ImageChanged);
        if !self.selection.is_empty() {
            self.selection.clear();
            self.emit_selection();
        }
    }

    /// Flatten the scene through `compositor`.
    pub fn current_image(&self, compositor: &dyn Compositor) -> AnnotateResult<RgbaImage> {
        if self.scene.background().is_none() {
            return Err(AnnotateError::NoImage);
        }
        compositor.composite(&self.scene)
    }

    /// Set the current tool. Any gesture in progress is abandoned.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.abort_gesture();
        self.tools.set_tool(tool);
    }

    /// Hit tolerance in image pixels at the current zoom.
    pub fn hit_tolerance(&self) -> f64 {
        self.camera.image_tolerance(self.hit_tolerance)
    }

    // --- Drawing ---

    /// Start drawing an item with the current tool at `position`.
    pub fn begin_item(
        &mut self,
        position: Point,
        properties: ItemProperties,
    ) -> AnnotateResult<ItemId> {
        if self.scene.background().is_none() {
            return Err(AnnotateError::NoImage);
        }
        self.abort_gesture();
        let item = self
            .tools
            .create_item(position, properties, self.scene.image_rect())?;
        let id = item.id();
        log::debug!("Begin {} at {:?}", item.kind_name(), position);
        self.gesture = Gesture::Drawing(item);
        self.clear_selection();
        Ok(id)
    }

    /// Start drawing with the tool manager's current properties.
    pub fn begin_item_with_defaults(&mut self, position: Point) -> AnnotateResult<ItemId> {
        let properties = self.tools.current_properties.clone();
        self.begin_item(position, properties)
    }

    /// Feed the cursor position to the item being drawn.
    pub fn extend_item(&mut self, position: Point) {
        if let Gesture::Drawing(item) = &mut self.gesture {
            item.add_point(position);
        }
    }

    /// Set the content of a text item being drawn.
    pub fn set_item_text(&mut self, text: &str) {
        if let Gesture::Drawing(AnnotationItem::Text(item)) = &mut self.gesture {
            item.set_text(text);
        }
    }

    /// The item currently being drawn, for live preview.
    pub fn drawing_item(&self) -> Option<&AnnotationItem> {
        match &self.gesture {
            Gesture::Drawing(item) => Some(item),
            _ => None,
        }
    }

    /// Finish the drawing gesture.
    ///
    /// Returns the id of the new item, or None when nothing was added: no
    /// gesture, degenerate geometry, or a cut-out (which edits the image).
    pub fn complete_item(&mut self) -> AnnotateResult<Option<ItemId>> {
        let item = match std::mem::take(&mut self.gesture) {
            Gesture::Drawing(item) => item,
            other => {
                self.gesture = other;
                return Ok(None);
            }
        };
        if item.is_degenerate() {
            log::debug!("Discarding degenerate {}", item.kind_name());
            return Ok(None);
        }
        if let AnnotationItem::CutOutMarker(marker) = &item {
            self.cut_out(marker.cut_rect())?;
            return Ok(None);
        }
        let id = item.id();
        log::debug!("Completed {} {}", item.kind_name(), id);
        self.push(Command::add_item(item))?;
        Ok(Some(id))
    }

    /// Abandon the drawing gesture without recording anything.
    pub fn cancel_item(&mut self) {
        if matches!(self.gesture, Gesture::Drawing(_)) {
            self.gesture = Gesture::Idle;
        }
    }

    // --- Selection ---

    /// Currently selected items.
    pub fn selection(&self) -> &[ItemId] {
        &self.selection
    }

    /// Check if an item is selected.
    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selection.contains(&id)
    }

    /// Replace the selection. Ids not in the scene are ignored.
    pub fn select(&mut self, ids: &[ItemId]) {
        let mut selection: Vec<ItemId> = Vec::with_capacity(ids.len());
        for &id in ids {
            if self.scene.contains(id) && !selection.contains(&id) {
                selection.push(id);
            }
        }
        if selection != self.selection {
            self.selection = selection;
            self.emit_selection();
        }
    }

    /// Select the topmost item under `point`, or clear the selection.
    pub fn select_at(&mut self, point: Point) -> Option<ItemId> {
        let hit = self
            .scene
            .items_at(point, self.hit_tolerance())
            .first()
            .copied();
        match hit {
            Some(id) => self.select(&[id]),
            None => self.clear_selection(),
        }
        hit
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.emit_selection();
        }
    }

    fn selected_items(&self) -> Vec<AnnotationItem> {
        self.selection
            .iter()
            .filter_map(|&id| self.scene.item(id))
            .map(AnnotationItem::clone_for_undo)
            .collect()
    }

    /// Delete the selected items as one command.
    pub fn delete_selected(&mut self) -> AnnotateResult<bool> {
        if self.selection.is_empty() {
            return Ok(false);
        }
        self.abort_gesture();
        let command = Command::delete_items(&self.scene, &self.selection)?;
        self.push(command)?;
        self.selection.clear();
        self.emit_selection();
        Ok(true)
    }

    /// Move the selected items by `delta` as one command.
    pub fn move_selected(&mut self, delta: Vec2) -> AnnotateResult<bool> {
        if self.selection.is_empty() || delta == Vec2::ZERO {
            return Ok(false);
        }
        self.abort_gesture();
        let before = self.selected_items();
        let after = before
            .iter()
            .map(|item| {
                let mut moved = item.clone_for_undo();
                moved.translate(delta);
                moved
            })
            .collect();
        self.push(Command::move_items(before, after))?;
        Ok(true)
    }

    /// Apply `properties` to every selected item as one command.
    pub fn set_properties_of_selected(
        &mut self,
        properties: ItemProperties,
    ) -> AnnotateResult<bool> {
        let before = self.selected_items();
        if before.is_empty() {
            return Ok(false);
        }
        let after = before
            .iter()
            .map(|item| {
                let mut changed = item.clone_for_undo();
                changed.set_properties(properties.clone());
                changed
            })
            .collect();
        self.push(Command::change_properties(before, after))?;
        Ok(true)
    }

    // --- Drag gestures ---

    /// Start moving or resizing at `point`.
    ///
    /// A handle of a single selected item starts a resize. A hit on a selected
    /// item moves the whole selection; a hit on another item selects and moves
    /// it. Returns false when nothing is under the pointer.
    pub fn begin_drag(&mut self, point: Point) -> bool {
        self.abort_gesture();

        if let [id] = self.selection[..] {
            if let Some(item) = self.scene.item(id) {
                let tolerance = self.camera.image_tolerance(HANDLE_HIT_TOLERANCE);
                if let Some(handle) = hit_test_handles(item, point, tolerance) {
                    let original = item.clone_for_undo();
                    self.gesture = Gesture::Dragging(DragState::resizing(point, handle, original));
                    return true;
                }
            }
        }

        let Some(&hit) = self.scene.items_at(point, self.hit_tolerance()).first() else {
            return false;
        };
        if !self.is_selected(hit) {
            self.select(&[hit]);
        }
        let originals = self.selected_items();
        self.gesture = Gesture::Dragging(DragState::moving(point, originals));
        true
    }

    /// Update the drag; the affected items follow live.
    pub fn drag_to(&mut self, point: Point) -> AnnotateResult<()> {
        let Gesture::Dragging(drag) = &mut self.gesture else {
            return Ok(());
        };
        drag.current_point = point;
        for item in drag.apply() {
            self.scene.replace(item)?;
        }
        Ok(())
    }

    /// Finish the drag, recording one command if anything changed.
    pub fn end_drag(&mut self) -> AnnotateResult<bool> {
        let drag = match std::mem::take(&mut self.gesture) {
            Gesture::Dragging(drag) => drag,
            other => {
                self.gesture = other;
                return Ok(false);
            }
        };
        if drag.delta() == Vec2::ZERO {
            restore(&mut self.scene, &drag.originals)?;
            return Ok(false);
        }
        let after = drag.apply();
        let command = match drag.handle {
            Some(_) => match (drag.originals.into_iter().next(), after.into_iter().next()) {
                (Some(before), Some(after)) => Command::modify_item(before, after),
                _ => return Ok(false),
            },
            None => Command::move_items(drag.originals, after),
        };
        self.push(command)?;
        Ok(true)
    }

    /// Abandon the drag and put the items back where they started.
    pub fn cancel_drag(&mut self) -> AnnotateResult<()> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging(drag) => restore(&mut self.scene, &drag.originals),
            other => {
                self.gesture = other;
                Ok(())
            }
        }
    }

    /// Check if a drag gesture is active.
    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging(_))
    }

    fn abort_gesture(&mut self) {
        if let Gesture::Dragging(drag) = std::mem::take(&mut self.gesture) {
            if let Err(e) = restore(&mut self.scene, &drag.originals) {
                log::warn!("Could not restore dragged items: {}", e);
            }
        }
    }

    // --- Image edits ---

    /// Remove a band spanning the full width or height of the image.
    ///
    /// A rectangle with no whole pixel inside the image is a no-op and
    /// returns `Ok(false)`.
    pub fn cut_out(&mut self, rect: Rect) -> AnnotateResult<bool> {
        let background = self.scene.background().ok_or(AnnotateError::NoImage)?;
        let (width, height) = background.dimensions();
        if PixelRect::clamped(rect, width, height).is_err() {
            log::debug!("Ignoring cut-out {:?} with no pixel area", rect);
            return Ok(false);
        }
        let command = match CutOutCommand::new(background, rect) {
            Ok(command) => command,
            Err(e) => {
                log::warn!("Rejected cut-out {:?}: {}", rect, e);
                return Err(e);
            }
        };
        log::info!(
            "Cut out {:?} band {:?}",
            command.orientation(),
            command.rect()
        );
        self.push(Command::cut_out(command))?;
        Ok(true)
    }

    /// Place `image` as a sticker with its top-left corner at `position`.
    pub fn insert_image_item(
        &mut self,
        position: Point,
        image: RgbaImage,
    ) -> AnnotateResult<ItemId> {
        self.abort_gesture();
        let properties = self.tools.current_properties.clone();
        let item = AnnotationItem::Sticker(StickerItem::at_position(position, image, properties));
        let id = item.id();
        self.push(Command::add_item(item))?;
        Ok(id)
    }

    // --- History ---

    /// Undo the last command. Gestures in progress are abandoned first.
    pub fn undo(&mut self) -> AnnotateResult<bool> {
        self.abort_gesture();
        self.gesture = Gesture::Idle;
        let undone = self.undo_stack.undo(&mut self.scene)?;
        if undone {
            self.after_history_change();
        }
        Ok(undone)
    }

    /// Redo the last undone command.
    pub fn redo(&mut self) -> AnnotateResult<bool> {
        self.abort_gesture();
        self.gesture = Gesture::Idle;
        let redone = self.undo_stack.redo(&mut self.scene)?;
        if redone {
            self.after_history_change();
        }
        Ok(redone)
    }

    fn after_history_change(&mut self) {
        self.emit(CanvasEvent::ImageChanged);
        let before = self.selection.len();
        let scene = &self.scene;
        self.selection.retain(|&id| scene.contains(id));
        if self.selection.len() != before {
            self.emit_selection();
        }
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_stack.can_redo()
    }

    /// Label of the command `undo` would revert.
    pub fn undo_text(&self) -> Option<String> {
        self.undo_stack.undo_text()
    }

    /// Label of the command `redo` would apply.
    pub fn redo_text(&self) -> Option<String> {
        self.undo_stack.redo_text()
    }

    /// Enable or disable undo and redo.
    pub fn set_undo_enabled(&mut self, enabled: bool) {
        self.undo_stack.set_enabled(enabled);
    }

    /// Check if the image changed since the last `mark_saved`.
    pub fn has_unsaved_changes(&self) -> bool {
        !self.undo_stack.is_clean()
    }

    /// Remember the current state as saved.
    pub fn mark_saved(&mut self) {
        self.undo_stack.mark_clean();
    }
}

/// Decode the stickers listed in `config` into shareable bitmaps.
pub(crate) fn shared_stickers(config: &AnnotatorConfig) -> Vec<Arc<RgbaImage>> {
    config
        .load_stickers()
        .into_iter()
        .map(|(_, image)| Arc::new(image))
        .collect()
}

fn restore(scene: &mut Scene, originals: &[AnnotationItem]) -> AnnotateResult<()> {
    for item in originals {
        scene.replace(item.clone_for_undo())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::SerializableColor;
    use crate::selection::{Corner, HandleKind};
    use image::Rgba;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct BackgroundOnly;

    impl Compositor for BackgroundOnly {
        fn composite(&self, scene: &Scene) -> AnnotateResult<RgbaImage> {
            scene.background().cloned().ok_or(AnnotateError::NoImage)
        }
    }

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255]))
    }

    fn canvas_with_image() -> AnnotationCanvas {
        let mut canvas = AnnotationCanvas::new();
        canvas.load_image(gradient(100, 100));
        canvas
    }

    fn draw(
        canvas: &mut AnnotationCanvas,
        tool: ToolKind,
        from: impl Into<Point>,
        to: impl Into<Point>,
    ) -> Option<ItemId> {
        let (from, to) = (from.into(), to.into());
        canvas.set_tool(tool);
        canvas.begin_item_with_defaults(from).unwrap();
        canvas.extend_item(Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0));
        canvas.extend_item(to);
        canvas.complete_item().unwrap()
    }

    #[test]
    fn test_drawing_gesture_is_one_command() {
        let mut canvas = canvas_with_image();
        let id = draw(&mut canvas, ToolKind::Line, (10.0, 10.0), (50.0, 10.0)).expect("line added");

        assert_eq!(canvas.undo_stack().len(), 1);
        assert_eq!(
            canvas.scene().item(id).map(|i| i.bounding_region()),
            Some(Rect::new(10.0, 10.0, 50.0, 10.0))
        );

        assert!(canvas.undo().unwrap());
        assert!(canvas.scene().is_empty());
        assert!(canvas.redo().unwrap());
        assert!(canvas.scene().contains(id));
    }

    #[test]
    fn test_degenerate_and_cancelled_gestures_record_nothing() {
        let mut canvas = canvas_with_image();
        canvas.set_tool(ToolKind::Rectangle);
        canvas.begin_item_with_defaults(Point::new(5.0, 5.0)).unwrap();
        canvas.extend_item(Point::new(5.0, 40.0));
        assert_eq!(canvas.complete_item().unwrap(), None);

        canvas.begin_item_with_defaults(Point::new(5.0, 5.0)).unwrap();
        canvas.extend_item(Point::new(40.0, 40.0));
        assert!(canvas.drawing_item().is_some());
        canvas.cancel_item();
        assert_eq!(canvas.complete_item().unwrap(), None);

        assert!(canvas.undo_stack().is_empty());
        assert!(canvas.scene().is_empty());
    }

    #[test]
    fn test_drawing_needs_image() {
        let mut canvas = AnnotationCanvas::new();
        canvas.set_tool(ToolKind::Line);
        assert!(matches!(
            canvas.begin_item_with_defaults(Point::ZERO),
            Err(AnnotateError::NoImage)
        ));
    }

    #[test]
    fn test_text_gesture() {
        let mut canvas = canvas_with_image();
        canvas.set_tool(ToolKind::Text);
        canvas.begin_item_with_defaults(Point::new(10.0, 10.0)).unwrap();
        canvas.set_item_text("note");
        let id = canvas.complete_item().unwrap().expect("text added");
        assert_eq!(canvas.scene().item(id).map(|i| i.kind_name()), Some("text"));
    }

    #[test]
    fn test_cut_out_gesture_and_undo() {
        let mut canvas = canvas_with_image();
        let original = canvas.scene().background().cloned();

        let added = draw(&mut canvas, ToolKind::CutOut, (30.0, 40.0), (50.0, 45.0));
        assert_eq!(added, None);
        let image = canvas.current_image(&BackgroundOnly).unwrap();
        assert_eq!(image.dimensions(), (80, 100));
        assert_eq!(image.get_pixel(30, 7), &Rgba([50, 7, 0, 255]));
        assert_eq!(canvas.scene().image_rect(), Rect::new(0.0, 0.0, 80.0, 100.0));
        assert_eq!(canvas.undo_text().as_deref(), Some("Cut out"));

        canvas.undo().unwrap();
        assert_eq!(canvas.scene().background().cloned(), original);
    }

    #[test]
    fn test_interior_cut_out_rejected_without_change() {
        let mut canvas = canvas_with_image();
        let result = canvas.cut_out(Rect::new(10.0, 10.0, 20.0, 20.0));
        assert!(matches!(result, Err(AnnotateError::CutOutNotSpanning { .. })));
        assert_eq!(canvas.scene().background(), Some(&gradient(100, 100)));
        assert!(canvas.undo_stack().is_empty());
    }

    #[test]
    fn test_zero_area_cut_out_is_a_no_op() {
        let mut canvas = canvas_with_image();
        let changes = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&changes);
        canvas.subscribe(move |event| {
            if *event == CanvasEvent::ImageChanged {
                *counter.borrow_mut() += 1;
            }
        });

        canvas.set_tool(ToolKind::CutOut);
        canvas.begin_item_with_defaults(Point::new(30.2, 40.0)).unwrap();
        canvas.extend_item(Point::new(30.4, 40.0));
        assert_eq!(canvas.complete_item().unwrap(), None);

        assert!(!canvas.cut_out(Rect::new(30.0, 0.0, 30.0, 100.0)).unwrap());
        assert!(!canvas.cut_out(Rect::new(120.0, 0.0, 140.0, 100.0)).unwrap());

        assert_eq!(canvas.scene().background(), Some(&gradient(100, 100)));
        assert!(canvas.undo_stack().is_empty());
        assert_eq!(*changes.borrow(), 0);
    }

    #[test]
    fn test_drag_moves_selection_as_one_command() {
        let mut canvas = canvas_with_image();
        let id = draw(&mut canvas, ToolKind::Line, (10.0, 10.0), (50.0, 10.0)).unwrap();

        assert!(canvas.begin_drag(Point::new(30.0, 10.0)));
        assert!(canvas.is_selected(id));
        canvas.drag_to(Point::new(32.0, 12.0)).unwrap();
        canvas.drag_to(Point::new(35.0, 15.0)).unwrap();
        assert!(canvas.end_drag().unwrap());

        assert_eq!(canvas.undo_stack().len(), 2);
        assert_eq!(
            canvas.scene().item(id).map(|i| i.bounding_region()),
            Some(Rect::new(15.0, 15.0, 55.0, 15.0))
        );

        canvas.undo().unwrap();
        assert_eq!(
            canvas.scene().item(id).map(|i| i.bounding_region()),
            Some(Rect::new(10.0, 10.0, 50.0, 10.0))
        );
    }

    #[test]
    fn test_cancel_drag_restores_items() {
        let mut canvas = canvas_with_image();
        let id = draw(&mut canvas, ToolKind::Line, (10.0, 10.0), (50.0, 10.0)).unwrap();

        assert!(canvas.begin_drag(Point::new(30.0, 10.0)));
        canvas.drag_to(Point::new(60.0, 60.0)).unwrap();
        canvas.cancel_drag().unwrap();

        assert_eq!(canvas.undo_stack().len(), 1);
        assert_eq!(
            canvas.scene().item(id).map(|i| i.bounding_region()),
            Some(Rect::new(10.0, 10.0, 50.0, 10.0))
        );
    }

    #[test]
    fn test_handle_drag_resizes() {
        let mut canvas = canvas_with_image();
        let id = draw(&mut canvas, ToolKind::Rectangle, (10.0, 10.0), (40.0, 40.0)).unwrap();
        canvas.select(&[id]);

        assert!(canvas.begin_drag(Point::new(40.0, 40.0)));
        canvas.drag_to(Point::new(70.0, 60.0)).unwrap();
        assert!(canvas.end_drag().unwrap());
        assert_eq!(canvas.undo_text().as_deref(), Some("Resize"));
        assert_eq!(
            canvas.scene().item(id).map(|i| i.bounding_region()),
            Some(Rect::new(10.0, 10.0, 70.0, 60.0))
        );
        let item = canvas.scene().item(id).unwrap();
        assert_eq!(
            crate::selection::hit_test_handles(item, Point::new(70.0, 60.0), 1.0),
            Some(HandleKind::Corner(Corner::BottomRight))
        );
    }

    #[test]
    fn test_delete_selected_and_undo() {
        let mut canvas = canvas_with_image();
        let a = draw(&mut canvas, ToolKind::Line, (0.0, 5.0), (20.0, 5.0)).unwrap();
        let b = draw(&mut canvas, ToolKind::Line, (0.0, 50.0), (20.0, 50.0)).unwrap();
        canvas.select(&[a, b]);

        assert!(canvas.delete_selected().unwrap());
        assert!(canvas.scene().is_empty());
        assert!(canvas.selection().is_empty());

        canvas.undo().unwrap();
        let order: Vec<_> = canvas.scene().items_ordered().map(|i| i.id()).collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn test_undo_prunes_selection() {
        let mut canvas = canvas_with_image();
        let id = draw(&mut canvas, ToolKind::Line, (0.0, 5.0), (20.0, 5.0)).unwrap();
        canvas.select(&[id]);
        canvas.undo().unwrap();
        assert!(canvas.selection().is_empty());
    }

    #[test]
    fn test_properties_of_selected() {
        let mut canvas = canvas_with_image();
        let id = draw(&mut canvas, ToolKind::Ellipse, (10.0, 10.0), (40.0, 30.0)).unwrap();
        let bounds = canvas.scene().item(id).unwrap().bounding_region();
        assert_eq!(canvas.select_at(Point::new(40.0, 20.0)), Some(id));

        let props = ItemProperties::default()
            .with_stroke_color(SerializableColor::red())
            .with_fill(Some(SerializableColor::yellow()));
        assert!(canvas.set_properties_of_selected(props.clone()).unwrap());

        let item = canvas.scene().item(id).unwrap();
        assert_eq!(item.properties(), &props);
        assert_eq!(item.bounding_region(), bounds);

        canvas.undo().unwrap();
        assert_eq!(canvas.scene().item(id).unwrap().properties(), &ItemProperties::default());
    }

    #[test]
    fn test_move_selected() {
        let mut canvas = canvas_with_image();
        let id = draw(&mut canvas, ToolKind::Line, (10.0, 10.0), (60.0, 10.0)).unwrap();
        let before = canvas.scene().item(id).unwrap().bounding_region();
        canvas.select(&[id]);
        assert!(canvas.move_selected(Vec2::new(0.0, 20.0)).unwrap());
        assert_eq!(
            canvas.scene().item(id).unwrap().bounding_region(),
            before + Vec2::new(0.0, 20.0)
        );
        assert!(!canvas.move_selected(Vec2::ZERO).unwrap());
    }

    #[test]
    fn test_insert_image_item() {
        let mut canvas = canvas_with_image();
        let id = canvas
            .insert_image_item(Point::new(5.0, 6.0), gradient(10, 4))
            .unwrap();
        assert_eq!(
            canvas.scene().item(id).unwrap().bounding_region(),
            Rect::new(5.0, 6.0, 15.0, 10.0)
        );
        assert!(canvas.can_undo());
    }

    #[test]
    fn test_events() {
        let mut canvas = canvas_with_image();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        canvas.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        let id = draw(&mut canvas, ToolKind::Line, (0.0, 5.0), (20.0, 5.0)).unwrap();
        canvas.select(&[id]);
        canvas.undo().unwrap();

        assert_eq!(
            events.borrow().as_slice(),
            &[
                CanvasEvent::ImageChanged,
                CanvasEvent::SelectionChanged(vec![id]),
                CanvasEvent::ImageChanged,
                CanvasEvent::SelectionChanged(Vec::new()),
            ]
        );
    }

    #[test]
    fn test_load_image_resets() {
        let mut canvas = canvas_with_image();
        draw(&mut canvas, ToolKind::Line, (0.0, 5.0), (20.0, 5.0)).unwrap();
        canvas.load_image(gradient(20, 20));
        assert!(canvas.scene().is_empty());
        assert!(!canvas.can_undo());
        assert!(!canvas.has_unsaved_changes());
    }

    #[test]
    fn test_undo_disabled_and_unsaved_changes() {
        let mut canvas = canvas_with_image();
        draw(&mut canvas, ToolKind::Line, (0.0, 5.0), (20.0, 5.0)).unwrap();
        assert!(canvas.has_unsaved_changes());
        canvas.mark_saved();
        assert!(!canvas.has_unsaved_changes());

        canvas.set_undo_enabled(false);
        assert!(!canvas.can_undo());
        assert!(!canvas.undo().unwrap());
        assert_eq!(canvas.scene().len(), 1);
    }

    #[test]
    fn test_config_applies() {
        let config = AnnotatorConfig {
            undo_limit: 2,
            max_zoom: 3.0,
            ..Default::default()
        };
        let mut canvas = AnnotationCanvas::with_config(&config);
        canvas.load_image(gradient(50, 50));
        for y in [5.0, 10.0, 15.0] {
            draw(&mut canvas, ToolKind::Line, (0.0, y), (20.0, y));
        }
        assert_eq!(canvas.undo_stack().len(), 2);
        canvas.camera.zoom(100.0);
        assert!((canvas.camera.zoom_value() - 3.0).abs() < f64::EPSILON);
    }
}
