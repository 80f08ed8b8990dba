//! Ordered set of canvases, one per open image.

use crate::canvas::{AnnotationCanvas, shared_stickers};
use crate::compose::Compositor;
use crate::config::AnnotatorConfig;
use crate::error::{AnnotateError, AnnotateResult};
use crate::items::ItemId;
use image::RgbaImage;
use kurbo::Point;
use std::path::PathBuf;
use std::sync::Arc;

/// One open image with its display info.
#[derive(Debug)]
pub struct AnnotationTab {
    pub title: String,
    pub tool_tip: String,
    pub canvas: AnnotationCanvas,
}

/// Canvases in tab order with one of them current.
///
/// Every canvas shares the same configuration and sticker bitmaps;
/// `reload_config` pushes changes to all of them.
#[derive(Debug, Default)]
pub struct AnnotationTabs {
    tabs: Vec<AnnotationTab>,
    current: Option<usize>,
    config: AnnotatorConfig,
    /// Decoded `config.sticker_paths`.
    stickers: Vec<Arc<RgbaImage>>,
    default_stickers: Vec<Arc<RgbaImage>>,
}

impl AnnotationTabs {
    pub fn new(config: AnnotatorConfig) -> Self {
        Self {
            tabs: Vec::new(),
            current: None,
            stickers: shared_stickers(&config),
            config,
            default_stickers: Vec::new(),
        }
    }

    fn new_canvas(&self) -> AnnotationCanvas {
        let mut canvas = AnnotationCanvas::new();
        canvas.tools.set_default_stickers(self.default_stickers.clone());
        canvas.apply_config_with_stickers(&self.config, self.stickers.clone());
        canvas
    }

    /// Shared configuration.
    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Index of the current tab.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    fn check_index(&self, index: usize) -> AnnotateResult<()> {
        if index < self.tabs.len() {
            Ok(())
        } else {
            Err(AnnotateError::TabOutOfRange {
                index,
                count: self.tabs.len(),
            })
        }
    }

    /// Open `image` in a new tab and make it current.
    pub fn add_tab(&mut self, image: RgbaImage, title: &str, tool_tip: &str) -> usize {
        let mut canvas = self.new_canvas();
        canvas.load_image(image);
        self.tabs.push(AnnotationTab {
            title: title.to_string(),
            tool_tip: tool_tip.to_string(),
            canvas,
        });
        let index = self.tabs.len() - 1;
        self.current = Some(index);
        log::debug!("Added tab {} '{}'", index, title);
        index
    }

    /// Change the title and tooltip of a tab.
    pub fn update_tab_info(
        &mut self,
        index: usize,
        title: &str,
        tool_tip: &str,
    ) -> AnnotateResult<()> {
        self.check_index(index)?;
        let tab = &mut self.tabs[index];
        tab.title = title.to_string();
        tab.tool_tip = tool_tip.to_string();
        Ok(())
    }

    /// Close a tab. The current tab stays current when it is not the one removed;
    /// otherwise its right neighbour (or the new last tab) takes over.
    pub fn remove_tab(&mut self, index: usize) -> AnnotateResult<AnnotationTab> {
        self.check_index(index)?;
        let tab = self.tabs.remove(index);
        self.current = match self.current {
            _ if self.tabs.is_empty() => None,
            Some(current) if current > index => Some(current - 1),
            Some(current) if current == index => Some(index.min(self.tabs.len() - 1)),
            other => other,
        };
        log::debug!("Removed tab {} '{}'", index, tab.title);
        Ok(tab)
    }

    /// Reorder tabs; the current tab keeps pointing at the same canvas.
    pub fn move_tab(&mut self, from: usize, to: usize) -> AnnotateResult<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let tab = self.tabs.remove(from);
        self.tabs.insert(to, tab);
        self.current = self.current.map(|current| {
            if current == from {
                to
            } else if from < current && current <= to {
                current - 1
            } else if to <= current && current < from {
                current + 1
            } else {
                current
            }
        });
        Ok(())
    }

    /// Make a tab current.
    pub fn set_current(&mut self, index: usize) -> AnnotateResult<()> {
        self.check_index(index)?;
        self.current = Some(index);
        Ok(())
    }

    /// Current tab.
    pub fn current(&self) -> Option<&AnnotationTab> {
        self.current.and_then(|index| self.tabs.get(index))
    }

    pub fn current_mut(&mut self) -> Option<&mut AnnotationTab> {
        self.current.and_then(|index| self.tabs.get_mut(index))
    }

    /// Tab at `index`.
    pub fn at(&self, index: usize) -> AnnotateResult<&AnnotationTab> {
        self.check_index(index)?;
        Ok(&self.tabs[index])
    }

    pub fn at_mut(&mut self, index: usize) -> AnnotateResult<&mut AnnotationTab> {
        self.check_index(index)?;
        Ok(&mut self.tabs[index])
    }

    /// Iterate tabs in order.
    pub fn iter(&self) -> impl Iterator<Item = &AnnotationTab> {
        self.tabs.iter()
    }

    /// Load `image` into the current tab, or open a tab for it if there is none.
    pub fn load_image(&mut self, image: RgbaImage) {
        match self.current_mut() {
            Some(tab) => tab.canvas.load_image(image),
            None => {
                self.add_tab(image, "", "");
            }
        }
    }

    /// Composite of the current tab.
    pub fn image(&self, compositor: &dyn Compositor) -> AnnotateResult<RgbaImage> {
        match self.current() {
            Some(tab) => tab.canvas.current_image(compositor),
            None => Err(AnnotateError::NoImage),
        }
    }

    /// Composite of the tab at `index`.
    pub fn image_at(
        &self,
        index: usize,
        compositor: &dyn Compositor,
    ) -> AnnotateResult<RgbaImage> {
        self.at(index)?.canvas.current_image(compositor)
    }

    /// Place a sticker in the current tab. Does nothing without a tab.
    pub fn insert_image_item(
        &mut self,
        position: Point,
        image: RgbaImage,
    ) -> AnnotateResult<Option<ItemId>> {
        match self.current_mut() {
            Some(tab) => tab.canvas.insert_image_item(position, image).map(Some),
            None => Ok(None),
        }
    }

    /// Clear the selection of the current tab.
    pub fn clear_selection(&mut self) {
        if let Some(tab) = self.current_mut() {
            tab.canvas.clear_selection();
        }
    }

    /// Undo in the current tab.
    pub fn undo(&mut self) -> AnnotateResult<bool> {
        match self.current_mut() {
            Some(tab) => tab.canvas.undo(),
            None => Ok(false),
        }
    }

    /// Redo in the current tab.
    pub fn redo(&mut self) -> AnnotateResult<bool> {
        match self.current_mut() {
            Some(tab) => tab.canvas.redo(),
            None => Ok(false),
        }
    }

    /// Enable or disable undo in every tab, including tabs opened later.
    pub fn set_undo_enabled(&mut self, enabled: bool) {
        self.config.undo_enabled = enabled;
        for tab in &mut self.tabs {
            tab.canvas.set_undo_enabled(enabled);
        }
    }

    /// Replace the configuration and apply it to every tab. Sticker files are
    /// decoded once and shared.
    pub fn reload_config(&mut self, config: AnnotatorConfig) {
        self.stickers = shared_stickers(&config);
        self.config = config;
        for tab in &mut self.tabs {
            tab.canvas.apply_config_with_stickers(&self.config, self.stickers.clone());
        }
        log::info!("Reloaded config for {} tabs", self.tabs.len());
    }

    /// Built-in stickers offered unless `keep_default_stickers` is off.
    pub fn set_default_stickers(&mut self, stickers: Vec<RgbaImage>) {
        self.default_stickers = stickers.into_iter().map(Arc::new).collect();
        for tab in &mut self.tabs {
            tab.canvas.tools.set_default_stickers(self.default_stickers.clone());
        }
    }

    /// Replace the sticker list offered by the sticker tool.
    pub fn set_stickers(&mut self, paths: Vec<PathBuf>, keep_default: bool) {
        let mut config = self.config.clone();
        config.sticker_paths = paths;
        config.keep_default_stickers = keep_default;
        self.reload_config(config);
    }
}
