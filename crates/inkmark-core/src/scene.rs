//! Scene: the background image plus the annotation items drawn over it.

use crate::error::{AnnotateError, AnnotateResult};
use crate::items::{AnnotationItem, ItemId, ItemTrait};
use image::RgbaImage;
use kurbo::{Point, Rect};
use std::collections::HashMap;

/// Items keyed by id, with an explicit back-to-front order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    background: Option<RgbaImage>,
    image_rect: Rect,
    items: HashMap<ItemId, AnnotationItem>,
    /// Z-order of items (back to front).
    z_order: Vec<ItemId>,
}

impl Scene {
    /// Create an empty scene without an image.
    pub fn new() -> Self {
        Self::default()
    }

    /// Background image, if one is loaded.
    pub fn background(&self) -> Option<&RgbaImage> {
        self.background.as_ref()
    }

    /// Replace the background image and return the previous one.
    pub fn replace_background(&mut self, image: Option<RgbaImage>) -> Option<RgbaImage> {
        self.image_rect = match &image {
            Some(image) => Rect::new(0.0, 0.0, image.width() as f64, image.height() as f64),
            None => Rect::ZERO,
        };
        std::mem::replace(&mut self.background, image)
    }

    /// Rectangle occupied by the background image.
    pub fn image_rect(&self) -> Rect {
        self.image_rect
    }

    /// Area covered by the image and every item.
    pub fn extents(&self) -> Rect {
        self.items
            .values()
            .map(ItemTrait::bounding_region)
            .fold(self.image_rect, |acc, bounds| acc.union(bounds))
    }

    /// Add an item on top of all others.
    pub fn insert(&mut self, item: AnnotationItem) -> AnnotateResult<()> {
        let index = self.z_order.len();
        self.insert_at(index, item)
    }

    /// Add an item at a z-index, clamped to the current item count.
    pub fn insert_at(&mut self, index: usize, item: AnnotationItem) -> AnnotateResult<()> {
        let id = item.id();
        if self.items.contains_key(&id) {
            return Err(AnnotateError::DuplicateItem(id));
        }
        let index = index.min(self.z_order.len());
        self.z_order.insert(index, id);
        self.items.insert(id, item);
        Ok(())
    }

    /// Remove an item, returning its z-index and the item.
    pub fn remove(&mut self, id: ItemId) -> AnnotateResult<(usize, AnnotationItem)> {
        let index = self
            .z_order
            .iter()
            .position(|&item_id| item_id == id)
            .ok_or(AnnotateError::ItemNotFound(id))?;
        let item = self
            .items
            .remove(&id)
            .ok_or(AnnotateError::ItemNotFound(id))?;
        self.z_order.remove(index);
        Ok((index, item))
    }

    /// Swap in a new state for an existing item, keeping its z-index.
    pub fn replace(&mut self, item: AnnotationItem) -> AnnotateResult<AnnotationItem> {
        let id = item.id();
        match self.items.get_mut(&id) {
            Some(slot) => Ok(std::mem::replace(slot, item)),
            None => Err(AnnotateError::ItemNotFound(id)),
        }
    }

    /// Check if an item is in the scene.
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Get an item by id.
    pub fn item(&self, id: ItemId) -> Option<&AnnotationItem> {
        self.items.get(&id)
    }

    /// Z-index of an item.
    pub fn z_index(&self, id: ItemId) -> Option<usize> {
        self.z_order.iter().position(|&item_id| item_id == id)
    }

    /// Items back to front.
    pub fn items_ordered(&self) -> impl Iterator<Item = &AnnotationItem> {
        self.z_order.iter().filter_map(|id| self.items.get(id))
    }

    /// Items under a point, front to back.
    pub fn items_at(&self, point: Point, tolerance: f64) -> Vec<ItemId> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|&id| {
                self.items
                    .get(&id)
                    .filter(|item| item.hit_test(point, tolerance))
                    .map(|_| id)
            })
            .collect()
    }

    /// Remove every item, keeping the background.
    pub fn clear_items(&mut self) {
        self.items.clear();
        self.z_order.clear();
    }

    /// Check if the scene has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
