//! Reversible commands recorded on the undo stack.
//!
//! Each command owns clones of every item state it needs, so applying and
//! reverting never depend on anything another command holds.

mod cutout;

pub use cutout::{CutOrientation, CutOutCommand, PixelRect, classify, splice, try_copy};

use crate::error::{AnnotateError, AnnotateResult};
use crate::items::{AnnotationItem, ItemId, ItemTrait};
use crate::scene::Scene;

/// Lifecycle of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandState {
    /// Built but never applied.
    #[default]
    Created,
    /// Its effect is present in the scene.
    Applied,
    /// Its effect was reverted.
    Reverted,
}

/// New item added on top of the scene.
#[derive(Debug, Clone)]
pub struct AddItem {
    item: AnnotationItem,
}

/// Items removed from the scene, each with the z-index it held.
#[derive(Debug, Clone)]
pub struct DeleteItems {
    /// Sorted by ascending z-index.
    removed: Vec<(usize, AnnotationItem)>,
}

/// Whole-item state swap used by moves, resizes and property edits.
#[derive(Debug, Clone)]
pub struct ItemSwap {
    before: Vec<AnnotationItem>,
    after: Vec<AnnotationItem>,
}

/// Mutation variants.
#[derive(Debug, Clone)]
pub enum CommandKind {
    AddItem(AddItem),
    DeleteItems(DeleteItems),
    MoveItems(ItemSwap),
    ModifyItem(ItemSwap),
    ChangeProperties(ItemSwap),
    CutOut(Box<CutOutCommand>),
}

/// A reversible scene mutation.
#[derive(Debug, Clone)]
pub struct Command {
    kind: CommandKind,
    state: CommandState,
}

impl Command {
    fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            state: CommandState::Created,
        }
    }

    /// Add `item` on top of the scene.
    pub fn add_item(item: AnnotationItem) -> Self {
        Self::new(CommandKind::AddItem(AddItem { item }))
    }

    /// Delete `ids`, capturing their current state and z-index.
    pub fn delete_items(scene: &Scene, ids: &[ItemId]) -> AnnotateResult<Self> {
        let mut removed = Vec::with_capacity(ids.len());
        for &id in ids {
            let item = scene.item(id).ok_or(AnnotateError::ItemNotFound(id))?;
            let index = scene.z_index(id).ok_or(AnnotateError::ItemNotFound(id))?;
            removed.push((index, item.clone_for_undo()));
        }
        removed.sort_by_key(|(index, _)| *index);
        removed.dedup_by_key(|(index, _)| *index);
        Ok(Self::new(CommandKind::DeleteItems(DeleteItems { removed })))
    }

    /// Translate items from `before` to `after`.
    pub fn move_items(before: Vec<AnnotationItem>, after: Vec<AnnotationItem>) -> Self {
        Self::new(CommandKind::MoveItems(ItemSwap { before, after }))
    }

    /// Replace the geometry of one item, e.g. after a handle drag.
    pub fn modify_item(before: AnnotationItem, after: AnnotationItem) -> Self {
        Self::new(CommandKind::ModifyItem(ItemSwap {
            before: vec![before],
            after: vec![after],
        }))
    }

    /// Replace the visual properties of items.
    pub fn change_properties(before: Vec<AnnotationItem>, after: Vec<AnnotationItem>) -> Self {
        Self::new(CommandKind::ChangeProperties(ItemSwap { before, after }))
    }

    /// Wrap a prepared cut-out.
    pub fn cut_out(command: CutOutCommand) -> Self {
        Self::new(CommandKind::CutOut(Box::new(command)))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CommandState {
        self.state
    }

    /// Variant and captured state.
    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    /// Short label for menus and logs.
    pub fn text(&self) -> String {
        match &self.kind {
            CommandKind::AddItem(add) => format!("Add {}", add.item.kind_name()),
            CommandKind::DeleteItems(delete) if delete.removed.len() == 1 => {
                format!("Delete {}", delete.removed[0].1.kind_name())
            }
            CommandKind::DeleteItems(delete) => format!("Delete {} items", delete.removed.len()),
            CommandKind::MoveItems(_) => "Move".to_string(),
            CommandKind::ModifyItem(_) => "Resize".to_string(),
            CommandKind::ChangeProperties(_) => "Change properties".to_string(),
            CommandKind::CutOut(_) => "Cut out".to_string(),
        }
    }

    fn label(&self) -> &'static str {
        match &self.kind {
            CommandKind::AddItem(_) => "add item",
            CommandKind::DeleteItems(_) => "delete items",
            CommandKind::MoveItems(_) => "move items",
            CommandKind::ModifyItem(_) => "modify item",
            CommandKind::ChangeProperties(_) => "change properties",
            CommandKind::CutOut(_) => "cut out",
        }
    }

    /// True when the command changes the background image.
    pub fn touches_image(&self) -> bool {
        matches!(self.kind, CommandKind::CutOut(_))
    }

    /// Ids of the items this command affects.
    pub fn item_ids(&self) -> Vec<ItemId> {
        match &self.kind {
            CommandKind::AddItem(add) => vec![add.item.id()],
            CommandKind::DeleteItems(delete) => {
                delete.removed.iter().map(|(_, item)| item.id()).collect()
            }
            CommandKind::MoveItems(swap)
            | CommandKind::ModifyItem(swap)
            | CommandKind::ChangeProperties(swap) => swap.after.iter().map(|i| i.id()).collect(),
            CommandKind::CutOut(_) => Vec::new(),
        }
    }

    /// Apply the command. Fails without touching the scene if it is already
    /// applied or the scene no longer matches.
    pub fn redo(&mut self, scene: &mut Scene) -> AnnotateResult<()> {
        if self.state == CommandState::Applied {
            return Err(AnnotateError::CommandAlreadyApplied(self.label()));
        }
        match &self.kind {
            CommandKind::AddItem(add) => scene.insert(add.item.clone_for_undo())?,
            CommandKind::DeleteItems(delete) => {
                ensure_present(scene, delete.removed.iter().map(|(_, item)| item))?;
                for (_, item) in &delete.removed {
                    scene.remove(item.id())?;
                }
            }
            CommandKind::MoveItems(swap)
            | CommandKind::ModifyItem(swap)
            | CommandKind::ChangeProperties(swap) => swap_in(scene, &swap.after)?,
            CommandKind::CutOut(cut) => cut.redo(scene)?,
        }
        self.state = CommandState::Applied;
        log::debug!("Applied '{}'", self.text());
        Ok(())
    }

    /// Revert the command. Fails without touching the scene unless it is applied.
    pub fn undo(&mut self, scene: &mut Scene) -> AnnotateResult<()> {
        if self.state != CommandState::Applied {
            return Err(AnnotateError::CommandNotApplied(self.label()));
        }
        match &self.kind {
            CommandKind::AddItem(add) => {
                scene.remove(add.item.id())?;
            }
            CommandKind::DeleteItems(delete) => {
                let present = delete
                    .removed
                    .iter()
                    .find(|(_, item)| scene.contains(item.id()));
                if let Some((_, item)) = present {
                    return Err(AnnotateError::DuplicateItem(item.id()));
                }
                for (index, item) in &delete.removed {
                    scene.insert_at(*index, item.clone_for_undo())?;
                }
            }
            CommandKind::MoveItems(swap)
            | CommandKind::ModifyItem(swap)
            | CommandKind::ChangeProperties(swap) => swap_in(scene, &swap.before)?,
            CommandKind::CutOut(cut) => cut.undo(scene)?,
        }
        self.state = CommandState::Reverted;
        log::debug!("Reverted '{}'", self.text());
        Ok(())
    }
}

fn ensure_present<'a>(
    scene: &Scene,
    mut items: impl Iterator<Item = &'a AnnotationItem>,
) -> AnnotateResult<()> {
    match items.find(|item| !scene.contains(item.id())) {
        Some(missing) => Err(AnnotateError::ItemNotFound(missing.id())),
        None => Ok(()),
    }
}

fn swap_in(scene: &mut Scene, states: &[AnnotationItem]) -> AnnotateResult<()> {
    ensure_present(scene, states.iter())?;
    for state in states {
        scene.replace(state.clone_for_undo())?;
    }
    Ok(())
}
