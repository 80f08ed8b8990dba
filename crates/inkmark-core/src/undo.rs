//! Bounded undo/redo history.

use crate::commands::Command;
use crate::error::AnnotateResult;
use crate::scene::Scene;

/// Maximum number of commands to keep.
pub const DEFAULT_UNDO_LIMIT: usize = 50;

/// Linear command history with a cursor.
///
/// Commands before the cursor are applied, commands after it were undone and
/// can be redone until a new command is pushed.
#[derive(Debug, Clone)]
pub struct UndoStack {
    commands: Vec<Command>,
    index: usize,
    limit: usize,
    enabled: bool,
    clean_index: Option<usize>,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_LIMIT)
    }
}

impl UndoStack {
    /// Create an empty history holding at most `limit` commands.
    pub fn new(limit: usize) -> Self {
        Self {
            commands: Vec::new(),
            index: 0,
            limit: limit.max(1),
            enabled: true,
            clean_index: Some(0),
        }
    }

    /// Apply `command` and record it. The redo tail is discarded and the
    /// oldest command evicted once the limit is exceeded.
    ///
    /// Nothing is recorded if the command fails to apply.
    pub fn push(&mut self, mut command: Command, scene: &mut Scene) -> AnnotateResult<()> {
        command.redo(scene)?;

        self.commands.truncate(self.index);
        if self.clean_index.is_some_and(|clean| clean > self.index) {
            self.clean_index = None;
        }
        self.commands.push(command);
        self.index += 1;
        self.evict();
        Ok(())
    }

    fn evict(&mut self) {
        while self.commands.len() > self.limit {
            let evicted = self.commands.remove(0);
            log::debug!("Evicted '{}' from undo history", evicted.text());
            self.index -= 1;
            self.clean_index = self.clean_index.and_then(|clean| clean.checked_sub(1));
        }
    }

    /// Revert the last applied command. Returns false when there is nothing
    /// to undo or the history is disabled.
    pub fn undo(&mut self, scene: &mut Scene) -> AnnotateResult<bool> {
        if !self.can_undo() {
            return Ok(false);
        }
        self.commands[self.index - 1].undo(scene)?;
        self.index -= 1;
        Ok(true)
    }

    /// Re-apply the next undone command.
    pub fn redo(&mut self, scene: &mut Scene) -> AnnotateResult<bool> {
        if !self.can_redo() {
            return Ok(false);
        }
        self.commands[self.index].redo(scene)?;
        self.index += 1;
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.enabled && self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.enabled && self.index < self.commands.len()
    }

    /// Label of the command `undo` would revert.
    pub fn undo_text(&self) -> Option<String> {
        self.can_undo()
            .then(|| self.commands[self.index - 1].text())
    }

    /// Label of the command `redo` would apply.
    pub fn redo_text(&self) -> Option<String> {
        self.can_redo().then(|| self.commands[self.index].text())
    }

    /// Last applied command.
    pub fn last_applied(&self) -> Option<&Command> {
        self.index.checked_sub(1).and_then(|i| self.commands.get(i))
    }

    /// Enable or disable undo and redo. Pushing keeps recording either way.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Change the history limit, evicting the oldest commands if needed.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        self.evict();
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Remember the current position as the saved state.
    pub fn mark_clean(&mut self) {
        self.clean_index = Some(self.index);
    }

    /// Check if the scene matches the last `mark_clean` position.
    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.index)
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.index = 0;
        self.clean_index = Some(0);
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
