use crate::scene::color::Color;
use crate::scene::object::ObjectId;
use crate::scene::registry::ObjectSnapshot;

/// A recorded registry mutation. Each command carries enough state to be
/// applied in either direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Add(ObjectSnapshot),
    Remove(ObjectSnapshot),
    ColorChange {
        id: ObjectId,
        from: Color,
        to: Color,
    },
}

/// Linear undo/redo log. Pushing after an undo discards the redo tail.
#[derive(Debug, Default)]
pub struct HistoryStack {
    commands: Vec<Command>,
    /// Number of commands currently applied.
    cursor: usize,
    /// Object whose color is being edited by a picker that is still active.
    /// Further color changes to it extend the last entry.
    color_edit: Option<ObjectId>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.truncate(self.cursor);

        if let Command::ColorChange { id, to, .. } = command {
            if self.color_edit == Some(id) {
                if let Some(Command::ColorChange { to: last_to, .. }) = self.commands.last_mut() {
                    *last_to = to;
                    return;
                }
            }
            self.color_edit = Some(id);
        } else {
            self.color_edit = None;
        }

        self.commands.push(command);
        self.cursor = self.commands.len();
    }

    /// Closes the running color edit, the next change starts a new entry.
    pub fn end_edit(&mut self) {
        self.color_edit = None;
    }

    /// Steps back and returns the command to revert.
    pub fn undo(&mut self) -> Option<Command> {
        self.color_edit = None;
        self.cursor = self.cursor.checked_sub(1)?;
        Some(self.commands[self.cursor])
    }

    /// Steps forward and returns the command to apply again.
    pub fn redo(&mut self) -> Option<Command> {
        self.color_edit = None;
        let command = *self.commands.get(self.cursor)?;
        self.cursor += 1;
        Some(command)
    }

    /// Overwrites the command returned by the last `undo`, so a later redo
    /// replays the state the object had when it was undone.
    pub fn replace_undone(&mut self, command: Command) {
        if let Some(slot) = self.commands.get_mut(self.cursor) {
            *slot = command;
        }
    }

    /// Overwrites the command returned by the last `redo`.
    pub fn replace_redone(&mut self, command: Command) {
        if let Some(slot) = self
            .cursor
            .checked_sub(1)
            .and_then(|index| self.commands.get_mut(index))
        {
            *slot = command;
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
