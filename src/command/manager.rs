// CommandHistory - Manages undo/redo stacks

use crate::command::factory::Command;
use crate::command::outcome::Outcome;
use crate::command::trait_def::{CommandError, CommandResult, StackKind, UndoableCommand};
use crate::graphics::GraphicsState;
use std::collections::VecDeque;

/// Undo and redo stacks plus the rules for moving commands between them
///
/// The history maintains two stacks:
/// - Undo stack: Commands that have been executed and can be undone
/// - Redo stack: Commands that have been undone and can be redone
///
/// When a new command is executed:
/// 1. Execute the command
/// 2. Push it onto the undo stack
/// 3. Clear the redo stack (since we're on a new timeline)
///
/// A command only moves between stacks after its execute/undo succeeded;
/// a failure leaves both stacks exactly as they were.
///
/// # Memory Management
/// An optional limit caps the undo stack. When it is exceeded, the oldest
/// command is dropped.
pub struct CommandHistory {
    /// Stack of commands that can be undone (most recent at the back)
    undo_stack: VecDeque<Command>,

    /// Stack of commands that can be redone (most recent at the back)
    redo_stack: VecDeque<Command>,

    /// Maximum number of commands to keep in the undo stack
    max_history: Option<usize>,
}

impl CommandHistory {
    /// Create an unbounded history
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// Create a history with an optional undo limit (at least one command)
    pub fn with_limit(max_history: Option<usize>) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history: max_history.map(|limit| limit.max(1)),
        }
    }

    /// Execute a command and add it to the undo stack
    ///
    /// # Errors
    /// Returns the command's error if execution fails; the command is dropped
    /// and the stacks are untouched.
    pub async fn execute<G: GraphicsState>(
        &mut self,
        mut command: Command,
        graphics: &mut G,
    ) -> CommandResult<Outcome> {
        let outcome = command.execute(graphics).await?;
        self.push_executed(command);
        Ok(outcome)
    }

    /// Record a command that already ran outside the history
    ///
    /// Starts a new timeline exactly like `execute`.
    pub fn push_executed(&mut self, command: Command) {
        self.undo_stack.push_back(command);

        // Clear redo stack (we're on a new timeline now)
        self.redo_stack.clear();

        self.trim();
    }

    /// Undo the last command
    ///
    /// The command is undone in place and only moved to the redo stack once
    /// that succeeded.
    ///
    /// # Errors
    /// - `EmptyStack(Undo)` if there are no commands to undo
    /// - the command's own error if undoing fails (it stays on the undo stack)
    pub async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let command = self
            .undo_stack
            .back_mut()
            .ok_or(CommandError::EmptyStack(StackKind::Undo))?;

        let outcome = command.undo(graphics).await?;

        if let Some(command) = self.undo_stack.pop_back() {
            self.redo_stack.push_back(command);
        }
        Ok(outcome)
    }

    /// Redo the last undone command
    ///
    /// Re-executes the same command (recapturing its undo payload) and moves
    /// it back to the undo stack once that succeeded.
    ///
    /// # Errors
    /// - `EmptyStack(Redo)` if there are no commands to redo
    /// - the command's own error if execution fails (it stays on the redo stack)
    pub async fn redo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let command = self
            .redo_stack
            .back_mut()
            .ok_or(CommandError::EmptyStack(StackKind::Redo))?;

        let outcome = command.execute(graphics).await?;

        if let Some(command) = self.redo_stack.pop_back() {
            self.undo_stack.push_back(command);
        }
        Ok(outcome)
    }

    /// Check if there are commands that can be undone
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if there are commands that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get a description of the command that would be undone
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.back().map(|cmd| cmd.description())
    }

    /// Get a description of the command that would be redone
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.back().map(|cmd| cmd.description())
    }

    pub fn clear_undo(&mut self) {
        self.undo_stack.clear();
    }

    pub fn clear_redo(&mut self) {
        self.redo_stack.clear();
    }

    /// Get the number of commands in the undo stack
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of commands in the redo stack
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    fn trim(&mut self) {
        if let Some(max_history) = self.max_history {
            while self.undo_stack.len() > max_history {
                self.undo_stack.pop_front();
            }
        }
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}
