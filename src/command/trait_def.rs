// UndoableCommand trait definition

use crate::command::kind::CommandName;
use crate::command::outcome::Outcome;
use crate::graphics::{GraphicsError, GraphicsState};
use std::fmt;
use std::future::Future;

/// Result type for command operations
pub type CommandResult<T> = Result<T, CommandError>;

/// Which history stack an operation refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackKind {
    Undo,
    Redo,
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackKind::Undo => write!(f, "Undo"),
            StackKind::Redo => write!(f, "Redo"),
        }
    }
}

/// Errors that can occur while building, executing or undoing a command
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// Missing or malformed arguments, rejected before a command is built
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// A command name that does not map to any command kind
    #[error("Unknown command kind: {0}")]
    UnknownCommandKind(String),

    /// Command execution failed
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Undo operation failed
    #[error("Undo failed: {0}")]
    UndoFailed(String),

    /// Undo or redo requested with nothing to pop
    #[error("{0} stack is empty")]
    EmptyStack(StackKind),

    /// The invoker's worker is gone, or dropped the request after it panicked
    #[error("Invoker is no longer running")]
    InvokerClosed,
}

impl CommandError {
    /// True for the rejection a keyboard shortcut handler is expected to ignore
    pub fn is_empty_stack(&self) -> bool {
        matches!(self, CommandError::EmptyStack(_))
    }

    /// True when a command itself failed while running against the graphics state
    pub fn is_execution_failure(&self) -> bool {
        matches!(
            self,
            CommandError::ExecutionFailed(_) | CommandError::UndoFailed(_)
        )
    }
}

impl From<GraphicsError> for CommandError {
    fn from(err: GraphicsError) -> Self {
        CommandError::ExecutionFailed(err.to_string())
    }
}

/// Trait for commands that support undo/redo
///
/// Every editing operation is a command. `execute` performs the change and
/// stores whatever it needs to reverse it on the command itself; `undo`
/// reverses it from that stored payload, never by diffing live state.
/// Executing the same command again (redo) captures the payload afresh.
///
/// Both operations may suspend, e.g. while an image is decoded. The graphics
/// state is borrowed exclusively for the whole call.
///
/// # Example
/// ```no_run
/// use pixel_invoker::command::trait_def::UndoableCommand;
/// use pixel_invoker::command::{CommandFactory, CommandKind, RotationType};
/// use pixel_invoker::graphics::MemoryGraphics;
///
/// # async fn demo() {
/// let mut graphics = MemoryGraphics::default();
/// let mut command = CommandFactory::create(CommandKind::Rotate(RotationType::SetAngle(30.0)));
///
/// let outcome = command.execute(&mut graphics).await.unwrap();
/// assert_eq!(outcome.angle(), Some(30.0));
///
/// command.undo(&mut graphics).await.unwrap();
/// # }
/// ```
pub trait UndoableCommand: Send {
    /// Execute the command
    ///
    /// Stores the previous state internally for undo capability.
    fn execute<G: GraphicsState>(
        &mut self,
        graphics: &mut G,
    ) -> impl Future<Output = CommandResult<Outcome>> + Send;

    /// Undo the command
    ///
    /// Restores the state to what it was before execute() was called.
    /// Fails with `UndoFailed` if execute() never captured a payload.
    fn undo<G: GraphicsState>(
        &mut self,
        graphics: &mut G,
    ) -> impl Future<Output = CommandResult<Outcome>> + Send;

    /// Kind of this command
    fn name(&self) -> CommandName;

    /// Get a human-readable description of the command
    ///
    /// Used for UI display (e.g., "Undo: Rotate by 90°")
    fn description(&self) -> String;
}
