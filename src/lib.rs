// Pixel Invoker - undoable command execution for an image editor canvas

pub mod command;
pub mod config;
pub mod graphics;
pub mod messaging;

// Re-export commonly used types for convenience
pub use command::{
    Command, CommandError, CommandFactory, CommandKind, CommandName, CommandResult, FlipType,
    Invoker, Outcome, RotationType, StackKind, TextOptions, UndoableCommand,
};
pub use config::{ConfigError, InvokerConfig};
pub use graphics::{GraphicsError, GraphicsState, MemoryGraphics};
pub use messaging::{ListenerId, StackEvent};
