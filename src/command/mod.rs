// Command Pattern for Undo/Redo functionality
//
// Every editing operation on the canvas is a command. Commands are built by
// the CommandFactory from a CommandKind, run by the Invoker against a
// GraphicsState, and kept on its undo/redo stacks.
//
// Architecture:
// - UndoableCommand trait: Defines execute(), undo(), description()
// - Concrete commands: LoadImageCommand, RotateCommand, AddShapeCommand, etc.
// - Command enum + CommandFactory: one closed set of command kinds
// - CommandHistory: Manages undo/redo stacks
// - Invoker: FIFO worker serializing execute/undo/redo, notifies listeners
//
// Each command stores its own undo payload when it executes. Undo restores
// from that payload; redo executes the same command again.

pub mod commands;
pub mod factory;
pub mod invoker;
pub mod kind;
pub mod manager;
pub mod object_commands;
pub mod outcome;
pub mod trait_def;

pub use factory::{Command, CommandFactory};
pub use invoker::Invoker;
pub use kind::{CommandKind, CommandName, FlipType, RotationType, TextOptions};
pub use manager::CommandHistory;
pub use outcome::{
    FilterAction, FilterResult, FlipStatus, ObjectProps, Outcome, RotateStatus, SizeChange,
};
pub use trait_def::{CommandError, CommandResult, StackKind, UndoableCommand};
