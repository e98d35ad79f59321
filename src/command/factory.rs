// CommandFactory - builds commands from command kinds

use crate::command::commands::{
    ApplyFilterCommand, FlipCommand, LoadImageCommand, RemoveFilterCommand,
    ResizeCanvasDimensionCommand, RotateCommand,
};
use crate::command::kind::{CommandKind, CommandName};
use crate::command::object_commands::{
    AddIconCommand, AddImageObjectCommand, AddObjectCommand, AddShapeCommand, AddTextCommand,
    ChangeIconColorCommand, ChangeShapeCommand, ChangeTextCommand, ChangeTextStyleCommand,
    ClearObjectsCommand, RemoveObjectCommand, SetObjectPositionCommand,
    SetObjectPropertiesCommand,
};
use crate::command::outcome::Outcome;
use crate::command::trait_def::{CommandResult, UndoableCommand};
use crate::graphics::{GraphicsObject, GraphicsState};

/// A command of any kind, as stored in the history stacks
pub enum Command {
    LoadImage(LoadImageCommand),
    AddObject(AddObjectCommand),
    AddImageObject(AddImageObjectCommand),
    RemoveObject(RemoveObjectCommand),
    Flip(FlipCommand),
    Rotate(RotateCommand),
    AddShape(AddShapeCommand),
    ChangeShape(ChangeShapeCommand),
    AddText(AddTextCommand),
    ChangeText(ChangeTextCommand),
    ChangeTextStyle(ChangeTextStyleCommand),
    AddIcon(AddIconCommand),
    ChangeIconColor(ChangeIconColorCommand),
    ApplyFilter(ApplyFilterCommand),
    RemoveFilter(RemoveFilterCommand),
    SetObjectProperties(SetObjectPropertiesCommand),
    SetObjectPosition(SetObjectPositionCommand),
    ResizeCanvasDimension(ResizeCanvasDimensionCommand),
    ClearObjects(ClearObjectsCommand),
}

/// Forward a call to the wrapped command, whatever its kind
macro_rules! dispatch {
    ($command:expr, $inner:ident => $call:expr) => {
        match $command {
            Command::LoadImage($inner) => $call,
            Command::AddObject($inner) => $call,
            Command::AddImageObject($inner) => $call,
            Command::RemoveObject($inner) => $call,
            Command::Flip($inner) => $call,
            Command::Rotate($inner) => $call,
            Command::AddShape($inner) => $call,
            Command::ChangeShape($inner) => $call,
            Command::AddText($inner) => $call,
            Command::ChangeText($inner) => $call,
            Command::ChangeTextStyle($inner) => $call,
            Command::AddIcon($inner) => $call,
            Command::ChangeIconColor($inner) => $call,
            Command::ApplyFilter($inner) => $call,
            Command::RemoveFilter($inner) => $call,
            Command::SetObjectProperties($inner) => $call,
            Command::SetObjectPosition($inner) => $call,
            Command::ResizeCanvasDimension($inner) => $call,
            Command::ClearObjects($inner) => $call,
        }
    };
}

impl Command {
    /// Command registering an object that is already on the canvas
    ///
    /// Meant for `Invoker::push_undo_stack` after the user drew the object
    /// directly; undo removes it and redo puts it back.
    pub fn add_object(object: GraphicsObject) -> Self {
        Command::AddObject(AddObjectCommand::new(object))
    }
}

impl UndoableCommand for Command {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        dispatch!(self, command => command.execute(graphics).await)
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        dispatch!(self, command => command.undo(graphics).await)
    }

    fn name(&self) -> CommandName {
        dispatch!(self, command => command.name())
    }

    fn description(&self) -> String {
        dispatch!(self, command => command.description())
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name())
            .field("description", &self.description())
            .finish()
    }
}

/// Maps a command kind and its arguments to a fresh command
///
/// The returned command has captured nothing yet; the graphics state is
/// only touched once it is executed.
pub struct CommandFactory;

impl CommandFactory {
    pub fn create(kind: CommandKind) -> Command {
        match kind {
            CommandKind::LoadImage { name, url } => {
                Command::LoadImage(LoadImageCommand::new(name, url))
            }
            CommandKind::AddObject(object) => Command::AddObject(AddObjectCommand::new(object)),
            CommandKind::AddImageObject { url } => {
                Command::AddImageObject(AddImageObjectCommand::new(url))
            }
            CommandKind::RemoveObject(id) => Command::RemoveObject(RemoveObjectCommand::new(id)),
            CommandKind::Flip(flip) => Command::Flip(FlipCommand::new(flip)),
            CommandKind::Rotate(rotation) => Command::Rotate(RotateCommand::new(rotation)),
            CommandKind::AddShape {
                shape_type,
                options,
            } => Command::AddShape(AddShapeCommand::new(shape_type, options)),
            CommandKind::ChangeShape { id, options } => {
                Command::ChangeShape(ChangeShapeCommand::new(id, options))
            }
            CommandKind::AddText { text, options } => {
                Command::AddText(AddTextCommand::new(text, options))
            }
            CommandKind::ChangeText { id, text } => {
                Command::ChangeText(ChangeTextCommand::new(id, text))
            }
            CommandKind::ChangeTextStyle { id, styles } => {
                Command::ChangeTextStyle(ChangeTextStyleCommand::new(id, styles))
            }
            CommandKind::AddIcon { icon_type, options } => {
                Command::AddIcon(AddIconCommand::new(icon_type, options))
            }
            CommandKind::ChangeIconColor { id, color } => {
                Command::ChangeIconColor(ChangeIconColorCommand::new(id, color))
            }
            CommandKind::ApplyFilter {
                filter_type,
                options,
            } => Command::ApplyFilter(ApplyFilterCommand::new(filter_type, options)),
            CommandKind::RemoveFilter(filter_type) => {
                Command::RemoveFilter(RemoveFilterCommand::new(filter_type))
            }
            CommandKind::SetObjectProperties { id, props } => {
                Command::SetObjectProperties(SetObjectPropertiesCommand::new(id, props))
            }
            CommandKind::SetObjectPosition { id, position } => {
                Command::SetObjectPosition(SetObjectPositionCommand::new(id, position))
            }
            CommandKind::ResizeCanvasDimension(dimension) => {
                Command::ResizeCanvasDimension(ResizeCanvasDimensionCommand::new(dimension))
            }
            CommandKind::ClearObjects => Command::ClearObjects(ClearObjectsCommand::new()),
        }
    }
}
