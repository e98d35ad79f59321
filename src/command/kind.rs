// Command kinds and their arguments

use crate::command::trait_def::{CommandError, CommandResult};
use crate::graphics::{
    Dimension, FilterType, GraphicsObject, ObjectId, Point, PositionInfo, Props, ShapeType,
    mask_object_id,
};
use std::fmt;
use std::str::FromStr;

/// Argument-free tag of a command kind
///
/// The string form is the name used by loosely typed callers (scripting,
/// key bindings) and in log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    LoadImage,
    AddObject,
    AddImageObject,
    RemoveObject,
    Flip,
    Rotate,
    AddShape,
    ChangeShape,
    AddText,
    ChangeText,
    ChangeTextStyle,
    AddIcon,
    ChangeIconColor,
    ApplyFilter,
    RemoveFilter,
    SetObjectProperties,
    SetObjectPosition,
    ResizeCanvasDimension,
    ClearObjects,
}

impl CommandName {
    pub const ALL: [CommandName; 19] = [
        CommandName::LoadImage,
        CommandName::AddObject,
        CommandName::AddImageObject,
        CommandName::RemoveObject,
        CommandName::Flip,
        CommandName::Rotate,
        CommandName::AddShape,
        CommandName::ChangeShape,
        CommandName::AddText,
        CommandName::ChangeText,
        CommandName::ChangeTextStyle,
        CommandName::AddIcon,
        CommandName::ChangeIconColor,
        CommandName::ApplyFilter,
        CommandName::RemoveFilter,
        CommandName::SetObjectProperties,
        CommandName::SetObjectPosition,
        CommandName::ResizeCanvasDimension,
        CommandName::ClearObjects,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandName::LoadImage => "loadImage",
            CommandName::AddObject => "addObject",
            CommandName::AddImageObject => "addImageObject",
            CommandName::RemoveObject => "removeObject",
            CommandName::Flip => "flip",
            CommandName::Rotate => "rotate",
            CommandName::AddShape => "addShape",
            CommandName::ChangeShape => "changeShape",
            CommandName::AddText => "addText",
            CommandName::ChangeText => "changeText",
            CommandName::ChangeTextStyle => "changeTextStyle",
            CommandName::AddIcon => "addIcon",
            CommandName::ChangeIconColor => "changeIconColor",
            CommandName::ApplyFilter => "applyFilter",
            CommandName::RemoveFilter => "removeFilter",
            CommandName::SetObjectProperties => "setObjectProperties",
            CommandName::SetObjectPosition => "setObjectPosition",
            CommandName::ResizeCanvasDimension => "resizeCanvasDimension",
            CommandName::ClearObjects => "clearObjects",
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandName {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| CommandError::UnknownCommandKind(s.to_string()))
    }
}

/// Flip operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipType {
    FlipX,
    FlipY,
    /// Clear both axes and the angle
    Reset,
}

impl FromStr for FlipType {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flipX" => Ok(FlipType::FlipX),
            "flipY" => Ok(FlipType::FlipY),
            "reset" => Ok(FlipType::Reset),
            other => Err(CommandError::InvalidParameters(format!(
                "unknown flip type '{}'",
                other
            ))),
        }
    }
}

/// Rotation operations, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationType {
    /// Add to the current angle
    Rotate(f64),
    /// Replace the current angle
    SetAngle(f64),
}

impl RotationType {
    pub fn value(&self) -> f64 {
        match self {
            RotationType::Rotate(delta) => *delta,
            RotationType::SetAngle(angle) => *angle,
        }
    }
}

/// Options for a new text object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextOptions {
    /// Initial styles (fill, fontFamily, fontSize, fontStyle, ...)
    pub styles: Props,
    /// Initial position; the canvas center when absent
    pub position: Option<Point>,
}

/// A command request: the kind together with its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    LoadImage { name: String, url: String },
    /// Register an object that already has an id, e.g. one drawn directly on the canvas
    AddObject(GraphicsObject),
    AddImageObject { url: String },
    RemoveObject(ObjectId),
    Flip(FlipType),
    Rotate(RotationType),
    AddShape { shape_type: ShapeType, options: Props },
    ChangeShape { id: ObjectId, options: Props },
    AddText { text: String, options: TextOptions },
    ChangeText { id: ObjectId, text: String },
    ChangeTextStyle { id: ObjectId, styles: Props },
    AddIcon { icon_type: String, options: Props },
    ChangeIconColor { id: ObjectId, color: String },
    ApplyFilter { filter_type: FilterType, options: Props },
    RemoveFilter(FilterType),
    SetObjectProperties { id: ObjectId, props: Props },
    SetObjectPosition { id: ObjectId, position: PositionInfo },
    ResizeCanvasDimension(Dimension),
    ClearObjects,
}

impl CommandKind {
    pub fn name(&self) -> CommandName {
        match self {
            CommandKind::LoadImage { .. } => CommandName::LoadImage,
            CommandKind::AddObject(_) => CommandName::AddObject,
            CommandKind::AddImageObject { .. } => CommandName::AddImageObject,
            CommandKind::RemoveObject(_) => CommandName::RemoveObject,
            CommandKind::Flip(_) => CommandName::Flip,
            CommandKind::Rotate(_) => CommandName::Rotate,
            CommandKind::AddShape { .. } => CommandName::AddShape,
            CommandKind::ChangeShape { .. } => CommandName::ChangeShape,
            CommandKind::AddText { .. } => CommandName::AddText,
            CommandKind::ChangeText { .. } => CommandName::ChangeText,
            CommandKind::ChangeTextStyle { .. } => CommandName::ChangeTextStyle,
            CommandKind::AddIcon { .. } => CommandName::AddIcon,
            CommandKind::ChangeIconColor { .. } => CommandName::ChangeIconColor,
            CommandKind::ApplyFilter { .. } => CommandName::ApplyFilter,
            CommandKind::RemoveFilter(_) => CommandName::RemoveFilter,
            CommandKind::SetObjectProperties { .. } => CommandName::SetObjectProperties,
            CommandKind::SetObjectPosition { .. } => CommandName::SetObjectPosition,
            CommandKind::ResizeCanvasDimension(_) => CommandName::ResizeCanvasDimension,
            CommandKind::ClearObjects => CommandName::ClearObjects,
        }
    }

    /// Reject malformed arguments before any command is built
    ///
    /// Only checks what can be decided without the graphics state; missing
    /// objects and undecodable images surface later as execution failures.
    pub fn validate(&self) -> CommandResult<()> {
        match self {
            CommandKind::LoadImage { name, url } => {
                if name.is_empty() || url.is_empty() {
                    return Err(invalid("loadImage requires an image name and a url"));
                }
            }
            CommandKind::AddImageObject { url } => {
                if url.is_empty() {
                    return Err(invalid("addImageObject requires a url"));
                }
            }
            CommandKind::Rotate(rotation) => {
                if !rotation.value().is_finite() {
                    return Err(invalid("angle must be a finite number"));
                }
            }
            CommandKind::AddIcon { icon_type, .. } => {
                if icon_type.is_empty() {
                    return Err(invalid("addIcon requires an icon type"));
                }
            }
            CommandKind::ChangeIconColor { color, .. } => {
                if color.is_empty() {
                    return Err(invalid("changeIconColor requires a color"));
                }
            }
            CommandKind::ApplyFilter {
                filter_type: FilterType::Mask,
                options,
            } => {
                if mask_object_id(options).is_none() {
                    return Err(invalid("mask filter requires a numeric maskObjId"));
                }
            }
            CommandKind::SetObjectPosition { position, .. } => {
                if !position.x.is_finite() || !position.y.is_finite() {
                    return Err(invalid("position must be finite"));
                }
            }
            CommandKind::ResizeCanvasDimension(dimension) => {
                if dimension.width == 0 || dimension.height == 0 {
                    return Err(invalid("canvas dimension must be non-zero"));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn invalid(message: &str) -> CommandError {
    CommandError::InvalidParameters(message.to_string())
}
