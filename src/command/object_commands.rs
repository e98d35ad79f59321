// Concrete command implementations for editable objects

use crate::command::kind::{CommandName, TextOptions};
use crate::command::outcome::{ObjectProps, Outcome};
use crate::command::trait_def::{CommandError, CommandResult, UndoableCommand};
use crate::graphics::{
    GraphicsObject, GraphicsState, ObjectId, ObjectKind, PositionInfo, Props, ShapeType,
};
use serde_json::{Value, json};

fn object_outcome<G: GraphicsState>(graphics: &G, id: ObjectId) -> CommandResult<Outcome> {
    graphics
        .object(id)
        .map(|object| Outcome::Object(ObjectProps::from(object)))
        .ok_or_else(|| CommandError::ExecutionFailed(format!("Object not found: {}", id)))
}

/// Place the object at the center of the working area unless positioned
fn default_position<G: GraphicsState>(graphics: &G, props: &mut Props) {
    let center = graphics.center();
    props.entry("left").or_insert(json!(center.x));
    props.entry("top").or_insert(json!(center.y));
}

/// Undo payload shared by every command that creates an object
///
/// The first execute lets the graphics state create the object. Undo keeps
/// the removed object so that redo puts back the very same object (same id,
/// same resolved properties) instead of creating a new one.
#[derive(Debug, Default)]
struct CreatedObject {
    id: Option<ObjectId>,
    removed: Option<GraphicsObject>,
}

impl CreatedObject {
    /// Put the object back after an undo. Returns its id, or None on first execute.
    fn reinsert<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Option<ObjectId>> {
        let Some(object) = &self.removed else {
            return Ok(None);
        };

        let id = object.id;
        graphics.insert_object(object.clone(), None)?;
        self.removed = None;
        Ok(Some(id))
    }

    fn created<G: GraphicsState>(&mut self, graphics: &G, id: ObjectId) -> CommandResult<Outcome> {
        self.id = Some(id);
        object_outcome(graphics, id)
    }

    fn remove<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let id = self
            .id
            .ok_or_else(|| CommandError::UndoFailed("No created object stored".into()))?;

        let (_, object) = graphics.remove_object(id)?;
        let outcome = Outcome::Object(ObjectProps::from(&object));
        self.removed = Some(object);
        Ok(outcome)
    }
}

/// Command to register an object that already carries an id
///
/// Used for objects drawn directly on the canvas: the object may already be
/// present when the command runs, in which case execute only reports it.
pub struct AddObjectCommand {
    object: GraphicsObject,
}

impl AddObjectCommand {
    pub fn new(object: GraphicsObject) -> Self {
        Self { object }
    }
}

impl UndoableCommand for AddObjectCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        if graphics.object(self.object.id).is_none() {
            graphics.insert_object(self.object.clone(), None)?;
        }
        object_outcome(graphics, self.object.id)
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let (_, object) = graphics.remove_object(self.object.id)?;
        let outcome = Outcome::Object(ObjectProps::from(&object));
        // Keep edits made while the object was live
        self.object = object;
        Ok(outcome)
    }

    fn name(&self) -> CommandName {
        CommandName::AddObject
    }

    fn description(&self) -> String {
        format!("Add {} #{}", self.object.kind.type_name(), self.object.id)
    }
}

/// Command to add an image object loaded from a url
pub struct AddImageObjectCommand {
    url: String,
    created: CreatedObject,
}

impl AddImageObjectCommand {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            created: CreatedObject::default(),
        }
    }
}

impl UndoableCommand for AddImageObjectCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let id = match self.created.reinsert(graphics)? {
            Some(id) => id,
            None => graphics.create_image_object(&self.url).await?,
        };
        self.created.created(graphics, id)
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.created.remove(graphics)
    }

    fn name(&self) -> CommandName {
        CommandName::AddImageObject
    }

    fn description(&self) -> String {
        format!("Add Image '{}'", self.url)
    }
}

/// Command to draw a shape
pub struct AddShapeCommand {
    shape_type: ShapeType,
    options: Props,
    created: CreatedObject,
}

impl AddShapeCommand {
    pub fn new(shape_type: ShapeType, options: Props) -> Self {
        Self {
            shape_type,
            options,
            created: CreatedObject::default(),
        }
    }
}

impl UndoableCommand for AddShapeCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let id = match self.created.reinsert(graphics)? {
            Some(id) => id,
            None => {
                let mut props = self.options.clone();
                default_position(graphics, &mut props);
                graphics.add_object(ObjectKind::Shape(self.shape_type), props)?
            }
        };
        self.created.created(graphics, id)
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.created.remove(graphics)
    }

    fn name(&self) -> CommandName {
        CommandName::AddShape
    }

    fn description(&self) -> String {
        format!("Add Shape ({})", self.shape_type.as_str())
    }
}

/// Command to add a text object
pub struct AddTextCommand {
    text: String,
    options: TextOptions,
    created: CreatedObject,
}

impl AddTextCommand {
    pub fn new(text: impl Into<String>, options: TextOptions) -> Self {
        Self {
            text: text.into(),
            options,
            created: CreatedObject::default(),
        }
    }
}

impl UndoableCommand for AddTextCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let id = match self.created.reinsert(graphics)? {
            Some(id) => id,
            None => {
                let mut props = self.options.styles.clone();
                props.insert("text".into(), json!(self.text));
                if let Some(position) = self.options.position {
                    props.insert("left".into(), json!(position.x));
                    props.insert("top".into(), json!(position.y));
                }
                default_position(graphics, &mut props);
                graphics.add_object(ObjectKind::Text, props)?
            }
        };
        self.created.created(graphics, id)
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.created.remove(graphics)
    }

    fn name(&self) -> CommandName {
        CommandName::AddText
    }

    fn description(&self) -> String {
        format!("Add Text '{}'", self.text)
    }
}

/// Command to add an icon of a registered icon type
pub struct AddIconCommand {
    icon_type: String,
    options: Props,
    created: CreatedObject,
}

impl AddIconCommand {
    pub fn new(icon_type: impl Into<String>, options: Props) -> Self {
        Self {
            icon_type: icon_type.into(),
            options,
            created: CreatedObject::default(),
        }
    }
}

impl UndoableCommand for AddIconCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let id = match self.created.reinsert(graphics)? {
            Some(id) => id,
            None => {
                if !graphics.has_icon(&self.icon_type) {
                    return Err(CommandError::ExecutionFailed(format!(
                        "Unknown icon type: {}",
                        self.icon_type
                    )));
                }
                let mut props = self.options.clone();
                default_position(graphics, &mut props);
                graphics.add_object(ObjectKind::Icon(self.icon_type.clone()), props)?
            }
        };
        self.created.created(graphics, id)
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.created.remove(graphics)
    }

    fn name(&self) -> CommandName {
        CommandName::AddIcon
    }

    fn description(&self) -> String {
        format!("Add Icon ({})", self.icon_type)
    }
}

/// Command to remove an object or a group
pub struct RemoveObjectCommand {
    id: ObjectId,
    removed: Option<(usize, GraphicsObject)>,
}

impl RemoveObjectCommand {
    pub fn new(id: ObjectId) -> Self {
        Self { id, removed: None }
    }
}

impl UndoableCommand for RemoveObjectCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let (index, object) = graphics.remove_object(self.id)?;
        let outcome = Outcome::Object(ObjectProps::from(&object));
        self.removed = Some((index, object));
        Ok(outcome)
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let (index, object) = self
            .removed
            .clone()
            .ok_or_else(|| CommandError::UndoFailed("No removed object stored".into()))?;

        graphics.insert_object(object, Some(index))?;
        object_outcome(graphics, self.id)
    }

    fn name(&self) -> CommandName {
        CommandName::RemoveObject
    }

    fn description(&self) -> String {
        format!("Remove Object #{}", self.id)
    }
}

/// Command to remove every object from the canvas
pub struct ClearObjectsCommand {
    removed: Option<Vec<GraphicsObject>>,
}

impl ClearObjectsCommand {
    pub fn new() -> Self {
        Self { removed: None }
    }
}

impl Default for ClearObjectsCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoableCommand for ClearObjectsCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let removed = graphics.clear_objects();
        let ids = removed.iter().map(|object| object.id).collect();
        self.removed = Some(removed);
        Ok(Outcome::ObjectIds(ids))
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let removed = self
            .removed
            .clone()
            .ok_or_else(|| CommandError::UndoFailed("No cleared objects stored".into()))?;

        let ids = removed.iter().map(|object| object.id).collect();
        graphics.restore_objects(removed);
        Ok(Outcome::ObjectIds(ids))
    }

    fn name(&self) -> CommandName {
        CommandName::ClearObjects
    }

    fn description(&self) -> String {
        "Clear Objects".to_string()
    }
}

/// Which objects a property patch may target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatchTarget {
    Any,
    Shape,
    Text,
    Icon,
}

impl PatchTarget {
    fn accepts(&self, kind: &ObjectKind) -> bool {
        match self {
            PatchTarget::Any => true,
            PatchTarget::Shape => matches!(kind, ObjectKind::Shape(_)),
            PatchTarget::Text => matches!(kind, ObjectKind::Text),
            PatchTarget::Icon => matches!(kind, ObjectKind::Icon(_)),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PatchTarget::Any => "object",
            PatchTarget::Shape => "shape",
            PatchTarget::Text => "text",
            PatchTarget::Icon => "icon",
        }
    }
}

/// Partial property update; the undo payload holds only the prior values of the patched keys
#[derive(Debug)]
struct PropertyPatch {
    id: ObjectId,
    target: PatchTarget,
    patch: Props,
    previous: Option<Props>,
}

impl PropertyPatch {
    fn new(id: ObjectId, target: PatchTarget, patch: Props) -> Self {
        Self {
            id,
            target,
            patch,
            previous: None,
        }
    }

    fn check_target<G: GraphicsState>(&self, graphics: &G) -> CommandResult<()> {
        let object = graphics
            .object(self.id)
            .ok_or_else(|| CommandError::ExecutionFailed(format!("Object not found: {}", self.id)))?;

        if !self.target.accepts(&object.kind) {
            return Err(CommandError::ExecutionFailed(format!(
                "Object {} is not a {}",
                self.id,
                self.target.label()
            )));
        }
        Ok(())
    }

    fn patched_keys(&self) -> Vec<String> {
        self.patch.keys().cloned().collect()
    }

    fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.check_target(graphics)?;

        let previous = graphics.object_properties(self.id, &self.patched_keys())?;
        graphics.set_object_properties(self.id, &self.patch)?;
        self.previous = Some(previous);

        object_outcome(graphics, self.id)
    }

    fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let previous = self
            .previous
            .as_ref()
            .ok_or_else(|| CommandError::UndoFailed("No previous properties stored".into()))?;

        graphics.set_object_properties(self.id, previous)?;
        object_outcome(graphics, self.id)
    }
}

fn single_prop(key: &str, value: Value) -> Props {
    let mut props = Props::new();
    props.insert(key.to_string(), value);
    props
}

/// Command to change the properties of a shape
pub struct ChangeShapeCommand {
    patch: PropertyPatch,
}

impl ChangeShapeCommand {
    pub fn new(id: ObjectId, options: Props) -> Self {
        Self {
            patch: PropertyPatch::new(id, PatchTarget::Shape, options),
        }
    }
}

impl UndoableCommand for ChangeShapeCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.patch.execute(graphics)
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.patch.undo(graphics)
    }

    fn name(&self) -> CommandName {
        CommandName::ChangeShape
    }

    fn description(&self) -> String {
        format!("Change Shape #{}", self.patch.id)
    }
}

/// Command to replace the contents of a text object
pub struct ChangeTextCommand {
    patch: PropertyPatch,
}

impl ChangeTextCommand {
    pub fn new(id: ObjectId, text: impl Into<String>) -> Self {
        let text: String = text.into();
        Self {
            patch: PropertyPatch::new(id, PatchTarget::Text, single_prop("text", json!(text))),
        }
    }
}

impl UndoableCommand for ChangeTextCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.patch.execute(graphics)
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.patch.undo(graphics)
    }

    fn name(&self) -> CommandName {
        CommandName::ChangeText
    }

    fn description(&self) -> String {
        format!("Change Text #{}", self.patch.id)
    }
}

/// Command to change the style of a text object
pub struct ChangeTextStyleCommand {
    patch: PropertyPatch,
}

impl ChangeTextStyleCommand {
    pub fn new(id: ObjectId, styles: Props) -> Self {
        Self {
            patch: PropertyPatch::new(id, PatchTarget::Text, styles),
        }
    }
}

impl UndoableCommand for ChangeTextStyleCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.patch.execute(graphics)
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.patch.undo(graphics)
    }

    fn name(&self) -> CommandName {
        CommandName::ChangeTextStyle
    }

    fn description(&self) -> String {
        format!("Change Text Style #{}", self.patch.id)
    }
}

/// Command to recolor an icon
pub struct ChangeIconColorCommand {
    patch: PropertyPatch,
}

impl ChangeIconColorCommand {
    pub fn new(id: ObjectId, color: impl Into<String>) -> Self {
        let color: String = color.into();
        Self {
            patch: PropertyPatch::new(id, PatchTarget::Icon, single_prop("fill", json!(color))),
        }
    }
}

impl UndoableCommand for ChangeIconColorCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.patch.execute(graphics)
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.patch.undo(graphics)
    }

    fn name(&self) -> CommandName {
        CommandName::ChangeIconColor
    }

    fn description(&self) -> String {
        format!("Change Icon Color #{}", self.patch.id)
    }
}

/// Command to set arbitrary properties on any object
pub struct SetObjectPropertiesCommand {
    patch: PropertyPatch,
}

impl SetObjectPropertiesCommand {
    pub fn new(id: ObjectId, props: Props) -> Self {
        Self {
            patch: PropertyPatch::new(id, PatchTarget::Any, props),
        }
    }
}

impl UndoableCommand for SetObjectPropertiesCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.patch.execute(graphics)
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.patch.undo(graphics)
    }

    fn name(&self) -> CommandName {
        CommandName::SetObjectProperties
    }

    fn description(&self) -> String {
        format!("Set Properties #{}", self.patch.id)
    }
}

/// Command to move an object to a position given for one of its origins
///
/// The graphics state computes the resulting left/top; only those two keys
/// are kept for undo.
pub struct SetObjectPositionCommand {
    id: ObjectId,
    position: PositionInfo,
    previous: Option<Props>,
}

impl SetObjectPositionCommand {
    pub fn new(id: ObjectId, position: PositionInfo) -> Self {
        Self {
            id,
            position,
            previous: None,
        }
    }
}

impl UndoableCommand for SetObjectPositionCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let keys = ["left".to_string(), "top".to_string()];
        let previous = graphics.object_properties(self.id, &keys)?;
        graphics.set_object_position(self.id, &self.position)?;
        self.previous = Some(previous);

        object_outcome(graphics, self.id)
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let previous = self
            .previous
            .as_ref()
            .ok_or_else(|| CommandError::UndoFailed("No previous position stored".into()))?;

        graphics.set_object_properties(self.id, previous)?;
        object_outcome(graphics, self.id)
    }

    fn name(&self) -> CommandName {
        CommandName::SetObjectPosition
    }

    fn description(&self) -> String {
        format!(
            "Move Object #{} to ({}, {})",
            self.id, self.position.x, self.position.y
        )
    }
}
