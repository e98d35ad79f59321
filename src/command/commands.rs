// Concrete command implementations for the image and canvas

use crate::command::kind::{CommandName, FlipType, RotationType};
use crate::command::outcome::{FilterAction, FilterResult, FlipStatus, Outcome, RotateStatus, SizeChange};
use crate::command::trait_def::{CommandError, CommandResult, UndoableCommand};
use crate::graphics::{
    CanvasImage, Dimension, Filter, FilterType, GraphicsObject, GraphicsState, ImageTransform,
    Props, mask_object_id,
};

/// Normalize an angle into (-360, 360), keeping its sign
///
/// `setAngle(5)` followed by `rotate(-95)` gives -90, not 270.
pub fn normalize_angle(angle: f64) -> f64 {
    let normalized = angle % 360.0;
    if normalized == 0.0 { 0.0 } else { normalized }
}

fn size_of(image: Option<&CanvasImage>) -> (u32, u32) {
    image.map_or((0, 0), |image| (image.width, image.height))
}

/// State replaced by a load, restored as a whole on undo
#[derive(Debug, Clone)]
struct LoadImageUndo {
    image: Option<CanvasImage>,
    transform: ImageTransform,
    filters: Vec<Filter>,
    objects: Vec<GraphicsObject>,
}

/// Command to replace the working image
///
/// Loading starts the new image from a clean slate: baseline transform,
/// no filters and no objects. The replaced image and everything drawn on
/// it is kept for undo.
pub struct LoadImageCommand {
    name: String,
    url: String,
    previous: Option<LoadImageUndo>,
}

impl LoadImageCommand {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            previous: None,
        }
    }
}

impl UndoableCommand for LoadImageCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        // Decode first; nothing is touched if it fails
        let image = graphics.load_image(&self.name, &self.url).await?;

        let previous = LoadImageUndo {
            image: graphics.image().cloned(),
            transform: graphics.transform(),
            filters: graphics.filters().to_vec(),
            objects: graphics.clear_objects(),
        };
        let (old_width, old_height) = size_of(previous.image.as_ref());
        let (new_width, new_height) = (image.width, image.height);

        graphics.set_image(Some(image));
        graphics.set_transform(ImageTransform::default());
        graphics.set_filters(Vec::new());
        self.previous = Some(previous);

        Ok(Outcome::SizeChange(SizeChange {
            old_width,
            old_height,
            new_width,
            new_height,
        }))
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let previous = self
            .previous
            .clone()
            .ok_or_else(|| CommandError::UndoFailed("No previous image stored".into()))?;

        let (old_width, old_height) = size_of(graphics.image());
        let (new_width, new_height) = size_of(previous.image.as_ref());

        graphics.clear_objects();
        graphics.set_image(previous.image);
        graphics.set_transform(previous.transform);
        graphics.set_filters(previous.filters);
        graphics.restore_objects(previous.objects);

        Ok(Outcome::SizeChange(SizeChange {
            old_width,
            old_height,
            new_width,
            new_height,
        }))
    }

    fn name(&self) -> CommandName {
        CommandName::LoadImage
    }

    fn description(&self) -> String {
        format!("Load Image '{}'", self.name)
    }
}

/// Command to flip the image or reset its flip state
pub struct FlipCommand {
    flip: FlipType,
    previous: Option<ImageTransform>,
}

impl FlipCommand {
    pub fn new(flip: FlipType) -> Self {
        Self {
            flip,
            previous: None,
        }
    }
}

impl UndoableCommand for FlipCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let current = graphics.transform();
        let flipped = match self.flip {
            FlipType::FlipX => ImageTransform {
                flip_x: !current.flip_x,
                ..current
            },
            FlipType::FlipY => ImageTransform {
                flip_y: !current.flip_y,
                ..current
            },
            FlipType::Reset => ImageTransform::default(),
        };

        graphics.set_transform(flipped);
        self.previous = Some(current);

        Ok(Outcome::Flip(FlipStatus::from(flipped)))
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let previous = self
            .previous
            .ok_or_else(|| CommandError::UndoFailed("No previous flip state stored".into()))?;

        graphics.set_transform(previous);

        Ok(Outcome::Flip(FlipStatus::from(previous)))
    }

    fn name(&self) -> CommandName {
        CommandName::Flip
    }

    fn description(&self) -> String {
        match self.flip {
            FlipType::FlipX => "Flip X".to_string(),
            FlipType::FlipY => "Flip Y".to_string(),
            FlipType::Reset => "Reset Flip".to_string(),
        }
    }
}

/// Command to rotate the image by a delta or to an absolute angle
pub struct RotateCommand {
    rotation: RotationType,
    old_angle: Option<f64>,
}

impl RotateCommand {
    pub fn new(rotation: RotationType) -> Self {
        Self {
            rotation,
            old_angle: None,
        }
    }
}

impl UndoableCommand for RotateCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let transform = graphics.transform();
        let angle = match self.rotation {
            RotationType::Rotate(delta) => normalize_angle(transform.angle + delta),
            RotationType::SetAngle(angle) => normalize_angle(angle),
        };

        graphics.set_transform(ImageTransform { angle, ..transform });
        self.old_angle = Some(transform.angle);

        Ok(Outcome::Rotate(RotateStatus { angle }))
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let angle = self
            .old_angle
            .ok_or_else(|| CommandError::UndoFailed("No previous angle stored".into()))?;

        let transform = graphics.transform();
        graphics.set_transform(ImageTransform { angle, ..transform });

        Ok(Outcome::Rotate(RotateStatus { angle }))
    }

    fn name(&self) -> CommandName {
        CommandName::Rotate
    }

    fn description(&self) -> String {
        match self.rotation {
            RotationType::Rotate(delta) => format!("Rotate by {}°", delta),
            RotationType::SetAngle(angle) => format!("Set Angle to {}°", angle),
        }
    }
}

/// What an applied filter replaced
#[derive(Debug, Clone)]
struct ApplyFilterUndo {
    /// Filter of the same type that was active before, with its index
    replaced: Option<(usize, Filter)>,
    /// Mask object taken off the canvas, with its z-order index
    mask: Option<(usize, GraphicsObject)>,
}

/// Put back the filter of `filter_type` that was active before, or drop it
///
/// The earlier filter is reinstated as captured, without validating its
/// options again (a previous mask no longer has its object on the canvas).
fn restore_filter<G: GraphicsState>(
    graphics: &mut G,
    filter_type: FilterType,
    replaced: Option<(usize, Filter)>,
) {
    match replaced {
        Some((index, filter)) => graphics.insert_filter(index, filter),
        None => {
            let _ = graphics.remove_filter(filter_type);
        }
    }
}

/// Command to add a filter or update the options of an active one
///
/// A mask filter consumes its masking object: the object leaves the canvas
/// and comes back on undo.
pub struct ApplyFilterCommand {
    filter_type: FilterType,
    options: Props,
    previous: Option<ApplyFilterUndo>,
}

impl ApplyFilterCommand {
    pub fn new(filter_type: FilterType, options: Props) -> Self {
        Self {
            filter_type,
            options,
            previous: None,
        }
    }
}

impl UndoableCommand for ApplyFilterCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let mask_id = match self.filter_type {
            FilterType::Mask => {
                let id = mask_object_id(&self.options).ok_or_else(|| {
                    CommandError::ExecutionFailed("mask filter requires maskObjId".into())
                })?;
                if graphics.object(id).is_none() {
                    return Err(CommandError::ExecutionFailed(format!(
                        "Mask object not found: {}",
                        id
                    )));
                }
                Some(id)
            }
            _ => None,
        };

        let replaced = graphics
            .filters()
            .iter()
            .enumerate()
            .find(|(_, filter)| filter.filter_type == self.filter_type)
            .map(|(index, filter)| (index, filter.clone()));

        graphics
            .apply_filter(Filter::new(self.filter_type, self.options.clone()))
            .await?;

        let mask = match mask_id {
            Some(id) => match graphics.remove_object(id) {
                Ok(removed) => Some(removed),
                Err(err) => {
                    // Leave the filter list as it was
                    restore_filter(graphics, self.filter_type, replaced);
                    return Err(err.into());
                }
            },
            None => None,
        };
        self.previous = Some(ApplyFilterUndo { replaced, mask });

        Ok(Outcome::Filter(FilterResult {
            filter_type: self.filter_type,
            action: FilterAction::Add,
        }))
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let previous = self
            .previous
            .clone()
            .ok_or_else(|| CommandError::UndoFailed("No previous filter state stored".into()))?;

        // Check everything that can fail before touching the graphics state
        if !graphics
            .filters()
            .iter()
            .any(|filter| filter.filter_type == self.filter_type)
        {
            return Err(CommandError::ExecutionFailed(format!(
                "Filter not applied: {}",
                self.filter_type
            )));
        }
        if let Some((_, object)) = &previous.mask {
            if graphics.object(object.id).is_some() {
                return Err(CommandError::ExecutionFailed(format!(
                    "Object already exists: {}",
                    object.id
                )));
            }
        }

        let action = if previous.replaced.is_some() {
            FilterAction::Add
        } else {
            FilterAction::Remove
        };
        restore_filter(graphics, self.filter_type, previous.replaced);

        if let Some((index, object)) = previous.mask {
            graphics.insert_object(object, Some(index))?;
        }

        Ok(Outcome::Filter(FilterResult {
            filter_type: self.filter_type,
            action,
        }))
    }

    fn name(&self) -> CommandName {
        CommandName::ApplyFilter
    }

    fn description(&self) -> String {
        format!("Apply Filter {}", self.filter_type)
    }
}

/// Command to remove an active filter
pub struct RemoveFilterCommand {
    filter_type: FilterType,
    removed: Option<(usize, Filter)>,
}

impl RemoveFilterCommand {
    pub fn new(filter_type: FilterType) -> Self {
        Self {
            filter_type,
            removed: None,
        }
    }
}

impl UndoableCommand for RemoveFilterCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.removed = Some(graphics.remove_filter(self.filter_type)?);

        Ok(Outcome::Filter(FilterResult {
            filter_type: self.filter_type,
            action: FilterAction::Remove,
        }))
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let (index, filter) = self
            .removed
            .clone()
            .ok_or_else(|| CommandError::UndoFailed("No removed filter stored".into()))?;

        graphics.insert_filter(index, filter);

        Ok(Outcome::Filter(FilterResult {
            filter_type: self.filter_type,
            action: FilterAction::Add,
        }))
    }

    fn name(&self) -> CommandName {
        CommandName::RemoveFilter
    }

    fn description(&self) -> String {
        format!("Remove Filter {}", self.filter_type)
    }
}

/// Command to change the canvas dimension
pub struct ResizeCanvasDimensionCommand {
    dimension: Dimension,
    old_dimension: Option<Dimension>,
}

impl ResizeCanvasDimensionCommand {
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            old_dimension: None,
        }
    }
}

impl UndoableCommand for ResizeCanvasDimensionCommand {
    async fn execute<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        self.old_dimension = Some(graphics.canvas_dimension());
        graphics.set_canvas_dimension(self.dimension);

        Ok(Outcome::Dimension(self.dimension))
    }

    async fn undo<G: GraphicsState>(&mut self, graphics: &mut G) -> CommandResult<Outcome> {
        let old_dimension = self
            .old_dimension
            .ok_or_else(|| CommandError::UndoFailed("No previous dimension stored".into()))?;

        graphics.set_canvas_dimension(old_dimension);

        Ok(Outcome::Dimension(old_dimension))
    }

    fn name(&self) -> CommandName {
        CommandName::ResizeCanvasDimension
    }

    fn description(&self) -> String {
        format!(
            "Resize Canvas to {}x{}",
            self.dimension.width, self.dimension.height
        )
    }
}
