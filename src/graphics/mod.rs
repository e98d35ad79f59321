// Graphics collaborator - the mutable image/object model commands operate on
//
// The invoker never renders anything. Everything it needs from the canvas
// goes through the GraphicsState trait, so the real canvas and the in-memory
// model used by tests are interchangeable.

pub mod memory;
pub mod types;

pub use memory::MemoryGraphics;
pub use types::*;

use std::collections::BTreeMap;
use std::future::Future;

/// Errors reported by a GraphicsState implementation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphicsError {
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("Object already exists: {0}")]
    DuplicateObject(ObjectId),

    #[error("Failed to load image: {0}")]
    ImageLoad(String),

    #[error("Unknown icon type: {0}")]
    UnknownIcon(String),

    #[error("Filter not applied: {0}")]
    FilterNotApplied(String),

    #[error("Invalid filter options: {0}")]
    InvalidFilter(String),

    #[error("No object ids left")]
    IdsExhausted,
}

pub type GraphicsResult<T> = Result<T, GraphicsError>;

/// Mutable canvas state shared between the invoker and the rendering layer
///
/// Methods that may suspend (image decoding, filter computation) return
/// futures; everything else is synchronous. Commands hold `&mut` access for
/// the whole duration of an execute or undo, so implementations do not need
/// interior locking.
pub trait GraphicsState: Send + 'static {
    /// Fetch and decode an image without installing it
    fn load_image(
        &mut self,
        name: &str,
        url: &str,
    ) -> impl Future<Output = GraphicsResult<CanvasImage>> + Send;

    /// Currently installed background image
    fn image(&self) -> Option<&CanvasImage>;

    fn set_image(&mut self, image: Option<CanvasImage>);

    fn canvas_dimension(&self) -> Dimension;

    fn set_canvas_dimension(&mut self, dimension: Dimension);

    fn transform(&self) -> ImageTransform;

    fn set_transform(&mut self, transform: ImageTransform);

    /// Filters in application order
    fn filters(&self) -> &[Filter];

    /// Add a filter, or update the options of the filter of the same type in place
    fn apply_filter(&mut self, filter: Filter) -> impl Future<Output = GraphicsResult<()>> + Send;

    /// Remove the filter of the given type, returning its position and value
    fn remove_filter(&mut self, filter_type: FilterType) -> GraphicsResult<(usize, Filter)>;

    /// Put a filter back at a given position
    fn insert_filter(&mut self, index: usize, filter: Filter);

    fn set_filters(&mut self, filters: Vec<Filter>);

    /// Center of the working area, used for default object positions
    fn center(&self) -> Point;

    fn object(&self, id: ObjectId) -> Option<&GraphicsObject>;

    /// All objects in z-order (bottom first)
    fn objects(&self) -> Vec<GraphicsObject>;

    /// Create a new object, assigning it a fresh id and resolving default properties
    fn add_object(&mut self, kind: ObjectKind, props: Props) -> GraphicsResult<ObjectId>;

    /// Create an image object from a url
    fn create_image_object(
        &mut self,
        url: &str,
    ) -> impl Future<Output = GraphicsResult<ObjectId>> + Send;

    /// Insert an existing object keeping its id. `None` places it on top.
    fn insert_object(&mut self, object: GraphicsObject, index: Option<usize>) -> GraphicsResult<()>;

    /// Remove an object (or a whole group), returning its z-order index and value
    fn remove_object(&mut self, id: ObjectId) -> GraphicsResult<(usize, GraphicsObject)>;

    /// Remove every object, returning them in z-order
    fn clear_objects(&mut self) -> Vec<GraphicsObject>;

    /// Put previously removed objects back underneath the current ones, ids and order intact
    fn restore_objects(&mut self, objects: Vec<GraphicsObject>);

    /// Read a set of properties. Keys the object does not carry are reported as `Null`.
    fn object_properties(&self, id: ObjectId, keys: &[String]) -> GraphicsResult<Props>;

    /// Merge properties into an object. A `Null` value removes the key.
    fn set_object_properties(&mut self, id: ObjectId, props: &Props) -> GraphicsResult<()>;

    /// Move an object so that the given origin lands on the given point
    fn set_object_position(&mut self, id: ObjectId, position: &PositionInfo) -> GraphicsResult<()>;

    /// Register custom icon paths by icon type
    fn register_icons(&mut self, icons: BTreeMap<String, String>);

    fn has_icon(&self, icon_type: &str) -> bool;
}
