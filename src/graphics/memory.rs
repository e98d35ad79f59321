// MemoryGraphics - in-memory GraphicsState without any rendering
//
// Models the image, transform, filter list and object graph exactly as a
// canvas backend would expose them. Image "decoding" is a lookup in a table
// of registered sources, so loading behaves asynchronously and can fail
// without touching the network.

use crate::graphics::{
    CanvasImage, Dimension, Filter, FilterType, GraphicsError, GraphicsObject, GraphicsResult,
    GraphicsState, ImageTransform, ObjectId, ObjectKind, Point, PositionInfo, Props,
};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Canvas size used when nothing else is specified
const DEFAULT_CANVAS: Dimension = Dimension {
    width: 800,
    height: 600,
};

/// Icon paths available without registration
const BUILTIN_ICONS: [(&str, &str); 2] = [
    (
        "arrow",
        "M 0 90 H 105 V 120 L 160 60 L 105 0 V 30 H 0 Z",
    ),
    (
        "cancel",
        "M 0 30 L 30 60 L 0 90 L 30 120 L 60 90 L 90 120 L 120 90 L 90 60 L 120 30 L 90 0 L 60 30 L 30 0 Z",
    ),
];

pub struct MemoryGraphics {
    image: Option<CanvasImage>,
    image_sources: HashMap<String, Dimension>,
    canvas: Dimension,
    transform: ImageTransform,
    filters: Vec<Filter>,
    objects: Vec<GraphicsObject>,
    icons: BTreeMap<String, String>,
    /// Next id to hand out; one past `ObjectId::MAX` once every id is taken
    next_id: u64,
    load_delay: Option<Duration>,
}

impl MemoryGraphics {
    pub fn new(canvas: Dimension) -> Self {
        Self {
            image: None,
            image_sources: HashMap::new(),
            canvas,
            transform: ImageTransform::default(),
            filters: Vec::new(),
            objects: Vec::new(),
            icons: BUILTIN_ICONS
                .iter()
                .map(|(name, path)| (name.to_string(), path.to_string()))
                .collect(),
            next_id: 1,
            load_delay: None,
        }
    }

    /// Make `url` loadable as an image of the given size
    pub fn register_image_source(&mut self, url: impl Into<String>, width: u32, height: u32) {
        self.image_sources
            .insert(url.into(), Dimension::new(width, height));
    }

    /// Builder variant of [`MemoryGraphics::register_image_source`]
    pub fn with_image_source(mut self, url: impl Into<String>, width: u32, height: u32) -> Self {
        self.register_image_source(url, width, height);
        self
    }

    /// Simulate slow decoding for image loads
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|object| object.id).collect()
    }

    pub fn has_filter(&self, filter_type: FilterType) -> bool {
        self.filters.iter().any(|f| f.filter_type == filter_type)
    }

    async fn decode(&self, url: &str) -> GraphicsResult<Dimension> {
        match self.load_delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }

        self.image_sources
            .get(url)
            .copied()
            .ok_or_else(|| GraphicsError::ImageLoad(url.to_string()))
    }

    fn allocate_id(&mut self) -> GraphicsResult<ObjectId> {
        let id = ObjectId::try_from(self.next_id).map_err(|_| GraphicsError::IdsExhausted)?;
        self.next_id += 1;
        Ok(id)
    }

    /// Keep freshly allocated ids clear of ids that came from outside
    fn reserve_id(&mut self, id: ObjectId) {
        self.next_id = self.next_id.max(u64::from(id) + 1);
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|object| object.id == id)
    }

    fn object_mut(&mut self, id: ObjectId) -> GraphicsResult<&mut GraphicsObject> {
        self.objects
            .iter_mut()
            .find(|object| object.id == id)
            .ok_or(GraphicsError::ObjectNotFound(id))
    }
}

impl Default for MemoryGraphics {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS)
    }
}

/// Insert `value` under `key` unless the caller already set it
fn default_prop(props: &mut Props, key: &str, value: Value) {
    props.entry(key.to_string()).or_insert(value);
}

impl GraphicsState for MemoryGraphics {
    async fn load_image(&mut self, name: &str, url: &str) -> GraphicsResult<CanvasImage> {
        let size = self.decode(url).await?;
        Ok(CanvasImage {
            name: name.to_string(),
            url: url.to_string(),
            width: size.width,
            height: size.height,
        })
    }

    fn image(&self) -> Option<&CanvasImage> {
        self.image.as_ref()
    }

    fn set_image(&mut self, image: Option<CanvasImage>) {
        self.image = image;
    }

    fn canvas_dimension(&self) -> Dimension {
        self.canvas
    }

    fn set_canvas_dimension(&mut self, dimension: Dimension) {
        self.canvas = dimension;
    }

    fn transform(&self) -> ImageTransform {
        self.transform
    }

    fn set_transform(&mut self, transform: ImageTransform) {
        self.transform = transform;
    }

    fn filters(&self) -> &[Filter] {
        &self.filters
    }

    async fn apply_filter(&mut self, filter: Filter) -> GraphicsResult<()> {
        tokio::task::yield_now().await;

        if filter.filter_type == FilterType::Mask {
            let mask_id = filter
                .mask_object_id()
                .ok_or_else(|| GraphicsError::InvalidFilter("mask requires maskObjId".into()))?;
            if self.index_of(mask_id).is_none() {
                return Err(GraphicsError::ObjectNotFound(mask_id));
            }
        }

        match self
            .filters
            .iter_mut()
            .find(|existing| existing.filter_type == filter.filter_type)
        {
            Some(existing) => existing.options = filter.options,
            None => self.filters.push(filter),
        }
        Ok(())
    }

    fn remove_filter(&mut self, filter_type: FilterType) -> GraphicsResult<(usize, Filter)> {
        let index = self
            .filters
            .iter()
            .position(|f| f.filter_type == filter_type)
            .ok_or_else(|| GraphicsError::FilterNotApplied(filter_type.to_string()))?;
        Ok((index, self.filters.remove(index)))
    }

    fn insert_filter(&mut self, index: usize, filter: Filter) {
        self.filters.retain(|f| f.filter_type != filter.filter_type);
        let index = index.min(self.filters.len());
        self.filters.insert(index, filter);
    }

    fn set_filters(&mut self, filters: Vec<Filter>) {
        self.filters = filters;
    }

    fn center(&self) -> Point {
        let (width, height) = match &self.image {
            Some(image) => (image.width, image.height),
            None => (self.canvas.width, self.canvas.height),
        };
        Point::new(f64::from(width) / 2.0, f64::from(height) / 2.0)
    }

    fn object(&self, id: ObjectId) -> Option<&GraphicsObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    fn objects(&self) -> Vec<GraphicsObject> {
        self.objects.clone()
    }

    fn add_object(&mut self, kind: ObjectKind, mut props: Props) -> GraphicsResult<ObjectId> {
        match &kind {
            ObjectKind::Shape(_) => {
                default_prop(&mut props, "fill", json!("#ffffff"));
                default_prop(&mut props, "stroke", json!("#000000"));
                default_prop(&mut props, "strokeWidth", json!(1));
            }
            ObjectKind::Text => {
                default_prop(&mut props, "text", json!(""));
                default_prop(&mut props, "fill", json!("#000000"));
                default_prop(&mut props, "fontSize", json!(10));
            }
            ObjectKind::Icon(icon_type) => {
                if !self.has_icon(icon_type) {
                    return Err(GraphicsError::UnknownIcon(icon_type.clone()));
                }
                default_prop(&mut props, "fill", json!("#000000"));
                default_prop(&mut props, "path", json!(self.icons[icon_type]));
            }
            ObjectKind::Image(_) | ObjectKind::Group(_) => {}
        }

        let id = self.allocate_id()?;
        self.objects.push(GraphicsObject { id, kind, props });
        Ok(id)
    }

    async fn create_image_object(&mut self, url: &str) -> GraphicsResult<ObjectId> {
        let size = self.decode(url).await?;
        let center = self.center();

        let mut props = Props::new();
        props.insert("width".into(), json!(size.width));
        props.insert("height".into(), json!(size.height));
        props.insert("left".into(), json!(center.x));
        props.insert("top".into(), json!(center.y));

        self.add_object(ObjectKind::Image(url.to_string()), props)
    }

    fn insert_object(&mut self, object: GraphicsObject, index: Option<usize>) -> GraphicsResult<()> {
        if self.index_of(object.id).is_some() {
            return Err(GraphicsError::DuplicateObject(object.id));
        }

        self.reserve_id(object.id);
        let index = index.unwrap_or(self.objects.len()).min(self.objects.len());
        self.objects.insert(index, object);
        Ok(())
    }

    fn remove_object(&mut self, id: ObjectId) -> GraphicsResult<(usize, GraphicsObject)> {
        let index = self.index_of(id).ok_or(GraphicsError::ObjectNotFound(id))?;
        Ok((index, self.objects.remove(index)))
    }

    fn clear_objects(&mut self) -> Vec<GraphicsObject> {
        std::mem::take(&mut self.objects)
    }

    fn restore_objects(&mut self, objects: Vec<GraphicsObject>) {
        for object in &objects {
            self.reserve_id(object.id);
        }
        let above = std::mem::replace(&mut self.objects, objects);
        self.objects.extend(above);
    }

    fn object_properties(&self, id: ObjectId, keys: &[String]) -> GraphicsResult<Props> {
        let object = self.object(id).ok_or(GraphicsError::ObjectNotFound(id))?;
        Ok(keys
            .iter()
            .map(|key| (key.clone(), object.props.get(key).cloned().unwrap_or(Value::Null)))
            .collect())
    }

    fn set_object_properties(&mut self, id: ObjectId, props: &Props) -> GraphicsResult<()> {
        let object = self.object_mut(id)?;
        for (key, value) in props {
            if value.is_null() {
                object.props.remove(key);
            } else {
                object.props.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    fn set_object_position(&mut self, id: ObjectId, position: &PositionInfo) -> GraphicsResult<()> {
        let object = self.object_mut(id)?;
        let width = object.prop_f64("width").unwrap_or(0.0);
        let height = object.prop_f64("height").unwrap_or(0.0);

        let left = position.x - width * position.origin_x.factor();
        let top = position.y - height * position.origin_y.factor();
        object.props.insert("left".into(), json!(left));
        object.props.insert("top".into(), json!(top));
        Ok(())
    }

    fn register_icons(&mut self, icons: BTreeMap<String, String>) {
        self.icons.extend(icons);
    }

    fn has_icon(&self, icon_type: &str) -> bool {
        self.icons.contains_key(icon_type)
    }
}
