// Value types exchanged with the graphics collaborator

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Identifier of an editable object, assigned by the graphics state
pub type ObjectId = u32;

/// Free-form property bag of an object (fill, stroke, left, top, fontSize, ...)
pub type Props = serde_json::Map<String, Value>;

/// Shape primitives supported by the shape tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Rect,
    Circle,
    Triangle,
}

impl ShapeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::Rect => "rect",
            ShapeType::Circle => "circle",
            ShapeType::Triangle => "triangle",
        }
    }
}

impl FromStr for ShapeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rect" => Ok(ShapeType::Rect),
            "circle" => Ok(ShapeType::Circle),
            "triangle" => Ok(ShapeType::Triangle),
            other => Err(format!("unknown shape type '{}'", other)),
        }
    }
}

/// What an object on the canvas is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectKind {
    Shape(ShapeType),
    Text,
    /// Icon of a registered icon type
    Icon(String),
    /// Image object created from a url
    Image(String),
    Group(Vec<GraphicsObject>),
}

impl ObjectKind {
    /// Type name reported to callers in object properties
    pub fn type_name(&self) -> &'static str {
        match self {
            ObjectKind::Shape(shape) => shape.as_str(),
            ObjectKind::Text => "i-text",
            ObjectKind::Icon(_) => "icon",
            ObjectKind::Image(_) => "image",
            ObjectKind::Group(_) => "group",
        }
    }
}

/// An editable object together with its properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphicsObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub props: Props,
}

impl GraphicsObject {
    pub fn new(id: ObjectId, kind: ObjectKind) -> Self {
        Self {
            id,
            kind,
            props: Props::new(),
        }
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    pub fn prop_f64(&self, key: &str) -> Option<f64> {
        self.props.get(key).and_then(Value::as_f64)
    }
}

/// The background image of the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasImage {
    pub name: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Flip and rotation of the background image
///
/// The default value is the baseline a freshly loaded image starts from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageTransform {
    pub flip_x: bool,
    pub flip_y: bool,
    /// Degrees
    pub angle: f64,
}

/// Image filters known to the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterType {
    Grayscale,
    Invert,
    Sepia,
    Sepia2,
    Blur,
    Sharpen,
    Emboss,
    RemoveWhite,
    Brightness,
    Noise,
    Pixelate,
    ColorFilter,
    Tint,
    Multiply,
    Blend,
    /// Uses another image object as an alpha mask (option `maskObjId`)
    Mask,
}

impl FilterType {
    pub const ALL: [FilterType; 16] = [
        FilterType::Grayscale,
        FilterType::Invert,
        FilterType::Sepia,
        FilterType::Sepia2,
        FilterType::Blur,
        FilterType::Sharpen,
        FilterType::Emboss,
        FilterType::RemoveWhite,
        FilterType::Brightness,
        FilterType::Noise,
        FilterType::Pixelate,
        FilterType::ColorFilter,
        FilterType::Tint,
        FilterType::Multiply,
        FilterType::Blend,
        FilterType::Mask,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::Grayscale => "grayscale",
            FilterType::Invert => "invert",
            FilterType::Sepia => "sepia",
            FilterType::Sepia2 => "sepia2",
            FilterType::Blur => "blur",
            FilterType::Sharpen => "sharpen",
            FilterType::Emboss => "emboss",
            FilterType::RemoveWhite => "removeWhite",
            FilterType::Brightness => "brightness",
            FilterType::Noise => "noise",
            FilterType::Pixelate => "pixelate",
            FilterType::ColorFilter => "colorFilter",
            FilterType::Tint => "tint",
            FilterType::Multiply => "multiply",
            FilterType::Blend => "blend",
            FilterType::Mask => "mask",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterType {
    type Err = String;

    /// Case-insensitive, so both "Grayscale" and "grayscale" parse
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterType::ALL
            .iter()
            .copied()
            .find(|filter| filter.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown filter type '{}'", s))
    }
}

/// A filter applied to the background image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub filter_type: FilterType,
    pub options: Props,
}

impl Filter {
    pub fn new(filter_type: FilterType, options: Props) -> Self {
        Self {
            filter_type,
            options,
        }
    }

    /// Id of the masking object for `Mask` filters
    pub fn mask_object_id(&self) -> Option<ObjectId> {
        mask_object_id(&self.options)
    }
}

/// Read the `maskObjId` option
pub fn mask_object_id(options: &Props) -> Option<ObjectId> {
    options
        .get("maskObjId")
        .and_then(Value::as_u64)
        .and_then(|id| ObjectId::try_from(id).ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginX {
    #[default]
    Left,
    Center,
    Right,
}

impl OriginX {
    /// Fraction of the object width between its left edge and this origin
    pub fn factor(&self) -> f64 {
        match self {
            OriginX::Left => 0.0,
            OriginX::Center => 0.5,
            OriginX::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginY {
    #[default]
    Top,
    Center,
    Bottom,
}

impl OriginY {
    pub fn factor(&self) -> f64 {
        match self {
            OriginY::Top => 0.0,
            OriginY::Center => 0.5,
            OriginY::Bottom => 1.0,
        }
    }
}

/// Target position of an object, expressed for one of its origins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInfo {
    pub x: f64,
    pub y: f64,
    pub origin_x: OriginX,
    pub origin_y: OriginY,
}

impl PositionInfo {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            origin_x: OriginX::Left,
            origin_y: OriginY::Top,
        }
    }

    pub fn with_origin(mut self, origin_x: OriginX, origin_y: OriginY) -> Self {
        self.origin_x = origin_x;
        self.origin_y = origin_y;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_type_parse_is_case_insensitive() {
        assert_eq!("Grayscale".parse::<FilterType>(), Ok(FilterType::Grayscale));
        assert_eq!("removewhite".parse::<FilterType>(), Ok(FilterType::RemoveWhite));
        assert!("vignette".parse::<FilterType>().is_err());
    }

    #[test]
    fn test_mask_object_id() {
        let mut options = Props::new();
        assert_eq!(mask_object_id(&options), None);

        options.insert("maskObjId".into(), json!(7));
        assert_eq!(mask_object_id(&options), Some(7));

        options.insert("maskObjId".into(), json!("7"));
        assert_eq!(mask_object_id(&options), None);
    }

    #[test]
    fn test_object_kind_type_names() {
        assert_eq!(ObjectKind::Shape(ShapeType::Circle).type_name(), "circle");
        assert_eq!(ObjectKind::Text.type_name(), "i-text");
        assert_eq!(ObjectKind::Icon("arrow".into()).type_name(), "icon");
    }
}
