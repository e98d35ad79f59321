// Outcome values returned to the caller when a command completes

use crate::graphics::{Dimension, FilterType, GraphicsObject, ImageTransform, ObjectId, Props};
use serde::{Deserialize, Serialize};

/// Image size before and after a load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeChange {
    pub old_width: u32,
    pub old_height: u32,
    pub new_width: u32,
    pub new_height: u32,
}

/// Flip state of the image after a flip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlipStatus {
    pub flip_x: bool,
    pub flip_y: bool,
    pub angle: f64,
}

impl From<ImageTransform> for FlipStatus {
    fn from(transform: ImageTransform) -> Self {
        Self {
            flip_x: transform.flip_x,
            flip_y: transform.flip_y,
            angle: transform.angle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotateStatus {
    pub angle: f64,
}

/// Resolved properties of an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectProps {
    pub id: ObjectId,
    pub object_type: String,
    pub props: Props,
}

impl From<&GraphicsObject> for ObjectProps {
    fn from(object: &GraphicsObject) -> Self {
        Self {
            id: object.id,
            object_type: object.kind.type_name().to_string(),
            props: object.props.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    Add,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResult {
    pub filter_type: FilterType,
    pub action: FilterAction,
}

/// Operation-specific result of executing or undoing a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    SizeChange(SizeChange),
    Flip(FlipStatus),
    Rotate(RotateStatus),
    Object(ObjectProps),
    Filter(FilterResult),
    Dimension(Dimension),
    /// Ids affected by a bulk object operation, in z-order
    ObjectIds(Vec<ObjectId>),
}

impl Outcome {
    pub fn object(&self) -> Option<&ObjectProps> {
        match self {
            Outcome::Object(props) => Some(props),
            _ => None,
        }
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        self.object().map(|props| props.id)
    }

    /// Resulting angle for rotate and flip outcomes
    pub fn angle(&self) -> Option<f64> {
        match self {
            Outcome::Rotate(status) => Some(status.angle),
            Outcome::Flip(status) => Some(status.angle),
            _ => None,
        }
    }
}
