//! Project document: the reloadable JSON save format.
//!
//! Objects are listed back to front. Interactive flags are not part of the
//! format. Whoever loads a document re-derives them from the current
//! selectability settings.

use crate::id::ObjectId;
use crate::model::*;
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Version written by `Document::from_scene`.
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed project document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported project document version {found} (expected {DOCUMENT_VERSION})")]
    UnsupportedVersion { found: u32 },
    #[error("object {id} has an invalid stroke color `{value}`")]
    InvalidColor { id: String, value: String },
    #[error("object id `{0}` appears more than once")]
    DuplicateId(String),
}

/// Tag that decides which selectability toggle governs an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomType {
    Icon,
    Line,
}

/// Shape payload, discriminated by `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeRecord {
    Path { path: Vec<PathCmd> },
    Image { src: String, width: f64, height: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    pub id: ObjectId,
    #[serde(flatten)]
    pub shape: ShapeRecord,
    pub left: f64,
    pub top: f64,
    #[serde(default)]
    pub angle: f64,
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default)]
    pub stroke_width: f64,
    #[serde(default = "unit_scale")]
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_type: Option<CustomType>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_background_image: bool,
}

fn unit_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub version: u32,
    pub objects: Vec<ObjectRecord>,
}

impl Document {
    /// Capture every live object of a scene, back to front.
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            objects: scene.objects().map(ObjectRecord::from_object).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and version-check a document.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        let document: Document = serde_json::from_str(text)?;
        if document.version != DOCUMENT_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: document.version,
            });
        }
        Ok(document)
    }

    /// Rebuild scene objects, back to front, with fresh bounds.
    ///
    /// Every record is validated before anything is returned, so callers
    /// can replace their scene only once the whole document is known good.
    pub fn into_objects(self) -> Result<Vec<SceneObject>, DocumentError> {
        let mut seen = HashSet::with_capacity(self.objects.len());
        if let Some(dup) = self.objects.iter().find(|r| !seen.insert(r.id)) {
            return Err(DocumentError::DuplicateId(dup.id.to_string()));
        }
        self.objects.into_iter().map(ObjectRecord::into_object).collect()
    }
}

impl ObjectRecord {
    fn from_object(object: &SceneObject) -> Self {
        let t = &object.state.transform;
        let s = &object.state.style;
        let shape = match &object.shape {
            Shape::Path { commands } => ShapeRecord::Path {
                path: commands.clone(),
            },
            Shape::Image { src, width, height } => ShapeRecord::Image {
                src: src.clone(),
                width: *width,
                height: *height,
            },
        };
        let custom_type = match object.category {
            Category::Icon => Some(CustomType::Icon),
            Category::Stroke => Some(CustomType::Line),
            Category::Background | Category::Other => None,
        };
        Self {
            id: object.id,
            shape,
            left: t.left,
            top: t.top,
            angle: t.angle,
            scale_x: t.scale_x,
            scale_y: t.scale_y,
            stroke: s.stroke.map(|c| c.to_hex()),
            stroke_width: s.stroke_width,
            opacity: s.opacity,
            custom_type,
            is_background_image: object.is_background(),
        }
    }

    fn into_object(self) -> Result<SceneObject, DocumentError> {
        let stroke = match &self.stroke {
            Some(hex) => Some(Color::from_hex(hex).ok_or_else(|| DocumentError::InvalidColor {
                id: self.id.to_string(),
                value: hex.clone(),
            })?),
            None => None,
        };
        let category = if self.is_background_image {
            Category::Background
        } else {
            match self.custom_type {
                Some(CustomType::Icon) => Category::Icon,
                Some(CustomType::Line) => Category::Stroke,
                None => Category::Other,
            }
        };
        let shape = match self.shape {
            ShapeRecord::Path { path } => Shape::Path { commands: path },
            ShapeRecord::Image { src, width, height } => Shape::Image { src, width, height },
        };
        let state = ObjectState {
            transform: Transform {
                left: self.left,
                top: self.top,
                angle: self.angle,
                scale_x: self.scale_x,
                scale_y: self.scale_y,
            },
            style: Style {
                stroke,
                stroke_width: self.stroke_width,
                opacity: self.opacity,
            },
        };
        let mut object = SceneObject::new(category, shape, state);
        object.id = self.id;
        Ok(object)
    }
}
