//! Scene object model.
//!
//! A canvas holds a flat, z-ordered list of `SceneObject`s: freehand
//! strokes, placed icons, and at most one background image. Each object has
//! an immutable shape (path data or image payload) and a mutable
//! `ObjectState` (transform + style). History only ever snapshots and
//! restores the mutable part.

use crate::geometry::Bounds;
use crate::id::ObjectId;
use serde::{Deserialize, Serialize};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional (color pickers always send it).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let channel = |hi: u8, lo: u8| -> Option<f32> {
            Some((hex_val(hi)? << 4 | hex_val(lo)?) as f32 / 255.0)
        };

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgba(
                    (r * 17) as f32 / 255.0,
                    (g * 17) as f32 / 255.0,
                    (b * 17) as f32 / 255.0,
                    1.0,
                ))
            }
            6 => Some(Self::rgba(
                channel(bytes[0], bytes[1])?,
                channel(bytes[2], bytes[3])?,
                channel(bytes[4], bytes[5])?,
                1.0,
            )),
            8 => Some(Self::rgba(
                channel(bytes[0], bytes[1])?,
                channel(bytes[2], bytes[3])?,
                channel(bytes[4], bytes[5])?,
                channel(bytes[6], bytes[7])?,
            )),
            _ => None,
        }
    }

    /// Emit as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = (to_byte(self.r), to_byte(self.g), to_byte(self.b), to_byte(self.a));
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

// ─── Path data ───────────────────────────────────────────────────────────

/// A single path command, relative to the owning object's origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCmd {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    QuadTo(f64, f64, f64, f64), // control, end
}

// ─── Shape ───────────────────────────────────────────────────────────────

/// The immutable drawable payload of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Freehand stroke.
    Path { commands: Vec<PathCmd> },
    /// Raster image (icon or background). `width`/`height` are the
    /// natural pixel size before scaling.
    Image { src: String, width: f64, height: f64 },
}

// ─── Mutable state ───────────────────────────────────────────────────────

/// Placement of an object. The origin sits at (`left`, `top`) and rotation
/// is applied about it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub left: f64,
    pub top: f64,
    /// Degrees, clockwise.
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl Transform {
    pub fn at(left: f64, top: f64) -> Self {
        Self {
            left,
            top,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke: None,
            stroke_width: 0.0,
            opacity: 1.0,
        }
    }
}

/// Everything about an object that an interactive edit can change.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectState {
    pub transform: Transform,
    pub style: Style,
}

/// An opaque capture of an object's mutable state, sufficient to restore
/// it exactly. Only the scene can look inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSnapshot(pub(crate) ObjectState);

impl StateSnapshot {
    /// Position (`left`, `top`) recorded in the snapshot.
    pub fn position(&self) -> (f64, f64) {
        (self.0.transform.left, self.0.transform.top)
    }
}

// ─── Objects ─────────────────────────────────────────────────────────────

/// Which selectability rule an object follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Icon,
    Stroke,
    Background,
    Other,
}

impl Category {
    /// Prefix used for generated IDs.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Category::Icon => "icon",
            Category::Stroke => "stroke",
            Category::Background => "background",
            Category::Other => "object",
        }
    }
}

/// A drawable entity on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub category: Category,
    pub shape: Shape,
    pub state: ObjectState,
    /// Whether the object can become the active selection.
    pub selectable: bool,
    /// Whether the object receives pointer events (hit testing).
    pub evented: bool,
    /// Cached axis-aligned bounds in scene coordinates.
    pub bounds: Bounds,
}

impl SceneObject {
    pub fn new(category: Category, shape: Shape, state: ObjectState) -> Self {
        let mut object = Self {
            id: ObjectId::with_prefix(category.id_prefix()),
            category,
            shape,
            state,
            selectable: category != Category::Background,
            evented: category != Category::Background,
            bounds: Bounds::default(),
        };
        object.recompute_bounds();
        object
    }

    /// Build a freehand stroke from absolute scene-space points.
    /// The object origin is the top-left of the points' extent.
    pub fn stroke(points: &[(f64, f64)], color: Color, width: f64) -> Self {
        let (left, top) = points.iter().fold((f64::MAX, f64::MAX), |(mx, my), &(x, y)| {
            (mx.min(x), my.min(y))
        });
        let (left, top) = if points.is_empty() { (0.0, 0.0) } else { (left, top) };
        let local: Vec<(f64, f64)> = points.iter().map(|&(x, y)| (x - left, y - top)).collect();
        let state = ObjectState {
            transform: Transform::at(left, top),
            style: Style {
                stroke: Some(color),
                stroke_width: width,
                opacity: 1.0,
            },
        };
        Self::new(
            Category::Stroke,
            Shape::Path {
                commands: crate::geometry::smooth_path(&local),
            },
            state,
        )
    }

    /// Build an icon whose origin sits at (`left`, `top`), uniformly scaled
    /// by `scale`.
    pub fn icon(src: impl Into<String>, width: f64, height: f64, left: f64, top: f64, scale: f64) -> Self {
        let state = ObjectState {
            transform: Transform {
                scale_x: scale,
                scale_y: scale,
                ..Transform::at(left, top)
            },
            style: Style::default(),
        };
        Self::new(
            Category::Icon,
            Shape::Image {
                src: src.into(),
                width,
                height,
            },
            state,
        )
    }

    pub fn is_background(&self) -> bool {
        self.category == Category::Background
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot(self.state)
    }

    /// Overwrite the mutable state. Bounds are left stale until
    /// `recompute_bounds` is called.
    pub fn restore(&mut self, snapshot: &StateSnapshot) {
        self.state = snapshot.0;
    }

    pub fn recompute_bounds(&mut self) {
        self.bounds = crate::geometry::object_bounds(&self.shape, &self.state);
    }

    pub fn position(&self) -> (f64, f64) {
        (self.state.transform.left, self.state.transform.top)
    }
}

// ─── Events ──────────────────────────────────────────────────────────────

/// Identifies one interactive modification gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GestureId(pub u64);

/// A notification the scene emits after mutating its content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEvent {
    Created(ObjectId),
    Removed(ObjectId),
    /// An interactive transform/edit finished.
    Modified {
        id: ObjectId,
        gesture: Option<GestureId>,
    },
}

impl SceneEvent {
    pub fn object(&self) -> ObjectId {
        match self {
            SceneEvent::Created(id) | SceneEvent::Removed(id) => *id,
            SceneEvent::Modified { id, .. } => *id,
        }
    }
}
