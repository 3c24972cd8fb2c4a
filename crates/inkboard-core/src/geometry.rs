//! Derived geometry: bounding boxes, stroke smoothing, and hit testing.
//!
//! Objects are placed by `Transform` (translate → rotate → scale about the
//! origin). Bounds are the axis-aligned box of the transformed local shape,
//! which is what selection and hit testing work against.

use crate::id::ObjectId;
use crate::model::{ObjectState, PathCmd, SceneObject, Shape};
use kurbo::{Affine, BezPath, Point, Rect, Shape as _};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounds in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    fn from_rect(r: Rect) -> Self {
        Self {
            x: r.x0,
            y: r.y0,
            width: r.width(),
            height: r.height(),
        }
    }
}

/// Local → scene transform for an object state.
pub fn object_affine(state: &ObjectState) -> Affine {
    let t = &state.transform;
    Affine::translate((t.left, t.top))
        * Affine::rotate(t.angle.to_radians())
        * Affine::scale_non_uniform(t.scale_x, t.scale_y)
}

/// Untransformed extent of a shape, in the object's local space.
fn local_rect(shape: &Shape, state: &ObjectState) -> Rect {
    match shape {
        Shape::Path { commands } => {
            let path = to_bez_path(commands);
            if path.elements().is_empty() {
                return Rect::ZERO;
            }
            let half = state.style.stroke_width / 2.0;
            path.bounding_box().inflate(half, half)
        }
        Shape::Image { width, height, .. } => Rect::new(0.0, 0.0, *width, *height),
    }
}

/// Recompute the scene-space bounding box of a shape in a given state.
pub fn object_bounds(shape: &Shape, state: &ObjectState) -> Bounds {
    let rect = local_rect(shape, state);
    Bounds::from_rect(object_affine(state).transform_rect_bbox(rect))
}

fn to_bez_path(commands: &[PathCmd]) -> BezPath {
    let mut path = BezPath::new();
    for cmd in commands {
        match *cmd {
            PathCmd::MoveTo(x, y) => path.move_to((x, y)),
            PathCmd::LineTo(x, y) => path.line_to((x, y)),
            PathCmd::QuadTo(cx, cy, x, y) => path.quad_to((cx, cy), (x, y)),
        }
    }
    path
}

/// Turn raw pointer samples into a smoothed path: each sample becomes the
/// control point of a quadratic segment ending halfway to the next sample.
pub fn smooth_path(points: &[(f64, f64)]) -> Vec<PathCmd> {
    let Some(&(x0, y0)) = points.first() else {
        return Vec::new();
    };
    let mut commands = Vec::with_capacity(points.len() + 1);
    commands.push(PathCmd::MoveTo(x0, y0));
    for pair in points[1..].windows(2) {
        let (cx, cy) = pair[0];
        let (nx, ny) = pair[1];
        commands.push(PathCmd::QuadTo(cx, cy, (cx + nx) / 2.0, (cy + ny) / 2.0));
    }
    // A single click still leaves a dot.
    let (lx, ly) = points[points.len() - 1];
    commands.push(PathCmd::LineTo(lx, ly));
    commands
}

/// Whether a scene-space point falls inside the object's transformed shape.
pub fn object_contains(object: &SceneObject, px: f64, py: f64) -> bool {
    if !object.bounds.contains(px, py) {
        return false;
    }
    let affine = object_affine(&object.state);
    if affine.determinant().abs() < f64::EPSILON {
        return false;
    }
    let local = affine.inverse() * Point::new(px, py);
    local_rect(&object.shape, &object.state).contains(local)
}

/// Find the topmost evented object at (`px`, `py`).
///
/// `objects` must be in back-to-front order; the walk is reversed so the
/// last painted object wins.
pub fn hit_test<'a, I>(objects: I, px: f64, py: f64) -> Option<ObjectId>
where
    I: DoubleEndedIterator<Item = &'a SceneObject>,
{
    objects
        .rev()
        .filter(|o| o.evented)
        .find(|o| object_contains(o, px, py))
        .map(|o| o.id)
}
