//! In-memory scene store.
//!
//! Holds the live objects in z-order (index 0 is painted first), a pool of
//! detached objects that history may still bring back, and an outbox of
//! `SceneEvent`s. The store never decides what is worth recording. It only
//! reports what changed, and the editor drains the outbox after every
//! operation.

use crate::geometry::{self, Bounds};
use crate::id::ObjectId;
use crate::model::*;
use smallvec::SmallVec;
use std::collections::HashMap;

/// A detached object plus the stacking slot it was removed from.
#[derive(Debug, Clone)]
struct Retained {
    object: SceneObject,
    z_index: usize,
}

#[derive(Debug, Clone)]
pub struct Scene {
    objects: Vec<SceneObject>,
    retained: HashMap<ObjectId, Retained>,
    events: SmallVec<[SceneEvent; 4]>,
    width: f64,
    height: f64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Scene {
    /// Create an empty scene for a canvas of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            objects: Vec::new(),
            retained: HashMap::new(),
            events: SmallVec::new(),
            width,
            height,
        }
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    // ─── Content mutation (emits events) ─────────────────────────────────

    /// Append an object on top of the stack.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let index = self.objects.len();
        self.insert_at(index, object)
    }

    /// Insert an object at `index` in z-order (clamped to the stack size).
    pub fn insert_at(&mut self, index: usize, object: SceneObject) -> ObjectId {
        let id = object.id;
        let index = index.min(self.objects.len());
        log::trace!("scene: insert {id:?} at z={index}");
        self.objects.insert(index, object);
        self.events.push(SceneEvent::Created(id));
        id
    }

    /// Take an object off the canvas but keep it, together with its z-index,
    /// so it can be re-attached later. Returns `false` if it is not live.
    pub fn detach(&mut self, id: ObjectId) -> bool {
        let Some(z_index) = self.z_index(id) else {
            return false;
        };
        let object = self.objects.remove(z_index);
        log::trace!("scene: detach {id:?} from z={z_index}");
        self.retained.insert(id, Retained { object, z_index });
        self.events.push(SceneEvent::Removed(id));
        true
    }

    /// Bring a detached object back at its former z-index. When objects
    /// below it have since gone, the index is clamped to the top.
    pub fn reattach(&mut self, id: ObjectId) -> bool {
        let Some(Retained { object, z_index }) = self.retained.remove(&id) else {
            return false;
        };
        self.insert_at(z_index, object);
        true
    }

    /// Remove an object for good, without retaining it.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.z_index(id)?;
        let object = self.objects.remove(index);
        self.events.push(SceneEvent::Removed(id));
        Some(object)
    }

    /// Remove every non-background object for good.
    pub fn clear(&mut self) {
        let ids: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|o| !o.is_background())
            .map(|o| o.id)
            .collect();
        for id in ids {
            self.remove(id);
        }
    }

    /// Remove everything, background included.
    pub fn clear_all(&mut self) {
        for object in std::mem::take(&mut self.objects) {
            self.events.push(SceneEvent::Removed(object.id));
        }
    }

    /// Replace the background image. The new background is stretched to
    /// the canvas width, then to the canvas height, and sits below
    /// everything else.
    pub fn set_background(&mut self, src: impl Into<String>, width: f64, height: f64) -> ObjectId {
        let existing: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|o| o.is_background())
            .map(|o| o.id)
            .collect();
        for id in existing {
            self.remove(id);
        }

        let mut transform = Transform::default();
        if width > 0.0 {
            transform.scale_x = self.width / width;
        }
        if height > 0.0 {
            transform.scale_y = self.height / height;
        }
        let background = SceneObject::new(
            Category::Background,
            Shape::Image {
                src: src.into(),
                width,
                height,
            },
            ObjectState {
                transform,
                style: Style::default(),
            },
        );
        self.insert_at(0, background)
    }

    /// Report that an interactive edit of `id` has finished.
    pub fn commit_modified(&mut self, id: ObjectId, gesture: Option<GestureId>) {
        if self.contains(id) {
            self.events.push(SceneEvent::Modified { id, gesture });
        }
    }

    /// Drain the event outbox.
    pub fn take_events(&mut self) -> SmallVec<[SceneEvent; 4]> {
        std::mem::take(&mut self.events)
    }

    // ─── Retained pool ───────────────────────────────────────────────────

    /// Drop a detached object. Live objects are left alone.
    pub fn release(&mut self, id: ObjectId) -> bool {
        let released = self.retained.remove(&id).is_some();
        if released {
            log::trace!("scene: release {id:?}");
        }
        released
    }

    pub fn is_retained(&self, id: ObjectId) -> bool {
        self.retained.contains_key(&id)
    }

    pub fn retained_len(&self) -> usize {
        self.retained.len()
    }

    // ─── State ───────────────────────────────────────────────────────────

    pub fn snapshot(&self, id: ObjectId) -> Option<StateSnapshot> {
        self.get(id).map(SceneObject::snapshot)
    }

    /// Restore a snapshot onto a live or retained object. Bounds stay stale
    /// until `recompute_bounds`.
    pub fn restore(&mut self, id: ObjectId, snapshot: &StateSnapshot) -> bool {
        match self.object_mut(id) {
            Some(object) => {
                object.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn recompute_bounds(&mut self, id: ObjectId) {
        if let Some(object) = self.object_mut(id) {
            object.recompute_bounds();
        }
    }

    /// Set the selectable + evented flags together. Backgrounds stay inert.
    pub fn set_interactive(&mut self, id: ObjectId, interactive: bool) {
        if let Some(object) = self.object_mut(id) {
            let interactive = interactive && !object.is_background();
            object.selectable = interactive;
            object.evented = interactive;
        }
    }

    /// Move a live object by a scene-space delta, keeping bounds current.
    pub fn translate(&mut self, id: ObjectId, dx: f64, dy: f64) {
        if let Some(object) = self.get_mut(id) {
            object.state.transform.left += dx;
            object.state.transform.top += dy;
            object.recompute_bounds();
        }
    }

    /// Set a live object's angle in degrees, keeping bounds current.
    pub fn set_angle(&mut self, id: ObjectId, angle: f64) {
        if let Some(object) = self.get_mut(id) {
            object.state.transform.angle = angle;
            object.recompute_bounds();
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Look up a live object.
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Live or retained object, for history replay.
    fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        if let Some(index) = self.z_index(id) {
            return Some(&mut self.objects[index]);
        }
        self.retained.get_mut(&id).map(|r| &mut r.object)
    }

    /// Category of a live or retained object.
    pub fn category(&self, id: ObjectId) -> Option<Category> {
        self.get(id)
            .or_else(|| self.retained.get(&id).map(|r| &r.object))
            .map(|o| o.category)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.z_index(id).is_some()
    }

    pub fn z_index(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// Live objects, back to front.
    pub fn objects(&self) -> impl DoubleEndedIterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|o| o.id).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn background(&self) -> Option<ObjectId> {
        self.objects.iter().find(|o| o.is_background()).map(|o| o.id)
    }

    pub fn bounds_of(&self, id: ObjectId) -> Option<Bounds> {
        self.get(id).map(|o| o.bounds)
    }

    /// Topmost evented object under a scene-space point.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<ObjectId> {
        geometry::hit_test(self.objects.iter(), x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon_at(x: f64, y: f64) -> SceneObject {
        SceneObject::icon("data:icon", 20.0, 20.0, x, y, 1.0)
    }

    #[test]
    fn add_emits_created() {
        let mut scene = Scene::default();
        let id = scene.add(icon_at(0.0, 0.0));
        assert_eq!(scene.take_events().as_slice(), &[SceneEvent::Created(id)]);
        assert!(scene.take_events().is_empty());
    }

    #[test]
    fn detach_and_reattach_keep_z_order() {
        let mut scene = Scene::default();
        let a = scene.add(icon_at(0.0, 0.0));
        let b = scene.add(icon_at(10.0, 0.0));
        let c = scene.add(icon_at(20.0, 0.0));
        scene.take_events();

        assert!(scene.detach(b));
        assert!(!scene.contains(b));
        assert!(scene.is_retained(b));
        assert_eq!(scene.ids(), vec![a, c]);

        assert!(scene.reattach(b));
        assert_eq!(scene.ids(), vec![a, b, c]);
        assert_eq!(
            scene.take_events().as_slice(),
            &[SceneEvent::Removed(b), SceneEvent::Created(b)]
        );
    }

    #[test]
    fn reattach_clamps_when_stack_shrank() {
        let mut scene = Scene::default();
        let a = scene.add(icon_at(0.0, 0.0));
        let b = scene.add(icon_at(10.0, 0.0));
        scene.detach(b);
        scene.remove(a);
        assert!(scene.reattach(b));
        assert_eq!(scene.ids(), vec![b]);
    }

    #[test]
    fn release_only_drops_detached() {
        let mut scene = Scene::default();
        let a = scene.add(icon_at(0.0, 0.0));
        assert!(!scene.release(a));
        assert!(scene.contains(a));
        scene.detach(a);
        assert!(scene.release(a));
        assert!(!scene.reattach(a));
        assert_eq!(scene.retained_len(), 0);
    }

    #[test]
    fn restore_reaches_retained_objects() {
        let mut scene = Scene::default();
        let a = scene.add(icon_at(0.0, 0.0));
        let before = scene.snapshot(a).unwrap();
        scene.translate(a, 5.0, 5.0);
        scene.detach(a);
        assert!(scene.restore(a, &before));
        scene.recompute_bounds(a);
        scene.reattach(a);
        assert_eq!(scene.get(a).unwrap().position(), (0.0, 0.0));
        assert_eq!(scene.bounds_of(a).unwrap().x, 0.0);
    }

    #[test]
    fn background_replaces_and_stays_at_bottom() {
        let mut scene = Scene::new(400.0, 300.0);
        let icon = scene.add(icon_at(0.0, 0.0));
        let first = scene.set_background("bg1", 800.0, 600.0);
        let second = scene.set_background("bg2", 200.0, 100.0);
        assert!(!scene.contains(first));
        assert_eq!(scene.ids(), vec![second, icon]);
        assert_eq!(scene.background(), Some(second));

        let bg = scene.get(second).unwrap();
        assert_eq!(bg.state.transform.scale_x, 2.0);
        assert_eq!(bg.state.transform.scale_y, 3.0);
        assert!(!bg.selectable && !bg.evented);
    }

    #[test]
    fn clear_keeps_background() {
        let mut scene = Scene::default();
        let bg = scene.set_background("bg", 100.0, 100.0);
        scene.add(icon_at(0.0, 0.0));
        scene.add(icon_at(5.0, 5.0));
        scene.clear();
        assert_eq!(scene.ids(), vec![bg]);
        scene.clear_all();
        assert!(scene.is_empty());
    }

    #[test]
    fn interactive_flags_never_apply_to_background() {
        let mut scene = Scene::default();
        let bg = scene.set_background("bg", 100.0, 100.0);
        scene.set_interactive(bg, true);
        assert!(!scene.get(bg).unwrap().selectable);
    }

    #[test]
    fn commit_modified_ignores_missing_objects() {
        let mut scene = Scene::default();
        scene.commit_modified(ObjectId::intern("ghost"), None);
        assert!(scene.take_events().is_empty());
    }
}
