//! The scene engine contract the editor drives, and the observer side of
//! its change notifications.
//!
//! The editor never reaches into object geometry directly. It issues
//! commands through `SceneEngine`, then drains the engine's event outbox
//! into a `SceneObserver` (the mutation interceptor, in practice).

use crate::commands::History;
use inkboard_core::{Category, GestureId, ObjectId, Scene, SceneEvent, SceneObject, StateSnapshot};
use smallvec::SmallVec;

/// Operations the editor needs from whatever owns the drawable objects.
pub trait SceneEngine {
    // ─── Content ─────────────────────────────────────────────────────────

    /// Insert a new object on top. Emits `Created`.
    fn add(&mut self, object: SceneObject) -> ObjectId;
    /// Take a live object off the canvas, keeping it restorable. Emits `Removed`.
    fn detach(&mut self, id: ObjectId) -> bool;
    /// Put a detached object back where it was. Emits `Created`.
    fn reattach(&mut self, id: ObjectId) -> bool;
    /// Forget a detached object for good.
    fn release(&mut self, id: ObjectId) -> bool;
    /// Remove every non-background object for good.
    fn clear(&mut self);

    // ─── State ───────────────────────────────────────────────────────────

    fn snapshot(&self, id: ObjectId) -> Option<StateSnapshot>;
    fn restore(&mut self, id: ObjectId, snapshot: &StateSnapshot) -> bool;
    fn recompute_bounds(&mut self, id: ObjectId);
    fn translate(&mut self, id: ObjectId, dx: f64, dy: f64);
    fn set_angle(&mut self, id: ObjectId, angle: f64);
    /// Signal that an interactive edit finished. Emits `Modified`.
    fn commit_modified(&mut self, id: ObjectId, gesture: Option<GestureId>);
    fn set_interactive(&mut self, id: ObjectId, interactive: bool);

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Category of a live or detached object.
    fn category(&self, id: ObjectId) -> Option<Category>;
    fn contains(&self, id: ObjectId) -> bool;
    fn is_selectable(&self, id: ObjectId) -> bool;
    fn position(&self, id: ObjectId) -> Option<(f64, f64)>;
    /// Live objects, back to front.
    fn ids(&self) -> Vec<ObjectId>;
    fn hit_test(&self, x: f64, y: f64) -> Option<ObjectId>;

    /// Drain pending change notifications.
    fn take_events(&mut self) -> SmallVec<[SceneEvent; 4]>;
}

/// Receives scene change notifications, with access to the engine and the
/// history they may be recorded into.
pub trait SceneObserver<E: SceneEngine> {
    fn on_created(&mut self, engine: &mut E, history: &mut History, id: ObjectId);
    fn on_removed(&mut self, engine: &mut E, history: &mut History, id: ObjectId);
    fn on_modified(&mut self, engine: &mut E, history: &mut History, id: ObjectId, gesture: Option<GestureId>);
}

/// Drain the engine's outbox into `observer`, in arrival order.
/// Returns the number of events delivered.
pub fn dispatch_events<E, O>(engine: &mut E, history: &mut History, observer: &mut O) -> usize
where
    E: SceneEngine,
    O: SceneObserver<E> + ?Sized,
{
    let events = engine.take_events();
    let count = events.len();
    for event in events {
        match event {
            SceneEvent::Created(id) => observer.on_created(engine, history, id),
            SceneEvent::Removed(id) => observer.on_removed(engine, history, id),
            SceneEvent::Modified { id, gesture } => observer.on_modified(engine, history, id, gesture),
        }
    }
    count
}

impl SceneEngine for Scene {
    fn add(&mut self, object: SceneObject) -> ObjectId {
        Scene::add(self, object)
    }

    fn detach(&mut self, id: ObjectId) -> bool {
        Scene::detach(self, id)
    }

    fn reattach(&mut self, id: ObjectId) -> bool {
        Scene::reattach(self, id)
    }

    fn release(&mut self, id: ObjectId) -> bool {
        Scene::release(self, id)
    }

    fn clear(&mut self) {
        Scene::clear(self)
    }

    fn snapshot(&self, id: ObjectId) -> Option<StateSnapshot> {
        Scene::snapshot(self, id)
    }

    fn restore(&mut self, id: ObjectId, snapshot: &StateSnapshot) -> bool {
        Scene::restore(self, id, snapshot)
    }

    fn recompute_bounds(&mut self, id: ObjectId) {
        Scene::recompute_bounds(self, id)
    }

    fn translate(&mut self, id: ObjectId, dx: f64, dy: f64) {
        Scene::translate(self, id, dx, dy)
    }

    fn set_angle(&mut self, id: ObjectId, angle: f64) {
        Scene::set_angle(self, id, angle)
    }

    fn commit_modified(&mut self, id: ObjectId, gesture: Option<GestureId>) {
        Scene::commit_modified(self, id, gesture)
    }

    fn set_interactive(&mut self, id: ObjectId, interactive: bool) {
        Scene::set_interactive(self, id, interactive)
    }

    fn category(&self, id: ObjectId) -> Option<Category> {
        Scene::category(self, id)
    }

    fn contains(&self, id: ObjectId) -> bool {
        Scene::contains(self, id)
    }

    fn is_selectable(&self, id: ObjectId) -> bool {
        self.get(id).is_some_and(|o| o.selectable)
    }

    fn position(&self, id: ObjectId) -> Option<(f64, f64)> {
        self.get(id).map(SceneObject::position)
    }

    fn ids(&self) -> Vec<ObjectId> {
        Scene::ids(self)
    }

    fn hit_test(&self, x: f64, y: f64) -> Option<ObjectId> {
        Scene::hit_test(self, x, y)
    }

    fn take_events(&mut self) -> SmallVec<[SceneEvent; 4]> {
        Scene::take_events(self)
    }
}
