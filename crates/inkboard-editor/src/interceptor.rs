//! Mutation interceptor: turns scene events into history commands.
//!
//! Creation and removal are recorded directly. Modifications need a
//! "before" state, so the interceptor snapshots an object when a gesture on
//! it begins and diffs against that snapshot when the engine reports the
//! gesture committed.

use crate::commands::{Command, History};
use crate::engine::{SceneEngine, SceneObserver};
use inkboard_core::{Category, GestureId, ObjectId, StateSnapshot};

/// State captured at the start of a gesture that may modify `object`.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingModification {
    pub object: ObjectId,
    pub gesture: GestureId,
    pub before: StateSnapshot,
}

#[derive(Debug, Default)]
pub struct Interceptor {
    /// At most one gesture is tracked; a new one overwrites it.
    pending: Option<PendingModification>,
    next_gesture: u64,
}

impl Interceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot `id` ahead of a potential modification. Returns `None` if
    /// the object is not live.
    pub fn begin_gesture<E: SceneEngine>(&mut self, engine: &E, id: ObjectId) -> Option<GestureId> {
        let before = engine.snapshot(id)?;
        self.next_gesture += 1;
        let gesture = GestureId(self.next_gesture);
        if let Some(stale) = self.pending.replace(PendingModification {
            object: id,
            gesture,
            before,
        }) {
            log::trace!("interceptor: gesture on {:?} abandoned", stale.object);
        }
        Some(gesture)
    }

    /// Forget any tracked gesture without recording it.
    pub fn abort_gesture(&mut self) -> Option<PendingModification> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<&PendingModification> {
        self.pending.as_ref()
    }

    /// Gesture currently tracked for `id`, if any.
    pub fn gesture_for(&self, id: ObjectId) -> Option<GestureId> {
        self.pending.as_ref().filter(|p| p.object == id).map(|p| p.gesture)
    }

    /// Whether changes to `id` are worth recording at all.
    fn is_recordable<E: SceneEngine>(engine: &E, id: ObjectId) -> bool {
        !matches!(engine.category(id), Some(Category::Background) | None)
    }
}

impl<E: SceneEngine> SceneObserver<E> for Interceptor {
    fn on_created(&mut self, engine: &mut E, history: &mut History, id: ObjectId) {
        if history.is_replaying() || !Self::is_recordable(engine, id) {
            return;
        }
        history.record(engine, Command::Add { object: id });
    }

    fn on_removed(&mut self, engine: &mut E, history: &mut History, id: ObjectId) {
        if self.pending.as_ref().is_some_and(|p| p.object == id) {
            self.pending = None;
        }
        if history.is_replaying() || !Self::is_recordable(engine, id) {
            return;
        }
        history.record(engine, Command::Remove { object: id });
    }

    fn on_modified(&mut self, engine: &mut E, history: &mut History, id: ObjectId, gesture: Option<GestureId>) {
        let pending = self
            .pending
            .take_if(|p| p.object == id && gesture.is_none_or(|g| g == p.gesture));
        let Some(pending) = pending else {
            log::debug!("interceptor: {id:?} modified outside a tracked gesture, not recorded");
            return;
        };
        if history.is_replaying() {
            return;
        }
        let Some(after) = engine.snapshot(id) else {
            return;
        };
        if after == pending.before {
            log::trace!("interceptor: {id:?} unchanged, skipping");
            return;
        }
        history.record(
            engine,
            Command::Modify {
                object: id,
                before: pending.before,
                after,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dispatch_events;
    use inkboard_core::{Scene, SceneObject};
    use pretty_assertions::assert_eq;

    fn setup() -> (Scene, History, Interceptor) {
        (Scene::default(), History::new(), Interceptor::new())
    }

    fn icon() -> SceneObject {
        SceneObject::icon("data:icon", 10.0, 10.0, 10.0, 10.0, 1.0)
    }

    #[test]
    fn created_and_removed_are_recorded() {
        let (mut scene, mut history, mut interceptor) = setup();
        let id = scene.add(icon());
        dispatch_events(&mut scene, &mut history, &mut interceptor);
        scene.detach(id);
        dispatch_events(&mut scene, &mut history, &mut interceptor);
        assert_eq!(
            history.undo_stack(),
            &[Command::Add { object: id }, Command::Remove { object: id }]
        );
    }

    #[test]
    fn background_is_never_recorded() {
        let (mut scene, mut history, mut interceptor) = setup();
        scene.set_background("bg", 100.0, 100.0);
        scene.set_background("bg2", 100.0, 100.0);
        dispatch_events(&mut scene, &mut history, &mut interceptor);
        assert!(!history.can_undo());
    }

    #[test]
    fn gesture_commit_records_modify() {
        let (mut scene, mut history, mut interceptor) = setup();
        let id = scene.add(icon());
        dispatch_events(&mut scene, &mut history, &mut interceptor);

        let before = scene.snapshot(id).unwrap();
        let gesture = interceptor.begin_gesture(&scene, id).unwrap();
        scene.translate(id, 40.0, 40.0);
        scene.commit_modified(id, Some(gesture));
        dispatch_events(&mut scene, &mut history, &mut interceptor);

        assert_eq!(history.undo_len(), 2);
        match &history.undo_stack()[1] {
            Command::Modify { object, before: b, after } => {
                assert_eq!(*object, id);
                assert_eq!(*b, before);
                assert_eq!(after.position(), (50.0, 50.0));
            }
            other => panic!("expected modify, got {other:?}"),
        }
        assert!(interceptor.pending().is_none());
    }

    #[test]
    fn untracked_or_unchanged_modifications_are_skipped() {
        let (mut scene, mut history, mut interceptor) = setup();
        let id = scene.add(icon());
        dispatch_events(&mut scene, &mut history, &mut interceptor);

        scene.translate(id, 1.0, 1.0);
        scene.commit_modified(id, None);
        dispatch_events(&mut scene, &mut history, &mut interceptor);
        assert_eq!(history.undo_len(), 1);

        interceptor.begin_gesture(&scene, id);
        scene.commit_modified(id, None);
        dispatch_events(&mut scene, &mut history, &mut interceptor);
        assert_eq!(history.undo_len(), 1);
        assert!(interceptor.pending().is_none());
    }

    #[test]
    fn new_gesture_overwrites_pending() {
        let (mut scene, mut history, mut interceptor) = setup();
        let a = scene.add(icon());
        let b = scene.add(icon());
        dispatch_events(&mut scene, &mut history, &mut interceptor);

        interceptor.begin_gesture(&scene, a);
        interceptor.begin_gesture(&scene, b);
        assert_eq!(interceptor.pending().map(|p| p.object), Some(b));
        assert_eq!(interceptor.gesture_for(a), None);

        // `a` lost its snapshot, so committing it records nothing.
        scene.translate(a, 5.0, 0.0);
        scene.commit_modified(a, None);
        dispatch_events(&mut scene, &mut history, &mut interceptor);
        assert_eq!(history.undo_len(), 2);
    }

    #[test]
    fn abort_resets_pending_state() {
        let (mut scene, _, mut interceptor) = setup();
        let id = scene.add(icon());
        interceptor.begin_gesture(&scene, id);
        assert!(interceptor.abort_gesture().is_some());
        assert!(interceptor.pending().is_none());
    }
}
