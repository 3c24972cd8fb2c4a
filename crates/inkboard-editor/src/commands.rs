//! Undo/Redo history.
//!
//! Every recorded edit is a reversible `Command` naming the object it
//! touched. Commands hold object handles, never objects: an object removed
//! by an edit (or by undoing its creation) waits in the engine's retained
//! pool until no command on either stack mentions it.
//!
//! Replays are guarded by `ReplayMode`. While a command is being undone or
//! redone, the scene events it causes are still delivered to the observer,
//! which sees `is_replaying()` and records nothing.

use crate::engine::{SceneEngine, SceneObserver, dispatch_events};
use inkboard_core::{ObjectId, StateSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// The object was inserted.
    Add { object: ObjectId },
    /// The object was deleted.
    Remove { object: ObjectId },
    /// The object's transform or style changed.
    Modify {
        object: ObjectId,
        before: StateSnapshot,
        after: StateSnapshot,
    },
}

impl Command {
    pub fn object(&self) -> ObjectId {
        match self {
            Command::Add { object } | Command::Remove { object } | Command::Modify { object, .. } => *object,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::Remove { .. } => "remove",
            Command::Modify { .. } => "modify",
        }
    }

    fn apply_inverse<E: SceneEngine>(&self, engine: &mut E) {
        match self {
            Command::Add { object } => {
                engine.detach(*object);
            }
            Command::Remove { object } => {
                engine.reattach(*object);
            }
            Command::Modify { object, before, .. } => {
                engine.restore(*object, before);
                engine.recompute_bounds(*object);
            }
        }
    }

    fn apply_forward<E: SceneEngine>(&self, engine: &mut E) {
        match self {
            Command::Add { object } => {
                engine.reattach(*object);
            }
            Command::Remove { object } => {
                engine.detach(*object);
            }
            Command::Modify { object, after, .. } => {
                engine.restore(*object, after);
                engine.recompute_bounds(*object);
            }
        }
    }
}

/// What the history is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayMode {
    #[default]
    Idle,
    Undoing,
    Redoing,
}

/// Two-stack edit history. Unbounded for the lifetime of a session.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    mode: ReplayMode,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a fresh edit. Any redo lineage is invalidated.
    pub fn record<E: SceneEngine>(&mut self, engine: &mut E, command: Command) {
        log::trace!("history: record {} {:?}", command.description(), command.object());
        self.undo_stack.push(command);
        let invalidated = std::mem::take(&mut self.redo_stack);
        self.drop_commands(engine, invalidated);
    }

    /// Revert the newest command. Returns `false` when there is nothing to
    /// undo.
    pub fn undo<E, O>(&mut self, engine: &mut E, observer: &mut O) -> bool
    where
        E: SceneEngine,
        O: SceneObserver<E> + ?Sized,
    {
        // Anything already pending belongs to a live edit, not the replay.
        dispatch_events(engine, self, observer);

        let Some(command) = self.undo_stack.pop() else {
            return false;
        };
        log::trace!("history: undo {} {:?}", command.description(), command.object());
        self.mode = ReplayMode::Undoing;
        command.apply_inverse(engine);
        self.redo_stack.push(command);
        dispatch_events(engine, self, observer);
        self.mode = ReplayMode::Idle;
        true
    }

    /// Re-apply the newest undone command. Returns `false` when there is
    /// nothing to redo.
    pub fn redo<E, O>(&mut self, engine: &mut E, observer: &mut O) -> bool
    where
        E: SceneEngine,
        O: SceneObserver<E> + ?Sized,
    {
        dispatch_events(engine, self, observer);

        let Some(command) = self.redo_stack.pop() else {
            return false;
        };
        log::trace!("history: redo {} {:?}", command.description(), command.object());
        self.mode = ReplayMode::Redoing;
        command.apply_forward(engine);
        self.undo_stack.push(command);
        dispatch_events(engine, self, observer);
        self.mode = ReplayMode::Idle;
        true
    }

    /// Empty both stacks, releasing every detached object they kept alive.
    pub fn clear<E: SceneEngine>(&mut self, engine: &mut E) {
        let mut dropped = std::mem::take(&mut self.undo_stack);
        dropped.append(&mut self.redo_stack);
        if !dropped.is_empty() {
            log::debug!("history: cleared {} commands", dropped.len());
        }
        self.drop_commands(engine, dropped);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Commands available to undo, oldest first.
    pub fn undo_stack(&self) -> &[Command] {
        &self.undo_stack
    }

    /// Commands available to redo; the last one is redone next.
    pub fn redo_stack(&self) -> &[Command] {
        &self.redo_stack
    }

    pub fn mode(&self) -> ReplayMode {
        self.mode
    }

    pub fn is_replaying(&self) -> bool {
        self.mode != ReplayMode::Idle
    }

    fn references(&self, id: ObjectId) -> bool {
        self.undo_stack.iter().chain(&self.redo_stack).any(|c| c.object() == id)
    }

    /// Let go of detached objects that only the dropped commands mentioned.
    fn drop_commands<E: SceneEngine>(&mut self, engine: &mut E, dropped: Vec<Command>) {
        for command in dropped {
            let id = command.object();
            if !self.references(id) && engine.release(id) {
                log::trace!("history: released {id:?}");
            }
        }
    }
}
