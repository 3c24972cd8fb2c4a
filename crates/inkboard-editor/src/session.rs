//! The editor session: one owned value holding the scene engine, history,
//! interceptor, tools, viewport, and selectability policy.
//!
//! Every entry point follows the same shape: interpret the input, mutate
//! the engine, then pump the engine's events through the interceptor so
//! they land in history before the call returns.

use crate::commands::History;
use crate::config::EditorConfig;
use crate::engine::{SceneEngine, SceneObserver, dispatch_events};
use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::interceptor::Interceptor;
use crate::policy::SelectionPolicy;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::{IconTemplate, Target, ToolController, ToolEffect, ToolMode, rotation_toward};
use crate::viewport::Viewport;
use inkboard_core::{Category, Color, Document, DocumentError, GestureId, ObjectId, Scene, SceneObject};
use serde::Serialize;

/// Routes scene events to the interceptor and keeps the selection and
/// selectability flags in step with what the scene now holds.
struct SessionObserver<'a> {
    interceptor: &'a mut Interceptor,
    policy: SelectionPolicy,
    selection: &'a mut Option<ObjectId>,
}

impl<E: SceneEngine> SceneObserver<E> for SessionObserver<'_> {
    fn on_created(&mut self, engine: &mut E, history: &mut History, id: ObjectId) {
        self.policy.apply_to(engine, id);
        self.interceptor.on_created(engine, history, id);
    }

    fn on_removed(&mut self, engine: &mut E, history: &mut History, id: ObjectId) {
        if *self.selection == Some(id) {
            *self.selection = None;
        }
        self.interceptor.on_removed(engine, history, id);
    }

    fn on_modified(&mut self, engine: &mut E, history: &mut History, id: ObjectId, gesture: Option<GestureId>) {
        self.interceptor.on_modified(engine, history, id, gesture);
    }
}

/// Snapshot of session state for the page's toolbar and status line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub tool: &'static str,
    pub undo_count: usize,
    pub redo_count: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub zoom: f64,
    pub brush_width: f64,
    pub selection: Option<ObjectId>,
    pub object_count: usize,
}

pub struct EditorSession<E: SceneEngine = Scene> {
    engine: E,
    history: History,
    interceptor: Interceptor,
    tools: ToolController,
    viewport: Viewport,
    policy: SelectionPolicy,
    config: EditorConfig,
    selection: Option<ObjectId>,
    canvas_size: (f64, f64),
}

impl<E: SceneEngine> EditorSession<E> {
    pub fn new(engine: E, config: EditorConfig) -> Self {
        let brush_color = Color::from_hex(&config.brush_color).unwrap_or_else(|| {
            log::warn!("invalid brush color {:?}, using white", config.brush_color);
            Color::WHITE
        });
        let viewport = Viewport::new(config.min_zoom, config.max_zoom);
        let mut tools = ToolController::new(config.brush_size, brush_color, config.icon_max_size);
        tools.set_zoom(viewport.zoom());
        Self {
            engine,
            history: History::new(),
            interceptor: Interceptor::new(),
            tools,
            viewport,
            policy: SelectionPolicy::new(config.icons_selectable, config.lines_selectable),
            canvas_size: (config.canvas_width, config.canvas_height),
            selection: None,
            config,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    pub fn tools(&self) -> &ToolController {
        &self.tools
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selection(&self) -> Option<ObjectId> {
        self.selection
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            tool: self.tools.mode().name(),
            undo_count: self.history.undo_len(),
            redo_count: self.history.redo_len(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            zoom: self.viewport.zoom(),
            brush_width: self.tools.brush().width,
            selection: self.selection,
            object_count: self.engine.ids().len(),
        }
    }

    // ─── Events ──────────────────────────────────────────────────────────

    /// Deliver pending scene events to the interceptor. Returns how many
    /// were delivered.
    pub fn pump_events(&mut self) -> usize {
        let mut observer = SessionObserver {
            interceptor: &mut self.interceptor,
            policy: self.policy,
            selection: &mut self.selection,
        };
        dispatch_events(&mut self.engine, &mut self.history, &mut observer)
    }

    /// Drop pending scene events unrecorded (bulk reloads).
    fn discard_events(&mut self) {
        let dropped = self.engine.take_events();
        if !dropped.is_empty() {
            log::trace!("session: discarded {} scene events", dropped.len());
        }
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let mut observer = SessionObserver {
            interceptor: &mut self.interceptor,
            policy: self.policy,
            selection: &mut self.selection,
        };
        self.history.undo(&mut self.engine, &mut observer)
    }

    pub fn redo(&mut self) -> bool {
        let mut observer = SessionObserver {
            interceptor: &mut self.interceptor,
            policy: self.policy,
            selection: &mut self.selection,
        };
        self.history.redo(&mut self.engine, &mut observer)
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, x: f64, y: f64, button: PointerButton, modifiers: Modifiers) -> bool {
        self.handle_input(InputEvent::PointerDown {
            x,
            y,
            button,
            modifiers,
        })
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.handle_input(InputEvent::PointerMove { x, y })
    }

    pub fn pointer_up(&mut self, x: f64, y: f64, button: PointerButton) -> bool {
        self.handle_input(InputEvent::PointerUp { x, y, button })
    }

    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        self.handle_input(InputEvent::Wheel { x, y, delta_y })
    }

    /// Process one input event. Returns `true` if the view may need a
    /// repaint.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        let (x, y) = match &event {
            InputEvent::Key { key, modifiers } => return self.handle_key(key, *modifiers).is_some(),
            InputEvent::Wheel { x, y, delta_y } => {
                let zoom = self
                    .viewport
                    .wheel_zoom(*x, *y, *delta_y, self.config.wheel_zoom_base);
                self.tools.set_zoom(zoom);
                return true;
            }
            InputEvent::PointerDown { x, y, .. }
            | InputEvent::PointerMove { x, y }
            | InputEvent::PointerUp { x, y, .. } => (*x, *y),
        };

        let scene = self.viewport.to_scene(x, y);
        let target = match event {
            InputEvent::PointerDown { .. } => self.engine.hit_test(scene.0, scene.1).map(|id| Target {
                id,
                selectable: self.engine.is_selectable(id),
            }),
            _ => None,
        };
        let effects = self.tools.handle(&event, scene, target);
        self.apply_effects(effects);
        true
    }

    /// Run the shortcut bound to a key, if any.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let action = ShortcutMap::resolve(key, modifiers)?;
        match action {
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::DeleteSelected => {
                self.delete_selected();
            }
            ShortcutAction::ToolSelect => self.set_tool(ToolMode::Select),
            ShortcutAction::ToolDraw => self.set_tool(ToolMode::Draw),
            ShortcutAction::ToolPan => self.set_tool(ToolMode::Pan),
            ShortcutAction::ToolRotate => self.set_tool(ToolMode::Rotate),
            ShortcutAction::Cancel => {
                let effects = self.tools.reset();
                self.apply_effects(effects);
            }
        }
        Some(action)
    }

    fn apply_effects(&mut self, effects: Vec<ToolEffect>) {
        for effect in effects {
            match effect {
                ToolEffect::BeginGesture(id) => {
                    self.interceptor.begin_gesture(&self.engine, id);
                }
                ToolEffect::CommitGesture(id) => {
                    let gesture = self.interceptor.gesture_for(id);
                    self.engine.commit_modified(id, gesture);
                }
                ToolEffect::AbortGesture => {
                    self.interceptor.abort_gesture();
                }
                ToolEffect::CancelGesture(id) => {
                    if let Some(pending) = self.interceptor.abort_gesture()
                        && pending.object == id
                    {
                        log::debug!("session: gesture on {id:?} cancelled, restoring");
                        self.engine.restore(id, &pending.before);
                        self.engine.recompute_bounds(id);
                    }
                }
                ToolEffect::Select(selection) => self.selection = selection,
                ToolEffect::LockSelection(id) => self.engine.set_interactive(id, false),
                ToolEffect::UnlockSelection(id) => {
                    self.engine.set_interactive(id, true);
                    self.policy.apply_to(&mut self.engine, id);
                }
                ToolEffect::Translate { id, dx, dy } => self.engine.translate(id, dx, dy),
                ToolEffect::RotateToward { id, x, y } => {
                    if let Some(anchor) = self.engine.position(id) {
                        self.engine.set_angle(id, rotation_toward(anchor, (x, y)));
                    }
                }
                ToolEffect::Pan { dx, dy } => self.viewport.pan_by(dx, dy),
                ToolEffect::CreateStroke { points, color, width } => {
                    let id = self.engine.add(SceneObject::stroke(&points, color, width));
                    log::debug!("session: stroke {id:?} with {} points", points.len());
                }
                ToolEffect::PlaceIcon {
                    src,
                    width,
                    height,
                    left,
                    top,
                    scale,
                } => {
                    let id = self.engine.add(SceneObject::icon(src, width, height, left, top, scale));
                    log::debug!("session: placed icon {id:?}");
                }
            }
        }
        self.pump_events();
    }

    // ─── Tools ───────────────────────────────────────────────────────────

    pub fn set_tool(&mut self, mode: ToolMode) {
        let effects = self.tools.set_mode(mode);
        self.apply_effects(effects);
        if mode == ToolMode::Select {
            self.policy.apply_all(&mut self.engine);
        }
    }

    /// Switch tools by name (`select`, `draw`, `pan`, `rotate`).
    pub fn set_tool_by_name(&mut self, name: &str) -> bool {
        match ToolMode::from_name(name) {
            Some(mode) => {
                self.set_tool(mode);
                true
            }
            None => {
                log::warn!("unknown tool {name:?}");
                false
            }
        }
    }

    /// Start placing an icon whose image has already been decoded to
    /// `width × height`.
    pub fn select_icon(&mut self, src: impl Into<String>, width: f64, height: f64) {
        let effects = self.tools.select_icon(IconTemplate {
            src: src.into(),
            width,
            height,
        });
        self.apply_effects(effects);
    }

    /// The page could not decode the picked icon. Returns whether
    /// placement was active.
    pub fn abort_icon_placement(&mut self) -> bool {
        match self.tools.abort_icon_placement() {
            Some(effects) => {
                self.apply_effects(effects);
                true
            }
            None => false,
        }
    }

    pub fn set_brush_size(&mut self, size: f64) {
        self.tools.set_brush_size(size);
    }

    /// Returns `false` (and keeps the old color) if `hex` does not parse.
    pub fn set_brush_color(&mut self, hex: &str) -> bool {
        match Color::from_hex(hex) {
            Some(color) => {
                self.tools.set_brush_color(color);
                true
            }
            None => false,
        }
    }

    pub fn set_icon_max_size(&mut self, max: f64) {
        self.config.icon_max_size = max;
        self.tools.set_icon_max_size(max);
    }

    // ─── View ────────────────────────────────────────────────────────────

    /// Slider zoom, anchored at the canvas center.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        let (w, h) = self.canvas_size;
        let zoom = self.viewport.zoom_to_point(w / 2.0, h / 2.0, zoom);
        self.tools.set_zoom(zoom);
        zoom
    }

    // ─── Selectability ───────────────────────────────────────────────────

    pub fn set_icons_selectable(&mut self, selectable: bool) -> usize {
        self.policy.set_icons_selectable(&mut self.engine, selectable)
    }

    pub fn set_lines_selectable(&mut self, selectable: bool) -> usize {
        self.policy.set_lines_selectable(&mut self.engine, selectable)
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    /// Add an object programmatically. It is recorded like any other
    /// creation.
    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        let id = self.engine.add(object);
        self.pump_events();
        id
    }

    /// Delete the selected object through the regular removal path, so it
    /// is recorded as one undoable `Remove`.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection else {
            return false;
        };
        if self.engine.category(id) == Some(Category::Background) || !self.engine.detach(id) {
            return false;
        }
        self.selection = None;
        self.pump_events();
        true
    }

    /// Remove every non-background object and forget all history.
    pub fn clear_canvas(&mut self) {
        self.pump_events();
        self.interceptor.abort_gesture();
        self.selection = None;
        self.engine.clear();
        self.discard_events();
        self.history.clear(&mut self.engine);
        log::debug!("session: canvas cleared");
    }

    /// Update the canvas size used for centered zoom.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_size = (width, height);
        self.config.canvas_width = width;
        self.config.canvas_height = height;
    }
}

impl EditorSession<Scene> {
    /// Session over a fresh in-memory scene sized from `config`.
    pub fn with_config(config: EditorConfig) -> Self {
        let scene = Scene::new(config.canvas_width, config.canvas_height);
        Self::new(scene, config)
    }

    pub fn scene(&self) -> &Scene {
        &self.engine
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.engine.set_size(width, height);
        self.set_canvas_size(width, height);
    }

    /// Replace the background image. Not recorded in history.
    pub fn set_background(&mut self, src: impl Into<String>, width: f64, height: f64) -> ObjectId {
        self.pump_events();
        let id = self.engine.set_background(src, width, height);
        self.discard_events();
        id
    }

    pub fn save_document(&self) -> Result<String, DocumentError> {
        Document::from_scene(&self.engine).to_json()
    }

    /// Replace the scene with a saved project. History is cleared and the
    /// current selectability flags are applied to every loaded object. On
    /// error nothing changes.
    pub fn load_document(&mut self, json: &str) -> Result<usize, DocumentError> {
        let objects = Document::from_json(json)?.into_objects()?;
        let count = objects.len();

        let effects = self.tools.reset();
        self.apply_effects(effects);
        self.interceptor.abort_gesture();
        self.selection = None;

        self.history.clear(&mut self.engine);
        self.engine.clear_all();
        for object in objects {
            self.engine.add(object);
        }
        self.discard_events();
        self.policy.apply_all(&mut self.engine);
        log::debug!("session: loaded {count} objects");
        Ok(count)
    }
}

impl Default for EditorSession<Scene> {
    fn default() -> Self {
        Self::with_config(EditorConfig::default())
    }
}
