//! Tool mode controller.
//!
//! Exactly one `ToolMode` is active. The controller decides what a pointer
//! stream means in that mode and answers with `ToolEffect`s; it never
//! touches the scene itself. The session applies the effects, so all
//! scene mutation still flows through the engine and its event outbox.
//!
//! | Input | Select | Draw | Pan | Rotate | Icon placement |
//! |-------|--------|------|-----|--------|----------------|
//! | Primary press | grab target | start stroke | pan | grab target | place icon |
//! | Middle press | pan | pan | pan | pan | pan |
//! | Secondary press | cancel → select | cancel → select | cancel → select | cancel → select | cancel → select |

use crate::input::{InputEvent, PointerButton};
use inkboard_core::{Color, ObjectId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    #[default]
    Select,
    Draw,
    Pan,
    Rotate,
    IconPlacement,
}

impl ToolMode {
    pub fn name(self) -> &'static str {
        match self {
            ToolMode::Select => "select",
            ToolMode::Draw => "draw",
            ToolMode::Pan => "pan",
            ToolMode::Rotate => "rotate",
            ToolMode::IconPlacement => "icon",
        }
    }

    /// Inverse of `name`. Icon placement is entered through
    /// `ToolController::select_icon`, never by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "select" => Some(ToolMode::Select),
            "draw" => Some(ToolMode::Draw),
            "pan" => Some(ToolMode::Pan),
            "rotate" => Some(ToolMode::Rotate),
            _ => None,
        }
    }
}

/// Object under the pointer at press time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub id: ObjectId,
    pub selectable: bool,
}

/// What the session must do in response to an input.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEffect {
    /// Snapshot the object ahead of a possible modification.
    BeginGesture(ObjectId),
    /// The gesture finished and changed the object.
    CommitGesture(ObjectId),
    /// The gesture finished without changing the object.
    AbortGesture,
    /// The gesture was cancelled; put the object back as it was.
    CancelGesture(ObjectId),
    Select(Option<ObjectId>),
    /// Stop `id` from being selected while it is being rotated.
    LockSelection(ObjectId),
    UnlockSelection(ObjectId),
    /// Scene-space move.
    Translate { id: ObjectId, dx: f64, dy: f64 },
    /// Turn `id` to face the scene point (`x`, `y`).
    RotateToward { id: ObjectId, x: f64, y: f64 },
    /// Screen-space view translation.
    Pan { dx: f64, dy: f64 },
    CreateStroke {
        points: Vec<(f64, f64)>,
        color: Color,
        width: f64,
    },
    PlaceIcon {
        src: String,
        width: f64,
        height: f64,
        left: f64,
        top: f64,
        scale: f64,
    },
}

/// Brush used by the draw tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    /// Screen pixels.
    pub size: f64,
    pub color: Color,
    /// Scene units; `size / zoom` so strokes look the same at any zoom.
    pub width: f64,
}

/// Custom pointer shown in draw mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCursor {
    pub size: f64,
    pub color: Color,
    /// Last screen position, once the pointer has moved.
    pub position: Option<(f64, f64)>,
}

/// An icon image the user picked, at its natural size.
#[derive(Debug, Clone, PartialEq)]
pub struct IconTemplate {
    pub src: String,
    pub width: f64,
    pub height: f64,
}

/// Preview that follows the pointer during icon placement.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingIcon {
    pub template: IconTemplate,
    pub scale: f64,
    /// Screen top-left, centered on the pointer.
    pub position: Option<(f64, f64)>,
}

impl FloatingIcon {
    pub fn display_size(&self) -> (f64, f64) {
        (self.template.width * self.scale, self.template.height * self.scale)
    }

    fn follow(&mut self, x: f64, y: f64) {
        let (w, h) = self.display_size();
        self.position = Some((x - w / 2.0, y - h / 2.0));
    }
}

/// Uniform scale that fits an icon inside `max × max` without enlarging it.
pub fn icon_scale(width: f64, height: f64, max: f64) -> f64 {
    (max / width).min(max / height).min(1.0)
}

/// Angle, in degrees, that turns an object anchored at `anchor` so its
/// front edge faces `pointer`.
pub fn rotation_toward(anchor: (f64, f64), pointer: (f64, f64)) -> f64 {
    let (dx, dy) = (pointer.0 - anchor.0, pointer.1 - anchor.1);
    dy.atan2(dx).to_degrees() + 90.0
}

/// Transient state between a press and its release.
#[derive(Debug, Clone, PartialEq, Default)]
enum Gesture {
    #[default]
    Idle,
    Panning {
        last: (f64, f64),
    },
    Dragging {
        id: ObjectId,
        last: (f64, f64),
        moved: bool,
    },
    Rotating {
        id: ObjectId,
    },
    Drawing {
        points: Vec<(f64, f64)>,
    },
}

#[derive(Debug, Clone)]
pub struct ToolController {
    mode: ToolMode,
    brush: Brush,
    zoom: f64,
    cursor: Option<DrawCursor>,
    floating_icon: Option<FloatingIcon>,
    icon_max_size: f64,
    /// Rubber-band selection on empty space; only in select mode.
    selection_enabled: bool,
    gesture: Gesture,
}

impl ToolController {
    pub fn new(brush_size: f64, brush_color: Color, icon_max_size: f64) -> Self {
        Self {
            mode: ToolMode::Select,
            brush: Brush {
                size: brush_size,
                color: brush_color,
                width: brush_size,
            },
            zoom: 1.0,
            cursor: None,
            floating_icon: None,
            icon_max_size,
            selection_enabled: true,
            gesture: Gesture::Idle,
        }
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn cursor(&self) -> Option<&DrawCursor> {
        self.cursor.as_ref()
    }

    pub fn floating_icon(&self) -> Option<&FloatingIcon> {
        self.floating_icon.as_ref()
    }

    pub fn selection_enabled(&self) -> bool {
        self.selection_enabled
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Gesture::Panning { .. })
    }

    pub fn is_rotating(&self) -> bool {
        matches!(self.gesture, Gesture::Rotating { .. })
    }

    /// Points of the stroke being drawn, in scene space.
    pub fn stroke_preview(&self) -> Option<&[(f64, f64)]> {
        match &self.gesture {
            Gesture::Drawing { points } => Some(points),
            _ => None,
        }
    }

    // ─── Mode transitions ────────────────────────────────────────────────

    /// Switch tools. Any gesture in flight is cancelled first, and the
    /// returned effects undo its partial work.
    pub fn set_mode(&mut self, mode: ToolMode) -> Vec<ToolEffect> {
        let effects = self.cancel_gesture();
        if mode != ToolMode::IconPlacement {
            self.floating_icon = None;
        }
        self.mode = mode;
        self.selection_enabled = mode == ToolMode::Select;
        if mode == ToolMode::Draw {
            self.brush.width = self.brush.size / self.zoom;
            self.cursor = Some(DrawCursor {
                size: self.brush.size,
                color: self.brush.color,
                position: None,
            });
        } else {
            self.cursor = None;
        }
        log::debug!("tools: mode → {}", mode.name());
        effects
    }

    /// Secondary-button press: back to select, dropping rotation and
    /// placement state.
    pub fn reset(&mut self) -> Vec<ToolEffect> {
        self.set_mode(ToolMode::Select)
    }

    /// Enter icon placement with a floating preview of `template`.
    pub fn select_icon(&mut self, template: IconTemplate) -> Vec<ToolEffect> {
        let scale = icon_scale(template.width, template.height, self.icon_max_size);
        let effects = self.set_mode(ToolMode::IconPlacement);
        self.floating_icon = Some(FloatingIcon {
            template,
            scale,
            position: None,
        });
        effects
    }

    /// Abort icon placement (e.g. the image failed to decode). Returns
    /// `None` if placement was not active.
    pub fn abort_icon_placement(&mut self) -> Option<Vec<ToolEffect>> {
        if self.mode != ToolMode::IconPlacement && self.floating_icon.is_none() {
            return None;
        }
        log::warn!("tools: icon placement aborted");
        Some(self.set_mode(ToolMode::Select))
    }

    // ─── Settings ────────────────────────────────────────────────────────

    /// Track a zoom change so brush width stays visually constant.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
        self.brush.width = self.brush.size / zoom;
    }

    pub fn set_brush_size(&mut self, size: f64) {
        self.brush.size = size;
        self.brush.width = size / self.zoom;
        if let Some(cursor) = &mut self.cursor {
            cursor.size = size;
        }
    }

    pub fn set_brush_color(&mut self, color: Color) {
        self.brush.color = color;
        if let Some(cursor) = &mut self.cursor {
            cursor.color = color;
        }
    }

    pub fn set_icon_max_size(&mut self, max: f64) {
        self.icon_max_size = max;
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Interpret one input. `scene` is the pointer position in scene space
    /// and `target` the object under it at press time.
    pub fn handle(&mut self, event: &InputEvent, scene: (f64, f64), target: Option<Target>) -> Vec<ToolEffect> {
        match event {
            InputEvent::PointerDown { x, y, button, .. } => self.pointer_down(*button, (*x, *y), scene, target),
            InputEvent::PointerMove { x, y } => self.pointer_move((*x, *y), scene),
            InputEvent::PointerUp { .. } => self.pointer_up(),
            InputEvent::Wheel { .. } | InputEvent::Key { .. } => vec![],
        }
    }

    fn pointer_down(
        &mut self,
        button: PointerButton,
        screen: (f64, f64),
        scene: (f64, f64),
        target: Option<Target>,
    ) -> Vec<ToolEffect> {
        if button == PointerButton::Secondary {
            return self.reset();
        }
        if self.mode == ToolMode::Pan || button == PointerButton::Middle {
            self.gesture = Gesture::Panning { last: screen };
            self.selection_enabled = false;
            return vec![];
        }
        if button != PointerButton::Primary {
            return vec![];
        }

        let grabbed = target.filter(|t| t.selectable).map(|t| t.id);
        match self.mode {
            ToolMode::Select => match grabbed {
                Some(id) => {
                    self.gesture = Gesture::Dragging {
                        id,
                        last: scene,
                        moved: false,
                    };
                    vec![ToolEffect::Select(Some(id)), ToolEffect::BeginGesture(id)]
                }
                None => vec![ToolEffect::Select(None)],
            },
            ToolMode::Rotate => match grabbed {
                Some(id) => {
                    self.gesture = Gesture::Rotating { id };
                    self.selection_enabled = false;
                    vec![
                        ToolEffect::Select(Some(id)),
                        ToolEffect::BeginGesture(id),
                        ToolEffect::LockSelection(id),
                    ]
                }
                None => vec![],
            },
            ToolMode::Draw => {
                self.gesture = Gesture::Drawing { points: vec![scene] };
                vec![]
            }
            ToolMode::IconPlacement => self.place_icon(scene),
            ToolMode::Pan => vec![],
        }
    }

    fn pointer_move(&mut self, screen: (f64, f64), scene: (f64, f64)) -> Vec<ToolEffect> {
        if let Some(cursor) = &mut self.cursor {
            cursor.position = Some(screen);
        }
        if let Some(icon) = &mut self.floating_icon {
            icon.follow(screen.0, screen.1);
        }

        match &mut self.gesture {
            Gesture::Idle => vec![],
            Gesture::Panning { last } => {
                let (dx, dy) = (screen.0 - last.0, screen.1 - last.1);
                *last = screen;
                vec![ToolEffect::Pan { dx, dy }]
            }
            Gesture::Dragging { id, last, moved } => {
                let (dx, dy) = (scene.0 - last.0, scene.1 - last.1);
                *last = scene;
                if dx == 0.0 && dy == 0.0 {
                    return vec![];
                }
                *moved = true;
                vec![ToolEffect::Translate { id: *id, dx, dy }]
            }
            Gesture::Rotating { id } => vec![ToolEffect::RotateToward {
                id: *id,
                x: scene.0,
                y: scene.1,
            }],
            Gesture::Drawing { points } => {
                points.push(scene);
                vec![]
            }
        }
    }

    fn pointer_up(&mut self) -> Vec<ToolEffect> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => vec![],
            Gesture::Panning { .. } => {
                self.selection_enabled = self.mode == ToolMode::Select;
                vec![]
            }
            Gesture::Dragging { id, moved: true, .. } => vec![ToolEffect::CommitGesture(id)],
            Gesture::Dragging { moved: false, .. } => vec![ToolEffect::AbortGesture],
            Gesture::Rotating { id } => {
                self.selection_enabled = self.mode == ToolMode::Select;
                vec![ToolEffect::CommitGesture(id), ToolEffect::UnlockSelection(id)]
            }
            Gesture::Drawing { points } if points.is_empty() => vec![],
            Gesture::Drawing { points } => vec![ToolEffect::CreateStroke {
                points,
                color: self.brush.color,
                width: self.brush.width,
            }],
        }
    }

    fn place_icon(&mut self, scene: (f64, f64)) -> Vec<ToolEffect> {
        let Some(icon) = self.floating_icon.take() else {
            return self.reset();
        };
        let mut effects = vec![ToolEffect::PlaceIcon {
            src: icon.template.src,
            width: icon.template.width,
            height: icon.template.height,
            left: scene.0,
            top: scene.1,
            scale: icon.scale,
        }];
        effects.extend(self.set_mode(ToolMode::Select));
        effects
    }

    /// Drop the gesture in flight, returning effects that revert it.
    fn cancel_gesture(&mut self) -> Vec<ToolEffect> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle | Gesture::Panning { .. } | Gesture::Drawing { .. } => vec![],
            Gesture::Dragging { id, .. } => vec![ToolEffect::CancelGesture(id)],
            Gesture::Rotating { id } => vec![ToolEffect::CancelGesture(id), ToolEffect::UnlockSelection(id)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use pretty_assertions::assert_eq;

    fn down(x: f64, y: f64, button: PointerButton) -> InputEvent {
        InputEvent::PointerDown {
            x,
            y,
            button,
            modifiers: Modifiers::NONE,
        }
    }

    fn up() -> InputEvent {
        InputEvent::PointerUp {
            x: 0.0,
            y: 0.0,
            button: PointerButton::Primary,
        }
    }

    fn controller() -> ToolController {
        ToolController::new(5.0, Color::WHITE, 100.0)
    }

    fn target(name: &str) -> Target {
        Target {
            id: ObjectId::intern(name),
            selectable: true,
        }
    }

    #[test]
    fn select_tool_drag() {
        let mut tools = controller();
        let t = target("drag_me");
        let effects = tools.handle(&down(10.0, 10.0, PointerButton::Primary), (10.0, 10.0), Some(t));
        assert_eq!(
            effects,
            vec![ToolEffect::Select(Some(t.id)), ToolEffect::BeginGesture(t.id)]
        );

        let moved = InputEvent::PointerMove { x: 50.0, y: 30.0 };
        assert_eq!(
            tools.handle(&moved, (50.0, 30.0), None),
            vec![ToolEffect::Translate {
                id: t.id,
                dx: 40.0,
                dy: 20.0
            }]
        );
        assert_eq!(tools.handle(&up(), (50.0, 30.0), None), vec![ToolEffect::CommitGesture(t.id)]);
    }

    #[test]
    fn click_without_move_aborts_gesture() {
        let mut tools = controller();
        tools.handle(&down(1.0, 1.0, PointerButton::Primary), (1.0, 1.0), Some(target("still")));
        assert_eq!(tools.handle(&up(), (1.0, 1.0), None), vec![ToolEffect::AbortGesture]);
    }

    #[test]
    fn unselectable_target_is_not_grabbed() {
        let mut tools = controller();
        let locked = Target {
            selectable: false,
            ..target("locked")
        };
        let effects = tools.handle(&down(1.0, 1.0, PointerButton::Primary), (1.0, 1.0), Some(locked));
        assert_eq!(effects, vec![ToolEffect::Select(None)]);
    }

    #[test]
    fn draw_brush_scales_with_zoom() {
        let mut tools = controller();
        tools.set_zoom(2.0);
        tools.set_mode(ToolMode::Draw);
        assert_eq!(tools.brush().width, 2.5);
        assert_eq!(tools.cursor().map(|c| c.size), Some(5.0));

        tools.set_zoom(0.5);
        assert_eq!(tools.brush().width, 10.0);

        tools.set_mode(ToolMode::Pan);
        assert!(tools.cursor().is_none());
    }

    #[test]
    fn draw_creates_stroke_on_release() {
        let mut tools = controller();
        tools.set_mode(ToolMode::Draw);
        tools.handle(&down(0.0, 0.0, PointerButton::Primary), (0.0, 0.0), None);
        tools.handle(&InputEvent::PointerMove { x: 5.0, y: 5.0 }, (5.0, 5.0), None);
        assert_eq!(tools.stroke_preview().map(<[_]>::len), Some(2));

        let effects = tools.handle(&up(), (5.0, 5.0), None);
        assert_eq!(
            effects,
            vec![ToolEffect::CreateStroke {
                points: vec![(0.0, 0.0), (5.0, 5.0)],
                color: Color::WHITE,
                width: 5.0,
            }]
        );
    }

    #[test]
    fn middle_button_pans_in_any_mode() {
        let mut tools = controller();
        tools.set_mode(ToolMode::Draw);
        tools.handle(&down(100.0, 100.0, PointerButton::Middle), (0.0, 0.0), None);
        assert!(tools.is_panning());
        let effects = tools.handle(&InputEvent::PointerMove { x: 110.0, y: 95.0 }, (0.0, 0.0), None);
        assert_eq!(effects, vec![ToolEffect::Pan { dx: 10.0, dy: -5.0 }]);
        tools.handle(&up(), (0.0, 0.0), None);
        assert!(!tools.is_panning());
        assert_eq!(tools.mode(), ToolMode::Draw);
    }

    #[test]
    fn rotate_locks_selection_until_release() {
        let mut tools = controller();
        tools.set_mode(ToolMode::Rotate);
        let t = target("spin");
        let effects = tools.handle(&down(0.0, 0.0, PointerButton::Primary), (0.0, 0.0), Some(t));
        assert!(effects.contains(&ToolEffect::LockSelection(t.id)));
        assert!(tools.is_rotating());

        let effects = tools.handle(&InputEvent::PointerMove { x: 3.0, y: 4.0 }, (3.0, 4.0), None);
        assert_eq!(effects, vec![ToolEffect::RotateToward { id: t.id, x: 3.0, y: 4.0 }]);

        let effects = tools.handle(&up(), (3.0, 4.0), None);
        assert_eq!(
            effects,
            vec![ToolEffect::CommitGesture(t.id), ToolEffect::UnlockSelection(t.id)]
        );
    }

    #[test]
    fn rotation_faces_pointer() {
        // Pointer straight to the right: front edge (top) turns to face it.
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        assert!(close(rotation_toward((0.0, 0.0), (10.0, 0.0)), 90.0));
        assert!(close(rotation_toward((0.0, 0.0), (0.0, -10.0)), 0.0));
        assert!(close(rotation_toward((5.0, 5.0), (5.0, 15.0)), 180.0));
    }

    #[test]
    fn secondary_press_cancels_rotation() {
        let mut tools = controller();
        tools.set_mode(ToolMode::Rotate);
        let t = target("spin2");
        tools.handle(&down(0.0, 0.0, PointerButton::Primary), (0.0, 0.0), Some(t));
        let effects = tools.handle(&down(0.0, 0.0, PointerButton::Secondary), (0.0, 0.0), None);
        assert_eq!(
            effects,
            vec![ToolEffect::CancelGesture(t.id), ToolEffect::UnlockSelection(t.id)]
        );
        assert_eq!(tools.mode(), ToolMode::Select);
        assert!(!tools.is_rotating());
    }

    #[test]
    fn icon_placement_previews_then_places() {
        let mut tools = controller();
        tools.select_icon(IconTemplate {
            src: "data:chair".into(),
            width: 400.0,
            height: 200.0,
        });
        assert_eq!(tools.mode(), ToolMode::IconPlacement);
        tools.handle(&InputEvent::PointerMove { x: 60.0, y: 60.0 }, (60.0, 60.0), None);
        let preview = tools.floating_icon().unwrap();
        assert_eq!(preview.scale, 0.25);
        assert_eq!(preview.position, Some((10.0, 35.0)));

        let effects = tools.handle(&down(60.0, 60.0, PointerButton::Primary), (30.0, 20.0), None);
        assert_eq!(
            effects,
            vec![ToolEffect::PlaceIcon {
                src: "data:chair".into(),
                width: 400.0,
                height: 200.0,
                left: 30.0,
                top: 20.0,
                scale: 0.25,
            }]
        );
        assert_eq!(tools.mode(), ToolMode::Select);
        assert!(tools.floating_icon().is_none());
    }

    #[test]
    fn small_icons_are_not_enlarged() {
        assert_eq!(icon_scale(20.0, 40.0, 100.0), 1.0);
        assert_eq!(icon_scale(200.0, 50.0, 100.0), 0.5);
    }

    #[test]
    fn abort_icon_placement_resets_state() {
        let mut tools = controller();
        assert_eq!(tools.abort_icon_placement(), None);
        tools.select_icon(IconTemplate {
            src: "broken".into(),
            width: 10.0,
            height: 10.0,
        });
        assert_eq!(tools.abort_icon_placement(), Some(vec![]));
        assert_eq!(tools.mode(), ToolMode::Select);
        assert!(tools.floating_icon().is_none());
        assert!(tools.selection_enabled());
    }

    #[test]
    fn secondary_press_cancels_icon_placement() {
        let mut tools = controller();
        tools.select_icon(IconTemplate {
            src: "x".into(),
            width: 10.0,
            height: 10.0,
        });
        let effects = tools.handle(&down(0.0, 0.0, PointerButton::Secondary), (0.0, 0.0), None);
        assert!(effects.is_empty());
        assert_eq!(tools.mode(), ToolMode::Select);
        assert!(tools.floating_icon().is_none());
    }

    #[test]
    fn mode_names_roundtrip() {
        for mode in [ToolMode::Select, ToolMode::Draw, ToolMode::Pan, ToolMode::Rotate] {
            assert_eq!(ToolMode::from_name(mode.name()), Some(mode));
        }
        assert_eq!(ToolMode::from_name("icon"), None);
    }
}
