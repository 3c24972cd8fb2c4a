//! WASM bridge for Inkboard. Exposes the editing session to the page script.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the DOM and
//! drawing; it forwards pointer and key events here and repaints from
//! `get_scene_json` whenever a call reports a change.

mod logger;

use inkboard_core::{Document, Scene};
use inkboard_editor::input::{Modifiers, PointerButton};
use inkboard_editor::shortcuts::ShortcutAction;
use inkboard_editor::{EditorConfig, EditorSession};
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;

/// The canvas controller handed to JavaScript.
#[wasm_bindgen]
pub struct InkCanvas {
    session: EditorSession<Scene>,
}

#[wasm_bindgen]
impl InkCanvas {
    /// Create a controller from the page's JSON config. Unknown or missing
    /// keys fall back to defaults; a malformed config is logged and ignored.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Self {
        console_error_panic_hook_setup();

        let raw: Value = serde_json::from_str(config_json).unwrap_or(Value::Null);
        logger::init(logger::parse_level(raw.get("logLevel").and_then(Value::as_str)));

        let config = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            serde_json::from_str::<EditorConfig>(config_json).unwrap_or_else(|e| {
                log::warn!("inkboard: bad config, using defaults: {e}");
                EditorConfig::default()
            })
        };
        log::info!(
            "inkboard: canvas {}x{}",
            config.canvas_width,
            config.canvas_height
        );
        Self {
            session: EditorSession::with_config(config),
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.session.resize(width, height);
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// `button` is the DOM `MouseEvent.button` value.
    /// Returns `true` if the scene or overlay needs a repaint.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        button: u16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.session
            .pointer_down(x, y, PointerButton::from_dom(button), modifiers)
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.session.pointer_move(x, y)
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64, button: u16) -> bool {
        self.session.pointer_up(x, y, PointerButton::from_dom(button))
    }

    /// Zoom around the pointer. Returns the new zoom level.
    pub fn handle_wheel(&mut self, x: f64, y: f64, delta_y: f64) -> f64 {
        self.session.wheel(x, y, delta_y);
        self.session.viewport().zoom()
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Returns JSON: `{"changed":bool,"action":"...","tool":"..."}`.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let before = self.session.status();
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        let action = self.session.handle_key(key, modifiers);
        let changed = self.session.status() != before;
        let action_name = action.map_or("none", action_to_name);
        let tool = self.session.tools().mode().name();
        format!(r#"{{"changed":{changed},"action":"{action_name}","tool":"{tool}"}}"#)
    }

    // ─── Tools ───────────────────────────────────────────────────────────

    /// Switch tool by name. Returns `false` for an unknown name.
    pub fn set_tool(&mut self, name: &str) -> bool {
        self.session.set_tool_by_name(name)
    }

    pub fn get_tool_name(&self) -> String {
        self.session.tools().mode().name().to_string()
    }

    /// Start icon placement once the page has decoded the image.
    pub fn select_icon(&mut self, src: &str, width: f64, height: f64) {
        self.session.select_icon(src, width, height);
    }

    /// The page failed to decode the picked icon.
    pub fn abort_icon_placement(&mut self) -> bool {
        self.session.abort_icon_placement()
    }

    pub fn set_brush_size(&mut self, size: f64) {
        self.session.set_brush_size(size);
    }

    /// Accepts `#rgb`, `#rrggbb` or `#rrggbbaa`. Returns `false` if unparseable.
    pub fn set_brush_color(&mut self, hex: &str) -> bool {
        self.session.set_brush_color(hex)
    }

    pub fn set_icon_max_size(&mut self, max: f64) {
        self.session.set_icon_max_size(max);
    }

    /// Zoom around the canvas center. Returns the clamped zoom.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.session.set_zoom(zoom)
    }

    /// Returns how many icons were updated.
    pub fn set_icons_selectable(&mut self, selectable: bool) -> u32 {
        self.session.set_icons_selectable(selectable) as u32
    }

    /// Returns how many strokes were updated.
    pub fn set_lines_selectable(&mut self, selectable: bool) -> u32 {
        self.session.set_lines_selectable(selectable) as u32
    }

    // ─── Editing ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.session.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.session.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.history().can_redo()
    }

    pub fn delete_selected(&mut self) -> bool {
        self.session.delete_selected()
    }

    pub fn clear_canvas(&mut self) {
        self.session.clear_canvas();
    }

    /// Replace the background image. Returns the new background's id.
    pub fn set_background(&mut self, src: &str, width: f64, height: f64) -> String {
        self.session.set_background(src, width, height).to_string()
    }

    // ─── Documents ───────────────────────────────────────────────────────

    /// Serialize the project. Returns an empty string on failure.
    pub fn save_document(&self) -> String {
        self.session.save_document().unwrap_or_else(|e| {
            log::error!("inkboard: save failed: {e}");
            String::new()
        })
    }

    /// Returns JSON: `{"ok":true,"count":N}` or `{"ok":false,"error":"..."}`.
    pub fn load_document(&mut self, json: &str) -> String {
        let result = match self.session.load_document(json) {
            Ok(count) => json!({ "ok": true, "count": count }),
            Err(e) => {
                log::warn!("inkboard: load failed: {e}");
                json!({ "ok": false, "error": e.to_string() })
            }
        };
        result.to_string()
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Toolbar state as JSON.
    pub fn get_status(&self) -> String {
        serde_json::to_string(&self.session.status()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Everything the page needs to repaint, as JSON.
    pub fn get_scene_json(&self) -> String {
        scene_json(&self.session).to_string()
    }
}

fn scene_json(session: &EditorSession<Scene>) -> Value {
    let tools = session.tools();
    let cursor = tools.cursor().map(|c| {
        json!({
            "size": c.size,
            "color": c.color.to_hex(),
            "position": c.position,
        })
    });
    let floating = tools.floating_icon().map(|f| {
        let (width, height) = f.display_size();
        json!({
            "src": f.template.src,
            "width": width,
            "height": height,
            "position": f.position,
        })
    });
    let brush = tools.brush();
    json!({
        "viewport": session.viewport().transform(),
        "objects": Document::from_scene(session.scene()).objects,
        "selection": session.selection(),
        "tool": tools.mode().name(),
        "brush": { "color": brush.color.to_hex(), "width": brush.width },
        "cursor": cursor,
        "floatingIcon": floating,
        "strokePreview": tools.stroke_preview(),
    })
}

fn action_to_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::DeleteSelected => "delete",
        ShortcutAction::ToolSelect => "tool_select",
        ShortcutAction::ToolDraw => "tool_draw",
        ShortcutAction::ToolPan => "tool_pan",
        ShortcutAction::ToolRotate => "tool_rotate",
        ShortcutAction::Cancel => "cancel",
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Inkboard WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone helpers (no canvas needed) ───────────────────────────────

/// Check a saved project. Returns JSON: `{"ok":true,"count":N}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_document(json: &str) -> String {
    let reply = match Document::from_json(json).and_then(Document::into_objects) {
        Ok(objects) => json!({ "ok": true, "count": objects.len() }),
        Err(e) => json!({ "ok": false, "error": e.to_string() }),
    };
    reply.to_string()
}

/// Scale factor that fits an icon of natural size `width`x`height` inside
/// `max` pixels.
#[wasm_bindgen]
pub fn icon_scale(width: f64, height: f64, max: f64) -> f64 {
    inkboard_editor::tools::icon_scale(width, height, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn canvas() -> InkCanvas {
        InkCanvas::new(r#"{"canvasWidth": 400, "canvasHeight": 300}"#)
    }

    fn parse(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn bad_config_falls_back_to_defaults() {
        let c = InkCanvas::new("{ not json");
        assert_eq!(c.session.config().canvas_width, EditorConfig::default().canvas_width);
        let c = InkCanvas::new("");
        assert_eq!(c.get_tool_name(), "select");
    }

    #[test]
    fn draw_then_undo_through_keys() {
        let mut c = canvas();
        assert!(c.set_tool("draw"));
        c.handle_pointer_down(10.0, 10.0, 0, false, false, false, false);
        c.handle_pointer_move(40.0, 40.0);
        c.handle_pointer_up(40.0, 40.0, 0);
        assert!(c.can_undo());

        let reply = parse(&c.handle_key("z", true, false, false, false));
        assert_eq!(reply["action"], "undo");
        assert_eq!(reply["changed"], true);
        assert!(c.can_redo());

        let reply = parse(&c.handle_key("q", false, false, false, false));
        assert_eq!(reply["action"], "none");
        assert_eq!(reply["changed"], false);
        assert_eq!(reply["tool"], "draw");
    }

    #[test]
    fn unknown_tool_name_is_rejected() {
        let mut c = canvas();
        assert!(!c.set_tool("icon"));
        assert!(!c.set_tool("lasso"));
        assert_eq!(c.get_tool_name(), "select");
    }

    #[test]
    fn load_reports_errors_as_json() {
        let mut c = canvas();
        let reply = parse(&c.load_document(r#"{"version": 9, "objects": []}"#));
        assert_eq!(reply["ok"], false);
        assert!(reply["error"].as_str().is_some());

        let reply = parse(&validate_document("nope"));
        assert_eq!(reply["ok"], false);
    }

    #[test]
    fn save_load_round_trip() {
        let mut c = canvas();
        c.set_background("data:plan", 400.0, 300.0);
        c.select_icon("data:chair", 50.0, 50.0);
        c.handle_pointer_down(100.0, 100.0, 0, false, false, false, false);
        c.handle_pointer_up(100.0, 100.0, 0);
        let saved = c.save_document();
        assert_eq!(parse(&validate_document(&saved))["count"], 2);

        let mut other = canvas();
        let reply = parse(&other.load_document(&saved));
        assert_eq!(reply, json!({ "ok": true, "count": 2 }));
        assert!(!other.can_undo());
    }

    #[test]
    fn scene_json_carries_overlay_state() {
        let mut c = canvas();
        c.set_tool("draw");
        c.handle_pointer_move(20.0, 20.0);
        let scene = parse(&c.get_scene_json());
        assert_eq!(scene["tool"], "draw");
        assert_eq!(scene["viewport"], json!([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]));
        assert_eq!(scene["cursor"]["position"], json!([20.0, 20.0]));
        assert!(scene["floatingIcon"].is_null());
        assert_eq!(scene["objects"], json!([]));
    }

    #[test]
    fn status_is_json() {
        let mut c = canvas();
        c.set_zoom(2.0);
        let status = parse(&c.get_status());
        assert_eq!(status["zoom"], 2.0);
        assert_eq!(status["undoCount"], 0);
        assert_eq!(status["tool"], "select");
    }

    #[test]
    fn action_names() {
        assert_eq!(action_to_name(ShortcutAction::DeleteSelected), "delete");
        assert_eq!(action_to_name(ShortcutAction::Cancel), "cancel");
    }
}
