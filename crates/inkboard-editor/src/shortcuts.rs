//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s, shared by the
//! wasm bridge and native tests.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    DeleteSelected,

    // ── Tools ──
    ToolSelect,
    ToolDraw,
    ToolPan,
    ToolRotate,
    /// Drop out of the current tool back to select.
    Cancel,
}

/// Resolves key events into shortcut actions.
///
/// `meta` (⌘) and `ctrl` are interchangeable as the command modifier.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.command() {
            return match key {
                "z" | "Z" if modifiers.shift => Some(ShortcutAction::Redo),
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }
        if modifiers.alt {
            return None;
        }

        match key {
            "x" | "X" | "Delete" | "Backspace" => Some(ShortcutAction::DeleteSelected),
            "v" | "V" => Some(ShortcutAction::ToolSelect),
            "b" | "B" => Some(ShortcutAction::ToolDraw),
            "h" | "H" => Some(ShortcutAction::ToolPan),
            "r" | "R" => Some(ShortcutAction::ToolRotate),
            "Escape" => Some(ShortcutAction::Cancel),
            _ => None,
        }
    }
}
