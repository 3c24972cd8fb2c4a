//! Per-category selectability.

use crate::engine::SceneEngine;
use inkboard_core::{Category, ObjectId};

/// Whether icons and strokes can be selected. Backgrounds never can;
/// uncategorized objects keep whatever flag they have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub icons_selectable: bool,
    pub lines_selectable: bool,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            icons_selectable: true,
            lines_selectable: true,
        }
    }
}

impl SelectionPolicy {
    pub fn new(icons_selectable: bool, lines_selectable: bool) -> Self {
        Self {
            icons_selectable,
            lines_selectable,
        }
    }

    /// Flag the policy prescribes for a category, if it governs it.
    pub fn flag_for(&self, category: Category) -> Option<bool> {
        match category {
            Category::Icon => Some(self.icons_selectable),
            Category::Stroke => Some(self.lines_selectable),
            Category::Background => Some(false),
            Category::Other => None,
        }
    }

    pub fn apply_to<E: SceneEngine>(&self, engine: &mut E, id: ObjectId) {
        if let Some(flag) = engine.category(id).and_then(|c| self.flag_for(c)) {
            engine.set_interactive(id, flag);
        }
    }

    pub fn apply_all<E: SceneEngine>(&self, engine: &mut E) {
        for id in engine.ids() {
            self.apply_to(engine, id);
        }
    }

    /// Change the icon flag, touching icons only. Returns how many objects
    /// were updated.
    pub fn set_icons_selectable<E: SceneEngine>(&mut self, engine: &mut E, selectable: bool) -> usize {
        self.icons_selectable = selectable;
        self.apply_category(engine, Category::Icon)
    }

    /// Change the stroke flag, touching strokes only.
    pub fn set_lines_selectable<E: SceneEngine>(&mut self, engine: &mut E, selectable: bool) -> usize {
        self.lines_selectable = selectable;
        self.apply_category(engine, Category::Stroke)
    }

    fn apply_category<E: SceneEngine>(&self, engine: &mut E, category: Category) -> usize {
        let mut updated = 0;
        for id in engine.ids() {
            if engine.category(id) == Some(category) {
                self.apply_to(engine, id);
                updated += 1;
            }
        }
        log::debug!("policy: {category:?} selectable flag applied to {updated} objects");
        updated
    }
}
