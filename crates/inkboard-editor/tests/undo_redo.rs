//! History laws exercised through a full editor session.

use inkboard_core::{Color, SceneObject};
use inkboard_editor::input::{Modifiers, PointerButton};
use inkboard_editor::{EditorSession, ReplayMode, ToolMode};
use pretty_assertions::assert_eq;

fn draw(session: &mut EditorSession, points: &[(f64, f64)]) {
    session.set_tool(ToolMode::Draw);
    let (x0, y0) = points[0];
    session.pointer_down(x0, y0, PointerButton::Primary, Modifiers::NONE);
    for &(x, y) in &points[1..] {
        session.pointer_move(x, y);
    }
    let (xn, yn) = points[points.len() - 1];
    session.pointer_up(xn, yn, PointerButton::Primary);
}

fn drag(session: &mut EditorSession, from: (f64, f64), to: (f64, f64)) {
    session.set_tool(ToolMode::Select);
    session.pointer_down(from.0, from.1, PointerButton::Primary, Modifiers::NONE);
    session.pointer_move(to.0, to.1);
    session.pointer_up(to.0, to.1, PointerButton::Primary);
}

/// Everything about the scene that undo/redo must reproduce.
fn scene_state(session: &EditorSession) -> Vec<(String, (f64, f64), f64)> {
    session
        .scene()
        .objects()
        .map(|o| (o.id.to_string(), o.position(), o.state.transform.angle))
        .collect()
}

#[test]
fn undo_all_then_redo_all_restores_scene() {
    let mut session: EditorSession = EditorSession::default();
    draw(&mut session, &[(10.0, 10.0), (40.0, 30.0), (60.0, 10.0)]);
    session.add_object(SceneObject::icon("data:a", 20.0, 20.0, 200.0, 200.0, 1.0));
    drag(&mut session, (205.0, 205.0), (305.0, 255.0));
    session.add_object(SceneObject::stroke(&[(0.0, 300.0), (50.0, 350.0)], Color::BLACK, 2.0));

    let final_state = scene_state(&session);
    let n = session.history().undo_len();
    assert_eq!(n, 4);

    for _ in 0..n {
        assert!(session.undo());
    }
    assert!(session.scene().is_empty());
    assert_eq!(session.history().redo_len(), n);

    for _ in 0..n {
        assert!(session.redo());
    }
    assert_eq!(scene_state(&session), final_state);
    assert_eq!(session.history().undo_len(), n);
    assert_eq!(session.history().redo_len(), 0);
}

#[test]
fn bounds_follow_replayed_state() {
    let mut session: EditorSession = EditorSession::default();
    let id = session.add_object(SceneObject::icon("data:a", 20.0, 20.0, 0.0, 0.0, 1.0));
    drag(&mut session, (5.0, 5.0), (105.0, 5.0));

    session.undo();
    assert_eq!(session.scene().bounds_of(id).unwrap().x, 0.0);
    session.redo();
    assert_eq!(session.scene().bounds_of(id).unwrap().x, 100.0);
}

#[test]
fn fresh_edit_after_undo_clears_redo() {
    let mut session: EditorSession = EditorSession::default();
    session.add_object(SceneObject::icon("data:a", 10.0, 10.0, 0.0, 0.0, 1.0));
    session.add_object(SceneObject::icon("data:b", 10.0, 10.0, 50.0, 0.0, 1.0));
    session.undo();
    session.undo();
    assert_eq!(session.history().redo_len(), 2);

    draw(&mut session, &[(100.0, 100.0), (120.0, 120.0)]);
    assert_eq!(session.history().redo_len(), 0);
    assert!(!session.redo());
    // The undone icons are gone for good.
    assert_eq!(session.scene().retained_len(), 0);
}

#[test]
fn replays_never_record() {
    let mut session: EditorSession = EditorSession::default();
    let id = session.add_object(SceneObject::icon("data:a", 20.0, 20.0, 0.0, 0.0, 1.0));
    drag(&mut session, (5.0, 5.0), (50.0, 50.0));
    session.set_tool(ToolMode::Select);
    session.pointer_down(55.0, 55.0, PointerButton::Primary, Modifiers::NONE);
    session.pointer_up(55.0, 55.0, PointerButton::Primary);
    assert!(session.delete_selected());

    let total = session.history().undo_len() + session.history().redo_len();
    for _ in 0..3 {
        session.undo();
        assert_eq!(session.history().undo_len() + session.history().redo_len(), total);
        assert_eq!(session.history().mode(), ReplayMode::Idle);
    }
    for _ in 0..3 {
        session.redo();
        assert_eq!(session.history().undo_len() + session.history().redo_len(), total);
    }
    assert!(!session.scene().contains(id));
}

#[test]
fn undone_removal_returns_to_original_z_index() {
    let mut session: EditorSession = EditorSession::default();
    let back = session.add_object(SceneObject::icon("data:a", 10.0, 10.0, 0.0, 0.0, 1.0));
    let middle = session.add_object(SceneObject::icon("data:b", 10.0, 10.0, 100.0, 0.0, 1.0));
    let front = session.add_object(SceneObject::icon("data:c", 10.0, 10.0, 200.0, 0.0, 1.0));

    session.pointer_down(105.0, 5.0, PointerButton::Primary, Modifiers::NONE);
    session.pointer_up(105.0, 5.0, PointerButton::Primary);
    assert_eq!(session.selection(), Some(middle));
    assert!(session.delete_selected());
    assert_eq!(session.scene().ids(), vec![back, front]);

    session.undo();
    assert_eq!(session.scene().ids(), vec![back, middle, front]);
    session.redo();
    assert_eq!(session.scene().ids(), vec![back, front]);
}

#[test]
fn undo_of_creation_drops_selection() {
    let mut session: EditorSession = EditorSession::default();
    let id = session.add_object(SceneObject::icon("data:a", 10.0, 10.0, 0.0, 0.0, 1.0));
    session.pointer_down(5.0, 5.0, PointerButton::Primary, Modifiers::NONE);
    session.pointer_up(5.0, 5.0, PointerButton::Primary);
    assert_eq!(session.selection(), Some(id));

    session.undo();
    assert_eq!(session.selection(), None);
    assert!(!session.delete_selected());
}

#[test]
fn empty_history_is_a_no_op() {
    let mut session: EditorSession = EditorSession::default();
    assert!(!session.undo());
    assert!(!session.redo());
    assert_eq!(session.status().undo_count, 0);
}
