use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::graph::{Gesture, apply_gesture};

use crate::tui::app::{App, ConfirmAction, Mode};

pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('y' | 'Y')) => {
            let action = app.confirm.take();
            app.mode = Mode::Navigate;
            match action {
                Some(ConfirmAction::DeleteProject { id }) => confirm_delete_project(app, &id),
                Some(ConfirmAction::DeleteTask { id }) => confirm_delete_task(app, &id),
                None => {}
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('n')) | (_, KeyCode::Esc) => {
            app.confirm = None;
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}

fn confirm_delete_project(app: &mut App, id: &str) {
    if app.mutate(|s| s.delete_project(id)) == Some(true) {
        app.boards.remove(id);
        app.clamp_projects_cursor();
    }
}

/// Delete a task with its subtree. The selection moves to the next
/// sibling, else the previous one, else the parent.
fn confirm_delete_task(app: &mut App, id: &str) {
    let fallback = {
        let siblings = app.graph.siblings(id);
        let pos = siblings.iter().position(|n| n.id == id);
        pos.and_then(|i| siblings.get(i + 1).or(i.checked_sub(1).and_then(|p| siblings.get(p))))
            .map(|n| n.id.clone())
            .or_else(|| app.graph.parent(id).map(|p| p.id.clone()))
    };
    if let Some(fallback) = &fallback {
        app.board.selected = Some(fallback.clone());
    }
    app.mutate(|s| {
        apply_gesture(
            s,
            Gesture::Delete {
                ids: vec![id.to_string()],
            },
        )
    });
}
