use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::graph::{Gesture, apply_gesture};
use crate::ops::tree::next_order;

use crate::tui::app::{App, Mode};

use super::board::navigate;

/// Move mode: walk to the new parent and press Enter, or R to make the
/// task a root.
pub(super) fn handle_move(app: &mut App, key: KeyEvent) {
    if navigate(app, key) {
        return;
    }
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => finish(app),
        (_, KeyCode::Enter) => connect(app),
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('R')) => make_root(app),
        _ => {}
    }
}

fn finish(app: &mut App) {
    app.move_source = None;
    app.mode = Mode::Navigate;
}

fn connect(app: &mut App) {
    let (Some(source), Some(parent)) = (app.move_source.clone(), app.selected_id()) else {
        return;
    };
    if source == parent {
        app.status = Some("pick a different node as the new parent".into());
        return;
    }
    let moved = app.mutate(|s| {
        apply_gesture(
            s,
            Gesture::Connect {
                source: parent.clone(),
                target: source.clone(),
            },
        )?;
        s.set_expanded(&parent, true)
    });
    if moved.is_some() {
        finish(app);
        app.select(&source);
    }
}

fn make_root(app: &mut App) {
    let Some(source) = app.move_source.clone() else {
        return;
    };
    let Some(project_id) = app.store.active_project().map(String::from) else {
        return;
    };
    let order = next_order(app.store.tasks(), &project_id, None);
    if app.mutate(|s| s.move_task(&source, None, order)).is_some() {
        finish(app);
        app.select(&source);
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::press;
    use super::*;
    use crate::tui::render::test_helpers::*;
    use pretty_assertions::assert_eq;

    fn node_id(app: &App, title: &str) -> String {
        app.graph.nodes().find(|n| n.title == title).unwrap().id.clone()
    }

    fn parent_title(app: &App, title: &str) -> Option<String> {
        app.graph.parent(&node_id(app, title)).map(|p| p.title.clone())
    }

    #[test]
    fn reconnect_under_another_root() {
        let (_tmp, mut app) = board_app(&[("Root", None), ("Kid", Some(0)), ("Other", None)]);
        app.select(&node_id(&app, "Kid"));
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.mode, Mode::Move);
        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(parent_title(&app, "Kid").as_deref(), Some("Other"));
        assert_eq!(app.selected_node().unwrap().title, "Kid");
    }

    #[test]
    fn descendant_as_parent_is_refused() {
        let (_tmp, mut app) = board_app(&[("Root", None), ("Kid", Some(0))]);
        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Move);
        assert!(app.status.as_deref().unwrap().contains("cannot move"));
        assert_eq!(parent_title(&app, "Kid").as_deref(), Some("Root"));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.move_source, None);
    }

    #[test]
    fn make_root_appends_after_roots() {
        let (_tmp, mut app) = board_app(&[("Root", None), ("Kid", Some(0)), ("Other", None)]);
        app.select(&node_id(&app, "Kid"));
        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Char('R'));
        assert_eq!(parent_title(&app, "Kid"), None);
        assert_eq!(node_titles(&app), vec!["Root", "Other", "Kid"]);
    }
}
