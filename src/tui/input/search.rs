use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::search::search_tasks;

use crate::tui::app::{App, Mode};

pub(super) fn handle_search(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => {
            app.search_input.clear();
            app.mode = Mode::Navigate;
        }
        (_, KeyCode::Enter) => {
            app.mode = Mode::Navigate;
            let pattern = std::mem::take(&mut app.search_input);
            if pattern.is_empty() {
                app.last_search = None;
                app.search_hits.clear();
                return;
            }
            app.last_search = Some(pattern);
            run_search(app);
            app.search_idx = 0;
            jump_to_hit(app);
        }
        (_, KeyCode::Backspace) => {
            app.search_input.pop();
        }
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            app.search_input.push(c);
        }
        _ => {}
    }
}

/// Advance to the next hit of the last search, wrapping at the end.
pub(super) fn next_hit(app: &mut App) {
    if app.last_search.is_none() {
        return;
    }
    if app.search_hits.is_empty() {
        run_search(app);
        app.search_idx = 0;
    } else {
        app.search_idx = (app.search_idx + 1) % app.search_hits.len();
    }
    jump_to_hit(app);
}

fn run_search(app: &mut App) {
    let Some(pattern) = app.last_search.clone() else {
        return;
    };
    match search_tasks(&app.store.task_list(), &pattern) {
        Ok(hits) => {
            log::info!(
                "event=search module=tui status=ok hits={}",
                hits.len()
            );
            app.search_hits = hits;
        }
        Err(e) => {
            app.search_hits.clear();
            app.status = Some(format!("bad pattern: {e}"));
        }
    }
}

/// Select the current hit, expanding collapsed ancestors so it is on the
/// board.
fn jump_to_hit(app: &mut App) {
    let Some(hit) = app.search_hits.get(app.search_idx) else {
        return;
    };
    let task_id = hit.task_id.clone();

    let mut collapsed = Vec::new();
    let mut cursor = app.store.task(&task_id).and_then(|t| t.parent_id.clone());
    while let Some(id) = cursor {
        let Some(parent) = app.store.task(&id) else {
            break;
        };
        if !parent.is_expanded {
            collapsed.push(id.clone());
        }
        cursor = parent.parent_id.clone();
        if collapsed.len() > app.store.tasks().count() {
            break;
        }
    }
    if !collapsed.is_empty() {
        app.mutate(|s| {
            for id in &collapsed {
                s.set_expanded(id, true)?;
            }
            Ok(())
        });
    }

    if app.graph.node(&task_id).is_some() {
        app.select(&task_id);
        app.center_on_selected();
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{press, type_text};
    use super::*;
    use crate::tui::render::test_helpers::*;
    use pretty_assertions::assert_eq;

    fn selected_title(app: &App) -> String {
        app.selected_node().map(|n| n.title.clone()).unwrap_or_default()
    }

    #[test]
    fn search_jumps_and_cycles() {
        let (_tmp, mut app) = board_app(&[
            ("Buy milk", None),
            ("Walk dog", None),
            ("Milk the cow", Some(1)),
        ]);
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.mode, Mode::Search);
        type_text(&mut app, "MILK");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.last_search.as_deref(), Some("MILK"));
        assert_eq!(app.search_hits.len(), 2);
        assert_eq!(selected_title(&app), "Buy milk");

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(selected_title(&app), "Milk the cow");
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(selected_title(&app), "Buy milk");
    }

    #[test]
    fn hit_inside_collapsed_subtree_expands_it() {
        let (_tmp, mut app) = board_app(&[("Root", None), ("Mid", Some(0)), ("Deep", Some(1))]);
        let root = app.selected_id().unwrap();
        app.mutate(|s| s.set_expanded(&root, false));
        assert_eq!(node_titles(&app), vec!["Root"]);

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "deep");
        press(&mut app, KeyCode::Enter);
        assert_eq!(node_titles(&app), vec!["Root", "Mid", "Deep"]);
        assert_eq!(selected_title(&app), "Deep");
    }

    #[test]
    fn escape_and_empty_pattern() {
        let (_tmp, mut app) = board_app(&[("Root", None)]);
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "ro");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.search_input, "r");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.last_search, None);

        app.last_search = Some("root".into());
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.last_search, None);
        assert!(app.search_hits.is_empty());
    }
}
