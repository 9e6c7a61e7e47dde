use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, EditTarget, Mode};

/// Checklist mode: the cursor walks the selected task's checklist items.
pub(super) fn handle_checklist(app: &mut App, key: KeyEvent) {
    let Some(task_id) = app.selected_id() else {
        app.mode = Mode::Navigate;
        return;
    };
    let items: Vec<(String, String)> = app
        .store
        .task(&task_id)
        .map(|t| {
            t.checklist_items()
                .iter()
                .map(|i| (i.id.clone(), i.title.clone()))
                .collect()
        })
        .unwrap_or_default();
    let current = items.get(app.checklist_cursor).cloned();

    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) | (KeyModifiers::NONE, KeyCode::Char('c' | 'q')) => {
            app.mode = Mode::Navigate;
        }
        (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
            if app.checklist_cursor + 1 < items.len() {
                app.checklist_cursor += 1;
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
            app.checklist_cursor = app.checklist_cursor.saturating_sub(1);
        }
        (KeyModifiers::NONE, KeyCode::Char(' ') | KeyCode::Enter) => {
            if let Some((item, _)) = current {
                app.mutate(|s| s.toggle_checklist_item(&task_id, &item));
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('a')) => {
            app.begin_edit(EditTarget::NewChecklistItem { task: task_id }, "");
        }
        (KeyModifiers::NONE, KeyCode::Char('e')) => {
            if let Some((item, title)) = current {
                app.begin_edit(
                    EditTarget::RenameChecklistItem {
                        task: task_id,
                        item,
                    },
                    &title,
                );
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('d') | KeyCode::Char('x')) | (_, KeyCode::Delete) => {
            if let Some((item, _)) = current {
                app.mutate(|s| s.remove_checklist_item(&task_id, &item));
                let remaining = items.len() - 1;
                app.checklist_cursor = app.checklist_cursor.min(remaining.saturating_sub(1));
            }
        }
        (_, KeyCode::Char('?')) => app.show_help = true,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{press, type_text};
    use super::*;
    use crate::tui::render::test_helpers::*;
    use pretty_assertions::assert_eq;

    fn items(app: &App) -> Vec<(String, bool)> {
        let id = app.selected_id().unwrap();
        app.store
            .task(&id)
            .unwrap()
            .checklist_items()
            .iter()
            .map(|i| (i.title.clone(), i.is_completed))
            .collect()
    }

    #[test]
    fn add_toggle_rename_remove() {
        let (_tmp, mut app) = board_app(&[("Pack", None)]);
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.mode, Mode::Checklist);
        for title in ["tent", "stove"] {
            press(&mut app, KeyCode::Char('a'));
            type_text(&mut app, title);
            press(&mut app, KeyCode::Enter);
        }
        assert_eq!(app.checklist_cursor, 1);

        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, "s");
        press(&mut app, KeyCode::Enter);
        assert_eq!(
            items(&app),
            vec![("tents".to_string(), true), ("stove".to_string(), false)]
        );
        assert_eq!(app.selected_node().unwrap().checklist_done, 1);

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.checklist_cursor, 0);
        press(&mut app, KeyCode::Char('d'));
        assert!(items(&app).is_empty());
        let id = app.selected_id().unwrap();
        assert_eq!(app.store.task(&id).unwrap().checklist, Some(Vec::new()));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Navigate);
    }
}
