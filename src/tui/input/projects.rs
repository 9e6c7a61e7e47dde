use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, ConfirmAction, EditTarget};

pub(super) fn handle_projects(app: &mut App, key: KeyEvent) {
    let len = app.projects().len();
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('j') | KeyCode::Down => {
            if app.projects_cursor + 1 < len {
                app.projects_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.projects_cursor = app.projects_cursor.saturating_sub(1);
        }
        KeyCode::Char('g') | KeyCode::Home => app.projects_cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.projects_cursor = len.saturating_sub(1),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
            if let Some(id) = app.cursor_project().map(|p| p.id.clone()) {
                app.open_project(&id);
            }
        }
        KeyCode::Char('a') => app.begin_edit(EditTarget::NewProject, ""),
        KeyCode::Char('r') => {
            if let Some(project) = app.cursor_project() {
                let (id, title) = (project.id.clone(), project.title.clone());
                app.begin_edit(EditTarget::RenameProject { id }, &title);
            }
        }
        KeyCode::Char('d') => {
            if let Some(id) = app.cursor_project().map(|p| p.id.clone()) {
                app.begin_confirm(ConfirmAction::DeleteProject { id });
            }
        }
        _ => {}
    }
}
