use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::util::unicode;

use crate::tui::app::{App, EditTarget, Mode};

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => cancel_edit(app),
        (_, KeyCode::Enter) => commit_edit(app),
        (m, KeyCode::Left) if !m.contains(KeyModifiers::ALT) => {
            if let Some(prev) = unicode::prev_grapheme_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_cursor = prev;
            }
        }
        (m, KeyCode::Right) if !m.contains(KeyModifiers::ALT) => {
            if let Some(next) = unicode::next_grapheme_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_cursor = next;
            }
        }
        (m, KeyCode::Left) if m.contains(KeyModifiers::ALT) => {
            app.edit_cursor = word_boundary_left(&app.edit_buffer, app.edit_cursor);
        }
        (m, KeyCode::Right) if m.contains(KeyModifiers::ALT) => {
            app.edit_cursor = word_boundary_right(&app.edit_buffer, app.edit_cursor);
        }
        (_, KeyCode::Home) | (KeyModifiers::CONTROL, KeyCode::Char('a')) => app.edit_cursor = 0,
        (_, KeyCode::End) | (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
            app.edit_cursor = app.edit_buffer.len();
        }
        // Word backspace (Alt+Backspace or Ctrl+W)
        (m, KeyCode::Backspace) if m.contains(KeyModifiers::ALT) => delete_word_left(app),
        (KeyModifiers::CONTROL, KeyCode::Char('w')) => delete_word_left(app),
        // Clear to start of line
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
            app.edit_buffer.drain(..app.edit_cursor);
            app.edit_cursor = 0;
        }
        (_, KeyCode::Backspace) => {
            if let Some(prev) = unicode::prev_grapheme_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_buffer.drain(prev..app.edit_cursor);
                app.edit_cursor = prev;
            }
        }
        (_, KeyCode::Delete) => {
            if let Some(next) = unicode::next_grapheme_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_buffer.drain(app.edit_cursor..next);
            }
        }
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            app.edit_buffer.insert(app.edit_cursor, c);
            app.edit_cursor += c.len_utf8();
        }
        _ => {}
    }
}

fn delete_word_left(app: &mut App) {
    let start = word_boundary_left(&app.edit_buffer, app.edit_cursor);
    app.edit_buffer.drain(start..app.edit_cursor);
    app.edit_cursor = start;
}

/// Start of the word before `pos` (skipping whitespace first)
fn word_boundary_left(s: &str, pos: usize) -> usize {
    let before = &s[..pos];
    let trimmed = before.trim_end();
    trimmed
        .rfind(char::is_whitespace)
        .map_or(0, |i| i + trimmed[i..].chars().next().map_or(1, char::len_utf8))
}

/// End of the word after `pos` (skipping whitespace first)
fn word_boundary_right(s: &str, pos: usize) -> usize {
    let after = &s[pos..];
    let skipped = after.len() - after.trim_start().len();
    let rest = &after[skipped..];
    let word = rest.find(char::is_whitespace).unwrap_or(rest.len());
    pos + skipped + word
}

/// Where the app returns after leaving the edit buffer
fn mode_after(target: Option<&EditTarget>) -> Mode {
    match target {
        Some(EditTarget::NewChecklistItem { .. } | EditTarget::RenameChecklistItem { .. }) => {
            Mode::Checklist
        }
        _ => Mode::Navigate,
    }
}

fn cancel_edit(app: &mut App) {
    let target = app.edit_target.take();
    app.mode = mode_after(target.as_ref());
    app.edit_buffer.clear();
    app.edit_cursor = 0;
}

fn commit_edit(app: &mut App) {
    let text = app.edit_buffer.trim().to_string();
    let Some(target) = app.edit_target.take() else {
        app.mode = Mode::Navigate;
        return;
    };
    app.mode = mode_after(Some(&target));
    app.edit_buffer.clear();
    app.edit_cursor = 0;
    if text.is_empty() {
        return;
    }

    match target {
        EditTarget::NewProject => {
            if let Some(project) = app.mutate(|s| s.add_project(&text))
                && let Some(idx) = app.projects().iter().position(|p| p.id == project.id)
            {
                app.projects_cursor = idx;
            }
        }
        EditTarget::RenameProject { id } => {
            app.mutate(|s| s.rename_project(&id, &text));
        }
        EditTarget::NewTask { parent } => {
            let Some(project_id) = app.store.active_project().map(String::from) else {
                return;
            };
            let created = app.mutate(|s| {
                let task = s.add_task(&project_id, parent.as_deref(), &text)?;
                if let Some(parent) = &parent {
                    s.set_expanded(parent, true)?;
                }
                Ok(task)
            });
            if let Some(task) = created {
                app.select(&task.id);
            }
        }
        EditTarget::RenameTask { id } => {
            app.mutate(|s| s.rename_task(&id, &text));
        }
        EditTarget::NewChecklistItem { task } => {
            if let Some(Some(updated)) = app.mutate(|s| s.add_checklist_item(&task, &text)) {
                app.checklist_cursor = updated.checklist_items().len().saturating_sub(1);
            }
        }
        EditTarget::RenameChecklistItem { task, item } => {
            app.mutate(|s| s.rename_checklist_item(&task, &item, &text));
        }
    }
}
