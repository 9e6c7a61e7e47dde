mod board;
mod checklist;
mod confirm;
mod edit;
mod move_mode;
mod projects;
mod search;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode, View};

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    app.status = None;

    // Help overlay intercepts everything until closed
    if app.show_help {
        if matches!(
            key.code,
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc
        ) {
            app.show_help = false;
        }
        return;
    }

    let key = normalize_key(key);
    match app.mode {
        Mode::Navigate => match app.view {
            View::Projects => projects::handle_projects(app, key),
            View::Board => board::handle_board(app, key),
        },
        Mode::Edit => edit::handle_edit(app, key),
        Mode::Confirm => confirm::handle_confirm(app, key),
        Mode::Move => move_mode::handle_move(app, key),
        Mode::Checklist => checklist::handle_checklist(app, key),
        Mode::Search => search::handle_search(app, key),
    }
}

/// Some terminals report Shift+h as `Char('h')` with SHIFT; fold that into
/// `Char('H')` so bindings can match on the character alone.
fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
        && c.is_ascii_lowercase()
    {
        key.code = KeyCode::Char(c.to_ascii_uppercase());
    }
    key
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    pub fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    pub fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let (_tmp, mut app) = app_with_projects(&[]);
        app.mode = Mode::Search;
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn help_overlay_swallows_keys() {
        let (_tmp, mut app) = app_with_projects(&["One"]);
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[test]
    fn shifted_letters_are_uppercased() {
        let key = normalize_key(KeyEvent::new(KeyCode::Char('h'), KeyModifiers::SHIFT));
        assert_eq!(key.code, KeyCode::Char('H'));
    }

    #[test]
    fn keys_clear_the_status_message() {
        let (_tmp, mut app) = app_with_projects(&["One"]);
        app.status = Some("saved".into());
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.status, None);
    }
}
