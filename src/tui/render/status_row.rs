use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::tree::collect_subtree_ids;
use crate::tui::app::{App, ConfirmAction, EditTarget, Mode, View};
use crate::util::unicode::truncate_to_width;

use super::helpers::push_right_aligned;

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let bright = Style::default().fg(app.theme.text_bright).bg(bg);
    let cursor = Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg));

    let (mut spans, hint): (Vec<Span>, Option<&str>) = match app.mode {
        Mode::Navigate => navigate_spans(app),
        Mode::Edit => {
            let at = app.edit_cursor.min(app.edit_buffer.len());
            let (before, after) = app.edit_buffer.split_at(at);
            (
                vec![
                    Span::styled(
                        format!(" {}", edit_prompt(app)),
                        Style::default().fg(app.theme.highlight).bg(bg),
                    ),
                    Span::styled(before.to_string(), bright),
                    cursor,
                    Span::styled(after.to_string(), bright),
                ],
                Some("Enter save  Esc cancel "),
            )
        }
        Mode::Confirm => (
            vec![Span::styled(
                format!(" {}", confirm_prompt(app)),
                Style::default()
                    .fg(app.theme.red)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD),
            )],
            Some("y confirm  n cancel "),
        ),
        Mode::Move => (
            vec![Span::styled(
                " Move: pick the new parent",
                Style::default().fg(app.theme.move_source).bg(bg),
            )],
            Some("Enter connect  R make root  Esc cancel "),
        ),
        Mode::Checklist => (
            vec![Span::styled(" Checklist", bright)],
            Some("space toggle  a add  e rename  d delete  Esc back "),
        ),
        Mode::Search => (
            vec![
                Span::styled(format!(" /{}", app.search_input), bright),
                cursor,
            ],
            Some("Enter search  Esc cancel "),
        ),
    };

    if let Some(hint) = hint {
        push_right_aligned(
            &mut spans,
            Span::styled(hint, dim),
            width,
            Style::default().bg(bg),
        );
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// Status message, else the active search, else key hints when enabled
fn navigate_spans(app: &App) -> (Vec<Span<'static>>, Option<&'static str>) {
    let bg = app.theme.background;
    if let Some(message) = &app.status {
        return (
            vec![Span::styled(
                format!(" {}", message),
                Style::default().fg(app.theme.yellow).bg(bg),
            )],
            None,
        );
    }
    if app.view == View::Board
        && let Some(pattern) = &app.last_search
    {
        let position = if app.search_hits.is_empty() {
            "no matches".to_string()
        } else {
            format!("{}/{}", app.search_idx + 1, app.search_hits.len())
        };
        return (
            vec![Span::styled(
                format!(" /{}  {}", pattern, position),
                Style::default().fg(app.theme.dim).bg(bg),
            )],
            Some("n next "),
        );
    }
    if app.config.ui.show_key_hints {
        let hints = match app.view {
            View::Projects => " Enter open  a add  r rename  d delete  ? help  q quit",
            View::Board => " a add  e edit  space done  z fold  m move  c checklist  ? help",
        };
        return (
            vec![Span::styled(hints, Style::default().fg(app.theme.dim).bg(bg))],
            None,
        );
    }
    (Vec::new(), None)
}

fn edit_prompt(app: &App) -> &'static str {
    match &app.edit_target {
        Some(EditTarget::NewProject) => "New project: ",
        Some(EditTarget::RenameProject { .. }) => "Rename project: ",
        Some(EditTarget::NewTask { parent: Some(_) }) => "New subtask: ",
        Some(EditTarget::NewTask { parent: None }) => "New task: ",
        Some(EditTarget::RenameTask { .. }) => "Title: ",
        Some(EditTarget::NewChecklistItem { .. }) => "New item: ",
        Some(EditTarget::RenameChecklistItem { .. }) => "Rename item: ",
        None => "",
    }
}

fn confirm_prompt(app: &App) -> String {
    match &app.confirm {
        Some(ConfirmAction::DeleteProject { id }) => {
            let title = app.store.project(id).map_or("", |p| p.title.as_str());
            let count = app.task_count(id);
            format!(
                "Delete project \"{}\" and its {} tasks?",
                truncate_to_width(title, 30),
                count
            )
        }
        Some(ConfirmAction::DeleteTask { id }) => {
            let title = app.store.task(id).map_or("", |t| t.title.as_str());
            let below = collect_subtree_ids(&app.store.task_list(), id)
                .len()
                .saturating_sub(1);
            if below == 0 {
                format!("Delete \"{}\"?", truncate_to_width(title, 30))
            } else {
                format!(
                    "Delete \"{}\" and {} subtasks?",
                    truncate_to_width(title, 30),
                    below
                )
            }
        }
        None => String::new(),
    }
}
