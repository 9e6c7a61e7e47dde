use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::Project;
use crate::tui::app::App;
use crate::util::unicode::{display_width, truncate_to_width};

use super::helpers::push_right_aligned;

/// Render the project list: title on the left, created date and task count
/// on the right
pub fn render_projects_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let height = area.height as usize;
    let mut lines: Vec<Line> = Vec::new();

    let projects = app.projects();
    if projects.is_empty() {
        lines.push(Line::from(Span::styled(
            " No projects yet. Press a to create one.",
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    }

    // Keep the cursor on screen
    let scroll = (app.projects_cursor + 1).saturating_sub(height);
    for (i, project) in projects.iter().enumerate().skip(scroll).take(height) {
        lines.push(project_line(app, project, i == app.projects_cursor, area.width));
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn project_line<'a>(app: &App, project: &'a Project, is_cursor: bool, width: u16) -> Line<'a> {
    let bg = if is_cursor {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let width = width as usize;
    let count = app.task_count(&project.id);
    let noun = if count == 1 { "task" } else { "tasks" };
    let meta = format!(
        "{}  {:>3} {} ",
        project.created_at.format("%Y-%m-%d"),
        count,
        noun
    );

    let marker = if is_cursor { " \u{25B8} " } else { "   " };
    let title_room = width.saturating_sub(display_width(marker) + meta.len() + 2);
    let mut title_style = Style::default().fg(app.theme.text).bg(bg);
    if is_cursor {
        title_style = title_style
            .fg(app.theme.text_bright)
            .add_modifier(Modifier::BOLD);
    }

    let mut spans = vec![
        Span::styled(
            marker,
            Style::default().fg(app.theme.selection_border).bg(bg),
        ),
        Span::styled(truncate_to_width(&project.title, title_room), title_style),
    ];
    push_right_aligned(
        &mut spans,
        Span::styled(meta, Style::default().fg(app.theme.dim).bg(bg)),
        width,
        Style::default().bg(bg),
    );
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn lists_projects_with_counts() {
        let (_tmp, mut app) = app_with_projects(&["Garden", "Taxes"]);
        let garden = app.projects()[0].id.clone();
        app.store.add_task(&garden, None, "Plant").unwrap();
        app.refresh_counts();

        let out = render_to_string(TERM_W, 4, |frame, area| {
            render_projects_view(frame, &app, area);
        });
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with(" \u{25B8} Garden"));
        assert!(lines[0].ends_with("1 task"));
        assert!(lines[1].starts_with("   Taxes"));
        assert!(lines[1].ends_with("0 tasks"));
    }

    #[test]
    fn empty_list_hint() {
        let (_tmp, app) = app_with_projects(&[]);
        let out = render_to_string(TERM_W, 2, |frame, area| {
            render_projects_view(frame, &app, area);
        });
        assert_eq!(out, " No projects yet. Press a to create one.");
    }

    #[test]
    fn cursor_scrolls_into_view() {
        let (_tmp, mut app) = app_with_projects(&["a", "b", "c", "d"]);
        app.projects_cursor = 3;
        let out = render_to_string(TERM_W, 2, |frame, area| {
            render_projects_view(frame, &app, area);
        });
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("   c"));
        assert!(lines[1].starts_with(" \u{25B8} d"));
    }
}
