use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, View};
use crate::util::unicode::truncate_to_width;

use super::helpers::{push_right_aligned, spans_width};

/// Title row (breadcrumb on the left, counts on the right) and a separator
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let bg = app.theme.background;
    let width = chunks[0].width as usize;
    let bright = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let mut spans = vec![
        Span::styled(" \u{25B6} ", Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled("tasktree", bright),
    ];
    let summary = match (app.view, app.active_project()) {
        (View::Board, Some(project)) => {
            spans.push(Span::styled(" \u{203A} ", dim));
            let room = width.saturating_sub(spans_width(&spans) + 12);
            spans.push(Span::styled(
                truncate_to_width(&project.title, room),
                Style::default().fg(app.theme.text).bg(bg),
            ));
            let hidden: usize = app.graph.nodes().map(|n| n.hidden).sum();
            if hidden > 0 {
                format!("{} shown +{} ", app.graph.len(), hidden)
            } else {
                format!("{} tasks ", app.graph.len())
            }
        }
        _ => format!("{} projects ", app.projects().len()),
    };

    push_right_aligned(
        &mut spans,
        Span::styled(summary, dim),
        width,
        Style::default().bg(bg),
    );

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "\u{2500}".repeat(chunks[1].width as usize),
            dim,
        )))
        .style(Style::default().bg(bg)),
        chunks[1],
    );
}
