use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, View};

/// (key, description)
type Binding = (&'static str, &'static str);

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Center the overlay, leaving some margin
    let overlay_area = centered_rect(60, 90, area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line<'static>> = Vec::new();
    let section = |lines: &mut Vec<Line<'static>>, title: &'static str, rows: &[Binding]| {
        lines.push(Line::from(Span::styled(title, header_style)));
        for &(key, desc) in rows {
            add_binding(lines, key, desc, key_style, desc_style);
        }
        lines.push(Line::from(""));
    };

    match app.view {
        View::Projects => {
            section(
                &mut lines,
                " Projects",
                &[
                    (" \u{2191}\u{2193}/jk", "Move cursor"),
                    (" Enter", "Open board"),
                    (" a", "New project"),
                    (" r", "Rename project"),
                    (" d", "Delete project and its tasks"),
                ],
            );
        }
        View::Board => {
            section(
                &mut lines,
                " Navigation",
                &[
                    (" \u{2190}\u{2192}\u{2191}\u{2193}/hjkl", "Parent / child / siblings"),
                    (" Shift+arrows", "Pan the board"),
                    (" .", "Center on selection"),
                    (" /  n", "Search / next match"),
                    (" Esc/q", "Back to projects"),
                ],
            );
            section(
                &mut lines,
                " Tasks",
                &[
                    (" a / A", "Add subtask / root task"),
                    (" e", "Edit title"),
                    (" space", "Toggle complete"),
                    (" z", "Expand / collapse"),
                    (" D", "Duplicate with subtasks"),
                    (" x", "Delete with subtasks"),
                    (" [ ]", "Move among siblings"),
                    (" m", "Reconnect to a new parent"),
                    (" HJKL", "Nudge (pins position)"),
                    (" u", "Unpin position"),
                    (" c", "Checklist"),
                ],
            );
        }
    }

    section(&mut lines, " Global", &[(" ?", "Toggle this help"), (" Ctrl+C", "Quit")]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .title(Span::styled(" Key Bindings ", header_style))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));

    frame.render_widget(paragraph, overlay_area);
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 16;
    let padded_key = format!("{:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}

/// Create a centered rectangle of the given percentage of the parent
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
