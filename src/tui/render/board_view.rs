//! Board view: the project's visible tasks as boxes, parent-child edges as
//! Braille lines underneath. Board units map to cells through `CELL_W` and
//! `CELL_H`; the viewport origin is `app.board.offset_*`.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction as LayoutDirection, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use regex::Regex;

use crate::model::{Direction, Task};
use crate::ops::graph::GraphNode;
use crate::tui::app::{App, CELL_H, CELL_W, EditTarget, Mode};
use crate::util::unicode::{truncate_to_width, wrap_to_width};

use super::helpers::check_marker;
use super::push_highlighted_spans;

const CHECKLIST_PANEL_WIDTH: u16 = 36;

/// Render the board, plus the checklist panel when it is in use
pub fn render_board_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let board_area = if checklist_panel_open(app) && area.width > CHECKLIST_PANEL_WIDTH * 2 {
        let chunks = Layout::default()
            .direction(LayoutDirection::Horizontal)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(CHECKLIST_PANEL_WIDTH),
            ])
            .split(area);
        render_checklist_panel(frame, app, chunks[1]);
        chunks[0]
    } else {
        area
    };

    app.viewport = (board_area.width, board_area.height);

    if app.graph.is_empty() {
        let hint = Paragraph::new(Line::from(Span::styled(
            " No tasks. Press a to add one.",
            Style::default().fg(app.theme.dim).bg(app.theme.background),
        )))
        .style(Style::default().bg(app.theme.background));
        frame.render_widget(hint, board_area);
        return;
    }

    render_edges(frame, app, board_area);

    let search_re = app.active_search_re();
    for node in app.graph.nodes() {
        if let Some(rect) = node_cells(app, node, board_area) {
            render_node(frame, app, node, rect, search_re.as_ref());
        }
    }
}

fn checklist_panel_open(app: &App) -> bool {
    app.mode == Mode::Checklist
        || matches!(
            app.edit_target,
            Some(EditTarget::NewChecklistItem { .. } | EditTarget::RenameChecklistItem { .. })
        )
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Cell rectangle of a node, clipped to `area`; `None` when off screen
fn node_cells(app: &App, node: &GraphNode, area: Rect) -> Option<Rect> {
    let rect = app.graph.rect(node);
    let x0 = ((rect.min_x - app.board.offset_x) / CELL_W).floor() as i64 + area.x as i64;
    let y0 = ((rect.min_y - app.board.offset_y) / CELL_H).floor() as i64 + area.y as i64;
    let x1 = x0 + (rect.width() / CELL_W).round().max(4.0) as i64;
    let y1 = y0 + (rect.height() / CELL_H).round().max(3.0) as i64;

    let cx0 = x0.max(area.x as i64);
    let cy0 = y0.max(area.y as i64);
    let cx1 = x1.min(area.right() as i64);
    let cy1 = y1.min(area.bottom() as i64);
    if cx0 >= cx1 || cy0 >= cy1 {
        return None;
    }
    Some(Rect::new(
        cx0 as u16,
        cy0 as u16,
        (cx1 - cx0) as u16,
        (cy1 - cy0) as u16,
    ))
}

/// Edge endpoints in board units: out of the parent's trailing side, into
/// the child's leading side.
fn edge_segment(app: &App, source: &GraphNode, target: &GraphNode) -> (f64, f64, f64, f64) {
    let from = app.graph.rect(source);
    let to = app.graph.rect(target);
    match app.config.layout.direction {
        Direction::LeftRight => (
            from.max_x,
            from.center().y,
            to.min_x,
            to.center().y,
        ),
        Direction::TopBottom => (
            from.center().x,
            from.max_y,
            to.center().x,
            to.min_y,
        ),
    }
}

fn render_edges(frame: &mut Frame, app: &App, area: Rect) {
    let segments: Vec<((f64, f64, f64, f64), Color)> = app
        .graph
        .edges()
        .filter_map(|edge| {
            let source = app.graph.node(&edge.source)?;
            let target = app.graph.node(&edge.target)?;
            Some((
                edge_segment(app, source, target),
                app.theme.edge_color(edge.completed),
            ))
        })
        .collect();

    let left = app.board.offset_x;
    let top = app.board.offset_y;
    let right = left + area.width as f64 * CELL_W;
    let bottom = top + area.height as f64 * CELL_H;

    // Canvas y grows upward; board y grows downward.
    let canvas = Canvas::default()
        .background_color(app.theme.background)
        .marker(Marker::Braille)
        .x_bounds([left, right])
        .y_bounds([-bottom, -top])
        .paint(move |ctx| {
            for &((x1, y1, x2, y2), color) in &segments {
                ctx.draw(&CanvasLine::new(x1, -y1, x2, -y2, color));
            }
        });
    frame.render_widget(canvas, area);
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

fn render_node(frame: &mut Frame, app: &App, node: &GraphNode, rect: Rect, re: Option<&Regex>) {
    let is_selected = app.board.selected.as_deref() == Some(node.id.as_str());
    let is_move_source =
        app.mode == Mode::Move && app.move_source.as_deref() == Some(node.id.as_str());

    let bg = if is_selected {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let border = if is_move_source {
        app.theme.move_source
    } else if is_selected {
        app.theme.selection_border
    } else {
        app.theme.node_border
    };
    let border_type = if is_selected || is_move_source {
        BorderType::Thick
    } else {
        BorderType::Rounded
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border).bg(bg))
        .style(Style::default().bg(bg));
    let inner_width = rect.width.saturating_sub(2) as usize;
    let inner_height = rect.height.saturating_sub(2) as usize;
    let lines = node_label(app, node, inner_width, inner_height, bg, re);

    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

/// Title lines (wrapped) followed by a meta line: checklist progress,
/// hidden descendants and a pin marker.
fn node_label<'a>(
    app: &App,
    node: &GraphNode,
    width: usize,
    height: usize,
    bg: Color,
    re: Option<&Regex>,
) -> Vec<Line<'a>> {
    let meta = node_meta(node);
    let title_lines = if meta.is_empty() {
        height
    } else {
        height.saturating_sub(1)
    }
    .max(1);

    let title_color = if node.is_completed {
        app.theme.node_done
    } else {
        app.theme.text_bright
    };
    let mut title_style = Style::default().fg(title_color).bg(bg);
    if node.is_completed {
        title_style = title_style.add_modifier(Modifier::CROSSED_OUT);
    }
    let match_style = Style::default()
        .fg(app.theme.search_match_fg)
        .bg(app.theme.search_match_bg);
    let marker_color = if node.is_completed {
        app.theme.green
    } else {
        app.theme.dim
    };

    let text = format!("{} {}", check_marker(node.is_completed), node.title);
    let mut lines = Vec::new();
    for (i, chunk) in wrap_to_width(&text, width, title_lines).into_iter().enumerate() {
        let mut spans = Vec::new();
        let rest = if i == 0 && (chunk.starts_with("[ ]") || chunk.starts_with("[x]")) {
            spans.push(Span::styled(
                chunk[..3].to_string(),
                Style::default().fg(marker_color).bg(bg),
            ));
            &chunk[3..]
        } else {
            chunk.as_str()
        };
        push_highlighted_spans(&mut spans, rest, title_style, match_style, re);
        lines.push(Line::from(spans));
    }

    if !meta.is_empty() && lines.len() < height {
        lines.push(Line::from(Span::styled(
            truncate_to_width(&meta, width),
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    }
    lines
}

fn node_meta(node: &GraphNode) -> String {
    let mut parts = Vec::new();
    if node.checklist_total > 0 {
        parts.push(format!(
            "\u{2611} {}/{}",
            node.checklist_done, node.checklist_total
        ));
    }
    if node.hidden > 0 {
        parts.push(format!("+{} hidden", node.hidden));
    }
    if node.pinned {
        parts.push("\u{25C6}".to_string());
    }
    parts.join("  ")
}

// ---------------------------------------------------------------------------
// Checklist panel
// ---------------------------------------------------------------------------

fn render_checklist_panel(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let task: Option<&Task> = app
        .board
        .selected
        .as_deref()
        .and_then(|id| app.store.task(id));
    let title = task.map_or(String::new(), |t| {
        truncate_to_width(&t.title, area.width.saturating_sub(4) as usize)
    });
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.selection_border).bg(bg))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(bg));

    let width = area.width.saturating_sub(2) as usize;
    let items = task.map(|t| t.checklist_items()).unwrap_or_default();
    let mut lines: Vec<Line> = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let is_cursor = app.mode == Mode::Checklist && i == app.checklist_cursor;
        let row_bg = if is_cursor { app.theme.selection_bg } else { bg };
        let fg = if item.is_completed {
            app.theme.node_done
        } else {
            app.theme.text
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ", check_marker(item.is_completed)),
                Style::default().fg(app.theme.dim).bg(row_bg),
            ),
            Span::styled(
                truncate_to_width(&item.title, width.saturating_sub(4)),
                Style::default().fg(fg).bg(row_bg),
            ),
        ]));
    }
    if items.is_empty() {
        lines.push(Line::from(Span::styled(
            "No items. Press a to add one.",
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    } else if let Some(task) = task {
        let (done, total) = task.checklist_progress();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("{done}/{total} done"),
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    }

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChecklistItem;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn renders_nodes_with_markers() {
        let (_tmp, mut app) = board_app(&[("Root", None), ("Child", Some(0))]);
        let out = render_to_string(TERM_W, 20, |frame, area| {
            render_board_view(frame, &mut app, area);
        });
        assert!(out.contains("[ ] Root"), "{out}");
        assert!(out.contains("[ ] Child"), "{out}");
        // selected node has a thick border
        assert!(out.contains('\u{250F}'), "{out}");
        assert_eq!(app.viewport, (TERM_W, 20));
    }

    #[test]
    fn collapsed_node_shows_hidden_count() {
        let (_tmp, mut app) = board_app(&[("Root", None), ("Child", Some(0))]);
        let root = app.selected_id().unwrap();
        app.mutate(|s| s.toggle_expanded(&root));
        app.center_on_selected();
        let out = render_to_string(TERM_W, 20, |frame, area| {
            render_board_view(frame, &mut app, area);
        });
        assert!(out.contains("+1 hidden"), "{out}");
        assert!(!out.contains("Child"), "{out}");
    }

    #[test]
    fn empty_board_hint() {
        let (_tmp, mut app) = board_app(&[]);
        let out = render_to_string(TERM_W, 5, |frame, area| {
            render_board_view(frame, &mut app, area);
        });
        assert_eq!(out, " No tasks. Press a to add one.");
    }

    #[test]
    fn checklist_panel_lists_items() {
        let (_tmp, mut app) = board_app(&[("Root", None)]);
        let root = app.selected_id().unwrap();
        let mut task = app.store.task(&root).unwrap().clone();
        let mut done = ChecklistItem::new("buy soil");
        done.is_completed = true;
        task.checklist = Some(vec![done, ChecklistItem::new("water")]);
        app.mutate(|s| s.update_task(&task));
        app.mode = Mode::Checklist;

        let out = render_to_string(TERM_W, 20, |frame, area| {
            render_board_view(frame, &mut app, area);
        });
        assert!(out.contains("[x] buy soil"), "{out}");
        assert!(out.contains("[ ] water"), "{out}");
        assert!(out.contains("1/2 done"), "{out}");
        assert_eq!(app.viewport.0, TERM_W - CHECKLIST_PANEL_WIDTH);
    }

    #[test]
    fn off_screen_nodes_are_skipped() {
        let (_tmp, mut app) = board_app(&[("Root", None)]);
        app.board.offset_x = 100_000.0;
        let node = app.selected_node().unwrap().clone();
        assert_eq!(node_cells(&app, &node, Rect::new(0, 0, 80, 20)), None);
    }

    #[test]
    fn meta_line_parts() {
        let (_tmp, app) = board_app(&[("Root", None)]);
        let mut node = app.selected_node().unwrap().clone();
        assert_eq!(node_meta(&node), "");
        node.checklist_done = 1;
        node.checklist_total = 3;
        node.hidden = 4;
        node.pinned = true;
        assert_eq!(node_meta(&node), "\u{2611} 1/3  +4 hidden  \u{25C6}");
    }
}
