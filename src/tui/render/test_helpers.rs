use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// An App over a fresh data directory holding the given projects (no tasks).
pub fn app_with_projects(titles: &[&str]) -> (TempDir, App) {
    let tmp = TempDir::new().unwrap();
    let mut app = App::new(tmp.path()).unwrap();
    for title in titles {
        app.store.add_project(title).unwrap();
    }
    app.refresh_counts();
    (tmp, app)
}

/// An App with one project open on the board. Each task is `(title,
/// parent)` where `parent` indexes an earlier entry.
pub fn board_app(tasks: &[(&str, Option<usize>)]) -> (TempDir, App) {
    let (tmp, mut app) = app_with_projects(&["Board"]);
    let pid = app.projects()[0].id.clone();
    let mut ids: Vec<String> = Vec::new();
    for (title, parent) in tasks {
        let parent = parent.map(|i| ids[i].clone());
        let task = app.store.add_task(&pid, parent.as_deref(), title).unwrap();
        ids.push(task.id);
    }
    app.open_project(&pid);
    (tmp, app)
}

/// Titles of the board's nodes in tree order
pub fn node_titles(app: &App) -> Vec<String> {
    app.graph.nodes().map(|n| n.title.clone()).collect()
}
