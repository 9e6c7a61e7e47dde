use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use regex::Regex;

use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::state::{BoardUiState, UiState, read_ui_state, write_ui_state};
use crate::io::storage::FileStore;
use crate::io::watcher::StorageWatcher;
use crate::model::{Config, Project};
use crate::ops::graph::{GraphNode, GraphView};
use crate::ops::search::{SearchHit, build_regex};
use crate::ops::store::{AppStore, StoreError};

use super::input;
use super::render;
use super::theme::Theme;

/// Board units per terminal column
pub const CELL_W: f64 = 10.0;
/// Board units per terminal row
pub const CELL_H: f64 = 20.0;

/// Which page is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Project list
    Projects,
    /// Graph of the active project's tasks
    Board,
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing into the edit buffer
    Edit,
    /// Waiting for y/n
    Confirm,
    /// Choosing a new parent for `move_source`
    Move,
    /// Cursor in the selected task's checklist
    Checklist,
    /// Typing a search pattern
    Search,
}

/// What the edit buffer is for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    NewProject,
    RenameProject { id: String },
    /// New task under `parent` (a root task for `None`)
    NewTask { parent: Option<String> },
    RenameTask { id: String },
    NewChecklistItem { task: String },
    RenameChecklistItem { task: String, item: String },
}

/// A destructive action awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteProject { id: String },
    DeleteTask { id: String },
}

/// Board cursor and viewport for one project
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    pub selected: Option<String>,
    /// Board coordinates of the top-left corner of the viewport
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Main application state
pub struct App {
    pub data_dir: PathBuf,
    pub store: AppStore<FileStore>,
    pub config: Config,
    pub theme: Theme,
    pub view: View,
    pub mode: Mode,
    pub should_quit: bool,
    pub projects_cursor: usize,
    /// Stored task count per project id
    pub task_counts: HashMap<String, usize>,
    /// Graph of the active project
    pub graph: GraphView,
    /// Board state of the active project
    pub board: BoardState,
    /// Saved board states of projects that are not open
    pub boards: HashMap<String, BoardState>,
    /// Task being reconnected in move mode
    pub move_source: Option<String>,
    pub checklist_cursor: usize,
    pub edit_buffer: String,
    /// Byte offset into `edit_buffer`
    pub edit_cursor: usize,
    pub edit_target: Option<EditTarget>,
    pub confirm: Option<ConfirmAction>,
    pub search_input: String,
    pub last_search: Option<String>,
    pub search_hits: Vec<SearchHit>,
    pub search_idx: usize,
    pub show_help: bool,
    /// One-line message for the status row, cleared on the next key
    pub status: Option<String>,
    /// Board area size in cells, captured while rendering
    pub viewport: (u16, u16),
}

impl App {
    /// Load config and projects from `data_dir`
    pub fn new(data_dir: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let config = config_io::load_config(data_dir)?;
        let theme = Theme::from_config(&config.ui);
        let mut store = AppStore::new(FileStore::new(data_dir), config.board.clone());
        store.load_projects()?;
        let task_counts = store.task_counts()?;
        let graph = GraphView::build(&[], &config.layout);

        Ok(App {
            data_dir: data_dir.to_path_buf(),
            store,
            config,
            theme,
            view: View::Projects,
            mode: Mode::Navigate,
            should_quit: false,
            projects_cursor: 0,
            task_counts,
            graph,
            board: BoardState::default(),
            boards: HashMap::new(),
            move_source: None,
            checklist_cursor: 0,
            edit_buffer: String::new(),
            edit_cursor: 0,
            edit_target: None,
            confirm: None,
            search_input: String::new(),
            last_search: None,
            search_hits: Vec::new(),
            search_idx: 0,
            show_help: false,
            status: None,
            viewport: (80, 20),
        })
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn projects(&self) -> &[Project] {
        self.store.projects()
    }

    pub fn cursor_project(&self) -> Option<&Project> {
        self.store.projects().get(self.projects_cursor)
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.store.project(self.store.active_project()?)
    }

    pub fn task_count(&self, project_id: &str) -> usize {
        self.task_counts.get(project_id).copied().unwrap_or(0)
    }

    pub fn clamp_projects_cursor(&mut self) {
        let len = self.store.projects().len();
        self.projects_cursor = self.projects_cursor.min(len.saturating_sub(1));
    }

    /// Open a project on the board, restoring its saved cursor and viewport.
    pub fn open_project(&mut self, id: &str) {
        if let Err(e) = self.store.load_tasks(id) {
            self.report(e);
            return;
        }
        self.board = self.boards.remove(id).unwrap_or_default();
        self.view = View::Board;
        self.mode = Mode::Navigate;
        self.search_hits.clear();
        self.refresh_graph();
        if self.board.offset_x == 0.0 && self.board.offset_y == 0.0 {
            self.center_on_selected();
        }
        log::debug!(
            "event=board_open module=tui status=ok nodes={}",
            self.graph.len()
        );
    }

    /// Leave the board for the project list.
    pub fn close_board(&mut self) {
        if let Some(id) = self.store.active_project().map(String::from) {
            self.boards.insert(id, std::mem::take(&mut self.board));
        }
        self.store.close_project();
        self.graph = GraphView::build(&[], &self.config.layout);
        self.move_source = None;
        self.search_hits.clear();
        self.view = View::Projects;
        self.mode = Mode::Navigate;
        self.refresh_counts();
    }

    // -----------------------------------------------------------------------
    // Mutation plumbing
    // -----------------------------------------------------------------------

    /// Run a store operation under the data-directory lock, then refresh
    /// the graph and counts. Errors land in the status row.
    pub fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut AppStore<FileStore>) -> Result<T, StoreError>,
    ) -> Option<T> {
        let _lock = match FileLock::acquire_default(&self.data_dir) {
            Ok(lock) => lock,
            Err(e) => {
                self.status = Some(e.to_string());
                return None;
            }
        };
        let result = op(&mut self.store);
        self.refresh_graph();
        self.refresh_counts();
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.report(e);
                None
            }
        }
    }

    fn report(&mut self, e: StoreError) {
        log::warn!("event=store_op module=tui status=error");
        self.status = Some(e.to_string());
    }

    pub fn refresh_counts(&mut self) {
        if let Ok(counts) = self.store.task_counts() {
            self.task_counts = counts;
        }
    }

    /// Rebuild the graph from the store and keep the selection valid.
    pub fn refresh_graph(&mut self) {
        self.graph = GraphView::build(&self.store.task_list(), &self.config.layout);
        let valid = self
            .board
            .selected
            .as_deref()
            .is_some_and(|id| self.graph.node(id).is_some());
        if !valid {
            self.board.selected = self.graph.nodes().next().map(|n| n.id.clone());
        }
        if let Some(source) = &self.move_source
            && self.store.task(source).is_none()
        {
            self.move_source = None;
            self.mode = Mode::Navigate;
        }
    }

    /// Reload everything after the collections changed on disk.
    pub fn reload_from_disk(&mut self) {
        if let Err(e) = self.store.reload() {
            self.report(e);
            return;
        }
        if self.view == View::Board && self.store.active_project().is_none() {
            self.view = View::Projects;
            self.mode = Mode::Navigate;
            self.status = Some("project was deleted".into());
        }
        self.clamp_projects_cursor();
        self.refresh_graph();
        self.refresh_counts();
        log::debug!("event=storage_reload module=tui status=ok");
    }

    // -----------------------------------------------------------------------
    // Board selection and viewport
    // -----------------------------------------------------------------------

    pub fn selected_node(&self) -> Option<&GraphNode> {
        self.graph.node(self.board.selected.as_deref()?)
    }

    pub fn selected_id(&self) -> Option<String> {
        self.board.selected.clone()
    }

    pub fn select(&mut self, id: &str) {
        self.board.selected = Some(id.to_string());
        self.checklist_cursor = 0;
        self.scroll_to_selected();
    }

    /// Viewport size in board units
    pub fn viewport_extent(&self) -> (f64, f64) {
        (
            self.viewport.0 as f64 * CELL_W,
            self.viewport.1 as f64 * CELL_H,
        )
    }

    /// Put the selected node (or the whole board when nothing is selected)
    /// in the middle of the viewport.
    pub fn center_on_selected(&mut self) {
        let target = match self.selected_node() {
            Some(node) => self.graph.rect(node).center(),
            None => match self.graph.bounds() {
                Some(b) => b.center(),
                None => return,
            },
        };
        let (w, h) = self.viewport_extent();
        self.board.offset_x = target.x - w / 2.0;
        self.board.offset_y = target.y - h / 2.0;
    }

    /// Recenter only when the selected node is not fully in view.
    pub fn scroll_to_selected(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        let rect = self.graph.rect(node);
        let (w, h) = self.viewport_extent();
        let inside = rect.min_x >= self.board.offset_x
            && rect.min_y >= self.board.offset_y
            && rect.max_x <= self.board.offset_x + w
            && rect.max_y <= self.board.offset_y + h;
        if !inside {
            self.center_on_selected();
        }
    }

    pub fn pan(&mut self, dx_cells: i32, dy_cells: i32) {
        self.board.offset_x += dx_cells as f64 * CELL_W;
        self.board.offset_y += dy_cells as f64 * CELL_H;
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Enter edit mode with `initial` in the buffer, cursor at the end.
    pub fn begin_edit(&mut self, target: EditTarget, initial: &str) {
        self.edit_buffer = initial.to_string();
        self.edit_cursor = self.edit_buffer.len();
        self.edit_target = Some(target);
        self.mode = Mode::Edit;
    }

    pub fn begin_confirm(&mut self, action: ConfirmAction) {
        self.confirm = Some(action);
        self.mode = Mode::Confirm;
    }

    /// Regex of the last search, for highlighting
    pub fn active_search_re(&self) -> Option<Regex> {
        let pattern = match self.mode {
            Mode::Search if !self.search_input.is_empty() => self.search_input.as_str(),
            Mode::Search => return None,
            _ => self.last_search.as_deref()?,
        };
        build_regex(pattern).ok()
    }
}

// ---------------------------------------------------------------------------
// UI state persistence
// ---------------------------------------------------------------------------

/// Restore UI state from .state.json
pub fn restore_ui_state(app: &mut App) {
    let Some(ui_state) = read_ui_state(&app.data_dir) else {
        return;
    };

    for (id, board) in ui_state.boards {
        app.boards.insert(
            id,
            BoardState {
                selected: board.selected,
                offset_x: board.offset_x,
                offset_y: board.offset_y,
            },
        );
    }
    app.projects_cursor = ui_state.projects_cursor;
    app.clamp_projects_cursor();
    app.last_search = ui_state.last_search;

    if ui_state.view == "board"
        && let Some(id) = ui_state.active_project
        && app.store.project(&id).is_some()
    {
        app.open_project(&id);
    }
}

/// Snapshot of the UI state as written to .state.json
pub fn ui_state(app: &App) -> UiState {
    let mut boards: HashMap<String, BoardUiState> = app
        .boards
        .iter()
        .map(|(id, b)| (id.clone(), board_ui_state(b)))
        .collect();
    if let Some(id) = app.store.active_project() {
        boards.insert(id.to_string(), board_ui_state(&app.board));
    }

    let view = match app.view {
        View::Projects => "projects",
        View::Board => "board",
    };
    UiState {
        view: view.to_string(),
        active_project: app.store.active_project().map(String::from),
        projects_cursor: app.projects_cursor,
        boards,
        last_search: app.last_search.clone(),
    }
}

fn board_ui_state(board: &BoardState) -> BoardUiState {
    BoardUiState {
        selected: board.selected.clone(),
        offset_x: board.offset_x,
        offset_y: board.offset_y,
    }
}

/// Save UI state to .state.json
pub fn save_ui_state(app: &App) {
    if write_ui_state(&app.data_dir, &ui_state(app)).is_err() {
        log::warn!("event=state_save module=tui status=error");
    }
}

// ---------------------------------------------------------------------------
// Terminal loop
// ---------------------------------------------------------------------------

/// Run the TUI application
pub fn run(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(data_dir)?;
    restore_ui_state(&mut app);

    // Not fatal: the board still works, it just won't see CLI writes.
    let watcher = match StorageWatcher::start(data_dir) {
        Ok(w) => Some(w),
        Err(_) => {
            log::warn!("event=watcher_start module=tui status=error");
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    log::info!("event=tui_start module=tui status=ok");
    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    save_ui_state(&app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    log::info!("event=tui_exit module=tui status=ok");
    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&StorageWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut save_counter = 0u32;
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
            // Debounced state save: every ~5 key presses
            save_counter += 1;
            if save_counter >= 5 {
                save_ui_state(app);
                save_counter = 0;
            }
        }

        if let Some(watcher) = watcher
            && !watcher.poll().is_empty()
        {
            app.reload_from_disk();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
