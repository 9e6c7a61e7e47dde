use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::io::paths::state_path;

/// Persisted TUI state (written to .state.json)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UiState {
    /// Which view is showing ("projects" or "board")
    pub view: String,
    /// Project open in the board view
    #[serde(default)]
    pub active_project: Option<String>,
    /// Cursor in the project list
    #[serde(default)]
    pub projects_cursor: usize,
    /// Per-project board state
    #[serde(default)]
    pub boards: HashMap<String, BoardUiState>,
    /// Last search pattern
    #[serde(default)]
    pub last_search: Option<String>,
}

/// Per-project board state
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BoardUiState {
    /// Selected task id
    #[serde(default)]
    pub selected: Option<String>,
    /// Viewport origin in board units
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
}

/// Read .state.json from the data directory
pub fn read_ui_state(data_dir: &Path) -> Option<UiState> {
    let content = fs::read_to_string(state_path(data_dir)).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the data directory
pub fn write_ui_state(data_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    fs::create_dir_all(data_dir)?;
    let content = serde_json::to_string_pretty(state)?;
    fs::write(state_path(data_dir), content)
}
