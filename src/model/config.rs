use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from `config.toml` in the data directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Which way the board grows from the roots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Roots on the left, children to the right
    #[default]
    #[serde(rename = "LR")]
    LeftRight,
    /// Roots on top, children below
    #[serde(rename = "TB")]
    TopBottom,
}

/// Automatic layout parameters (board units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub direction: Direction,
    #[serde(default = "default_node_width")]
    pub node_width: f64,
    #[serde(default = "default_node_height")]
    pub node_height: f64,
    /// Gap between consecutive ranks (parent → child)
    #[serde(default = "default_rank_sep")]
    pub rank_sep: f64,
    /// Gap between neighbouring nodes of the same rank
    #[serde(default = "default_node_sep")]
    pub node_sep: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            direction: Direction::LeftRight,
            node_width: default_node_width(),
            node_height: default_node_height(),
            rank_sep: default_rank_sep(),
            node_sep: default_node_sep(),
        }
    }
}

fn default_node_width() -> f64 {
    250.0
}

fn default_node_height() -> f64 {
    100.0
}

fn default_rank_sep() -> f64 {
    100.0
}

fn default_node_sep() -> f64 {
    50.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// How far a duplicated root lands from its source (both axes)
    #[serde(default = "default_step")]
    pub duplicate_offset: f64,
    /// Distance a node moves per nudge key
    #[serde(default = "default_step")]
    pub nudge_step: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            duplicate_offset: default_step(),
            nudge_step: default_step(),
        }
    }
}

fn default_step() -> f64 {
    50.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub show_key_hints: bool,
    /// Theme overrides: name → `#RRGGBB`
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.layout.node_width, 250.0);
        assert_eq!(config.layout.direction, Direction::LeftRight);
        assert_eq!(config.board.duplicate_offset, 50.0);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: Config = toml::from_str(
            r##"
[layout]
direction = "TB"
rank_sep = 60.0

[ui.colors]
highlight = "#FF8800"
"##,
        )
        .unwrap();
        assert_eq!(config.layout.direction, Direction::TopBottom);
        assert_eq!(config.layout.rank_sep, 60.0);
        assert_eq!(config.layout.node_sep, 50.0);
        assert_eq!(config.ui.colors["highlight"], "#FF8800");
    }
}
