use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TASKTREE_DATA_DIR";

/// Resolve the data directory: explicit flag, then `TASKTREE_DATA_DIR`,
/// then `$XDG_DATA_HOME/tasktree`, then `$HOME/.local/share/tasktree`.
pub fn resolve_data_dir(flag: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    if let Some(dir) = non_empty_env(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    let data_home = non_empty_env("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".local").join("share"));
    data_home.join("tasktree")
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Get the user's home directory
fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

pub fn state_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".state.json")
}

pub fn lock_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".lock")
}

pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}
