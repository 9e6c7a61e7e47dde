//! File logging bootstrap.
//!
//! Logs go to rotating files under `<data_dir>/logs`, never to the terminal
//! (the board owns it). Events are metadata-only `key=value` lines; task and
//! project titles are never logged.

use std::path::{Path, PathBuf};

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use once_cell::sync::OnceCell;

/// Environment variable overriding the configured log level
pub const LOG_ENV: &str = "TASKTREE_LOG";

const LOG_FILE_BASENAME: &str = "tasktree";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Error type for logging setup
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("unsupported log level `{0}` (expected trace|debug|info|warn|error|off)")]
    Level(String),
    #[error("could not create log directory {path}: {source}")]
    Dir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not start logger: {0}")]
    Start(#[from] flexi_logger::FlexiLoggerError),
    #[error("logging already initialized at {0}")]
    AlreadyInitialized(PathBuf),
}

/// Start file logging in `log_dir`. Calling again with the same directory
/// is a no-op; a different directory is refused.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), LoggingError> {
    let level = normalize_level(level)?;

    if let Some(state) = LOGGING_STATE.get() {
        if state.log_dir == log_dir {
            return Ok(());
        }
        return Err(LoggingError::AlreadyInitialized(state.log_dir.clone()));
    }

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, LoggingError> {
        std::fs::create_dir_all(log_dir).map_err(|source| LoggingError::Dir {
            path: log_dir.to_path_buf(),
            source,
        })?;

        let logger = Logger::try_with_str(level)?
            .log_to_file(
                FileSpec::default()
                    .directory(log_dir)
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()?;

        info!(
            "event=app_start module=core status=ok platform={} version={} level={}",
            std::env::consts::OS,
            env!("CARGO_PKG_VERSION"),
            level
        );

        Ok(LoggingState {
            log_dir: log_dir.to_path_buf(),
            _logger: logger,
        })
    })?;

    if state.log_dir != log_dir {
        return Err(LoggingError::AlreadyInitialized(state.log_dir.clone()));
    }
    Ok(())
}

/// Pick the level: the environment override when set and non-empty,
/// otherwise the configured level.
pub fn resolve_level(env_value: Option<&str>, configured: &str) -> String {
    match env_value.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => configured.to_string(),
    }
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(LoggingError::Level(other.to_string())),
    }
}
