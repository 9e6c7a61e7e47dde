use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::io::storage::{PROJECTS_KEY, TASKS_KEY};

/// Events sent from the storage watcher to the TUI event loop.
#[derive(Debug)]
pub enum StorageEvent {
    /// One or more collection files changed on disk.
    Changed(Vec<PathBuf>),
}

/// Watches the data directory for changes to the collection files.
pub struct StorageWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<StorageEvent>,
}

impl StorageWatcher {
    /// Start watching `data_dir`. Call `poll()` each tick.
    pub fn start(data_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let dir = data_dir.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else {
                    return;
                };
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    return;
                }
                let relevant: Vec<PathBuf> = event
                    .paths
                    .into_iter()
                    .filter(|p| p.starts_with(&dir) && is_collection_file(p))
                    .collect();
                if !relevant.is_empty() {
                    let _ = tx.send(StorageEvent::Changed(relevant));
                }
            },
            Config::default(),
        )?;

        watcher.watch(data_dir, RecursiveMode::NonRecursive)?;
        Ok(StorageWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll; returns every queued event (may be empty).
    pub fn poll(&self) -> Vec<StorageEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

/// Whether `path` is one of the two collection files
pub fn is_collection_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.strip_suffix(".json")
        .is_some_and(|stem| stem == PROJECTS_KEY || stem == TASKS_KEY)
}
