pub mod config_io;
pub mod lock;
pub mod paths;
pub mod project_repo;
pub mod state;
pub mod storage;
pub mod task_repo;
pub mod watcher;
