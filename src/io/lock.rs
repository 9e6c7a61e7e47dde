use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::io::paths::lock_path;

/// Advisory lock serializing writers of one data directory.
///
/// The CLI holds it for the duration of a write command; the TUI takes it
/// around each mutation. Uses flock on Unix.
/// Dropping the lock closes the file, which releases the flock. The lock
/// file itself is left in place so every process locks the same inode.
pub struct FileLock {
    _file: File,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another tt process is writing")]
    Timeout { path: PathBuf },
}

impl FileLock {
    /// Acquire the lock on `data_dir`, waiting up to `timeout`.
    pub fn acquire(data_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let lock_path = lock_path(data_dir);
        let create_err = |source| LockError::CreateError {
            path: lock_path.clone(),
            source,
        };
        fs::create_dir_all(data_dir).map_err(create_err)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(create_err)?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => {
                    return Ok(FileLock { _file: file });
                }
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => {
                    log::warn!("event=lock_timeout module=io status=error");
                    return Err(LockError::Timeout { path: lock_path });
                }
            }
        }
    }

    /// Acquire with the default timeout (5 seconds)
    pub fn acquire_default(data_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(data_dir, Duration::from_secs(5))
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    // SAFETY: `fd` is a valid open descriptor owned by `file` for this call.
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn acquire_release_acquire() {
        let tmp = TempDir::new().unwrap();
        let lock = FileLock::acquire_default(tmp.path());
        assert!(lock.is_ok());
        drop(lock);
        assert!(lock_path(tmp.path()).exists());
        assert!(FileLock::acquire_default(tmp.path()).is_ok());
    }

    #[test]
    fn creates_missing_data_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("fresh");
        let _lock = FileLock::acquire_default(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn contention_times_out() {
        let tmp = TempDir::new().unwrap();
        let _held = FileLock::acquire_default(tmp.path()).unwrap();
        let second = FileLock::acquire(tmp.path(), Duration::from_millis(50));
        assert!(matches!(second, Err(LockError::Timeout { .. })));
    }
}
