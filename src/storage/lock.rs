//! Advisory locking of the data directory.
//!
//! The store rewrites its whole mapping on every change, so two processes
//! working on the same directory could lose each other's updates. The CLI holds
//! a `DirectoryLock` for the duration of each command to rule that out.

use crate::constants::LOCK_FILE_NAME;
use crate::errors::{AppResult, LockError};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// An exclusive advisory lock on a data directory, released on drop.
#[derive(Debug)]
pub struct DirectoryLock {
    file: File,
    path: PathBuf,
}

impl DirectoryLock {
    /// Tries to take the lock without blocking.
    ///
    /// # Errors
    ///
    /// Returns `LockError::FileBusy` if another process holds the lock, or
    /// `LockError::AcquisitionFailed` if the lock file cannot be opened or locked.
    pub fn acquire(data_dir: &Path) -> AppResult<Self> {
        let path = data_dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::AcquisitionFailed {
                path: path.clone(),
                source,
            })?;

        if let Err(e) = file.try_lock_exclusive() {
            let contended = e.raw_os_error().is_some()
                && e.raw_os_error() == fs2::lock_contended_error().raw_os_error();
            if contended || e.kind() == std::io::ErrorKind::WouldBlock {
                return Err(LockError::FileBusy { path }.into());
            }
            return Err(LockError::AcquisitionFailed { path, source: e }.into());
        }

        debug!("Acquired directory lock {:?}", path);
        Ok(DirectoryLock { file, path })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirectoryLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            debug!("Failed to release directory lock {:?}: {}", self.path, e);
        }
    }
}
