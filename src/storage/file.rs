//! Directory-backed slot storage.
//!
//! Each slot is a single `<slot>.json` file inside the data directory. Writes go
//! to a temporary file in the same directory which is flushed and then renamed
//! over the target, so a slot is never observed half-written.

use super::Backend;
use crate::constants::{JOURNAL_SLOTS, SLOT_FILE_EXTENSION};
use crate::errors::{AppError, AppResult};
use std::fs;
#[cfg(unix)]
use std::fs::Permissions;
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Ensures the data directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns:
/// - `AppError::Config` if the provided path is not an absolute path
/// - `AppError::Io` if the directory creation fails
pub fn ensure_data_directory_exists(data_dir: &Path) -> AppResult<()> {
    if !data_dir.is_absolute() {
        return Err(AppError::Config(format!(
            "Data directory path must be absolute: {}",
            data_dir.display()
        )));
    }

    if !data_dir.exists() {
        fs::create_dir_all(data_dir).map_err(|e| {
            AppError::Io(io::Error::new(
                e.kind(),
                format!("Failed to create data directory: {}", e),
            ))
        })?;

        #[cfg(unix)]
        {
            let permissions = Permissions::from_mode(crate::constants::DEFAULT_DIR_PERMISSIONS);
            fs::set_permissions(data_dir, permissions).map_err(|e| {
                AppError::Io(io::Error::new(
                    e.kind(),
                    format!("Failed to set secure permissions on data directory: {}", e),
                ))
            })?;
            debug!("Set 0o700 permissions on data directory");
        }
    }
    Ok(())
}

/// Slot storage in a directory on disk.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Opens (creating if needed) a backend rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is relative or the directory cannot be created.
    pub fn open(dir: &Path) -> AppResult<Self> {
        ensure_data_directory_exists(dir)?;
        debug!("Opened file backend at {:?}", dir);
        Ok(FileBackend {
            dir: dir.to_path_buf(),
        })
    }

    /// The directory holding the slot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", slot, SLOT_FILE_EXTENSION))
    }
}

impl Backend for FileBackend {
    fn read(&self, slot: &str) -> AppResult<Option<String>> {
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(io::Error::new(
                e.kind(),
                format!("Failed to read slot '{}': {}", slot, e),
            ))),
        }
    }

    fn write(&self, slot: &str, data: &str) -> AppResult<()> {
        let target = self.slot_path(slot);
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(data.as_bytes())?;
        temp.as_file().sync_all()?;

        #[cfg(unix)]
        temp.as_file()
            .set_permissions(Permissions::from_mode(crate::constants::DEFAULT_FILE_PERMISSIONS))?;

        temp.persist(&target).map_err(|e| {
            AppError::Io(io::Error::new(
                e.error.kind(),
                format!("Failed to replace slot '{}': {}", slot, e.error),
            ))
        })?;

        debug!("Wrote {} bytes to slot '{}'", data.len(), slot);
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        for slot in JOURNAL_SLOTS {
            let path = self.slot_path(slot);
            match fs::remove_file(&path) {
                Ok(()) => debug!("Removed slot file {:?}", path),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(AppError::Io(e)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PASS_SLOT, STORE_SLOT};
    use tempfile::tempdir;

    #[test]
    fn test_ensure_data_directory_creates_missing_dir() {
        let temp_dir = tempdir().unwrap();
        let data_dir = temp_dir.path().join("nested").join("soulpages");
        assert!(!data_dir.exists());

        ensure_data_directory_exists(&data_dir).unwrap();
        assert!(data_dir.is_dir());

        #[cfg(unix)]
        {
            let mode = fs::metadata(&data_dir).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }

    #[test]
    fn test_ensure_data_directory_rejects_relative_path() {
        let result = ensure_data_directory_exists(Path::new("relative/dir"));
        match result {
            Err(AppError::Config(message)) => assert!(message.contains("must be absolute")),
            _ => panic!("Expected Config error for relative path"),
        }
    }

    #[test]
    fn test_file_backend_round_trip() {
        let temp_dir = tempdir().unwrap();
        let backend = FileBackend::open(temp_dir.path()).unwrap();

        assert_eq!(backend.read("slot").unwrap(), None);
        backend.write("slot", "{\"a\":1}").unwrap();
        assert_eq!(backend.read("slot").unwrap().as_deref(), Some("{\"a\":1}"));

        backend.write("slot", "{}").unwrap();
        assert_eq!(backend.read("slot").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_file_backend_write_leaves_no_temp_files() {
        let temp_dir = tempdir().unwrap();
        let backend = FileBackend::open(temp_dir.path()).unwrap();
        backend.write("slot", "data").unwrap();
        backend.write("slot", "more data").unwrap();

        let names: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["slot.json".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_backend_slot_permissions() {
        let temp_dir = tempdir().unwrap();
        let backend = FileBackend::open(temp_dir.path()).unwrap();
        backend.write("slot", "secret").unwrap();

        let mode = fs::metadata(temp_dir.path().join("slot.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_backend_clear_only_removes_slots() {
        let temp_dir = tempdir().unwrap();
        let backend = FileBackend::open(temp_dir.path()).unwrap();
        backend.write(STORE_SLOT, "{}").unwrap();
        backend.write(PASS_SLOT, "digest").unwrap();
        fs::write(temp_dir.path().join("keep.txt"), "unrelated").unwrap();

        backend.clear().unwrap();

        assert_eq!(backend.read(STORE_SLOT).unwrap(), None);
        assert_eq!(backend.read(PASS_SLOT).unwrap(), None);
        assert!(temp_dir.path().join("keep.txt").exists());
    }

    #[test]
    fn test_file_backend_clear_keeps_exports_in_data_dir() {
        let temp_dir = tempdir().unwrap();
        let backend = FileBackend::open(temp_dir.path()).unwrap();
        backend.write(STORE_SLOT, "{}").unwrap();
        let export = temp_dir.path().join("backup.json");
        fs::write(&export, "{}").unwrap();

        backend.clear().unwrap();

        assert_eq!(backend.read(STORE_SLOT).unwrap(), None);
        assert_eq!(fs::read_to_string(&export).unwrap(), "{}");
    }

    #[test]
    fn test_file_backend_clear_without_slots() {
        let temp_dir = tempdir().unwrap();
        let backend = FileBackend::open(temp_dir.path()).unwrap();
        assert!(backend.clear().is_ok());
    }
}
