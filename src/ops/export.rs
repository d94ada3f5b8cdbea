//! Exporting the store to a JSON file.

#[cfg(unix)]
use crate::constants::DEFAULT_FILE_PERMISSIONS;
use crate::constants::{EXPORT_FILE_EXTENSION, EXPORT_FILE_PREFIX};
use crate::errors::{AppError, AppResult};
use crate::snapshot;
use crate::storage::Backend;
use crate::store::EntryStore;
use blake3::Hasher;
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Report of a completed export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Number of entries written
    pub total_entries: usize,
    /// Size of the export file in bytes
    pub file_size: u64,
    /// BLAKE3 checksum of the export file
    pub checksum: String,
    /// Duration taken to write the export
    pub duration: Duration,
}

/// File name for an export taken at `now`: `soulpages-<unix millis>.json`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use soulpages::ops::export::default_export_file_name;
///
/// let now = Utc.timestamp_millis_opt(1_704_067_200_123).unwrap();
/// assert_eq!(default_export_file_name(now), "soulpages-1704067200123.json");
/// ```
pub fn default_export_file_name(now: DateTime<Utc>) -> String {
    format!(
        "{}{}{}",
        EXPORT_FILE_PREFIX,
        now.timestamp_millis(),
        EXPORT_FILE_EXTENSION
    )
}

/// Writes the whole store to `output_path` as pretty JSON.
///
/// Parent directories are created as needed. An existing file is overwritten.
/// On unix the file is readable by its owner only, like the journal itself.
///
/// # Errors
///
/// Returns an error if:
/// - The store cannot be read
/// - Serialization fails
/// - The output directory or file cannot be written
pub fn export_to_file<B: Backend>(
    store: &EntryStore<B>,
    output_path: &Path,
) -> AppResult<ExportReport> {
    let start_time = Instant::now();
    info!("Exporting journal to {:?}", output_path);

    let snapshot = store.snapshot()?;
    let json = snapshot::serialize(&snapshot)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create export directory {:?}: {}", parent, e),
                ))
            })?;
        }
    }

    write_private_file(output_path, json.as_bytes()).map_err(|e| {
        AppError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to write export file {:?}: {}", output_path, e),
        ))
    })?;

    let mut hasher = Hasher::new();
    hasher.update(json.as_bytes());
    let checksum = hasher.finalize().to_hex().to_string();
    debug!("Export checksum: {}", checksum);

    let duration = start_time.elapsed();
    info!(
        "Export completed: {} entries, {} bytes",
        snapshot.len(),
        json.len()
    );

    Ok(ExportReport {
        total_entries: snapshot.len(),
        file_size: json.len() as u64,
        checksum,
        duration,
    })
}

fn write_private_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(DEFAULT_FILE_PERMISSIONS);

    let mut file = options.open(path)?;
    // `mode` only applies on creation
    #[cfg(unix)]
    file.set_permissions(fs::Permissions::from_mode(DEFAULT_FILE_PERMISSIONS))?;
    file.write_all(data)?;
    file.sync_all()
}
