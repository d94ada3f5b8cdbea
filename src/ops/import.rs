//! Importing an exported JSON file into the store.

use crate::errors::{AppError, AppResult};
use crate::ops::merge::{import_snapshot, ImportReport};
use crate::snapshot;
use crate::storage::Backend;
use crate::store::EntryStore;
use std::fs;
use std::path::Path;
use tracing::info;

/// Reads, validates and merges the snapshot at `input_path`.
///
/// The file is fully decoded and validated before the store is touched, so a
/// rejected file leaves the store unchanged.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The contents are not valid JSON (`SnapshotError::Parse`)
/// - The contents are not a snapshot (`SnapshotError::InvalidShape`)
/// - The merged store cannot be written
pub fn import_from_file<B: Backend>(
    store: &EntryStore<B>,
    input_path: &Path,
) -> AppResult<ImportReport> {
    info!("Importing journal from {:?}", input_path);

    let text = fs::read_to_string(input_path).map_err(|e| {
        AppError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read import file {:?}: {}", input_path, e),
        ))
    })?;

    let imported = snapshot::deserialize(&text)?;
    import_snapshot(store, &imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SnapshotError;
    use crate::journal_core::DateKey;
    use crate::storage::MemoryBackend;
    use crate::store::Entry;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store_with_entry() -> EntryStore<MemoryBackend> {
        let store = EntryStore::new(Arc::new(MemoryBackend::new()));
        let entry = Entry {
            text: "live".to_string(),
            ..Entry::empty()
        };
        store
            .save(&DateKey::parse("2024-01-01").unwrap(), entry)
            .unwrap();
        store
    }

    #[test]
    fn test_import_merges_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("import.json");
        fs::write(
            &path,
            r#"{"2024-01-01": {"text": "imported", "createdAt": 1000}, "2024-01-09": {"text": "new"}}"#,
        )
        .unwrap();

        let store = store_with_entry();
        let report = import_from_file(&store, &path).unwrap();

        assert_eq!(report.added, 1);
        assert_eq!(report.overwritten, 1);
        assert_eq!(report.total, 2);
        let merged = store.get(&DateKey::parse("2024-01-01").unwrap()).unwrap();
        assert_eq!(merged.text, "imported");
        assert_eq!(merged.created_at.timestamp_millis(), 1000);
    }

    #[test]
    fn test_rejected_import_leaves_store_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with_entry();
        let before = store.snapshot().unwrap();

        let cases = [
            ("array.json", "[1,2,3]"),
            ("broken.json", "{\"2024-01-01\": "),
            ("badkey.json", r#"{"someday": {"text": "x"}}"#),
        ];
        for (name, contents) in cases {
            let path = temp_dir.path().join(name);
            fs::write(&path, contents).unwrap();

            let result = import_from_file(&store, &path);
            assert!(
                matches!(
                    result,
                    Err(AppError::Snapshot(SnapshotError::InvalidShape(_)))
                        | Err(AppError::Snapshot(SnapshotError::Parse(_)))
                ),
                "{} should be rejected",
                name
            );
            assert_eq!(store.snapshot().unwrap(), before);
        }
    }

    #[test]
    fn test_import_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with_entry();

        let result = import_from_file(&store, &temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
