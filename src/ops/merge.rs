//! Reconciling an imported snapshot with the live store.
//!
//! Import wins: on a date present in both, the imported entry replaces the live
//! one whole, `createdAt` included. Dates only in the live store are kept.
//! There is no per-field merge and no preview.

use crate::errors::AppResult;
use crate::snapshot::Snapshot;
use crate::storage::Backend;
use crate::store::EntryStore;
use tracing::{debug, info};

/// Summary of a completed import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Entries in the imported snapshot
    pub imported: usize,
    /// Imported dates the live store did not have
    pub added: usize,
    /// Live entries replaced by imported ones
    pub overwritten: usize,
    /// Entries in the store after the merge
    pub total: usize,
}

/// Combines two snapshots, letting `imported` win on shared dates.
///
/// # Examples
///
/// ```
/// use soulpages::ops::merge::merge;
/// use soulpages::snapshot;
///
/// let live = snapshot::deserialize(r#"{"2024-01-01": {"text": "a"}, "2024-01-02": {"text": "b"}}"#)?;
/// let imported = snapshot::deserialize(r#"{"2024-01-02": {"text": "B"}, "2024-01-03": {"text": "c"}}"#)?;
///
/// let merged = merge(&live, &imported);
/// let texts: Vec<_> = merged.iter().map(|(_, e)| e.text.as_str()).collect();
/// assert_eq!(texts, vec!["a", "B", "c"]);
/// # Ok::<(), soulpages::errors::SnapshotError>(())
/// ```
pub fn merge(live: &Snapshot, imported: &Snapshot) -> Snapshot {
    let mut merged = live.clone();
    for (key, entry) in imported {
        merged.insert(key.clone(), entry.clone());
    }
    merged
}

/// Merges `imported` into the store and persists the result in one write.
///
/// If loading the live store or writing the result fails, the store keeps its
/// previous contents.
pub fn import_snapshot<B: Backend>(
    store: &EntryStore<B>,
    imported: &Snapshot,
) -> AppResult<ImportReport> {
    let live = store.snapshot()?;
    let overwritten = imported.iter().filter(|(key, _)| live.contains(key)).count();
    debug!(
        "Merging {} imported entries into {} live entries",
        imported.len(),
        live.len()
    );

    let merged = merge(&live, imported);
    store.replace_all(&merged)?;

    let report = ImportReport {
        imported: imported.len(),
        added: imported.len() - overwritten,
        overwritten,
        total: merged.len(),
    };
    info!(
        "Import merged: {} added, {} overwritten, {} total",
        report.added, report.overwritten, report.total
    );
    Ok(report)
}
