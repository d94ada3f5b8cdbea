//! Attaching files from disk to an entry.
//!
//! Each accepted file is read, encoded as a token and appended to the entry on
//! its own, so a failure halfway through keeps the attachments already added.
//! Files that cannot be attached are reported back with a reason instead of
//! failing the whole batch.

use crate::errors::{AppError, AppResult, StoreError};
use crate::journal_core::DateKey;
use crate::media::{self, AttachmentKind, MediaType};
use crate::storage::Backend;
use crate::store::EntryStore;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Why a file was left out of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The file came after the first `limit` files of the batch
    BatchLimit { limit: usize },
    /// The file is not an image or audio format we recognize
    Unsupported(String),
    /// The file is media, but of the other kind
    WrongKind { found: AttachmentKind },
    /// The file could not be read
    Unreadable(String),
    /// The entry already holds as many attachments of this kind as allowed
    EntryFull { max: usize },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::BatchLimit { limit } => {
                write!(f, "only the first {} files of a batch are attached", limit)
            }
            RejectReason::Unsupported(detail) => write!(f, "unsupported file type ({})", detail),
            RejectReason::WrongKind { found } => write!(f, "file is {} data", found),
            RejectReason::Unreadable(detail) => write!(f, "could not read file: {}", detail),
            RejectReason::EntryFull { max } => {
                write!(f, "entry already holds {} attachments of this kind", max)
            }
        }
    }
}

/// A file that was not attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// The file as given by the caller
    pub path: PathBuf,
    /// Why it was skipped
    pub reason: RejectReason,
}

/// Outcome of attaching a batch of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachReport {
    /// Files that were appended, in order
    pub attached: Vec<PathBuf>,
    /// Files that were skipped
    pub rejected: Vec<Rejection>,
}

/// Attaches up to `batch_limit` files of `kind` to the entry for `key`.
///
/// `max_per_entry` caps the total number of attachments of `kind` on the entry.
///
/// # Errors
///
/// Per-file problems end up in `AttachReport::rejected`. Only store failures
/// (unreadable or unwritable backend, corrupt document) abort the batch.
pub fn attach_files<B: Backend>(
    store: &EntryStore<B>,
    key: &DateKey,
    kind: AttachmentKind,
    paths: &[PathBuf],
    batch_limit: usize,
    max_per_entry: usize,
) -> AppResult<AttachReport> {
    let mut report = AttachReport::default();

    for (position, path) in paths.iter().enumerate() {
        if position >= batch_limit {
            report.reject(path, RejectReason::BatchLimit { limit: batch_limit });
            continue;
        }

        let token = match read_token(path, kind) {
            Ok(token) => token,
            Err(reason) => {
                report.reject(path, reason);
                continue;
            }
        };

        match store.append_attachment(key, kind, token, max_per_entry) {
            Ok(count) => {
                debug!("Attached {:?} to {} as {} #{}", path, key, kind, count);
                report.attached.push(path.clone());
            }
            Err(AppError::Store(StoreError::AttachmentLimitExceeded { max, .. })) => {
                report.reject(path, RejectReason::EntryFull { max });
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "Attached {} {} file(s) to {}, {} rejected",
        report.attached.len(),
        kind,
        key,
        report.rejected.len()
    );
    Ok(report)
}

fn read_token(path: &Path, kind: AttachmentKind) -> Result<String, RejectReason> {
    let media_type =
        MediaType::from_path(path).map_err(|e| RejectReason::Unsupported(e.to_string()))?;
    if media_type.kind() != kind {
        return Err(RejectReason::WrongKind {
            found: media_type.kind(),
        });
    }

    let bytes = fs::read(path).map_err(|e| RejectReason::Unreadable(e.to_string()))?;
    Ok(media::encode(&bytes, &media_type))
}

impl AttachReport {
    fn reject(&mut self, path: &Path, reason: RejectReason) {
        warn!("Skipping {:?}: {}", path, reason);
        self.rejected.push(Rejection {
            path: path.to_path_buf(),
            reason,
        });
    }
}
