//! The persistent entry store.
//!
//! `EntryStore` maps date keys to `Entry` records and persists the whole mapping
//! as one document in the backend's store slot. Every mutation is a
//! read-modify-write of that document: the mapping is loaded, changed in memory
//! and written back with a single `Backend::write`, so a failed operation never
//! leaves a partially updated store behind.
//!
//! The store does no locking of its own. Callers sharing a backend between
//! threads or processes must serialize `save`, `delete`, merges and resets
//! themselves (the CLI does this with a `DirectoryLock`).
//!
//! # Example
//!
//! ```
//! use soulpages::journal_core::DateKey;
//! use soulpages::storage::MemoryBackend;
//! use soulpages::store::EntryStore;
//! use std::sync::Arc;
//!
//! let store = EntryStore::new(Arc::new(MemoryBackend::new()));
//! let key = DateKey::parse("2024-01-05")?;
//!
//! let mut entry = store.get(&key)?;
//! entry.text = "First page.".to_string();
//! store.save(&key, entry)?;
//!
//! assert_eq!(store.get(&key)?.text, "First page.");
//! assert_eq!(store.list()?, vec![key]);
//! # Ok::<(), soulpages::errors::AppError>(())
//! ```


use crate::constants::STORE_SLOT;
use crate::errors::{AppResult, MediaError, StoreError};
use crate::journal_core::DateKey;
use crate::media::{self, AttachmentKind};
use crate::snapshot::{self, Snapshot};
use crate::storage::Backend;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// One day's page.
///
/// `created_at` is fixed by the store the first time the date is saved; the
/// value carried by an unsaved `Entry` is only a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Entry {
    /// Free-form text, may be empty
    #[serde(default)]
    pub text: String,

    /// Image tokens, oldest first
    #[serde(default, alias = "imgs")]
    pub images: Vec<String>,

    /// Voice note tokens, oldest first
    #[serde(default)]
    pub audios: Vec<String>,

    /// When the date was first saved, in millisecond precision
    #[serde(with = "chrono::serde::ts_milliseconds", default = "now_millis")]
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// A blank page stamped with the current time.
    pub fn empty() -> Self {
        Entry {
            text: String::new(),
            images: Vec::new(),
            audios: Vec::new(),
            created_at: now_millis(),
        }
    }

    /// The attachment sequence of the given kind.
    pub fn attachments(&self, kind: AttachmentKind) -> &[String] {
        match kind {
            AttachmentKind::Image => &self.images,
            AttachmentKind::Audio => &self.audios,
        }
    }

    fn attachments_mut(&mut self, kind: AttachmentKind) -> &mut Vec<String> {
        match kind {
            AttachmentKind::Image => &mut self.images,
            AttachmentKind::Audio => &mut self.audios,
        }
    }

    /// Whether the page has neither text nor attachments.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty() && self.images.is_empty() && self.audios.is_empty()
    }
}

/// The current time truncated to milliseconds, the precision timestamps are
/// persisted with.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Keyed store of journal entries over an injected backend.
pub struct EntryStore<B> {
    backend: Arc<B>,
}

impl<B> Clone for EntryStore<B> {
    fn clone(&self) -> Self {
        EntryStore {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: Backend> EntryStore<B> {
    /// Creates a store persisting through `backend`.
    pub fn new(backend: Arc<B>) -> Self {
        EntryStore { backend }
    }

    /// Loads a detached copy of the whole store.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the backend cannot be read, or
    /// `StoreError::Corrupt` if the persisted document does not decode.
    pub fn snapshot(&self) -> AppResult<Snapshot> {
        match self.backend.read(STORE_SLOT)? {
            Some(text) => Ok(snapshot::deserialize(&text).map_err(StoreError::Corrupt)?),
            None => Ok(Snapshot::new()),
        }
    }

    /// Replaces the whole store with `snapshot` in one backend write.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails; the previous
    /// contents are then left in place.
    pub fn replace_all(&self, snapshot: &Snapshot) -> AppResult<()> {
        let text = snapshot::serialize(snapshot)?;
        self.backend.write(STORE_SLOT, &text)?;
        debug!("Persisted store with {} entries", snapshot.len());
        Ok(())
    }

    /// Returns the entry for `key`, or a blank page if the date has no entry.
    ///
    /// Absence is not an error; only backend failures are.
    pub fn get(&self, key: &DateKey) -> AppResult<Entry> {
        let entry = self.snapshot()?.remove(key);
        debug!("Loaded entry {} (exists: {})", key, entry.is_some());
        Ok(entry.unwrap_or_else(Entry::empty))
    }

    /// Inserts or updates the entry for `key` and returns what was stored.
    ///
    /// A new key gets its `created_at` stamped now; an existing key keeps the
    /// stored `created_at` and has its text and attachments overwritten.
    pub fn save(&self, key: &DateKey, entry: Entry) -> AppResult<Entry> {
        let mut snapshot = self.snapshot()?;

        let created_at = match snapshot.get(key) {
            Some(existing) => existing.created_at,
            None => {
                info!("Creating entry {}", key);
                now_millis()
            }
        };

        let stored = Entry { created_at, ..entry };
        snapshot.insert(key.clone(), stored.clone());
        self.replace_all(&snapshot)?;

        debug!(
            "Saved entry {} ({} images, {} audios)",
            key,
            stored.images.len(),
            stored.audios.len()
        );
        Ok(stored)
    }

    /// Removes the entry for `key`. Returns whether anything was removed.
    pub fn delete(&self, key: &DateKey) -> AppResult<bool> {
        let mut snapshot = self.snapshot()?;
        if snapshot.remove(key).is_none() {
            debug!("Delete of {} ignored: no such entry", key);
            return Ok(false);
        }

        self.replace_all(&snapshot)?;
        info!("Deleted entry {}", key);
        Ok(true)
    }

    /// All keys with an entry, newest date first.
    pub fn list(&self) -> AppResult<Vec<DateKey>> {
        Ok(self.snapshot()?.keys_newest_first())
    }

    /// Appends an attachment token to the entry for `key`.
    ///
    /// Returns the new length of the sequence.
    ///
    /// # Errors
    ///
    /// - `MediaError::MalformedToken` if the token is not well formed
    /// - `MediaError::UnsupportedMedia` if the token's media type is of the other kind
    /// - `StoreError::AttachmentLimitExceeded` if the sequence already holds
    ///   `max_count` items
    pub fn append_attachment(
        &self,
        key: &DateKey,
        kind: AttachmentKind,
        token: String,
        max_count: usize,
    ) -> AppResult<usize> {
        let media_type = media::validate(&token)?;
        if media_type.kind() != kind {
            return Err(MediaError::UnsupportedMedia(format!(
                "{} cannot be stored as {} attachment",
                media_type, kind
            ))
            .into());
        }

        self.modify(key, |entry| {
            let sequence = entry.attachments_mut(kind);
            if sequence.len() >= max_count {
                return Err(StoreError::AttachmentLimitExceeded {
                    kind,
                    max: max_count,
                }
                .into());
            }
            sequence.push(token);
            Ok(sequence.len())
        })
    }

    /// Removes the attachment at `index` and returns its token.
    ///
    /// Positions shift after every removal, so callers should re-read the entry
    /// before computing the next index.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IndexOutOfRange` if `index` is not a valid position.
    pub fn remove_attachment(
        &self,
        key: &DateKey,
        kind: AttachmentKind,
        index: usize,
    ) -> AppResult<String> {
        self.modify(key, |entry| {
            let sequence = entry.attachments_mut(kind);
            if index >= sequence.len() {
                return Err(StoreError::IndexOutOfRange {
                    kind,
                    index,
                    len: sequence.len(),
                }
                .into());
            }
            Ok(sequence.remove(index))
        })
    }

    /// Removes the first attachment equal to `token`.
    ///
    /// Unlike [`EntryStore::remove_attachment`] this cannot hit the wrong item
    /// when the sequence changed since the caller last read it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AttachmentNotFound` if no attachment matches.
    pub fn remove_attachment_token(
        &self,
        key: &DateKey,
        kind: AttachmentKind,
        token: &str,
    ) -> AppResult<()> {
        self.modify(key, |entry| {
            let sequence = entry.attachments_mut(kind);
            let position = sequence
                .iter()
                .position(|existing| existing == token)
                .ok_or(StoreError::AttachmentNotFound(kind))?;
            sequence.remove(position);
            Ok(())
        })
    }

    /// Applies `change` to the entry for `key` and persists the result.
    ///
    /// Nothing is written if `change` fails.
    fn modify<T>(
        &self,
        key: &DateKey,
        change: impl FnOnce(&mut Entry) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut snapshot = self.snapshot()?;
        let mut entry = snapshot.remove(key).unwrap_or_else(Entry::empty);

        let result = change(&mut entry)?;

        snapshot.insert(key.clone(), entry);
        self.replace_all(&snapshot)?;
        debug!("Updated attachments of entry {}", key);
        Ok(result)
    }
}
