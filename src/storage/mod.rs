//! Persistence backends.
//!
//! The entry store and the passcode gate persist through a tiny key-value
//! interface with named slots. Each slot holds one whole document; there are no
//! partial updates, so a write either replaces the slot completely or leaves the
//! previous value in place.
//!
//! # Module Structure
//!
//! - `file`: Directory-backed slots with atomic replace-on-write
//! - `lock`: Advisory lock used to serialize processes sharing a directory
//!
//! `MemoryBackend` lives here and is what the unit tests inject.

pub mod file;
pub mod lock;

use crate::errors::AppResult;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

pub use self::file::{ensure_data_directory_exists, FileBackend};
pub use self::lock::DirectoryLock;

/// A durable store of named text slots.
///
/// Implementations must make `write` atomic per slot: after a crash a reader sees
/// either the old or the new document, never a mix.
pub trait Backend {
    /// Reads a slot, returning `None` if it has never been written.
    fn read(&self, slot: &str) -> AppResult<Option<String>>;

    /// Replaces the contents of a slot.
    fn write(&self, slot: &str, data: &str) -> AppResult<()>;

    /// Removes every journal slot, leaving anything else in the backing store alone.
    fn clear(&self) -> AppResult<()>;
}

/// In-memory backend, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots currently holding data.
    pub fn slot_count(&self) -> usize {
        self.slots().len()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the guard cannot leave a half-written slot
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Backend for MemoryBackend {
    fn read(&self, slot: &str) -> AppResult<Option<String>> {
        Ok(self.slots().get(slot).cloned())
    }

    fn write(&self, slot: &str, data: &str) -> AppResult<()> {
        self.slots().insert(slot.to_string(), data.to_string());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        self.slots().clear();
        Ok(())
    }
}
