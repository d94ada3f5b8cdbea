/*!
# SoulPages

SoulPages is a personal diary: one free-text page per calendar date, optionally
with images and short voice notes, behind an optional numeric passcode.

## Core Features

- Write, show, list and delete dated pages
- Attach images and voice notes, embedded as self-describing text tokens
- Lock the journal behind a 4-8 digit passcode
- Export the whole journal to JSON and merge an export back in

## Architecture

- `media`: attachment tokens (`data:<mime>;base64,<payload>`)
- `journal_core`: date keys, date selection and the quote of the day
- `storage`: slot backends (memory and directory) and the process lock
- `store`: the persistent `date -> Entry` mapping
- `gate`: passcode hashing and unlocking
- `snapshot`: whole-store JSON codec
- `ops`: export, import/merge and batch attachment
- `cli`, `config`, `errors`, `constants`: the application shell

## Usage Example

```rust,no_run
use soulpages::gate::PassGate;
use soulpages::journal_core::DateKey;
use soulpages::storage::FileBackend;
use std::path::Path;
use std::sync::Arc;

fn main() -> soulpages::AppResult<()> {
    let backend = Arc::new(FileBackend::open(Path::new("/home/me/Documents/soulpages"))?);
    let gate = PassGate::new(backend);

    let session = gate.unlock(Some("1234"))?;
    let key = DateKey::parse("2024-01-05")?;

    let mut entry = session.entries().get(&key)?;
    entry.text.push_str("A quiet morning.");
    session.entries().save(&key, entry)?;
    Ok(())
}
```
*/

/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// Error types and utilities for error handling
pub mod errors;
/// Passcode gate
pub mod gate;
/// Date keys and date selection
pub mod journal_core;
/// Attachment token codec
pub mod media;
/// High-level journal operations
pub mod ops;
/// Whole-store snapshots
pub mod snapshot;
/// Persistence backends and locking
pub mod storage;
/// The persistent entry store
pub mod store;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use journal_core::{DateKey, DateSpecifier};
pub use store::{Entry, EntryStore};
