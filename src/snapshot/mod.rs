//! Whole-store snapshots and their JSON codec.
//!
//! A `Snapshot` is a detached copy of the full `dateKey -> Entry` mapping. The
//! same JSON form is used for the persisted store document and for export files:
//!
//! ```json
//! {
//!   "2024-01-05": {
//!     "text": "Walked by the sea.",
//!     "images": ["data:image/png;base64,..."],
//!     "audios": [],
//!     "createdAt": 1704441600000
//!   }
//! }
//! ```
//!
//! Decoding never trusts the parsed structure: the top level must be an object,
//! every key must be a canonical date, every value must be an entry record with
//! only the known fields, and every attachment must be a well-formed token of the
//! right kind.

use crate::errors::SnapshotError;
use crate::journal_core::DateKey;
use crate::media::{self, AttachmentKind};
use crate::store::Entry;
use serde_json::Value;
use std::collections::btree_map::{self, BTreeMap};

/// A detached, order-independent copy of every entry in a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: BTreeMap<DateKey, Entry>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the entry for a date.
    pub fn get(&self, key: &DateKey) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Whether the snapshot has an entry for a date.
    pub fn contains(&self, key: &DateKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or replaces an entry, returning the previous one.
    pub fn insert(&mut self, key: DateKey, entry: Entry) -> Option<Entry> {
        self.entries.insert(key, entry)
    }

    /// Removes an entry, returning it if it was present.
    pub fn remove(&mut self, key: &DateKey) -> Option<Entry> {
        self.entries.remove(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All keys, newest date first.
    pub fn keys_newest_first(&self) -> Vec<DateKey> {
        self.entries.keys().rev().cloned().collect()
    }

    /// Iterates entries in ascending date order.
    pub fn iter(&self) -> btree_map::Iter<'_, DateKey, Entry> {
        self.entries.iter()
    }
}

impl FromIterator<(DateKey, Entry)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (DateKey, Entry)>>(iter: I) -> Self {
        Snapshot {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Snapshot {
    type Item = (DateKey, Entry);
    type IntoIter = btree_map::IntoIter<DateKey, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = (&'a DateKey, &'a Entry);
    type IntoIter = btree_map::Iter<'a, DateKey, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Serializes a snapshot to pretty-printed JSON.
///
/// Attachment tokens are copied verbatim.
///
/// # Errors
///
/// Returns `SnapshotError::Serialize` if JSON encoding fails.
pub fn serialize(snapshot: &Snapshot) -> Result<String, SnapshotError> {
    serde_json::to_string_pretty(&snapshot.entries).map_err(SnapshotError::Serialize)
}

/// Parses and validates a snapshot.
///
/// # Errors
///
/// - `SnapshotError::Parse` if the text is not well-formed JSON
/// - `SnapshotError::InvalidShape` if the top-level value is not an object, or
///   any key, entry or attachment does not have the expected shape
///
/// # Examples
///
/// ```
/// use soulpages::errors::SnapshotError;
/// use soulpages::snapshot;
///
/// let parsed = snapshot::deserialize(r#"{"2024-01-01": {"text": "hello"}}"#).unwrap();
/// assert_eq!(parsed.len(), 1);
///
/// assert!(matches!(
///     snapshot::deserialize("[1,2,3]"),
///     Err(SnapshotError::InvalidShape(_))
/// ));
/// assert!(matches!(
///     snapshot::deserialize("{not json"),
///     Err(SnapshotError::Parse(_))
/// ));
/// ```
pub fn deserialize(text: &str) -> Result<Snapshot, SnapshotError> {
    let value: Value = serde_json::from_str(text).map_err(SnapshotError::Parse)?;

    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(SnapshotError::InvalidShape(format!(
                "expected an object of date keys, found {}",
                describe(&other)
            )))
        }
    };

    let mut entries = BTreeMap::new();
    for (raw_key, raw_entry) in object {
        let key = DateKey::parse(&raw_key)
            .map_err(|_| SnapshotError::InvalidShape(format!("'{}' is not a date key", raw_key)))?;

        if !raw_entry.is_object() {
            return Err(SnapshotError::InvalidShape(format!(
                "entry {} must be an object, found {}",
                key,
                describe(&raw_entry)
            )));
        }

        let entry: Entry = serde_json::from_value(raw_entry)
            .map_err(|e| SnapshotError::InvalidShape(format!("entry {}: {}", key, e)))?;
        validate_attachments(&key, &entry)?;

        entries.insert(key, entry);
    }

    Ok(Snapshot { entries })
}

fn validate_attachments(key: &DateKey, entry: &Entry) -> Result<(), SnapshotError> {
    for kind in [AttachmentKind::Image, AttachmentKind::Audio] {
        for (index, token) in entry.attachments(kind).iter().enumerate() {
            let media_type = media::validate(token).map_err(|e| {
                SnapshotError::InvalidShape(format!("entry {} {} {}: {}", key, kind, index, e))
            })?;
            if media_type.kind() != kind {
                return Err(SnapshotError::InvalidShape(format!(
                    "entry {} {} {} holds {} data",
                    key,
                    kind,
                    index,
                    media_type.kind()
                )));
            }
        }
    }
    Ok(())
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
