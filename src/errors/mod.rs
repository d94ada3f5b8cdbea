//! Error handling utilities for the soulpages application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//! Each component has its own error enum so callers can match on the precise
//! failure without parsing messages.

use crate::media::AttachmentKind;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the attachment codec.
///
/// # Examples
///
/// ```
/// use soulpages::errors::MediaError;
///
/// let error = MediaError::UnsupportedMedia("application/pdf".to_string());
/// assert!(format!("{}", error).contains("application/pdf"));
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaError {
    /// The payload is not a recognized image or audio type.
    #[error("Unsupported media type '{0}'. Only image and audio attachments can be stored.")]
    UnsupportedMedia(String),

    /// A token does not have the `data:<mime>;base64,<payload>` shape.
    #[error("Malformed attachment token: {0}")]
    MalformedToken(String),
}

/// Errors raised by the entry store.
///
/// # Examples
///
/// ```
/// use soulpages::errors::StoreError;
/// use soulpages::media::AttachmentKind;
///
/// let error = StoreError::IndexOutOfRange {
///     kind: AttachmentKind::Image,
///     index: 3,
///     len: 2,
/// };
/// assert!(format!("{}", error).contains("out of range"));
/// ```
#[derive(Debug, Error)]
pub enum StoreError {
    /// A date key is not a real calendar date in `YYYY-MM-DD` form.
    #[error("Invalid date key '{0}'. Expected a calendar date in YYYY-MM-DD format.")]
    InvalidDateKey(String),

    /// The attachment sequence is already full.
    #[error("Cannot attach another {kind}: the entry already holds {max} of them.")]
    AttachmentLimitExceeded {
        /// Which attachment sequence was full
        kind: AttachmentKind,
        /// The limit that was reached
        max: usize,
    },

    /// A positional removal pointed past the end of the sequence.
    #[error("{kind} index {index} is out of range (entry has {len}). Re-read the entry and try again.")]
    IndexOutOfRange {
        /// Which attachment sequence was addressed
        kind: AttachmentKind,
        /// The requested position
        index: usize,
        /// The current length of the sequence
        len: usize,
    },

    /// A token-based removal found no matching attachment.
    #[error("No matching {0} attachment on this entry.")]
    AttachmentNotFound(AttachmentKind),

    /// The persisted store document could not be read back.
    #[error("Stored journal data is corrupt: {0}. Restore from an export before saving again.")]
    Corrupt(#[source] SnapshotError),
}

/// Errors raised while decoding a snapshot.
///
/// # Examples
///
/// ```
/// use soulpages::errors::SnapshotError;
///
/// let error = SnapshotError::InvalidShape("top-level value is an array".to_string());
/// assert!(format!("{}", error).contains("array"));
/// ```
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The text is not well-formed JSON.
    #[error("Could not parse snapshot: {0}")]
    Parse(#[source] serde_json::Error),

    /// The JSON is well-formed but is not a mapping of date keys to entries.
    #[error("Invalid snapshot format: {0}")]
    InvalidShape(String),

    /// Writing the snapshot out as JSON failed.
    #[error("Could not serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Errors raised by the passcode gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// Passcodes must be between 4 and 8 characters long.
    #[error("Passcode must be 4-8 digits (got {0} characters).")]
    InvalidPasscodeLength(usize),

    /// The passcode and its confirmation differ.
    #[error("Passcodes do not match.")]
    PasscodeMismatch,

    /// The candidate passcode did not match the stored digest.
    #[error("Incorrect passcode.")]
    IncorrectPasscode,

    /// Reading the passcode from the terminal failed.
    #[error("Failed to read passcode: {0}")]
    PasscodePrompt(String),
}

/// Represents errors that can occur when locking the data directory.
///
/// # Examples
///
/// ```
/// use soulpages::errors::LockError;
/// use std::path::PathBuf;
///
/// let error = LockError::FileBusy {
///     path: PathBuf::from("/path/to/.soulpages.lock"),
/// };
///
/// assert!(format!("{}", error).contains("in use"));
/// ```
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process holds the lock.
    #[error("The journal is in use by another soulpages process: {path}. Wait for it to finish and try again.")]
    FileBusy {
        /// The path to the lock file
        path: PathBuf,
    },

    /// Acquiring the lock failed for a technical reason.
    #[error("Failed to acquire lock {path}: {source}. Please check directory permissions.")]
    AcquisitionFailed {
        /// The path to the lock file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Represents all possible errors that can occur in the soulpages application.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use soulpages::errors::AppError;
///
/// let error = AppError::Config("Missing data directory".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Missing data directory");
/// ```
///
/// Converting from an IO error:
/// ```
/// use soulpages::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from the persistence backend or attachment files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Attachment encoding or decoding failures.
    #[error("Attachment error: {0}")]
    Media(#[from] MediaError),

    /// Entry store failures.
    #[error("Journal error: {0}")]
    Store(#[from] StoreError),

    /// Snapshot decoding failures during import.
    #[error("Import error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Passcode gate failures.
    #[error("Passcode error: {0}")]
    Gate(#[from] GateError),

    /// Errors related to locking the data directory.
    #[error("Locking error: {0}")]
    Lock(#[from] LockError),
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use soulpages::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::Config("Something went wrong".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_app_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let app_error: AppError = io_error.into();

        match app_error {
            AppError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("Expected AppError::Io variant"),
        }
    }

    #[test]
    fn test_app_error_display() {
        let config_error = AppError::Config("Invalid configuration".to_string());
        assert_eq!(
            format!("{}", config_error),
            "Configuration error: Invalid configuration"
        );

        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        assert_eq!(
            format!("{}", AppError::Io(io_error)),
            "I/O error: permission denied"
        );

        let media_error = AppError::from(MediaError::UnsupportedMedia("text/plain".to_string()));
        assert!(format!("{}", media_error).starts_with("Attachment error"));
        assert!(format!("{}", media_error).contains("text/plain"));

        let gate_error = AppError::from(GateError::IncorrectPasscode);
        assert_eq!(
            format!("{}", gate_error),
            "Passcode error: Incorrect passcode."
        );
    }

    #[test]
    fn test_store_error_variants() {
        let error = StoreError::InvalidDateKey("2024-13-01".to_string());
        assert!(format!("{}", error).contains("2024-13-01"));

        let error = StoreError::AttachmentLimitExceeded {
            kind: AttachmentKind::Audio,
            max: 8,
        };
        assert!(format!("{}", error).contains("audio"));
        assert!(format!("{}", error).contains('8'));

        let error = StoreError::IndexOutOfRange {
            kind: AttachmentKind::Image,
            index: 5,
            len: 1,
        };
        let message = format!("{}", error);
        assert!(message.contains("image index 5"));
        assert!(message.contains("entry has 1"));

        let error = StoreError::AttachmentNotFound(AttachmentKind::Image);
        assert!(format!("{}", error).contains("No matching image"));
    }

    #[test]
    fn test_corrupt_store_error_source_chaining() {
        let inner = SnapshotError::InvalidShape("top-level value is a number".to_string());
        let app_error = AppError::from(StoreError::Corrupt(inner));

        let store_source = app_error.source().expect("AppError should have a source");
        assert!(store_source.to_string().contains("corrupt"));

        let shape_source = store_source
            .source()
            .expect("StoreError::Corrupt should expose the snapshot error");
        assert!(shape_source.to_string().contains("number"));
    }

    #[test]
    fn test_lock_error_variants() {
        let error = LockError::FileBusy {
            path: PathBuf::from("/data/.soulpages.lock"),
        };
        assert!(format!("{}", error).contains("/data/.soulpages.lock"));

        let error = LockError::AcquisitionFailed {
            path: PathBuf::from("/data/.soulpages.lock"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(format!("{}", error).contains("Failed to acquire lock"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_result_combinators() {
        let io_result: Result<(), io::Error> = Err(io::Error::other("test error"));
        let app_result: AppResult<()> = io_result.map_err(AppError::Io);

        match app_result {
            Err(AppError::Io(inner)) => assert_eq!(inner.kind(), io::ErrorKind::Other),
            _ => panic!("Expected AppError::Io variant"),
        }
    }
}
