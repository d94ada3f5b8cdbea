//! Passcode gate.
//!
//! The gate keeps a hex SHA-256 digest of the passcode in its own backend slot
//! and hands out a `Session` once a candidate matches. A journal with no
//! passcode set is open: `unlock` succeeds without a candidate so a first run
//! can write pages before choosing a passcode.
//!
//! The digest is a convenience lock against casual access, not encryption.
//! Entries are stored in plain text next to it.

use crate::constants::{PASSCODE_MAX_LEN, PASSCODE_MIN_LEN, PASS_SLOT};
use crate::errors::{AppResult, GateError};
use crate::storage::Backend;
use crate::store::EntryStore;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lowercase hex SHA-256 of the passcode's UTF-8 bytes.
///
/// # Examples
///
/// ```
/// use soulpages::gate::digest_passcode;
///
/// assert_eq!(
///     digest_passcode("1234"),
///     "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
/// );
/// assert_ne!(digest_passcode(" 1234 "), digest_passcode("1234"));
/// ```
pub fn digest_passcode(passcode: &str) -> String {
    hex::encode(Sha256::digest(passcode.as_bytes()))
}

fn check_length(passcode: &str) -> Result<(), GateError> {
    let len = passcode.chars().count();
    if (PASSCODE_MIN_LEN..=PASSCODE_MAX_LEN).contains(&len) {
        Ok(())
    } else {
        Err(GateError::InvalidPasscodeLength(len))
    }
}

/// Guards access to the entry store behind a passcode digest.
pub struct PassGate<B> {
    backend: Arc<B>,
}

impl<B: Backend> PassGate<B> {
    /// Creates a gate over `backend`.
    pub fn new(backend: Arc<B>) -> Self {
        PassGate { backend }
    }

    /// Stores the digest of `passcode`, replacing any previous one.
    ///
    /// The passcode is hashed exactly as given; callers reading it from a
    /// terminal strip line endings first.
    ///
    /// # Errors
    ///
    /// Returns `GateError::InvalidPasscodeLength` unless the passcode is 4 to 8
    /// characters long.
    pub fn set_pass(&self, passcode: &str) -> AppResult<()> {
        check_length(passcode)?;
        self.backend.write(PASS_SLOT, &digest_passcode(passcode))?;
        info!("Passcode updated");
        Ok(())
    }

    /// Whether `candidate` matches the stored digest.
    ///
    /// Always `false` when no passcode is set.
    pub fn check_pass(&self, candidate: &str) -> AppResult<bool> {
        match self.stored_digest()? {
            Some(digest) => Ok(digest == digest_passcode(candidate)),
            None => Ok(false),
        }
    }

    /// Whether a passcode has been set.
    pub fn has_pass(&self) -> AppResult<bool> {
        Ok(self.stored_digest()?.is_some())
    }

    /// Erases every entry and the passcode.
    ///
    /// Needs no unlocking; anyone at the device can wipe the journal.
    pub fn reset(&self) -> AppResult<()> {
        self.backend.clear()?;
        warn!("Journal reset: all entries and the passcode were erased");
        Ok(())
    }

    /// Opens a session on the entry store.
    ///
    /// With no passcode set the candidate is ignored.
    ///
    /// # Errors
    ///
    /// Returns `GateError::IncorrectPasscode` if a passcode is set and the
    /// candidate is missing or does not match.
    pub fn unlock(&self, candidate: Option<&str>) -> AppResult<Session<B>> {
        if !self.has_pass()? {
            debug!("No passcode set, journal is open");
            return Ok(Session::new(Arc::clone(&self.backend)));
        }

        match candidate {
            Some(candidate) if self.check_pass(candidate)? => {
                debug!("Passcode accepted");
                Ok(Session::new(Arc::clone(&self.backend)))
            }
            _ => {
                warn!("Unlock attempt with an incorrect passcode");
                Err(GateError::IncorrectPasscode.into())
            }
        }
    }

    fn stored_digest(&self) -> AppResult<Option<String>> {
        Ok(self
            .backend
            .read(PASS_SLOT)?
            .map(|digest| digest.trim().to_string())
            .filter(|digest| !digest.is_empty()))
    }
}

/// Proof that the gate was passed. The only way to reach the entry store
/// through the gate.
pub struct Session<B> {
    entries: EntryStore<B>,
}

impl<B: Backend> Session<B> {
    fn new(backend: Arc<B>) -> Self {
        Session {
            entries: EntryStore::new(backend),
        }
    }

    /// The unlocked entry store.
    pub fn entries(&self) -> &EntryStore<B> {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::journal_core::DateKey;
    use crate::storage::MemoryBackend;
    use crate::store::Entry;

    fn gate() -> (Arc<MemoryBackend>, PassGate<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        (Arc::clone(&backend), PassGate::new(backend))
    }

    #[test]
    fn test_set_and_check_pass() {
        let (_backend, gate) = gate();
        assert!(!gate.has_pass().unwrap());
        assert!(!gate.check_pass("1234").unwrap(), "no passcode set");

        gate.set_pass("1234").unwrap();
        assert!(gate.has_pass().unwrap());
        assert!(gate.check_pass("1234").unwrap());
        assert!(!gate.check_pass(" 1234\n").unwrap(), "whitespace is significant");
        assert!(!gate.check_pass("4321").unwrap());
    }

    #[test]
    fn test_set_pass_stores_hex_digest() {
        let (backend, gate) = gate();
        gate.set_pass("5678").unwrap();

        let stored = backend.read(PASS_SLOT).unwrap().unwrap();
        assert_eq!(stored, digest_passcode("5678"));
        assert_ne!(stored, digest_passcode(" 5678"));
        assert_eq!(stored.len(), 64);
        assert!(stored.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_set_pass_length_bounds() {
        let (_backend, gate) = gate();

        for bad in ["", "123", "123456789", "  1234567  "] {
            assert!(
                matches!(
                    gate.set_pass(bad),
                    Err(AppError::Gate(GateError::InvalidPasscodeLength(_)))
                ),
                "{:?} should be rejected",
                bad
            );
        }
        assert!(!gate.has_pass().unwrap());

        gate.set_pass("1234").unwrap();
        gate.set_pass("12345678").unwrap();
        assert!(gate.check_pass("12345678").unwrap());

        // Length is counted on the string as given, spaces included
        gate.set_pass("   12  ").unwrap();
        assert!(gate.check_pass("   12  ").unwrap());
        assert!(!gate.check_pass("12").unwrap());
    }

    #[test]
    fn test_unlock_without_pass_is_open() {
        let (_backend, gate) = gate();
        assert!(gate.unlock(None).is_ok());
        assert!(gate.unlock(Some("anything")).is_ok());
    }

    #[test]
    fn test_unlock_with_pass() {
        let (_backend, gate) = gate();
        gate.set_pass("2468").unwrap();

        assert!(matches!(
            gate.unlock(None),
            Err(AppError::Gate(GateError::IncorrectPasscode))
        ));
        assert!(matches!(
            gate.unlock(Some("1357")),
            Err(AppError::Gate(GateError::IncorrectPasscode))
        ));

        let session = gate.unlock(Some("2468")).unwrap();
        assert!(session.entries().list().unwrap().is_empty());
    }

    #[test]
    fn test_reset_clears_entries_and_pass() {
        let (_backend, gate) = gate();
        gate.set_pass("1234").unwrap();

        let key = DateKey::parse("2024-01-01").unwrap();
        let session = gate.unlock(Some("1234")).unwrap();
        session
            .entries()
            .save(
                &key,
                Entry {
                    text: "secret".to_string(),
                    ..Entry::empty()
                },
            )
            .unwrap();

        gate.reset().unwrap();

        assert!(!gate.has_pass().unwrap());
        let session = gate.unlock(None).unwrap();
        assert!(session.entries().list().unwrap().is_empty());
    }
}
