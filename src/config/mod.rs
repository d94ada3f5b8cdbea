//! Configuration management for the soulpages application.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults.
//!
//! # Environment Variables
//!
//! - `SOULPAGES_DIR`: Path to the data directory (defaults to ~/Documents/soulpages)
//! - `SOULPAGES_BATCH_LIMIT`: Files accepted per attach batch (defaults to 8, at most 64)
//! - `SOULPAGES_ATTACHMENT_LIMIT`: Attachments of each kind per entry (unlimited if unset)
//! - `SOULPAGES_PASSCODE`: Passcode used instead of prompting
//! - `HOME`: Used for expanding the default data directory path

use crate::constants::{
    DEFAULT_BATCH_LIMIT, DEFAULT_DATA_SUBDIR, ENV_VAR_ATTACHMENT_LIMIT, ENV_VAR_BATCH_LIMIT,
    ENV_VAR_HOME, ENV_VAR_PASSCODE, ENV_VAR_SOULPAGES_DIR, MAX_BATCH_LIMIT,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;
use zeroize::Zeroizing;

/// Configuration for the soulpages application.
///
/// # Examples
///
/// Creating a configuration manually:
/// ```
/// use soulpages::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     data_dir: PathBuf::from("/path/to/journal"),
///     ..Config::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
///
/// Loading configuration from environment variables:
/// ```no_run
/// use soulpages::Config;
/// use std::env;
///
/// env::set_var("SOULPAGES_DIR", "/custom/journal/path");
///
/// let config = Config::load().expect("Failed to load configuration");
/// assert_eq!(config.batch_limit, 8);
/// ```
pub struct Config {
    /// Directory holding the store, the passcode digest and the lock file.
    pub data_dir: PathBuf,

    /// How many files a single `attach` accepts.
    pub batch_limit: usize,

    /// Cap on attachments of each kind per entry. `None` means unlimited.
    pub attachment_limit: Option<usize>,

    /// Passcode supplied through the environment, used instead of prompting.
    pub passcode: Option<Zeroizing<String>>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_dir", &"[REDACTED_PATH]")
            .field("batch_limit", &self.batch_limit)
            .field("attachment_limit", &self.attachment_limit)
            .field(
                "passcode",
                &self.passcode.as_ref().map(|_| "[REDACTED_PASSCODE]"),
            )
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from(""),
            batch_limit: DEFAULT_BATCH_LIMIT,
            attachment_limit: None,
            passcode: None,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// The data directory path is expanded with `shellexpand`, so `~` and
    /// environment variable references work.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - The data directory path expansion fails or yields an empty path
    /// - A limit is not a number or is out of range
    pub fn load() -> AppResult<Self> {
        let data_dir_str = env::var(ENV_VAR_SOULPAGES_DIR).unwrap_or_else(|_| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, DEFAULT_DATA_SUBDIR)
        });

        let expanded_path = shellexpand::full(&data_dir_str)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
        let data_dir = PathBuf::from(expanded_path.into_owned());

        if data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory path is empty".to_string()));
        }

        let batch_limit = match env::var(ENV_VAR_BATCH_LIMIT) {
            Ok(raw) => parse_limit(ENV_VAR_BATCH_LIMIT, &raw, MAX_BATCH_LIMIT)?,
            Err(_) => DEFAULT_BATCH_LIMIT,
        };

        let attachment_limit = match env::var(ENV_VAR_ATTACHMENT_LIMIT) {
            Ok(raw) => Some(parse_limit(ENV_VAR_ATTACHMENT_LIMIT, &raw, usize::MAX)?),
            Err(_) => None,
        };

        let passcode = env::var(ENV_VAR_PASSCODE).ok().map(Zeroizing::new);

        Ok(Config {
            data_dir,
            batch_limit,
            attachment_limit,
            passcode,
        })
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` with one of the following messages:
    /// - "Data directory path is empty"
    /// - "Data directory must be an absolute path"
    /// - "Batch limit must be between 1 and 64"
    pub fn validate(&self) -> AppResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory path is empty".to_string()));
        }

        if !self.data_dir.is_absolute() {
            return Err(AppError::Config(
                "Data directory must be an absolute path".to_string(),
            ));
        }

        if !(1..=MAX_BATCH_LIMIT).contains(&self.batch_limit) {
            return Err(AppError::Config(format!(
                "Batch limit must be between 1 and {}",
                MAX_BATCH_LIMIT
            )));
        }

        if self.attachment_limit == Some(0) {
            return Err(AppError::Config(
                "Attachment limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// The per-entry attachment cap to pass to the store.
    pub fn max_attachments(&self) -> usize {
        self.attachment_limit.unwrap_or(usize::MAX)
    }
}

fn parse_limit(var: &str, raw: &str, max: usize) -> AppResult<usize> {
    let value: usize = raw
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} must be a whole number, got '{}'", var, raw)))?;
    if value == 0 || value > max {
        return Err(AppError::Config(format!(
            "{} must be between 1 and {}, got {}",
            var, max, value
        )));
    }
    Ok(value)
}
