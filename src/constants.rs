//! Constants used throughout the application.
//!
//! This module contains all constants used in the SoulPages application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "soulpages";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A gentle diary: one page per day, with pictures and voice notes";

// Logging
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "soulpages";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";

// Configuration Keys & Environment Variables
/// Environment variable for specifying the data directory.
pub const ENV_VAR_SOULPAGES_DIR: &str = "SOULPAGES_DIR";
/// Environment variable overriding the attachment batch limit.
pub const ENV_VAR_BATCH_LIMIT: &str = "SOULPAGES_BATCH_LIMIT";
/// Environment variable capping attachments of each kind on one entry.
pub const ENV_VAR_ATTACHMENT_LIMIT: &str = "SOULPAGES_ATTACHMENT_LIMIT";
/// Environment variable supplying the passcode non-interactively.
pub const ENV_VAR_PASSCODE: &str = "SOULPAGES_PASSCODE";
/// Environment variable selecting the log format.
pub const ENV_VAR_LOG_FORMAT: &str = "SOULPAGES_LOG_FORMAT";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default sub-directory for journal data within the user's home directory.
pub const DEFAULT_DATA_SUBDIR: &str = "Documents/soulpages";

// Persistence slots
/// Backend slot holding the serialized entry store.
pub const STORE_SLOT: &str = "soulpages_data_v3";
/// Backend slot holding the passcode digest.
pub const PASS_SLOT: &str = "soulpages_pass_v3";
/// Every slot the journal writes; `clear` removes exactly these.
pub const JOURNAL_SLOTS: [&str; 2] = [STORE_SLOT, PASS_SLOT];
/// File extension used by the directory backend for slot files.
pub const SLOT_FILE_EXTENSION: &str = "json";
/// Name of the advisory lock file inside the data directory.
pub const LOCK_FILE_NAME: &str = ".soulpages.lock";
/// Default POSIX permissions for newly created directories (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;
/// Default POSIX permissions for newly created files (owner read/write).
#[cfg(unix)]
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o600;

// Passcode
/// Shortest accepted passcode.
pub const PASSCODE_MIN_LEN: usize = 4;
/// Longest accepted passcode.
pub const PASSCODE_MAX_LEN: usize = 8;

// Attachments
/// Number of files accepted from a single attach batch.
pub const DEFAULT_BATCH_LIMIT: usize = 8;
/// Upper bound for a configured batch limit.
pub const MAX_BATCH_LIMIT: usize = 64;
/// Prefix of every attachment token.
pub const TOKEN_PREFIX: &str = "data:";
/// Separator between the media type and the payload of a token.
pub const TOKEN_BASE64_MARKER: &str = ";base64,";

// Date/Time Logic
/// Date format string for ISO date format (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";
/// Date format string for compact date format (YYYYMMDD).
pub const DATE_FORMAT_COMPACT: &str = "%Y%m%d";

// Export
/// Prefix of generated export file names.
pub const EXPORT_FILE_PREFIX: &str = "soulpages-";
/// Extension of generated export file names.
pub const EXPORT_FILE_EXTENSION: &str = ".json";
