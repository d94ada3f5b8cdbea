//! High-level journal operations.
//!
//! These orchestrate the store and the snapshot codec for the CLI: exporting
//! the journal to a file, importing and merging an exported file, and attaching
//! files from disk to an entry.

pub mod attach;
pub mod export;
pub mod import;
pub mod merge;

// Re-export commonly used functions
pub use attach::{attach_files, AttachReport, RejectReason, Rejection};
pub use export::{default_export_file_name, export_to_file, ExportReport};
pub use import::import_from_file;
pub use merge::{import_snapshot, merge, ImportReport};
