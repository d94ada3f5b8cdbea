//! Command-line interface definitions.
//!
//! Parsing lives here; `commands` carries out the parsed command against the
//! journal.

pub mod commands;

use crate::constants::{APP_DESCRIPTION, APP_NAME, LOG_FORMAT_JSON, LOG_FORMAT_TEXT};
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

/// A gentle diary: one page per day, with pictures and voice notes
#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION)]
#[command(author, version, long_about = None)]
pub struct CliArgs {
    /// Log output format (text or json). Falls back to SOULPAGES_LOG_FORMAT, then text
    #[arg(long, global = true, value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON])]
    pub log_format: Option<String>,

    /// Print debug logs
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// The page a command works on.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct DateArg {
    /// Date of the page (format: YYYY-MM-DD or YYYYMMDD, default today)
    #[arg(short = 'd', long)]
    pub date: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Write the text of a page (reads stdin when TEXT is omitted)
    Write {
        #[command(flatten)]
        date: DateArg,
        /// New text of the page
        text: Option<String>,
    },

    /// Show a page with its attachments and the quote of the day
    Show {
        #[command(flatten)]
        date: DateArg,
    },

    /// List every written page, newest first
    List,

    /// Delete a page
    Delete {
        #[command(flatten)]
        date: DateArg,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Attach image files (or voice notes with --audio) to a page
    Attach {
        #[command(flatten)]
        date: DateArg,
        /// Attach as voice notes instead of images
        #[arg(long)]
        audio: bool,
        /// Files to attach
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Remove one attachment from a page, by its number in `show`
    #[command(group(ArgGroup::new("target").required(true).args(["image", "audio"])))]
    Detach {
        #[command(flatten)]
        date: DateArg,
        /// Number of the image to remove
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        image: Option<u64>,
        /// Number of the voice note to remove
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        audio: Option<u64>,
    },

    /// Export the whole journal to a JSON file
    Export {
        /// Output file (default: soulpages-<timestamp>.json in the current directory)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Import an exported JSON file; imported pages replace pages of the same date
    Import {
        /// File to import
        path: PathBuf,
    },

    /// Manage the passcode
    Lock {
        #[command(subcommand)]
        command: LockCommand,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum LockCommand {
    /// Set or change the passcode (4-8 digits)
    Set,

    /// Show whether a passcode is set
    Status,

    /// Erase every page and the passcode
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_write_with_date_and_text() {
        let args = parse(&["soulpages", "write", "-d", "2023-01-15", "hello there"]);
        assert_eq!(
            args.command,
            Command::Write {
                date: DateArg {
                    date: Some("2023-01-15".to_string())
                },
                text: Some("hello there".to_string()),
            }
        );
        assert!(!args.verbose);
        assert!(args.log_format.is_none());
    }

    #[test]
    fn test_write_defaults_to_today_and_stdin() {
        let args = parse(&["soulpages", "write"]);
        assert_eq!(
            args.command,
            Command::Write {
                date: DateArg::default(),
                text: None,
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["soulpages", "list", "-v", "--log-format", "json"]);
        assert_eq!(args.command, Command::List);
        assert!(args.verbose);
        assert_eq!(args.log_format.as_deref(), Some("json"));
    }

    #[test]
    fn test_invalid_log_format() {
        let result = CliArgs::try_parse_from(["soulpages", "--log-format", "xml", "list"]);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_attach_requires_files() {
        let result = CliArgs::try_parse_from(["soulpages", "attach"]);
        assert!(result.is_err());

        let args = parse(&["soulpages", "attach", "--audio", "a.webm", "b.ogg"]);
        match args.command {
            Command::Attach { audio, files, .. } => {
                assert!(audio);
                assert_eq!(files, vec![PathBuf::from("a.webm"), PathBuf::from("b.ogg")]);
            }
            other => panic!("Expected Attach, got {:?}", other),
        }
    }

    #[test]
    fn test_detach_needs_exactly_one_target() {
        let args = parse(&["soulpages", "detach", "--image", "2"]);
        assert_eq!(
            args.command,
            Command::Detach {
                date: DateArg::default(),
                image: Some(2),
                audio: None,
            }
        );

        assert!(CliArgs::try_parse_from(["soulpages", "detach"]).is_err());
        assert!(
            CliArgs::try_parse_from(["soulpages", "detach", "--image", "1", "--audio", "1"])
                .is_err()
        );
        assert!(CliArgs::try_parse_from(["soulpages", "detach", "--image", "0"]).is_err());
    }

    #[test]
    fn test_lock_subcommands() {
        assert_eq!(
            parse(&["soulpages", "lock", "set"]).command,
            Command::Lock {
                command: LockCommand::Set
            }
        );
        assert_eq!(
            parse(&["soulpages", "lock", "reset", "--yes"]).command,
            Command::Lock {
                command: LockCommand::Reset { yes: true }
            }
        );
    }

    #[test]
    fn test_export_and_import_paths() {
        assert_eq!(
            parse(&["soulpages", "export", "-o", "/tmp/out.json"]).command,
            Command::Export {
                output: Some(PathBuf::from("/tmp/out.json"))
            }
        );
        assert_eq!(
            parse(&["soulpages", "import", "backup.json"]).command,
            Command::Import {
                path: PathBuf::from("backup.json")
            }
        );
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }
}
