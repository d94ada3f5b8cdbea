//! Carrying out parsed commands.
//!
//! Every command runs under an exclusive `DirectoryLock`. Commands that touch
//! pages go through the passcode gate first; the passcode comes from
//! `SOULPAGES_PASSCODE` when set, otherwise from a terminal prompt.

use crate::cli::{Command, DateArg, LockCommand};
use crate::config::Config;
use crate::errors::{AppError, AppResult, GateError, StoreError};
use crate::gate::{PassGate, Session};
use crate::journal_core::{quote_for_date, DateKey, DateSpecifier};
use crate::media::{self, AttachmentKind};
use crate::ops;
use crate::storage::{self, Backend, DirectoryLock, FileBackend};
use chrono::{NaiveDate, Utc};
use std::io::{self, BufRead, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use zeroize::Zeroizing;

/// Runs `command` against the journal in `config.data_dir`.
///
/// `today` is the local date used when a command has no `--date`.
pub fn run(command: &Command, config: &Config, today: NaiveDate) -> AppResult<()> {
    storage::ensure_data_directory_exists(&config.data_dir)?;
    let _lock = DirectoryLock::acquire(&config.data_dir)?;
    let gate = PassGate::new(Arc::new(FileBackend::open(&config.data_dir)?));

    match command {
        Command::Write { date, text } => {
            let key = resolve_date(date, today)?;
            let text = match text {
                Some(text) => text.clone(),
                None => read_text_from_stdin()?,
            };
            let session = unlock(&gate, config)?;
            write_page(&session, &key, text)
        }
        Command::Show { date } => {
            let key = resolve_date(date, today)?;
            show_page(&unlock(&gate, config)?, &key)
        }
        Command::List => list_pages(&unlock(&gate, config)?),
        Command::Delete { date, yes } => {
            let key = resolve_date(date, today)?;
            let session = unlock(&gate, config)?;
            if !yes {
                println!("This permanently deletes the page for {}. Re-run with --yes to confirm.", key);
                return Ok(());
            }
            if session.entries().delete(&key)? {
                println!("Deleted {}", key);
            } else {
                println!("No page for {}", key);
            }
            Ok(())
        }
        Command::Attach { date, audio, files } => {
            let key = resolve_date(date, today)?;
            let kind = if *audio {
                AttachmentKind::Audio
            } else {
                AttachmentKind::Image
            };
            let session = unlock(&gate, config)?;
            attach(&session, config, &key, kind, files)
        }
        Command::Detach { date, image, audio } => {
            let key = resolve_date(date, today)?;
            let (kind, number) = match (image, audio) {
                (Some(number), _) => (AttachmentKind::Image, *number),
                (None, Some(number)) => (AttachmentKind::Audio, *number),
                (None, None) => {
                    return Err(AppError::Config(
                        "Choose an attachment with --image N or --audio N".to_string(),
                    ))
                }
            };
            let session = unlock(&gate, config)?;
            let index = usize::try_from(number.saturating_sub(1)).unwrap_or(usize::MAX);
            session.entries().remove_attachment(&key, kind, index)?;
            println!("Removed {} {} from {}", kind, number, key);
            Ok(())
        }
        Command::Export { output } => {
            let session = unlock(&gate, config)?;
            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(ops::default_export_file_name(Utc::now())));
            let report = ops::export_to_file(session.entries(), &path)?;
            println!(
                "Exported {} pages to {} ({} bytes, blake3 {})",
                report.total_entries,
                path.display(),
                report.file_size,
                report.checksum
            );
            Ok(())
        }
        Command::Import { path } => {
            let session = unlock(&gate, config)?;
            let report = ops::import_from_file(session.entries(), path)?;
            println!(
                "Imported {} pages: {} new, {} replaced, {} pages in journal",
                report.imported, report.added, report.overwritten, report.total
            );
            Ok(())
        }
        Command::Lock { command } => run_lock(command, &gate, config),
    }
}

fn run_lock<B: Backend>(command: &LockCommand, gate: &PassGate<B>, config: &Config) -> AppResult<()> {
    match command {
        LockCommand::Set => {
            if gate.has_pass()? {
                unlock(gate, config)?;
            }
            let passcode = read_new_passcode()?;
            gate.set_pass(&passcode)?;
            println!("Passcode set.");
            Ok(())
        }
        LockCommand::Status => {
            if gate.has_pass()? {
                println!("Passcode: set");
            } else {
                println!("Passcode: not set");
            }
            println!("Data directory: {}", config.data_dir.display());
            Ok(())
        }
        LockCommand::Reset { yes } => {
            if !yes {
                println!(
                    "This erases every page and the passcode. Re-run with --yes to confirm."
                );
                return Ok(());
            }
            gate.reset()?;
            println!("Journal erased.");
            Ok(())
        }
    }
}

fn resolve_date(arg: &DateArg, today: NaiveDate) -> AppResult<DateKey> {
    let specifier = DateSpecifier::from_cli_arg(arg.date.as_deref()).map_err(|e| {
        debug!("Date parse failure: {}", e);
        StoreError::InvalidDateKey(arg.date.clone().unwrap_or_default())
    })?;
    Ok(specifier.resolve(today)?)
}

fn unlock<B: Backend>(gate: &PassGate<B>, config: &Config) -> AppResult<Session<B>> {
    if !gate.has_pass()? {
        return gate.unlock(None);
    }

    let candidate = match &config.passcode {
        Some(passcode) => passcode.clone(),
        None => Zeroizing::new(
            rpassword::prompt_password("Passcode: ")
                .map_err(|e| GateError::PasscodePrompt(e.to_string()))?,
        ),
    };
    gate.unlock(Some(candidate.trim()))
}

/// Reads a new passcode: one line from stdin when piped, otherwise a prompt
/// with confirmation. Surrounding whitespace is stripped.
fn read_new_passcode() -> AppResult<Zeroizing<String>> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        let mut line = Zeroizing::new(String::new());
        stdin.lock().read_line(&mut line)?;
        return Ok(Zeroizing::new(line.trim().to_string()));
    }

    let prompt = |label: &str| {
        rpassword::prompt_password(label)
            .map(Zeroizing::new)
            .map_err(|e| GateError::PasscodePrompt(e.to_string()))
    };
    let first = prompt("New passcode (4-8 digits): ")?;
    let second = prompt("Repeat passcode: ")?;
    if first.trim() != second.trim() {
        return Err(GateError::PasscodeMismatch.into());
    }
    Ok(Zeroizing::new(first.trim().to_string()))
}

fn read_text_from_stdin() -> AppResult<String> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    Ok(text)
}

fn write_page<B: Backend>(session: &Session<B>, key: &DateKey, text: String) -> AppResult<()> {
    let mut entry = session.entries().get(key)?;
    entry.text = text;
    session.entries().save(key, entry)?;
    info!("Page {} written", key);
    println!("Saved {}", key);
    Ok(())
}

fn show_page<B: Backend>(session: &Session<B>, key: &DateKey) -> AppResult<()> {
    let entry = session.entries().get(key)?;
    let (quote, author) = quote_for_date(key);

    println!("{}", key);
    println!("\"{}\" - {}", quote, author);
    println!();
    if entry.text.is_empty() {
        println!("(empty page)");
    } else {
        println!("{}", entry.text);
    }

    for kind in [AttachmentKind::Image, AttachmentKind::Audio] {
        for (position, token) in entry.attachments(kind).iter().enumerate() {
            let info = media::inspect(token)?;
            println!(
                "{} {}: {} ({} bytes)",
                kind,
                position + 1,
                info.media_type,
                info.payload_len
            );
        }
    }
    Ok(())
}

fn list_pages<B: Backend>(session: &Session<B>) -> AppResult<()> {
    let snapshot = session.entries().snapshot()?;
    if snapshot.is_empty() {
        println!("No pages yet.");
        return Ok(());
    }

    for key in snapshot.keys_newest_first() {
        if let Some(entry) = snapshot.get(&key) {
            let preview: String = entry
                .text
                .lines()
                .next()
                .unwrap_or_default()
                .chars()
                .take(60)
                .collect();
            println!(
                "{}  {}  [{} images, {} audios]",
                key,
                preview,
                entry.images.len(),
                entry.audios.len()
            );
        }
    }
    Ok(())
}

fn attach<B: Backend>(
    session: &Session<B>,
    config: &Config,
    key: &DateKey,
    kind: AttachmentKind,
    files: &[PathBuf],
) -> AppResult<()> {
    let report = ops::attach_files(
        session.entries(),
        key,
        kind,
        files,
        config.batch_limit,
        config.max_attachments(),
    )?;

    for path in &report.attached {
        println!("Attached {}", path.display());
    }
    for rejection in &report.rejected {
        println!("Skipped {}: {}", rejection.path.display(), rejection.reason);
    }
    Ok(())
}
