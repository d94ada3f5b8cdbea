/*!
# SoulPages - A Gentle Diary

SoulPages keeps one page per calendar day, with optional pictures and voice
notes, behind an optional passcode.

This file wires up logging, configuration and the command dispatcher.

## Usage

```text
soulpages [OPTIONS] <COMMAND>

Commands:
  write   Write the text of a page (reads stdin when TEXT is omitted)
  show    Show a page with its attachments and the quote of the day
  list    List every written page, newest first
  delete  Delete a page
  attach  Attach image files (or voice notes with --audio) to a page
  detach  Remove one attachment from a page, by its number in `show`
  export  Export the whole journal to a JSON file
  import  Import an exported JSON file
  lock    Manage the passcode

Options:
      --log-format <LOG_FORMAT>  Log output format (text or json)
  -v, --verbose                  Print debug logs
```

## Configuration

- `SOULPAGES_DIR`: data directory (defaults to "~/Documents/soulpages")
- `SOULPAGES_PASSCODE`: passcode used instead of prompting
- `SOULPAGES_BATCH_LIMIT`, `SOULPAGES_ATTACHMENT_LIMIT`: attachment limits
- `SOULPAGES_LOG_FORMAT`: `text` or `json`
- `RUST_LOG`: log filter (defaults to "info")
*/

use chrono::Local;
use clap::Parser;
use soulpages::cli::{commands, CliArgs};
use soulpages::config::Config;
use soulpages::constants::{
    DEFAULT_LOG_LEVEL, ENV_VAR_LOG_FORMAT, LOG_FORMAT_JSON, LOG_FORMAT_TEXT,
    TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME,
};
use soulpages::errors::AppResult;
use std::env;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing::{debug, error, info, info_span, warn};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let (log_format, unknown_format) = select_log_format(args.log_format.as_deref());
    init_tracing(log_format, args.verbose);
    if let Some(unknown) = unknown_format {
        warn!(
            "Ignoring unknown {} '{}', using {}",
            ENV_VAR_LOG_FORMAT, unknown, LOG_FORMAT_TEXT
        );
    }

    let correlation_id = Uuid::new_v4();
    let root_span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service = TRACING_SERVICE_NAME,
        correlation_id = %correlation_id
    );
    let _guard = root_span.enter();

    match run_application(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_application(args: &CliArgs) -> AppResult<()> {
    info!("Starting soulpages");

    let config = Config::load()?;
    config.validate()?;
    debug!("Loaded configuration: {:?}", config);

    let today = Local::now().date_naive();
    commands::run(&args.command, &config, today)
}

/// Picks the log format from the flag, then the environment, then text.
///
/// Also returns an unrecognized environment value so it can be reported once
/// logging is up.
fn select_log_format(flag: Option<&str>) -> (&'static str, Option<String>) {
    let requested = match flag {
        Some(flag) => flag.to_string(),
        None => match env::var(ENV_VAR_LOG_FORMAT) {
            Ok(value) => value,
            Err(_) => return (LOG_FORMAT_TEXT, None),
        },
    };

    match requested.trim().to_ascii_lowercase().as_str() {
        LOG_FORMAT_JSON => (LOG_FORMAT_JSON, None),
        LOG_FORMAT_TEXT => (LOG_FORMAT_TEXT, None),
        _ => (LOG_FORMAT_TEXT, Some(requested)),
    }
}

fn init_tracing(log_format: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
    };

    let json_layer = (log_format == LOG_FORMAT_JSON).then(|| {
        fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(io::stderr)
    });
    let text_layer = (log_format != LOG_FORMAT_JSON).then(|| {
        fmt::layer()
            .with_target(false)
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
