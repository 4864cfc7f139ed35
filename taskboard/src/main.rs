//! `taskboard`: inspect task board patches, history dumps and bulk results.
//!
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/taskboard/config.toml`).
//!
//! ```bash
//! # What would an editor send for this edit?
//! cargo run --bin taskboard -- diff before.json after.json
//!
//! # Only status changes from a history dump
//! cargo run --bin taskboard -- history history.json --filter STATUS_CHANGE
//!
//! # Check a bulk-update response against the selection
//! cargo run --bin taskboard -- bulk-report response.json --ids <id>,<id>
//! ```

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use taskboard::config::{CliArgs, ClientConfig};
use taskboard::editor::Keymap;
use taskboard::inspect;

fn main() -> ExitCode {
    let cli = CliArgs::parse();

    // CLI args > env > config file > defaults.
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            match ClientConfig::defaults() {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("error: {e}");
                    return ExitCode::FAILURE;
                }
            }
        }
    };

    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::debug!(api = %config.api_base_url, autosave = config.autosave.enabled, "taskboard starting");

    let Some(command) = cli.command else {
        println!("No subcommand given; see --help.\n");
        println!("Editor shortcuts:");
        for (chord, action) in Keymap::editor_default().help_lines() {
            println!("  {chord:<12} {action}");
        }
        return ExitCode::SUCCESS;
    };

    match inspect::run(&command, &config) {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::warn!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging.
///
/// With `--log-file` logs go to that file through a non-blocking writer;
/// otherwise to stderr so reports on stdout stay clean. The returned
/// [`WorkerGuard`] must be held until shutdown to flush buffered entries.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let Some(log_path) = file_path else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
        return None;
    };

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}
