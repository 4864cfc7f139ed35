//! Reports behind the `taskboard` inspection subcommands.
//!
//! Each report takes JSON text in the server's wire format and renders a
//! plain-text summary. [`run`] reads the files named on the command line.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use url::Url;

use taskboard_proto::bulk::BulkUpdateResponse;
use taskboard_proto::codec::{self, CodecError};
use taskboard_proto::history::HistoryEntry;
use taskboard_proto::task::{Task, TaskId, TaskUpdate};

use crate::api::endpoint::Endpoint;
use crate::config::{ClientConfig, Command};
use crate::tasks::history::{self, HistoryFilter};
use crate::tasks::{BulkOutcome, ShapeViolation, TaskDraft, ValidationError, diff};

/// Errors from the inspection commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// An input file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Input JSON did not match the expected shape.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// A task id argument is not a UUID.
    #[error("invalid task id {value:?}: {source}")]
    InvalidId {
        /// The rejected argument.
        value: String,
        /// Parser error.
        source: uuid::Error,
    },
    /// Rejected before evaluation.
    #[error("{0}")]
    Validation(String),
    /// The bulk response does not match the request.
    #[error("bulk response rejected: {0}")]
    Shape(#[from] ShapeViolation),
    /// An endpoint URL could not be built.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
    /// The report text could not be written.
    #[error("failed to render report")]
    Render(#[from] std::fmt::Error),
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Runs one subcommand and returns its report.
///
/// # Errors
///
/// Returns [`CliError`] if an input cannot be read or parsed, or the report
/// itself fails.
pub fn run(command: &Command, config: &ClientConfig) -> Result<String, CliError> {
    match command {
        Command::Diff { baseline, draft } => {
            diff_report(&read(baseline)?, &read(draft)?, &config.api_base_url)
        }
        Command::History { file, filter } => {
            let filter = filter.parse().unwrap_or_default();
            history_report(&read(file)?, &filter)
        }
        Command::BulkReport { response, ids } => bulk_report(&read(response)?, ids, config),
    }
}

/// Shows the request an editor would send for `draft_json` over
/// `baseline_json`.
///
/// The edited task is read through a draft, so dates compare by day just as
/// in the editor. When the status changed, the full-replace body a drag
/// would send is shown as well.
///
/// # Errors
///
/// Returns [`CliError::Codec`] for malformed task JSON.
pub fn diff_report(baseline_json: &str, draft_json: &str, base: &Url) -> Result<String, CliError> {
    let baseline: Task = codec::decode(baseline_json)?;
    let edited: Task = codec::decode(draft_json)?;
    let patch = diff(&baseline, &TaskDraft::from_task(&edited));

    if patch.is_empty() {
        return Ok("no changes; nothing would be sent\n".to_string());
    }

    let mut out = String::new();
    let fields: Vec<&str> = patch.fields().iter().map(|f| f.as_str()).collect();
    writeln!(out, "changed: {}", fields.join(", "))?;
    let endpoint = Endpoint::PatchTask(&baseline.id);
    writeln!(out, "{} {}", endpoint.method(), endpoint.url(base)?)?;
    writeln!(out, "{}", codec::encode(&patch)?)?;

    if let Some(status) = patch.status {
        let endpoint = Endpoint::UpdateTask(&baseline.id);
        let body = TaskUpdate::status_transition(&baseline, status);
        writeln!(out, "{} {}", endpoint.method(), endpoint.url(base)?)?;
        writeln!(out, "{}", codec::encode(&body)?)?;
    }
    Ok(out)
}

/// Renders a history dump, one record per line, newest first.
///
/// # Errors
///
/// Returns [`CliError::Codec`] for malformed history JSON.
pub fn history_report(json: &str, filter: &HistoryFilter) -> Result<String, CliError> {
    let entries: Vec<HistoryEntry> = codec::decode(json)?;
    let shown = history::filter(&entries, filter);

    let mut out = String::new();
    if shown.is_empty() {
        writeln!(out, "no history records (filter: {filter})")?;
        return Ok(out);
    }
    for entry in shown {
        let class = history::classify(entry);
        let when = entry
            .changed_at
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        writeln!(
            out,
            "{} {when} [{}] {}",
            class.icon,
            class.label,
            history::describe(entry)
        )?;
    }
    Ok(out)
}

/// Validates a bulk-update response against the requested ids and
/// summarizes it.
///
/// # Errors
///
/// - [`CliError::InvalidId`] for an id that is not a UUID.
/// - [`CliError::Validation`] when no ids are given.
/// - [`CliError::Shape`] when the response does not account for the ids.
pub fn bulk_report(json: &str, ids: &[String], config: &ClientConfig) -> Result<String, CliError> {
    let requested = ids
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<TaskId>().map_err(|source| CliError::InvalidId {
                value: s.to_string(),
                source,
            })
        })
        .collect::<Result<BTreeSet<_>, _>>()?;
    if requested.is_empty() {
        return Err(CliError::Validation(
            config.validation_message(&ValidationError::NoTasksSelected),
        ));
    }

    let response: BulkUpdateResponse = codec::decode(json)?;
    let outcome = BulkOutcome::from_response(&requested, response, &config.failure_message)?;

    let mut out = String::new();
    writeln!(
        out,
        "requested {}, succeeded {}, failed {}",
        outcome.total_requested, outcome.total_successful, outcome.total_failed
    )?;
    for failure in &outcome.failures {
        match &failure.code {
            Some(code) => writeln!(out, "  {}: {} ({code})", failure.id, failure.message)?,
            None => writeln!(out, "  {}: {}", failure.id, failure.message)?,
        }
    }
    Ok(out)
}
