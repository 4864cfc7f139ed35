//! Configuration for the task board client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskboard/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::editor::AutoSaveConfig;
use crate::outcome::{DEFAULT_FAILURE_MESSAGE, DEFAULT_NOTHING_SELECTED_MESSAGE};
use crate::tasks::ValidationError;

/// Base URL used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The API base URL is not a valid absolute URL.
    #[error("invalid API base URL {url:?}: {source}")]
    InvalidUrl {
        /// The rejected value.
        url: String,
        /// Parser error.
        source: url::ParseError,
    },
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    api: ApiFileConfig,
    editor: EditorFileConfig,
    messages: MessagesFileConfig,
}

/// `[api]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ApiFileConfig {
    base_url: Option<String>,
}

/// `[editor]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct EditorFileConfig {
    autosave: Option<bool>,
    autosave_delay_ms: Option<u64>,
}

/// `[messages]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct MessagesFileConfig {
    generic_failure: Option<String>,
    bulk_nothing_selected: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root of the REST API; endpoint paths are joined onto it.
    pub api_base_url: Url,
    /// Editor auto-save behaviour.
    pub autosave: AutoSaveConfig,
    /// Shown when a request fails without a server message.
    pub failure_message: String,
    /// Shown when a bulk edit is attempted with nothing selected.
    pub nothing_selected_message: String,
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path
    /// (`~/.config/taskboard/config.toml`) is tried and silently ignored if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read or
    /// parsed, or if the resolved base URL is invalid.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, &file)
    }

    /// Compiled defaults, ignoring CLI, environment and config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the built-in base URL does not
    /// parse.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::resolve(&CliArgs::default(), &ConfigFile::default())
    }

    /// The configured text for a validation failure.
    #[must_use]
    pub fn validation_message(&self, error: &ValidationError) -> String {
        match error {
            ValidationError::NoTasksSelected => self.nothing_selected_message.clone(),
            other => other.to_string(),
        }
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default. Separated from `load()` to enable
    /// unit testing without CLI parsing.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Result<Self, ConfigError> {
        let defaults = AutoSaveConfig::default();

        let raw_url = cli
            .api_url
            .as_deref()
            .or(file.api.base_url.as_deref())
            .unwrap_or(DEFAULT_API_BASE_URL);
        let api_base_url = Url::parse(raw_url).map_err(|source| ConfigError::InvalidUrl {
            url: raw_url.to_string(),
            source,
        })?;

        Ok(Self {
            api_base_url,
            autosave: AutoSaveConfig {
                enabled: if cli.no_autosave {
                    false
                } else {
                    file.editor.autosave.unwrap_or(defaults.enabled)
                },
                delay: file
                    .editor
                    .autosave_delay_ms
                    .map_or(defaults.delay, Duration::from_millis),
            },
            failure_message: file
                .messages
                .generic_failure
                .clone()
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            nothing_selected_message: file
                .messages
                .bulk_nothing_selected
                .clone()
                .unwrap_or_else(|| DEFAULT_NOTHING_SELECTED_MESSAGE.to_string()),
        })
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Inspect task board patches, history and bulk results")]
pub struct CliArgs {
    /// Base URL of the task board REST API.
    #[arg(long, env = "TASKBOARD_API_URL")]
    pub api_url: Option<String>,

    /// Disable editor auto-save.
    #[arg(long)]
    pub no_autosave: bool,

    /// Path to config file (default: `~/.config/taskboard/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKBOARD_LOG")]
    pub log_level: String,

    /// Path to log file (default: stderr).
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// What to do.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Inspection subcommands.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the patch and request a baseline/draft pair would produce.
    Diff {
        /// JSON file holding the baseline task.
        baseline: PathBuf,
        /// JSON file holding the edited task.
        draft: PathBuf,
    },
    /// Classify and filter a task history dump.
    History {
        /// JSON file holding the history array (newest first).
        file: PathBuf,
        /// `all` or a change type such as `STATUS_CHANGE`.
        #[arg(long, default_value = "all")]
        filter: String,
    },
    /// Validate a bulk-update response against the requested ids.
    BulkReport {
        /// JSON file holding the bulk-update response.
        response: PathBuf,
        /// Requested task ids.
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskboard").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
