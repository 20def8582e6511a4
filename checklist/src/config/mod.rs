//! Configuration for the `checklist` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/checklist/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use checklist_proto::task::{TaskDefinition, TaskId};
use url::Url;

use crate::lifecycle::manager::{DEFAULT_BULK_DELAY, DEFAULT_COMPLETION_DELAY};

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

    /// The configured server URL is not a valid absolute URL.
    #[error("invalid server URL {url:?}: {source}")]
    InvalidServerUrl {
        /// Value as configured.
        url: String,
        /// Parser error.
        source: url::ParseError,
    },

    /// No storage file was configured and no data directory is available.
    #[error("could not determine data directory for local storage (set --storage-file)")]
    NoDataDir,
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    backend: BackendFileConfig,
    lifecycle: LifecycleFileConfig,
    tasks: Vec<TaskDefinition>,
}

/// `[backend]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BackendFileConfig {
    server_url: Option<String>,
    storage_file: Option<PathBuf>,
}

/// `[lifecycle]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct LifecycleFileConfig {
    completion_delay_ms: Option<u64>,
    bulk_delay_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Where checklist state is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Browser-style key-value storage in a JSON file.
    Local {
        /// Storage file path.
        storage_file: PathBuf,
    },
    /// The State API served by `checklist-server`.
    Remote {
        /// Server base URL.
        server_url: Url,
    },
}

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Persistence backend.
    pub backend: BackendConfig,
    /// Delay before each task is marked complete.
    pub completion_delay: Duration,
    /// Delay before a bulk completion starts.
    pub bulk_delay: Duration,
    /// Ordered task catalog.
    pub tasks: Vec<TaskDefinition>,
    /// Answer every confirmation prompt with yes.
    pub assume_yes: bool,
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read,
    /// any config file cannot be parsed, the server URL is invalid, or no
    /// storage location can be determined for the local backend.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, &file, dirs::data_dir().as_deref())
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default. `data_dir` is the base for the
    /// default storage file.
    fn resolve(
        cli: &CliArgs,
        file: &ConfigFile,
        data_dir: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let server_url = cli
            .server_url
            .clone()
            .or_else(|| file.backend.server_url.clone())
            .filter(|url| !url.trim().is_empty());

        let backend = if let Some(raw) = server_url {
            let server_url =
                Url::parse(&raw).map_err(|source| ConfigError::InvalidServerUrl { url: raw, source })?;
            BackendConfig::Remote { server_url }
        } else {
            let storage_file = match cli
                .storage_file
                .clone()
                .or_else(|| file.backend.storage_file.clone())
            {
                Some(path) => path,
                None => default_storage_file(data_dir).ok_or(ConfigError::NoDataDir)?,
            };
            BackendConfig::Local { storage_file }
        };

        let tasks = if file.tasks.is_empty() {
            default_catalog()
        } else {
            file.tasks.clone()
        };

        Ok(Self {
            backend,
            completion_delay: file
                .lifecycle
                .completion_delay_ms
                .map_or(DEFAULT_COMPLETION_DELAY, Duration::from_millis),
            bulk_delay: file
                .lifecycle
                .bulk_delay_ms
                .map_or(DEFAULT_BULK_DELAY, Duration::from_millis),
            tasks,
            assume_yes: cli.yes,
        })
    }
}

/// The mock change-request catalog used when no `[[tasks]]` are configured.
#[must_use]
pub fn default_catalog() -> Vec<TaskDefinition> {
    [
        ("1", "Submit change request", "jsmith", "John Smith"),
        ("2", "Assess impact and risk", "mgarcia", "Maria Garcia"),
        ("3", "Obtain CAB approval", "achen", "Alice Chen"),
        ("4", "Schedule implementation window", "jsmith", "John Smith"),
        ("5", "Implement change", "rpatel", "Raj Patel"),
        ("6", "Post-implementation review", "mgarcia", "Maria Garcia"),
    ]
    .into_iter()
    .map(|(id, name, user, display)| TaskDefinition::new(id, name).assigned(user, display))
    .collect()
}

fn default_storage_file(data_dir: Option<&Path>) -> Option<PathBuf> {
    data_dir.map(|dir| dir.join("checklist").join("storage.json"))
}

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Change-request checklist")]
pub struct CliArgs {
    /// Base URL of a checklist state server; enables remote persistence.
    #[arg(long, env = "CHECKLIST_SERVER_URL")]
    pub server_url: Option<String>,

    /// Local storage file (default: `<data dir>/checklist/storage.json`).
    #[arg(long, env = "CHECKLIST_STORAGE")]
    pub storage_file: Option<PathBuf>,

    /// Path to config file (default: `~/.config/checklist/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Answer yes to every confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn", env = "CHECKLIST_LOG")]
    pub log_level: String,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Action to run (default: `status`).
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Checklist actions.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the checklist.
    Status,
    /// Complete the active task and advance to the next pending one.
    Complete,
    /// Complete one task directly.
    CompleteTask {
        /// Task id.
        id: TaskId,
    },
    /// Add tasks to the selection.
    Select {
        /// Task ids.
        #[arg(required = true)]
        ids: Vec<TaskId>,
    },
    /// Remove tasks from the selection.
    Deselect {
        /// Task ids.
        #[arg(required = true)]
        ids: Vec<TaskId>,
    },
    /// Flip one task's selection.
    Toggle {
        /// Task id.
        id: TaskId,
    },
    /// Select every task.
    SelectAll,
    /// Clear the selection.
    DeselectAll,
    /// Complete every selected task.
    CompleteSelected,
    /// Show task counts.
    Summary,
    /// Restore the initial state.
    Reset,
}

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ConfigFile::default());
    };
    let path = config_dir.join("checklist").join("config.toml");

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
