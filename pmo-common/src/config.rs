//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`PMO_ROOT_FOLDER`)
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or malformed TOML file never stops startup: a warning is
//! logged and compiled defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "PMO_ROOT_FOLDER";

/// Application directory name under the platform config/data dirs
const APP_DIR: &str = "pmo-dashboard";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding input files and the persisted model
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Timesheet export file name (relative to root folder unless absolute)
    #[serde(default = "default_tasks_file")]
    pub tasks_file: PathBuf,

    /// Roster file name (relative to root folder unless absolute)
    #[serde(default = "default_roster_file")]
    pub roster_file: PathBuf,

    /// Largest accepted upload, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            port: default_port(),
            tasks_file: default_tasks_file(),
            roster_file: default_roster_file(),
            max_upload_bytes: default_max_upload_bytes(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_port() -> u16 {
    5780
}

fn default_tasks_file() -> PathBuf {
    PathBuf::from("tarefas.csv")
}

fn default_roster_file() -> PathBuf {
    PathBuf::from("stacks_squads.csv")
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read `path` without logging; `Ok(None)` when the file does not exist
    ///
    /// Used before the tracing subscriber is installed.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Load `explicit` or the platform config file, falling back to defaults
    ///
    /// Never logs, so it can run before the subscriber exists; call
    /// [`ConfigOutcome::log`] afterwards.
    pub fn resolve(explicit: Option<&Path>) -> (Self, ConfigOutcome) {
        let Some(path) = explicit.map(Path::to_path_buf).or_else(config_file_path) else {
            return (Self::default(), ConfigOutcome::NoConfigDir);
        };

        match Self::load(&path) {
            Ok(Some(config)) => (config, ConfigOutcome::Loaded(path)),
            Ok(None) => (Self::default(), ConfigOutcome::Missing(path)),
            Err(e) => (Self::default(), ConfigOutcome::Invalid(path, e.to_string())),
        }
    }
}

/// What happened when looking for the config file
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigOutcome {
    Loaded(PathBuf),
    Missing(PathBuf),
    /// Present but unreadable or unparseable; defaults were used
    Invalid(PathBuf, String),
    /// No explicit path and no platform config directory
    NoConfigDir,
}

impl ConfigOutcome {
    /// Report the outcome once tracing is available
    pub fn log(&self) {
        match self {
            ConfigOutcome::Loaded(path) => info!("Loaded configuration from {}", path.display()),
            ConfigOutcome::Missing(path) => {
                info!("No config file at {}, using defaults", path.display())
            }
            ConfigOutcome::Invalid(path, e) => {
                warn!("Ignoring config file {}: {}", path.display(), e)
            }
            ConfigOutcome::NoConfigDir => {
                warn!("Could not determine config directory, using defaults")
            }
        }
    }
}

/// Platform config file location
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// OS-dependent compiled defaults
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("./pmo_data"));

        Self {
            root_folder,
            log_level: default_log_level(),
        }
    }
}

/// Resolves the root folder from CLI, environment, TOML and defaults
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    config: Option<TomlConfig>,
}

impl RootFolderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root folder given on the command line
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Already-loaded TOML configuration
    pub fn with_config(mut self, config: TomlConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = self.config.as_ref().and_then(|c| c.root_folder.clone()) {
            return path;
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder and derives the file paths inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    /// SQLite document store
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("pmo.db")
    }

    /// JSON-file fallback for the aggregated model
    pub fn model_file_path(&self) -> PathBuf {
        self.root_folder.join("data").join("dados.json")
    }

    /// Append-only per-project comments
    pub fn comments_file_path(&self) -> PathBuf {
        self.root_folder.join("data").join("comentarios.json")
    }

    /// Resolve a configured input file against the root folder
    pub fn input_path(&self, configured: &Path) -> PathBuf {
        if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            self.root_folder.join(configured)
        }
    }
}
