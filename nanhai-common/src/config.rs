//! Configuration loading
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments / environment variables (resolved by clap)
//! 2. TOML configuration file
//! 3. Built-in defaults (code constants)
//!
//! A missing TOML file is not an error: a warning is logged and defaults apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default cap on simultaneous push connections
pub const DEFAULT_MAX_CONNECTIONS: usize = 4;

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; unset fields fall back to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Interface to bind
    #[serde(default)]
    pub host: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Maximum simultaneous push connections
    #[serde(default)]
    pub max_connections: Option<usize>,

    /// Replacement artifact catalog (TOML)
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Directory of static client assets
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

/// Values given on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub max_connections: Option<usize>,
    pub catalog_path: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
}

/// Fully resolved server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub max_connections: usize,
    pub catalog_path: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
    pub log_level: String,
}

impl ServerSettings {
    /// Merge CLI/env values over the TOML file over compiled defaults
    pub fn resolve(cli: CliOverrides, toml: TomlConfig) -> Self {
        Self {
            host: cli
                .host
                .or(toml.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            database_path: cli
                .database_path
                .or(toml.database_path)
                .unwrap_or_else(default_database_path),
            max_connections: cli
                .max_connections
                .or(toml.max_connections)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            catalog_path: cli.catalog_path.or(toml.catalog_path),
            static_dir: cli.static_dir.or(toml.static_dir),
            log_level: toml.logging.level.unwrap_or_else(|| "info".to_string()),
        }
    }

    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a TOML configuration string
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("invalid config file: {}", e)))
}

/// Where the TOML config comes from
///
/// Locating and loading are separate from logging so the binary can read the
/// file before its subscriber exists and report the outcome afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// File exists at this path
    File(PathBuf),
    /// Expected here but absent; defaults apply
    Missing(PathBuf),
    /// No explicit path and no platform config directory
    Unresolved,
}

impl ConfigSource {
    /// Resolve the explicit path, or the default location
    pub fn locate(explicit: Option<&Path>) -> Self {
        match explicit.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) if path.exists() => ConfigSource::File(path),
            Some(path) => ConfigSource::Missing(path),
            None => ConfigSource::Unresolved,
        }
    }

    /// Parse the file, or return defaults when there is none
    pub fn load(&self) -> Result<TomlConfig> {
        match self {
            ConfigSource::File(path) => {
                let content = std::fs::read_to_string(path)?;
                parse_toml_config(&content)
            }
            ConfigSource::Missing(_) | ConfigSource::Unresolved => Ok(TomlConfig::default()),
        }
    }

    /// Report which configuration is in effect
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config file {}", path.display()),
            ConfigSource::Missing(path) => {
                warn!("Config file {} not found, using defaults", path.display())
            }
            ConfigSource::Unresolved => {
                warn!("Could not determine config directory, using defaults")
            }
        }
    }
}

/// Load the TOML config file, degrading to defaults when it is absent
///
/// An explicit path that does not exist only produces a warning; a file that
/// exists but cannot be parsed is an error.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let source = ConfigSource::locate(explicit);
    let config = source.load()?;
    source.log();
    Ok(config)
}

/// `<config_dir>/nanhai/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nanhai").join("config.toml"))
}

/// `<data_local_dir>/nanhai/nanhai.db`, or `./nanhai_data/nanhai.db`
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("nanhai"))
        .unwrap_or_else(|| PathBuf::from("./nanhai_data"))
        .join("nanhai.db")
}
