//! Bootstrap configuration loading and path resolution
//!
//! Configuration sources, highest priority first:
//! 1. Command-line argument (or its environment fallback)
//! 2. TOML config file
//! 3. Compiled defaults
//!
//! A missing config file is not fatal: the service logs a warning and starts
//! with compiled defaults. A config file that exists but fails to parse is an
//! error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "DOCUSENSE_CONFIG";

/// Default HTTP port for docusense-server
pub const DEFAULT_PORT: u16 = 5780;

/// Default cap on the upload request body (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default number of ticket ids echoed back by an ingest
pub const DEFAULT_TICKET_ID_PREVIEW: usize = 20;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Bootstrap configuration loaded from TOML file
///
/// Cannot change while the service runs; restart to pick up edits.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Interface to bind the HTTP server to
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to SQLite database file (optional, platform default otherwise)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Maximum accepted request body for uploads, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// CSV ingest behaviour
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_path: None,
            max_upload_bytes: default_max_upload_bytes(),
            ingest: IngestConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("host must not be empty".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(Error::Config(
                "max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        let level = self.logging.level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::Config(format!(
                "Unknown log level '{}' (expected one of {})",
                self.logging.level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

/// Transaction boundary used when ingesting an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestAtomicity {
    /// One transaction per upload: all rows persist or none do
    #[default]
    Batch,
    /// One commit per row: a failure keeps the rows committed before it
    PerRow,
}

/// CSV ingest configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub atomicity: IngestAtomicity,

    /// How many assigned ids the ingest response lists
    #[serde(default = "default_ticket_id_preview")]
    pub ticket_id_preview: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            atomicity: IngestAtomicity::default(),
            ticket_id_preview: default_ticket_id_preview(),
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

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_ticket_id_preview() -> usize {
    DEFAULT_TICKET_ID_PREVIEW
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Locate the config file
///
/// Priority: explicit path (CLI), `DOCUSENSE_CONFIG`, user config dir,
/// then `/etc/docusense/config.toml` on Linux. Explicit paths are returned
/// even if they do not exist so the caller can warn about them.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join("docusense").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/docusense/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load bootstrap configuration, falling back to compiled defaults
///
/// Missing file → warning + defaults. Unreadable or invalid file → error.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        info!("No config file found, using compiled defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file {} not found, using compiled defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config = TomlConfig::from_toml_str(&content).map_err(|e| match e {
        Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;
    info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("docusense"))
        .unwrap_or_else(|| PathBuf::from("./docusense_data"))
        .join("docusense.db")
}

/// Pick the database path: CLI/env override, then TOML, then platform default
pub fn resolve_database_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }
    if let Some(path) = &config.database_path {
        return path.clone();
    }
    default_database_path()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.ingest.atomicity, IngestAtomicity::Batch);
        assert_eq!(config.ingest.ticket_id_preview, 20);
        assert_eq!(config.logging.level, "info");
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_per_row_atomicity_parses() {
        let config = TomlConfig::from_toml_str(
            r#"
            [ingest]
            atomicity = "per_row"
            ticket_id_preview = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.ingest.atomicity, IngestAtomicity::PerRow);
        assert_eq!(config.ingest.ticket_id_preview, 5);
    }

    #[test]
    fn test_unknown_atomicity_rejected() {
        let result = TomlConfig::from_toml_str("[ingest]\natomicity = \"sometimes\"\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let result = TomlConfig::from_toml_str("[logging]\nlevel = \"loud\"\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_upload_limit_rejected() {
        let result = TomlConfig::from_toml_str("max_upload_bytes = 0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_database_path_priority() {
        let mut config = TomlConfig::default();
        assert_eq!(resolve_database_path(None, &config), default_database_path());

        config.database_path = Some(PathBuf::from("/srv/toml.db"));
        assert_eq!(
            resolve_database_path(None, &config),
            PathBuf::from("/srv/toml.db")
        );

        let cli = PathBuf::from("/srv/cli.db");
        assert_eq!(resolve_database_path(Some(&cli), &config), cli);
    }

    #[test]
    fn test_default_database_path_file_name() {
        let path = default_database_path();
        assert_eq!(path.file_name().unwrap(), "docusense.db");
    }
}
