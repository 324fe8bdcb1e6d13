//! Configuration loading and resolution
//!
//! Each setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const ENV_DB: &str = "SURVEY_DB";
pub const ENV_BIND: &str = "SURVEY_BIND";
pub const ENV_CONFIG: &str = "SURVEY_CONFIG";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";

/// Admin sessions lapse after this long (24 hours)
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub log_level: Option<String>,
    pub session_ttl_secs: Option<u64>,
}

/// Fully resolved server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_path: PathBuf,
    pub bind_addr: String,
    pub log_level: Option<String>,
    pub session_ttl: Duration,
}

impl ServerConfig {
    /// Resolve every setting from CLI values, environment and the TOML file
    ///
    /// A missing config file is not an error; the other layers still apply.
    /// A config file that exists but fails to parse is reported.
    pub fn resolve(
        cli_db: Option<&Path>,
        cli_bind: Option<&str>,
        cli_config: Option<&Path>,
    ) -> Result<ServerConfig> {
        let config_path = cli_config
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from))
            .or_else(default_config_path);

        let toml = match config_path {
            Some(path) if path.exists() => load_toml_config(&path)?,
            Some(path) => {
                debug!("No config file at {}, using defaults", path.display());
                TomlConfig::default()
            }
            None => TomlConfig::default(),
        };

        Ok(ServerConfig {
            database_path: resolve_database_path(cli_db, &toml),
            bind_addr: resolve_bind_addr(cli_bind, &toml),
            log_level: toml.log_level,
            session_ttl: Duration::from_secs(
                toml.session_ttl_secs.unwrap_or(DEFAULT_SESSION_TTL_SECS),
            ),
        })
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
}

/// `<config_dir>/survey/config.toml`, if the platform has a config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("survey").join("config.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join("survey").join("surveys.db"),
        None => {
            warn!("Could not determine local data directory, using working directory");
            PathBuf::from("./surveys.db")
        }
    }
}

pub fn resolve_database_path(cli_arg: Option<&Path>, toml: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Some(path) = std::env::var_os(ENV_DB) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml.database_path {
        return path.clone();
    }

    // Priority 4: compiled default
    default_database_path()
}

pub fn resolve_bind_addr(cli_arg: Option<&str>, toml: &TomlConfig) -> String {
    cli_arg
        .map(str::to_string)
        .or_else(|| std::env::var(ENV_BIND).ok())
        .or_else(|| toml.bind_addr.clone())
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
}
