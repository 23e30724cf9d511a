//! Configuration loading
//!
//! Resolution priority (highest first):
//! 1. Command-line arguments (applied by each binary)
//! 2. Environment variables (`FLEETOPS_*`)
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! A missing config file is not an error: the service logs a warning and
//! continues with defaults.

use crate::{Error, Locale, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const ENV_CONFIG_PATH: &str = "FLEETOPS_CONFIG";
pub const ENV_STORE_URL: &str = "FLEETOPS_STORE_URL";
pub const ENV_STORE_TOKEN: &str = "FLEETOPS_STORE_TOKEN";
pub const ENV_LOCALE: &str = "FLEETOPS_LOCALE";
pub const ENV_PORT: &str = "FLEETOPS_PORT";
pub const ENV_DATABASE: &str = "FLEETOPS_DATABASE";

const DEFAULT_STORE_URL: &str = "http://127.0.0.1:54321";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5780;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Complete configuration as read from `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// SQLite file holding import job history
    pub database_path: Option<PathBuf>,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub import: ImportConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Remote store (hosted Postgres REST endpoint) settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Project URL, e.g. `https://xyz.example.co`; `/rest/v1` is appended by the client
    pub base_url: String,
    /// Service or user access token sent as `apikey` and bearer token
    pub access_token: Option<String>,
    pub timeout_seconds: u64,
}

/// Batch import behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub locale: Locale,
    /// Remote create calls allowed in flight at once (1 = strictly sequential)
    pub max_in_flight: usize,
    /// Send creates as upserts on the schema's conflict key
    pub upsert: bool,
    /// Report the specific validation reason instead of the generic message
    pub detailed_errors: bool,
    /// Decode non-UTF-8 uploads as Windows-1252
    pub latin1_fallback: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STORE_URL.to_string(),
            access_token: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            max_in_flight: 1,
            upsert: false,
            detailed_errors: false,
            latin1_fallback: true,
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Load configuration from file (if any), then apply environment overrides
    ///
    /// An explicitly requested file that does not exist is an error; a
    /// missing file found through the default search is not.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::read_file(path)?
            }
            None => match find_config_file() {
                Some(path) => Self::read_file(&path)?,
                None => {
                    warn!("No config file found, using compiled defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `FLEETOPS_*` environment variables on top of file values
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var(ENV_STORE_URL) {
            self.store.base_url = url;
        }
        if let Ok(token) = std::env::var(ENV_STORE_TOKEN) {
            self.store.access_token = Some(token);
        }
        if let Ok(locale) = std::env::var(ENV_LOCALE) {
            self.import.locale = locale.parse()?;
        }
        if let Ok(port) = std::env::var(ENV_PORT) {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid {}: {}", ENV_PORT, port)))?;
        }
        if let Ok(path) = std::env::var(ENV_DATABASE) {
            self.database_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// Check values that would otherwise fail later in confusing ways
    pub fn validate(&self) -> Result<()> {
        let url = self.store.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "store.base_url must be an http(s) URL, got '{}'",
                self.store.base_url
            )));
        }
        if self.import.max_in_flight == 0 {
            return Err(Error::Config(
                "import.max_in_flight must be at least 1".to_string(),
            ));
        }
        if self.store.timeout_seconds == 0 {
            return Err(Error::Config(
                "store.timeout_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Access token, required before talking to the remote store
    pub fn require_access_token(&self) -> Result<&str> {
        match self.store.access_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(Error::Config(format!(
                "store.access_token is not set (use config file or {})",
                ENV_STORE_TOKEN
            ))),
        }
    }

    /// Database path, falling back to the platform data directory
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

/// Locate a config file: `FLEETOPS_CONFIG`, then user config dir, then `/etc`
fn find_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
        warn!("{} points to missing file: {}", ENV_CONFIG_PATH, path.display());
    }

    if let Some(path) = dirs::config_dir().map(|d| d.join("fleetops").join("config.toml")) {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/fleetops/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default location of the job history database
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("fleetops").join("fleetops.db"))
        .unwrap_or_else(|| PathBuf::from("./fleetops_data/fleetops.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TomlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 5780);
        assert_eq!(config.import.max_in_flight, 1);
        assert!(config.import.latin1_fallback);
        assert!(!config.import.upsert);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            [store]
            base_url = "https://fleet.example.co"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.base_url, "https://fleet.example.co");
        assert_eq!(config.store.timeout_seconds, 30);
        assert_eq!(config.import.locale, Locale::Es);
    }

    #[test]
    fn test_rejects_zero_in_flight() {
        let mut config = TomlConfig::default();
        config.import.max_in_flight = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let mut config = TomlConfig::default();
        config.store.base_url = "postgres://localhost/fleet".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_token_is_missing() {
        let mut config = TomlConfig::default();
        config.store.access_token = Some("   ".to_string());
        assert!(config.require_access_token().is_err());

        config.store.access_token = Some("secret".to_string());
        assert_eq!(config.require_access_token().unwrap(), "secret");
    }
}
