//! Server configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Environment variable that overrides [`ServerConfig::database_url`].
pub const DATABASE_URL_ENV: &str = "SCOREBOARD_DATABASE_URL";

/// Runtime configuration for the scoreboard server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind to.
    host: String,

    /// Port to listen on.
    port: u16,

    /// SQLite database path (`:memory:` is not shared across pooled connections).
    database_url: String,

    /// Maximum number of pooled database connections.
    pool_size: u32,

    /// Origins allowed to call the API from a browser.
    cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            database_url: "scoreboard.db".to_string(),
            pool_size: 8,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:8000".to_string(),
            ],
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file. Missing keys take their defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!(database_url = %config.database_url, "Config loaded successfully");
        Ok(config)
    }

    /// Loads from `path` when it exists, otherwise starts from defaults, then
    /// applies the [`DATABASE_URL_ENV`] override.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                info!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            debug!(database_url = %url, "Database URL taken from environment");
            config.database_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Returns a copy with any provided command-line values applied.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        database_url: Option<String>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(database_url) = database_url {
            self.database_url = database_url;
        }
        self
    }

    /// Checks values that would otherwise fail later at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::new("pool_size must be at least 1"));
        }
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::new("database_url must not be empty"));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new config error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: ServerConfig = toml::from_str("port = 9000").expect("Parse failed");
        assert_eq!(*config.port(), 9000);
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.cors_origins().len(), 2);
    }

    #[test]
    fn zero_pool_size_rejected() {
        let config: ServerConfig = toml::from_str("pool_size = 0").expect("Parse failed");
        assert!(config.validate().is_err());
    }

    #[test]
    fn overrides_replace_only_given_values() {
        let config = ServerConfig::default().with_overrides(None, Some(1234), None);
        assert_eq!(*config.port(), 1234);
        assert_eq!(config.database_url(), "scoreboard.db");
    }
}
