//! CLI utilities for binaries
//!
//! Handles configuration loading and environment variables
//! for the listener binary.

use eventsub::{ClientConfig, EventSubError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Type of configuration to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Listener configuration (config/eventsub.yaml)
    Listener,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Listener => "config/eventsub.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Get the environment variable name for this config type
    pub fn env_var_name(&self) -> &str {
        match self {
            ConfigType::Listener => "EVENTSUB_CONFIG_PATH",
            ConfigType::Custom(_) => "EVENTSUB_CONFIG_PATH",
        }
    }
}

/// Load configuration path from environment or use default
///
/// A custom path always wins over the environment.
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    if let ConfigType::Custom(path) = &config_type {
        return path.into();
    }

    std::env::var(config_type.env_var_name())
        .unwrap_or_else(|_| config_type.default_path().to_string())
        .into()
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Client(#[from] EventSubError),
}

/// Listener binary configuration
///
/// ```yaml
/// log_level: info
/// client:
///   url: wss://eventsub.wss.twitch.tv/ws
///   reconnect_welcome_timeout: 10
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    pub client: ClientConfig,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            client: ClientConfig::default(),
        }
    }
}

impl ListenerConfig {
    /// Load from YAML, then apply environment overrides
    ///
    /// A missing file means defaults; an unreadable or malformed one is an
    /// error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();

        let config = match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_yaml(&contents).map_err(|source| ConfigError::Parse {
                path: display,
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(source) => return Err(ConfigError::Io { path: display, source }),
        };

        let client = config.client.merge_env()?;

        Ok(Self { client, ..config })
    }

    fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to null, treat it as an empty mapping
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_type_paths() {
        assert_eq!(ConfigType::Listener.default_path(), "config/eventsub.yaml");

        let custom = ConfigType::Custom("custom/path.yaml".to_string());
        assert_eq!(custom.default_path(), "custom/path.yaml");
    }

    #[test]
    fn test_config_type_env_vars() {
        assert_eq!(ConfigType::Listener.env_var_name(), "EVENTSUB_CONFIG_PATH");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ListenerConfig::from_yaml("log_level: debug\n").unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.client.url, eventsub::config::DEFAULT_URL);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = ListenerConfig::from_yaml("  \n").unwrap();
        assert_eq!(config.log_level, "info");
    }
}
