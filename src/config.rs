//! Chat client configuration
//!
//! Loaded from YAML, then overridden from the environment:
//!
//! ```yaml
//! url: wss://chat.reasonable.systems/house.chat
//! reconnect_delay_ms: 1500
//! debug: false
//! log_level: info
//! ```

use peerlink::states::HasUrl;
use peerlink::{ChatClient, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Relay used when nothing else is configured
pub const DEFAULT_URL: &str = "wss://chat.reasonable.systems/house.chat";

/// Overrides `url`
pub const URL_ENV: &str = "HOUSE_CHAT_URL";

/// Overrides `debug`
pub const DEBUG_ENV: &str = "HOUSE_CHAT_DEBUG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Relay endpoint (ws:// or wss://)
    #[serde(default = "default_url")]
    pub url: String,
    /// Fixed wait between reconnect attempts
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Protocol-level debug logging
    #[serde(default)]
    pub debug: bool,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    1500
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            debug: false,
            log_level: default_log_level(),
        }
    }
}

impl ChatConfig {
    /// Load configuration from a YAML file, falling back to defaults when it
    /// does not exist, then apply environment overrides and validate
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let path = config_path.as_ref();

        let mut config = if path.exists() {
            let yaml_content = std::fs::read_to_string(path)?;
            Self::from_yaml(&yaml_content)?
        } else {
            info!("No config at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parse without overrides or validation
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as null
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply `HOUSE_CHAT_URL` / `HOUSE_CHAT_DEBUG` from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(URL_ENV) {
            info!("Overriding url from environment variable");
            self.url = url;
        }

        if let Some(debug) = lookup(DEBUG_ENV) {
            self.debug = matches!(
                debug.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(ConfigError::ValidationError(format!(
                "url must start with ws:// or wss://, got '{}'",
                self.url
            )));
        }

        if self.reconnect_delay_ms == 0 {
            return Err(ConfigError::ValidationError(
                "reconnect_delay_ms must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Client builder preloaded with this configuration
    pub fn client_builder(&self) -> ClientBuilder<HasUrl> {
        ChatClient::builder()
            .url(self.url.clone())
            .reconnect_delay(self.reconnect_delay())
            .debug(self.debug)
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  Url: {}", self.url);
        info!("  Reconnect delay: {} ms", self.reconnect_delay_ms);
        info!("  Debug: {}", self.debug);
        info!("  Log level: {}", self.log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.reconnect_delay(), Duration::from_millis(1500));
        assert!(!config.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = ChatConfig::from_yaml("debug: true\n").unwrap();
        assert!(config.debug);
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.reconnect_delay_ms, 1500);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(ChatConfig::from_yaml("  \n").unwrap(), ChatConfig::default());
    }

    #[test]
    fn test_overrides() {
        let mut config = ChatConfig::default();
        config.apply_overrides(env(&[
            (URL_ENV, "ws://localhost:9000/room"),
            (DEBUG_ENV, "TRUE"),
        ]));
        assert_eq!(config.url, "ws://localhost:9000/room");
        assert!(config.debug);

        config.apply_overrides(env(&[(DEBUG_ENV, "0")]));
        assert!(!config.debug);
        assert_eq!(config.url, "ws://localhost:9000/room");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_scheme = ChatConfig {
            url: "http://chat.example.com".into(),
            ..ChatConfig::default()
        };
        assert!(matches!(
            bad_scheme.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let zero_delay = ChatConfig {
            reconnect_delay_ms: 0,
            ..ChatConfig::default()
        };
        assert!(zero_delay.validate().is_err());

        let bad_level = ChatConfig {
            log_level: "loud".into(),
            ..ChatConfig::default()
        };
        assert!(bad_level.validate().is_err());
    }
}
