use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::target::DEFAULT_ADDRESS;

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "logstream.toml";

/// Line shown as soon as a new session is started
pub const DEFAULT_STATUS_LINE: &str = "starting logs...";

/// Server configuration
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Log source address, `host:port` or a `ws://` base URL
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
        }
    }
}

/// Stream presentation settings
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    /// Resource to follow when none is given on the command line
    pub resource_id: Option<String>,

    /// Status line appended after the sink is cleared
    pub status_line: String,

    /// Whether transport errors are shown inline as `ERROR: ` lines
    pub show_errors: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            resource_id: None,
            status_line: DEFAULT_STATUS_LINE.to_string(),
            show_errors: true,
        }
    }
}

/// Main configuration structure
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Stream configuration
    pub stream: StreamConfig,
}

impl Config {
    /// Load configuration from file or use default values
    pub fn load(config_path: Option<String>) -> Result<Self> {
        match config_path {
            Some(path) => Self::from_file(&path),
            None => {
                if Path::new(DEFAULT_CONFIG_FILE).exists() {
                    Self::from_file(DEFAULT_CONFIG_FILE)
                } else {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self> {
        tracing::info!("Loading configuration from file: {}", path);

        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_string()),
            _ => Error::Io(e),
        })?;

        let config = Self::parse(&content)?;

        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn empty_document_yields_defaults() {
        let config = assert_ok!(Config::parse(""));
        assert_eq!(config, Config::default());
        assert_eq!(config.server.address, "127.0.0.1:8080");
        assert_eq!(config.stream.status_line, "starting logs...");
        assert!(config.stream.show_errors);
        assert_eq!(config.stream.resource_id, None);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = assert_ok!(Config::parse(
            r#"
            [server]
            address = "logs.internal:9000"

            [stream]
            resource_id = "task-foo"
            show_errors = false
            "#,
        ));
        assert_eq!(config.server.address, "logs.internal:9000");
        assert_eq!(config.stream.resource_id.as_deref(), Some("task-foo"));
        assert!(!config.stream.show_errors);
        assert_eq!(config.stream.status_line, DEFAULT_STATUS_LINE);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = assert_err!(Config::parse("[server\naddress = 1"));
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn explicit_missing_file_is_reported() {
        let err = assert_err!(Config::load(Some(
            "/nonexistent/logstream-test/config.toml".to_string()
        )));
        assert!(matches!(err, Error::FileNotFound(path) if path.ends_with("config.toml")));
    }
}
