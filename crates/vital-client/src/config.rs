//! Client configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. Command-line flags override what is loaded here.
//!
//! | Variable             | Default                      |
//! |----------------------|------------------------------|
//! | `VITAL_API_URL`      | `http://localhost:8000/api`  |
//! | `VITAL_SESSION_PATH` | platform data dir            |
//! | `VITAL_REQUEST_LOG`  | `false`                      |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Backend base URL used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub api_url: String,

    /// Session file override; `None` means the platform data directory.
    pub session_path: Option<PathBuf>,

    /// Log every request at info level instead of debug.
    pub log_requests: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: DEFAULT_API_URL.to_string(),
            session_path: None,
            log_requests: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = match lookup("VITAL_API_URL") {
            Some(url) => normalize_api_url(&url)?,
            None => DEFAULT_API_URL.to_string(),
        };

        let session_path = lookup("VITAL_SESSION_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let log_requests = match lookup("VITAL_REQUEST_LOG") {
            Some(value) => parse_flag("VITAL_REQUEST_LOG", &value)?,
            None => false,
        };

        Ok(ClientConfig {
            api_url,
            session_path,
            log_requests,
        })
    }

    /// Replaces the backend URL (e.g. from a command-line flag).
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_url = normalize_api_url(url)?;
        Ok(self)
    }

    /// Replaces the session file location.
    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }
}

/// Checks the scheme and strips trailing slashes.
pub fn normalize_api_url(url: &str) -> Result<String, ConfigError> {
    let url = url.trim().trim_end_matches('/');

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidValue {
            key: "VITAL_API_URL".to_string(),
            value: url.to_string(),
        });
    }

    Ok(url.to_string())
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Configuration error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}
