//! Configuration for the companion client.
//!
//! The backend URL is resolved once at startup (file, then environment,
//! then command line) and injected into the reply client. It never changes
//! while the client runs.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Backend used when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "https://sentinel-ai-6czp.onrender.com";

/// Environment variable that overrides the configured backend URL.
pub const BACKEND_URL_ENV: &str = "COMPANION_BACKEND_URL";

/// Main configuration for companion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the reply service; `/chat` is appended.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Transport timeout for a single reply request. `None` waits
    /// indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.into()
}

fn non_blank(url: Option<&str>) -> Option<&str> {
    url.map(str::trim).filter(|u| !u.is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Default config file location (`~/.config/companion/config.json`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("companion").join("config.json"))
    }

    /// Resolve the effective configuration from the process environment.
    ///
    /// An explicit path must exist; the default path is only read if present.
    /// `flag_url` is the command-line override and wins over everything.
    pub fn resolve(
        explicit_path: Option<&Path>,
        flag_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let env_url = std::env::var(BACKEND_URL_ENV).ok();
        Self::resolve_from(
            explicit_path,
            Self::default_path().as_deref(),
            env_url.as_deref(),
            flag_url,
        )
    }

    /// Resolve configuration from explicit inputs.
    ///
    /// Only the final backend URL is validated, so a bad environment value
    /// does not matter when the flag replaces it.
    pub fn resolve_from(
        explicit_path: Option<&Path>,
        default_path: Option<&Path>,
        env_url: Option<&str>,
        flag_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut config = match (explicit_path, default_path) {
            (Some(path), _) => Self::load(path)?,
            (None, Some(path)) if path.exists() => Self::load(path)?,
            _ => Self::default(),
        };

        if let Some(url) = non_blank(env_url) {
            tracing::debug!(%url, "backend URL overridden from {BACKEND_URL_ENV}");
            config.backend_url = url.to_string();
        }
        if let Some(url) = non_blank(flag_url) {
            tracing::debug!(%url, "backend URL overridden from the command line");
            config.backend_url = url.to_string();
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the backend URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.backend_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {e}", self.backend_url)))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "{}: expected an http(s) URL",
                self.backend_url
            )));
        }
        Ok(())
    }

    /// Full URL of the chat endpoint.
    pub fn chat_endpoint(&self) -> String {
        format!("{}/chat", self.backend_url.trim_end_matches('/'))
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Backend URL is not usable.
    #[error("Invalid backend URL {0}")]
    InvalidUrl(String),
}
