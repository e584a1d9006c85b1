//! Client configuration for the TalkFlow backend connection.

use crate::error::{ClientError, Result};
use crate::types::SessionParams;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,
    /// Readiness probe settings.
    pub health: HealthConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            health: HealthConfig::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_owned()
}

/// Readiness probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Interval between liveness checks while the backend is not yet ready.
    pub poll_interval_ms: u64,
    /// Per-request timeout for the liveness check.
    pub request_timeout_ms: u64,
    /// How long a front end waits before showing the not-ready banner.
    ///
    /// This is a presentation timer, independent of the probe itself.
    pub banner_delay_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 3_000,
            request_timeout_ms: 5_000,
            banner_delay_ms: 5_000,
        }
    }
}

impl HealthConfig {
    /// Poll interval as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Banner delay as a [`Duration`].
    #[must_use]
    pub fn banner_delay(&self) -> Duration {
        Duration::from_millis(self.banner_delay_ms)
    }
}

impl ClientConfig {
    /// Load configuration: the config file when present, defaults otherwise,
    /// with the `TALKFLOW_API_URL` environment variable overriding `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing config file cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::default_config_path();
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        if let Ok(url) = std::env::var("TALKFLOW_API_URL")
            && !url.trim().is_empty()
        {
            config.base_url = url.trim().trim_end_matches('/').to_owned();
        }
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ClientError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/talkflow/config.toml`.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp/talkflow-config"))
            .join("talkflow")
            .join("config.toml")
    }

    /// Liveness check endpoint.
    #[must_use]
    pub fn health_url(&self) -> String {
        format!("{}/health", self.base())
    }

    /// Document upload endpoint.
    #[must_use]
    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.base())
    }

    /// Assistant stream endpoint for one turn.
    #[must_use]
    pub fn stream_url(&self, text: &str, params: &SessionParams) -> String {
        format!(
            "{}/stream?q={}&session_id={}&personality={}&lang={}",
            self.base(),
            urlencoding::encode(text),
            urlencoding::encode(&params.session_id),
            params.personality.as_str(),
            params.language.as_str(),
        )
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
