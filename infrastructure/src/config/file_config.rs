//! Raw TOML configuration data types
//!
//! These structs mirror the config file layout and are converted into the
//! application's runtime settings after validation.

use crate::ollama::{DEFAULT_OLLAMA_URL, OllamaSettings};
use chat_application::ChatConfig;
use chat_domain::{DEFAULT_MODEL_ID, ModelId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default address the web server listens on
pub const DEFAULT_WEB_HOST: &str = "0.0.0.0";
/// Default port the web server listens on
pub const DEFAULT_WEB_PORT: u16 = 5555;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("server.url cannot be empty")]
    EmptyServerUrl,

    #[error("server.url must start with http:// or https://, got '{0}'")]
    InvalidServerUrl(String),

    #[error("server.connect_timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("chat.{field}: model name cannot be empty")]
    EmptyModelName { field: &'static str },

    #[error("web.port cannot be 0")]
    InvalidPort,
}

/// Ollama server connection (`[server]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Base URL of the Ollama HTTP API
    pub url: String,
    /// Seconds allowed to establish a connection
    pub connect_timeout_seconds: Option<u64>,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OLLAMA_URL.to_string(),
            connect_timeout_seconds: Some(10),
        }
    }
}

/// Model selection (`[chat]` section)
///
/// ```toml
/// [chat]
/// default_model = "llama3.2:1b"    # preselected in the page
/// fallback_model = "llama3.2:1b"   # downloaded when a model is missing
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    pub default_model: String,
    pub fallback_model: String,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL_ID.to_string(),
            fallback_model: DEFAULT_MODEL_ID.to_string(),
        }
    }
}

/// Web server binding (`[web]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWebConfig {
    pub host: String,
    pub port: u16,
}

impl Default for FileWebConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_WEB_HOST.to_string(),
            port: DEFAULT_WEB_PORT,
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: FileServerConfig,
    pub chat: FileChatConfig,
    pub web: FileWebConfig,
}

impl FileConfig {
    /// Check the configuration, stopping at the first problem found
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let url = self.server.url.trim();
        if url.is_empty() {
            return Err(ConfigValidationError::EmptyServerUrl);
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigValidationError::InvalidServerUrl(url.to_string()));
        }

        if let Some(0) = self.server.connect_timeout_seconds {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        if self.chat.default_model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName {
                field: "default_model",
            });
        }
        if self.chat.fallback_model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName {
                field: "fallback_model",
            });
        }

        if self.web.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        Ok(())
    }

    /// Build the chat settings; call [`validate`](Self::validate) first
    pub fn to_chat_config(&self) -> Result<ChatConfig, ConfigValidationError> {
        let default_model =
            ModelId::new(&self.chat.default_model).map_err(|_| {
                ConfigValidationError::EmptyModelName {
                    field: "default_model",
                }
            })?;
        let fallback_model =
            ModelId::new(&self.chat.fallback_model).map_err(|_| {
                ConfigValidationError::EmptyModelName {
                    field: "fallback_model",
                }
            })?;

        Ok(ChatConfig::default()
            .with_default_model(default_model)
            .with_fallback_model(fallback_model))
    }

    pub fn ollama_settings(&self) -> OllamaSettings {
        OllamaSettings {
            base_url: self.server.url.trim().to_string(),
            connect_timeout: self.server.connect_timeout_seconds.map(Duration::from_secs),
        }
    }

    /// Effective configuration as TOML (for --show-config)
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// `host:port` the web server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.web.host, self.web.port)
    }
}
