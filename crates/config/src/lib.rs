//! Configuration management for the Mayan Medicine Guide
//!
//! Loads and saves provider credentials, guide tuning and the content file
//! location from a JSON file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod paths;

pub use paths::{config_path, content_path, data_dir, expand_home};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

/// Credentials for one chat-completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

/// Supported endpoints
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openrouter: ProviderConfig,
    #[serde(default)]
    pub openai: ProviderConfig,
}

/// Tuning for the query-answering agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_iterations")]
    pub max_tool_iterations: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Request JSON-object responses from the endpoint
    #[serde(default)]
    pub json_mode: bool,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_tool_iterations: default_max_iterations(),
            timeout_secs: default_timeout_secs(),
            json_mode: false,
        }
    }
}

fn default_model() -> String {
    "google/gemini-2.0-flash-001".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.4
}

fn default_max_iterations() -> u32 {
    20
}

fn default_timeout_secs() -> u64 {
    60
}

/// Where plants and articles are read from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_content_path")]
    pub path: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            path: default_content_path(),
        }
    }
}

fn default_content_path() -> String {
    "~/.mayaguide/content.json".to_string()
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub guide: GuideConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

impl Config {
    /// Load from the default location
    pub async fn load() -> Result<Self> {
        let path = config_path();
        Self::load_from(&path).await
    }

    /// Load from a specific location, falling back to defaults when absent
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no config at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        debug!("loading config from {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every query fail
    pub fn validate(&self) -> Result<()> {
        if self.guide.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "guide.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.guide.max_tool_iterations == 0 {
            return Err(ConfigError::Invalid(
                "guide.max_tool_iterations must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Save to the default location
    pub async fn save(&self) -> Result<()> {
        let path = config_path();
        self.save_to(&path).await
    }

    /// Save to a specific location
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        debug!("saving config to {:?}", path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Resolved content file path
    pub fn content_path(&self) -> PathBuf {
        expand_home(&self.content.path)
    }

    /// First configured API key, OpenRouter preferred
    pub fn api_key(&self) -> Option<String> {
        [&self.providers.openrouter, &self.providers.openai]
            .into_iter()
            .map(|p| p.api_key.clone())
            .find(|key| !key.is_empty())
    }

    /// API base matching the key returned by [`Config::api_key`]
    pub fn api_base(&self) -> Option<String> {
        if !self.providers.openrouter.api_key.is_empty() {
            return self
                .providers
                .openrouter
                .api_base
                .clone()
                .or_else(|| Some(OPENROUTER_API_BASE.to_string()));
        }

        self.providers
            .openai
            .api_base
            .clone()
            .filter(|base| !base.is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn default_model(&self) -> String {
        self.guide.model.clone()
    }

    /// Upper bound for one answer, tool calls included
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.guide.timeout_secs)
    }
}

/// Create the data directory and a default config if none exists
pub async fn init() -> Result<Config> {
    let config_path = config_path();

    if config_path.exists() {
        warn!("config already exists at {:?}", config_path);
    } else {
        let config = Config::default();
        config.save().await?;
        info!("created config at {:?}", config_path);
    }

    tokio::fs::create_dir_all(data_dir()).await?;

    Config::load().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_from_secs() {
        let mut config = Config::default();
        config.guide.timeout_secs = 5;
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_api_base_requires_openai_base() {
        let mut config = Config::default();
        config.providers.openai.api_key = "sk-test".to_string();
        assert_eq!(config.api_base(), None);

        config.providers.openai.api_base = Some(String::new());
        assert_eq!(config.api_base(), None);

        config.providers.openai.api_base = Some("http://localhost:8000/v1".to_string());
        assert_eq!(config.api_base().as_deref(), Some("http://localhost:8000/v1"));
    }
}
