//! Relay settings loaded from a TOML file
//!
//! Every table is optional; missing keys keep the built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::Config;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub upstream: UpstreamSection,

    #[serde(default)]
    pub history: HistorySection,
}

/// Listener settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,
}

/// Remote endpoint settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamSection {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub default_model: Option<String>,

    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Conversation retention settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistorySection {
    #[serde(default)]
    pub max_conversations: Option<usize>,

    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub(super) fn apply(self, config: &mut Config) {
        if let Some(host) = self.server.host {
            config.host = host;
        }
        if let Some(port) = self.server.port {
            config.port = port;
        }
        if let Some(url) = self.upstream.url {
            config.upstream_url = url;
        }
        if let Some(model) = self.upstream.default_model {
            config.default_model = model;
        }
        if let Some(secs) = self.upstream.timeout_secs {
            config.timeout_secs = secs;
        }
        if let Some(max) = self.history.max_conversations {
            config.max_conversations = max;
        }
        if let Some(ttl) = self.history.ttl_secs {
            config.conversation_ttl_secs = ttl;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
