//! Application configuration

pub mod file;

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use file::{ConfigError, FileConfig};

pub const DEFAULT_UPSTREAM_URL: &str = "https://www.blackbox.ai/api/chat";
pub const DEFAULT_MODEL: &str = "blackboxai";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Remote chat endpoint every relay call is posted to
    pub upstream_url: String,
    /// Model used when a request does not name one
    pub default_model: String,
    /// Outbound request timeout in seconds, 0 disables it
    pub timeout_secs: u64,
    /// Maximum live conversations, 0 means unbounded
    pub max_conversations: usize,
    /// Idle lifetime of a conversation in seconds, 0 means no expiry
    pub conversation_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            upstream_url: DEFAULT_UPSTREAM_URL.into(),
            default_model: DEFAULT_MODEL.into(),
            timeout_secs: 60,
            max_conversations: 10_000,
            conversation_ttl_secs: 0,
        }
    }
}

impl Config {
    /// Load from the optional TOML file named by `BLACKBOX_RELAY_CONFIG`,
    /// then apply environment overrides.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::from_lookup(|key| env::var(key).ok())?)
    }

    /// Same as [`Config::from_env`], reading variables through `var`
    pub fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match var("BLACKBOX_RELAY_CONFIG") {
            Some(path) => Some(FileConfig::from_file(Path::new(&path))?),
            None => None,
        };

        Ok(Self::from_sources(file, var))
    }

    /// Merge a file config and a variable lookup over the defaults.
    /// Unparsable numeric values are ignored.
    pub fn from_sources<F>(file: Option<FileConfig>, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(file) = file {
            file.apply(&mut config);
        }

        if let Some(host) = var("HOST") {
            config.host = host;
        }
        if let Some(port) = var("PORT").and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        if let Some(url) = var("BLACKBOX_API_URL") {
            config.upstream_url = url;
        }
        if let Some(model) = var("BLACKBOX_DEFAULT_MODEL").filter(|m| !m.is_empty()) {
            config.default_model = model;
        }
        if let Some(secs) = var("BLACKBOX_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            config.timeout_secs = secs;
        }
        if let Some(max) = var("BLACKBOX_MAX_CONVERSATIONS").and_then(|s| s.parse().ok()) {
            config.max_conversations = max;
        }
        if let Some(ttl) = var("BLACKBOX_CONVERSATION_TTL_SECS").and_then(|s| s.parse().ok()) {
            config.conversation_ttl_secs = ttl;
        }

        config
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn conversation_ttl(&self) -> Option<Duration> {
        (self.conversation_ttl_secs > 0).then(|| Duration::from_secs(self.conversation_ttl_secs))
    }

    pub fn conversation_limit(&self) -> Option<usize> {
        (self.max_conversations > 0).then_some(self.max_conversations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_sources(None, lookup(&[]));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.upstream_url, DEFAULT_UPSTREAM_URL);
        assert_eq!(config.default_model, "blackboxai");
        assert_eq!(config.timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.conversation_ttl(), None);
    }

    #[test]
    fn test_host_override() {
        let config = Config::from_sources(None, lookup(&[("HOST", "127.0.0.1")]));
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_port_from_env() {
        let config = Config::from_sources(None, lookup(&[("PORT", "8080")]));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_bad_port_falls_back() {
        let config = Config::from_sources(None, lookup(&[("PORT", "not-a-port")]));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = FileConfig::from_str(
            r#"
[server]
port = 4000

[upstream]
default_model = "gpt-4o"
"#,
        )
        .unwrap();

        let config = Config::from_sources(
            Some(file),
            lookup(&[("PORT", "5000"), ("BLACKBOX_MAX_CONVERSATIONS", "0")]),
        );
        assert_eq!(config.port, 5000);
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.conversation_limit(), None);
    }

    #[test]
    fn test_zero_timeout_disables() {
        let config = Config::from_sources(None, lookup(&[("BLACKBOX_TIMEOUT_SECS", "0")]));
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_config_file_from_lookup() {
        let path = std::env::temp_dir().join(format!(
            "blackbox-relay-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[upstream]\ndefault_model = \"gpt-4o\"\n\n[history]\nttl_secs = 600\n",
        )
        .unwrap();

        let path_str = path.to_string_lossy().into_owned();
        let config = Config::from_lookup(lookup(&[
            ("BLACKBOX_RELAY_CONFIG", path_str.as_str()),
            ("BLACKBOX_DEFAULT_MODEL", "claude-sonnet"),
        ]))
        .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.default_model, "claude-sonnet");
        assert_eq!(config.conversation_ttl(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_missing_config_file() {
        let err = Config::from_lookup(lookup(&[(
            "BLACKBOX_RELAY_CONFIG",
            "/nonexistent/blackbox-relay.toml",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
