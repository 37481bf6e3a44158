//! turnstile.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_COUNTER_NAME: &str = "global";
pub const DEFAULT_MESSAGE: &str = "Hola, quiero más información";
pub const DEFAULT_COUNTER_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnstileConfig {
    pub routing: RoutingConfig,
    pub content: Option<ContentConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Destination identifiers in rotation order.
    pub channels: Vec<String>,
    #[serde(default = "default_message")]
    pub default_message: String,
    #[serde(default = "default_counter_name")]
    pub counter_name: String,
    #[serde(default = "default_counter_timeout_ms")]
    pub counter_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// JSON array of content records.
    pub corpus_path: PathBuf,
}

fn default_message() -> String {
    DEFAULT_MESSAGE.to_string()
}

fn default_counter_name() -> String {
    DEFAULT_COUNTER_NAME.to_string()
}

fn default_counter_timeout_ms() -> u64 {
    DEFAULT_COUNTER_TIMEOUT_MS
}

impl RoutingConfig {
    pub fn counter_timeout(&self) -> Duration {
        Duration::from_millis(self.counter_timeout_ms)
    }
}

impl TurnstileConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        // Relative corpus paths resolve against the config file's directory.
        if let (Some(content), Some(base)) = (config.content.as_mut(), path.parent()) {
            if content.corpus_path.is_relative() {
                content.corpus_path = base.join(&content.corpus_path);
            }
        }
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: TurnstileConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the invariants the router relies on for the process lifetime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let routing = &self.routing;
        if routing.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }
        if let Some(idx) = routing.channels.iter().position(|c| c.trim().is_empty()) {
            return Err(ConfigError::BlankChannel(idx));
        }
        if routing.counter_name.trim().is_empty() {
            return Err(ConfigError::EmptyCounterName);
        }
        if routing.counter_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_applies_defaults() {
        let toml_str = r#"
[routing]
channels = ["+5215512345678", "+5215587654321"]
"#;
        let config = TurnstileConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.routing.channels.len(), 2);
        assert_eq!(config.routing.counter_name, "global");
        assert_eq!(config.routing.default_message, DEFAULT_MESSAGE);
        assert_eq!(config.routing.counter_timeout(), Duration::from_secs(2));
        assert!(config.content.is_none());
    }

    #[test]
    fn parse_full() {
        let toml_str = r#"
[routing]
channels = ["111"]
default_message = "hi"
counter_name = "whatsapp"
counter_timeout_ms = 250

[content]
corpus_path = "/srv/verses.json"
"#;
        let config = TurnstileConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.routing.counter_name, "whatsapp");
        assert_eq!(config.routing.counter_timeout(), Duration::from_millis(250));
        assert_eq!(
            config.content.unwrap().corpus_path,
            PathBuf::from("/srv/verses.json")
        );
    }

    #[test]
    fn empty_channel_list_is_rejected() {
        let err = TurnstileConfig::from_toml_str("[routing]\nchannels = []\n").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::NoChannels)
        );
    }

    #[test]
    fn blank_channel_is_rejected() {
        let err =
            TurnstileConfig::from_toml_str("[routing]\nchannels = [\"1\", \"  \"]\n").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::BlankChannel(1))
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let toml_str = "[routing]\nchannels = [\"1\"]\ncounter_timeout_ms = 0\n";
        let err = TurnstileConfig::from_toml_str(toml_str).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::ZeroTimeout)
        );
    }

    #[test]
    fn relative_corpus_path_resolves_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("turnstile.toml");
        std::fs::write(
            &path,
            "[routing]\nchannels = [\"1\"]\n\n[content]\ncorpus_path = \"verses.json\"\n",
        )
        .unwrap();

        let config = TurnstileConfig::from_file(&path).unwrap();
        assert_eq!(
            config.content.unwrap().corpus_path,
            dir.path().join("verses.json")
        );
    }

    #[test]
    fn toml_roundtrip_keeps_channels() {
        let config = TurnstileConfig::from_toml_str("[routing]\nchannels = [\"a\", \"b\"]\n").unwrap();
        let rendered = config.to_toml_string().unwrap();
        let reparsed = TurnstileConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(reparsed.routing.channels, vec!["a", "b"]);
    }
}
