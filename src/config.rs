use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::classifier::ClassifierSettings;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub dialogue: DialogueConfig,
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
}

/// Dialogue data configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DialogueConfig {
    /// Directory holding `conversation{key}.json` and `persona{key}.txt`.
    pub data_dir: PathBuf,
    #[serde(default = "default_characters")]
    pub characters: Vec<String>,
    #[serde(default = "default_character")]
    pub default_character: String,
    /// Reject unknown character keys instead of falling back to the default.
    #[serde(default)]
    pub strict_character_keys: bool,
    /// 0 keeps the re-read-on-every-call behaviour.
    #[serde(default)]
    pub graph_cache_capacity: usize,
}

fn default_characters() -> Vec<String> {
    vec!["1".to_string(), "2".to_string()]
}

fn default_character() -> String {
    "1".to_string()
}

/// Classifier endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_agent_id_env")]
    pub agent_id_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.mistral.ai".to_string()
}

fn default_api_key_env() -> String {
    "MISTRAL_API_KEY".to_string()
}

fn default_agent_id_env() -> String {
    "MISTRAL_AGENT_INTENT_CLASSIFIER".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in NPC_DIALOGUE_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        let config = Self::load_offline()?;
        config.classifier_settings()?;
        Ok(config)
    }

    /// Load configuration without requiring classifier credentials
    ///
    /// Used by commands that only read dialogue data.
    pub fn load_offline() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("NPC_DIALOGUE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        Self::from_toml_str(&config_str)
    }

    /// Parse and validate configuration without touching the environment
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("Failed to parse config.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if !self.dialogue.data_dir.is_dir() {
            anyhow::bail!(
                "data_dir must be an existing directory: {}. Set data_dir in config.toml to your dialogue data.",
                self.dialogue.data_dir.display()
            );
        }

        if self.dialogue.characters.is_empty() {
            anyhow::bail!("dialogue.characters must list at least one character key");
        }

        if !self.dialogue.characters.contains(&self.dialogue.default_character) {
            anyhow::bail!(
                "dialogue.default_character '{}' is not listed in dialogue.characters",
                self.dialogue.default_character
            );
        }

        if self.classifier.timeout_secs == 0 {
            anyhow::bail!("classifier.timeout_secs must be greater than 0");
        }

        Ok(())
    }

    /// Build classifier settings, reading the key and agent id once from the environment
    pub fn classifier_settings(&self) -> Result<ClassifierSettings> {
        let api_key = required_env(&self.classifier.api_key_env)?;
        let agent_id = required_env(&self.classifier.agent_id_env)?;

        Ok(ClassifierSettings {
            base_url: self.classifier.base_url.trim_end_matches('/').to_string(),
            api_key,
            agent_id,
            timeout: Duration::from_secs(self.classifier.timeout_secs),
        })
    }

    /// Get the dialogue data directory
    pub fn data_dir(&self) -> &Path {
        &self.dialogue.data_dir
    }
}

fn required_env(var: &str) -> Result<String> {
    std::env::var(var).with_context(|| {
        format!(
            "Environment variable {} not set. Set it in your .env file or as an environment variable.",
            var
        )
    })
}
