//! Client configuration file handling
//!
//! Loads and saves ~/.config/currencycloud/config.yaml. Secrets never live in
//! the file itself: it names the environment variables that hold them.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which Currencycloud deployment to talk to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Production,
    /// Sandbox with test money
    #[default]
    Demonstration,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://api.currencycloud.com",
            Environment::Demonstration => "https://devapi.currencycloud.com",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "demonstration" | "demo" | "sandbox" => Ok(Environment::Demonstration),
            other => Err(format!("unknown environment: {}", other)),
        }
    }
}

fn default_api_key_env() -> String {
    "CURRENCYCLOUD_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub environment: Environment,

    /// Overrides the environment's base URL (proxies, mock servers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Login id (usually an email address) used with the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_id: Option<String>,

    /// Environment variable holding the API key (a leading `$` is ignored)
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Environment variable holding an already-issued auth token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token_env: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            base_url: None,
            login_id: None,
            api_key_env: default_api_key_env(),
            auth_token_env: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Load configuration from the default path (~/.config/currencycloud/config.yaml)
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        Self::load(&path)
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading client configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(
            environment = ?config.environment,
            base_url = %config.base_url(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a specific path, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving client configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/currencycloud/config.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("currencycloud");
        path.push("config.yaml");
        path
    }

    /// Effective base URL: the override if set, else the environment's
    pub fn base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API key read from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        read_env(&self.api_key_env)
    }

    /// Pre-issued auth token read from the configured environment variable
    pub fn auth_token(&self) -> Option<String> {
        self.auth_token_env.as_deref().and_then(read_env)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name.trim_start_matches('$'))
        .ok()
        .filter(|v| !v.trim().is_empty())
}
