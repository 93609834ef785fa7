use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level calculator configuration, read from YAML.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct CalcConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

/// Where the daemon listens.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    /// Interface to bind. Default: 127.0.0.1
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind. 0 picks a free port. Default: 0
    #[serde(default)]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 0,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// How clients connect and how long they wait for replies.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ClientConfig {
    /// Maximum connection attempts with exponential backoff. Default: 5
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,
    /// Base delay for the backoff, in milliseconds. Default: 100
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Deadline for a single call, in milliseconds. A delayed pop gets its
    /// requested delay on top of this. Default: 10000
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_attempts: default_connect_attempts(),
            base_delay_ms: default_base_delay_ms(),
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

fn default_connect_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    100
}

fn default_call_timeout_ms() -> u64 {
    10_000
}

impl CalcConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file as YAML: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads an explicit config file, or the default one under the calculator
    /// home if it exists, or falls back to built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default_path = crate::calc_paths::config_path()?;
        if default_path.exists() {
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.client.connect_attempts == 0 {
            anyhow::bail!("client.connect_attempts must be at least 1");
        }
        if self.client.call_timeout_ms == 0 {
            anyhow::bail!("client.call_timeout_ms must be greater than 0");
        }
        Ok(())
    }
}
