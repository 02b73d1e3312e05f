use std::path::PathBuf;
use std::time::Duration;

use eyre::{Result, bail};
use log::debug;
use serde::Deserialize;

pub const API_KEY_ENV: &str = "GENAI_API_KEY";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_LANG: &str = "en";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Optional settings from ~/.config/ytsum/config.toml
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model: Option<String>,
    pub lang: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load config from ~/.config/ytsum/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytsum")
        .join("config.toml")
}

/// Command-line values; each one beats the config file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model: Option<String>,
    pub lang: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Settings fixed at startup and handed to every collaborator
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub model: String,
    pub lang: String,
    pub request_timeout: Duration,
    pub api_key: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("model", &self.model)
            .field("lang", &self.lang)
            .field("request_timeout", &self.request_timeout)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl AppConfig {
    pub fn resolve(overrides: Overrides, file: Config, api_key: Option<String>) -> Result<Self> {
        let api_key = match api_key.map(|k| k.trim().to_string()) {
            Some(k) if !k.is_empty() => k,
            _ => bail!("{API_KEY_ENV} environment variable not set (required for summarization)"),
        };

        let timeout_secs = overrides
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            bail!("timeout must be at least one second");
        }

        Ok(Self {
            host: overrides.host.or(file.host).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            model: overrides.model.or(file.model).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            lang: overrides.lang.or(file.lang).unwrap_or_else(|| DEFAULT_LANG.to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
            api_key,
        })
    }
}
