use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::language::Language;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    pub language: Language,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub picture_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            language: Language::default(),
            poll_interval_ms: 3000,
            request_timeout_secs: 30,
            picture_dir: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved settings overlaid with environment overrides.
    pub fn resolve() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load().unwrap_or_else(|e| {
            tracing::warn!("ignoring unreadable config: {}", e);
            Self::new()
        });
        config.apply_env()?;
        Ok(config)
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall polling or time out every request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "poll_interval_ms".to_string(),
                self.poll_interval_ms.to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "request_timeout_secs".to_string(),
                self.request_timeout_secs.to_string(),
            ));
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Remember the picked language as the next session's default.
    pub fn save_language(language: Language) -> Result<()> {
        Self::save_language_to(&Self::config_path()?, language)
    }

    /// Update only the language in the file at `path`, keeping other settings.
    pub fn save_language_to(path: &Path, language: Language) -> Result<()> {
        let mut config = Self::load_from(path).unwrap_or_else(|_| Self::new());
        config.language = language;
        config.save_to(path)
    }

    /// Apply `AKSHARA_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = std::env::var("AKSHARA_BACKEND_URL") {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue("AKSHARA_BACKEND_URL".to_string(), url));
            }
            self.backend_url = url;
        }

        if let Ok(value) = std::env::var("AKSHARA_LANGUAGE") {
            self.language = Language::from_str(&value)
                .ok_or_else(|| ConfigError::InvalidValue("AKSHARA_LANGUAGE".to_string(), value.clone()))?;
        }

        if let Some(ms) = env_u64("AKSHARA_POLL_INTERVAL_MS")? {
            self.poll_interval_ms = ms;
        }

        if let Some(secs) = env_u64("AKSHARA_REQUEST_TIMEOUT_SECS")? {
            self.request_timeout_secs = secs;
        }

        if let Ok(dir) = std::env::var("AKSHARA_PICTURE_DIR") {
            self.picture_dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Directory the image picker browses
    pub fn picture_dir(&self) -> PathBuf {
        self.picture_dir
            .clone()
            .or_else(dirs::picture_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("akshara").join("config.json"))
    }
}

/// Positive integer from the environment; `None` when unset.
fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(value) if value > 0 => Ok(Some(value)),
            _ => Err(ConfigError::InvalidValue(name.to_string(), raw)),
        },
        Err(_) => Ok(None),
    }
}
