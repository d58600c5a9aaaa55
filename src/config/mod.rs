//! Application Configuration Module
//!
//! Provides service configuration loaded from TOML files, replacing
//! hardcoded endpoints, keys, and narration settings with operator-tunable
//! values.
//!
//! ## Loading Order
//!
//! 1. `AGROSENSE_CONFIG` environment variable (path to TOML file)
//! 2. `agrosense.toml` in the current working directory
//! 3. Built-in defaults
//!
//! API keys may also come from the environment (`OPENWEATHER_API_KEY`,
//! `CHAT_API_KEY`), typically via a `.env` file loaded at startup. The
//! config is constructed once in `main` and injected into the components
//! that need it; there is no global config state.

pub mod defaults;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error ({0}): {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("config parse error ({0}): {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub weather: WeatherConfig,
    pub chat: ChatConfig,
    pub narration: NarrationConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address, e.g. "0.0.0.0:8080"
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: defaults::DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

/// Classifier artifact settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path of the serialized model artifact loaded at startup.
    pub artifact_path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: defaults::DEFAULT_MODEL_PATH.to_string(),
        }
    }
}

/// Weather provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Provider base URL (OpenWeatherMap-compatible).
    pub base_url: String,
    /// API key. Empty means "take from OPENWEATHER_API_KEY".
    pub api_key: String,
    /// Request timeout (seconds).
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::DEFAULT_WEATHER_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: defaults::WEATHER_HTTP_TIMEOUT_SECS,
        }
    }
}

impl WeatherConfig {
    /// Resolve the API key: explicit config value wins, then the
    /// `OPENWEATHER_API_KEY` environment variable.
    pub fn resolved_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        std::env::var("OPENWEATHER_API_KEY").unwrap_or_default()
    }
}

/// Chat assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Provider base URL (OpenAI-compatible).
    pub base_url: String,
    /// API key. Empty means "take from CHAT_API_KEY".
    pub api_key: String,
    /// Model identifier sent with each completion request.
    pub model: String,
    /// Request timeout (seconds).
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::DEFAULT_CHAT_BASE_URL.to_string(),
            api_key: String::new(),
            model: defaults::DEFAULT_CHAT_MODEL.to_string(),
            timeout_secs: defaults::CHAT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl ChatConfig {
    /// Resolve the API key: explicit config value wins, then the
    /// `CHAT_API_KEY` environment variable.
    pub fn resolved_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        std::env::var("CHAT_API_KEY").unwrap_or_default()
    }
}

/// Narration (text-to-speech) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// Whether advisory narration is enabled.
    pub enabled: bool,
    /// TTS engine command invoked per utterance.
    pub engine: String,
    /// Speech rate (words per minute).
    pub rate_wpm: u32,
    /// Speech volume (0.0-1.0).
    pub volume: f64,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            engine: defaults::DEFAULT_NARRATION_ENGINE.to_string(),
            rate_wpm: defaults::DEFAULT_NARRATION_RATE_WPM,
            volume: defaults::DEFAULT_NARRATION_VOLUME,
        }
    }
}

impl AppConfig {
    /// Load configuration using the documented loading order.
    ///
    /// Unreadable or invalid files fall through to the next source with a
    /// warning; this function never fails.
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var("AGROSENSE_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from AGROSENSE_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from AGROSENSE_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "AGROSENSE_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./agrosense.toml
        let local = PathBuf::from("agrosense.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./agrosense.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./agrosense.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No agrosense.toml found — using built-in defaults");
        Self::default()
    }

    /// Load and validate a config file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate recognized option ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!(
                "server.bind_address '{}' is not a valid socket address",
                self.server.bind_address
            ));
        }
        if self.model.artifact_path.is_empty() {
            errors.push("model.artifact_path must not be empty".to_string());
        }
        if self.weather.timeout_secs == 0 {
            errors.push("weather.timeout_secs must be greater than zero".to_string());
        }
        if self.chat.timeout_secs == 0 {
            errors.push("chat.timeout_secs must be greater than zero".to_string());
        }
        if self.narration.rate_wpm == 0 {
            errors.push("narration.rate_wpm must be greater than zero".to_string());
        }
        if !(0.0..=1.0).contains(&self.narration.volume) {
            errors.push(format!(
                "narration.volume {} outside the recognized 0.0-1.0 range",
                self.narration.volume
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_volume_out_of_range_rejected() {
        let mut config = AppConfig::default();
        config.narration.volume = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("narration.volume"));
    }

    #[test]
    fn test_bad_bind_address_rejected() {
        let mut config = AppConfig::default();
        config.server.bind_address = "not-an-address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [weather]
            api_key = "abc123"

            [narration]
            enabled = true
            rate_wpm = 120
            "#,
        )
        .unwrap();
        assert_eq!(config.weather.api_key, "abc123");
        assert_eq!(config.weather.timeout_secs, defaults::WEATHER_HTTP_TIMEOUT_SECS);
        assert!(config.narration.enabled);
        assert_eq!(config.narration.rate_wpm, 120);
        assert_eq!(config.server.bind_address, defaults::DEFAULT_BIND_ADDRESS);
    }
}
