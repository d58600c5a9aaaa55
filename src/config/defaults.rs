//! System-wide default constants.
//!
//! Centralises the values used when no config file overrides them.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Server
// ============================================================================

/// Default HTTP bind address for the dashboard API.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

// ============================================================================
// Model
// ============================================================================

/// Default path of the serialized crop classifier artifact.
pub const DEFAULT_MODEL_PATH: &str = "./data/crop_model.json";

// ============================================================================
// Weather Client
// ============================================================================

/// Default weather provider base URL (OpenWeatherMap-compatible).
pub const DEFAULT_WEATHER_BASE_URL: &str = "http://api.openweathermap.org/data/2.5";

/// HTTP client timeout for forecast requests (seconds).
pub const WEATHER_HTTP_TIMEOUT_SECS: u64 = 10;

/// Number of forecast entries surfaced to callers.
pub const FORECAST_WINDOW: usize = 5;

// ============================================================================
// Chat Assistant
// ============================================================================

/// Default chat-completion provider base URL (OpenAI-compatible).
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat-completion model identifier.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

/// HTTP client timeout for chat requests (seconds).
pub const CHAT_HTTP_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Narration
// ============================================================================

/// Default text-to-speech engine command.
pub const DEFAULT_NARRATION_ENGINE: &str = "espeak-ng";

/// Default speech rate (words per minute).
pub const DEFAULT_NARRATION_RATE_WPM: u32 = 150;

/// Default speech volume (0.0-1.0).
pub const DEFAULT_NARRATION_VOLUME: f64 = 0.9;
