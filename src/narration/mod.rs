//! Narration Service — fire-and-forget text-to-speech side channel.
//!
//! Spawns a local TTS engine process per utterance with the configured
//! rate and volume. No return value is consumed by the advisory core:
//! spawn failures and non-zero exits are logged at debug level and
//! dropped, so a missing engine degrades narration silently without
//! touching the request path.

use crate::config::NarrationConfig;
use tokio::process::Command;
use tracing::debug;

/// Narrates advisory text through a local TTS engine.
#[derive(Debug, Clone)]
pub struct Narrator {
    config: NarrationConfig,
}

impl Narrator {
    pub fn new(config: NarrationConfig) -> Self {
        Self { config }
    }

    /// Whether narration is enabled in config.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Speak a line of text. Returns immediately; the engine process runs
    /// detached from the calling request.
    pub fn speak(&self, text: &str) {
        if !self.config.enabled || text.is_empty() {
            return;
        }

        let engine = self.config.engine.clone();
        let rate = self.config.rate_wpm.to_string();
        // espeak amplitude is 0-200; config volume is 0.0-1.0
        let amplitude = ((self.config.volume * 200.0).round() as i64).to_string();
        let text = text.to_string();

        tokio::spawn(async move {
            let result = Command::new(&engine)
                .arg("-s")
                .arg(&rate)
                .arg("-a")
                .arg(&amplitude)
                .arg(&text)
                .status()
                .await;
            match result {
                Ok(status) if status.success() => {}
                Ok(status) => debug!(%engine, %status, "TTS engine exited non-zero"),
                Err(e) => debug!(%engine, error = %e, "Failed to spawn TTS engine"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NarrationConfig;

    #[tokio::test]
    async fn test_disabled_narrator_is_noop() {
        let narrator = Narrator::new(NarrationConfig::default());
        assert!(!narrator.is_enabled());
        // Must not panic or block
        narrator.speak("Recommended crop is rice");
    }

    #[tokio::test]
    async fn test_missing_engine_is_swallowed() {
        let narrator = Narrator::new(NarrationConfig {
            enabled: true,
            engine: "definitely-not-a-tts-engine".to_string(),
            ..NarrationConfig::default()
        });
        narrator.speak("hello");
        // Give the spawned task a moment; failure must stay internal
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
}
