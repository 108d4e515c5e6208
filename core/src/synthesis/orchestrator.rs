use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use super::provider::{AudioFormat, ProviderOutcome, SpeechProvider, SpeechRequest};
use crate::{MurmurError, Result};

/// Bounds applied to a caller-supplied speed.
pub const MIN_SPEED: f32 = 0.25;
pub const MAX_SPEED: f32 = 4.0;

/// Synthesis defaults loaded from environment variables
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    pub model: String,
    pub default_voice: String,
    pub default_speed: f32,
    /// Upper bound for the whole attempt sequence; 0 disables it.
    pub timeout_ms: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            model: std::env::var("TTS_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "gpt-4o-mini-tts".to_string()),
            default_voice: std::env::var("DEFAULT_VOICE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "alloy".to_string()),
            default_speed: std::env::var("DEFAULT_SPEED")
                .ok()
                .and_then(|v| v.parse::<f32>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(1.05),
            timeout_ms: std::env::var("TTS_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60_000),
        }
    }
}

/// What a caller asks to have spoken.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub speed: Option<f32>,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }
}

/// Build the provider input. A non-blank style guide is prepended as a
/// `[STYLE]` section followed by the `[SCRIPT]`.
pub fn compose_input(style: &str, text: &str) -> String {
    let style = style.trim();
    let text = text.trim();
    if style.is_empty() {
        text.to_string()
    } else {
        format!("[STYLE]\n{style}\n\n[SCRIPT]\n{text}\n")
    }
}

/// Turns a [`SynthesisRequest`] into audio bytes via a [`SpeechProvider`].
pub struct SynthesisOrchestrator {
    provider: Arc<dyn SpeechProvider>,
    cfg: SynthesisConfig,
}

impl SynthesisOrchestrator {
    pub fn new(provider: Arc<dyn SpeechProvider>, cfg: SynthesisConfig) -> Self {
        Self { provider, cfg }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.cfg
    }

    /// Synthesize speech.
    /// Contract:
    /// - Input: non-blank text, optional style/voice/speed
    /// - Output: non-empty encoded audio
    /// - Error: `InvalidInput` before any provider call; `Synthesis` for
    ///   provider failures, timeouts and empty audio
    pub async fn synthesize(&self, req: &SynthesisRequest) -> Result<Bytes> {
        let text = req.text.trim();
        if text.is_empty() {
            return Err(MurmurError::InvalidInput("text is empty".into()));
        }

        let request = SpeechRequest {
            model: self.cfg.model.clone(),
            voice: self.resolve_voice(req.voice.as_deref()),
            input: compose_input(req.style.as_deref().unwrap_or_default(), text),
            format: AudioFormat::Mp3,
            speed: Some(self.resolve_speed(req.speed)),
        };

        let started = Instant::now();
        let attempts = self.run_attempts(request);
        let audio = if self.cfg.timeout_ms > 0 {
            timeout(Duration::from_millis(self.cfg.timeout_ms), attempts)
                .await
                .map_err(|_| {
                    warn!(target: "orchestrator", timeout_ms = self.cfg.timeout_ms, "Synthesis timed out");
                    MurmurError::Synthesis(format!(
                        "provider timed out after {} ms",
                        self.cfg.timeout_ms
                    ))
                })??
        } else {
            attempts.await?
        };

        if audio.is_empty() {
            return Err(MurmurError::Synthesis("empty audio returned".into()));
        }

        info!(
            target: "orchestrator",
            provider = self.provider.name(),
            text_len = text.len(),
            bytes = audio.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Synthesis complete"
        );
        Ok(audio)
    }

    /// First attempt with speed; on a parameter rejection, exactly one more
    /// attempt without it.
    async fn run_attempts(&self, request: SpeechRequest) -> Result<Bytes> {
        let outcome = match self.provider.speak(&request).await {
            ProviderOutcome::UnsupportedParameter(detail) => {
                debug!(target: "orchestrator", detail = %detail, "Speed rejected; retrying without it");
                self.provider.speak(&request.without_speed()).await
            }
            other => other,
        };

        match outcome {
            ProviderOutcome::Succeeded(audio) => audio.into_bytes().await,
            ProviderOutcome::UnsupportedParameter(detail) => Err(MurmurError::Synthesis(format!(
                "provider rejected request parameters: {detail}"
            ))),
            ProviderOutcome::Failed(detail) => Err(MurmurError::Synthesis(detail)),
        }
    }

    fn resolve_voice(&self, voice: Option<&str>) -> String {
        match voice.map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => self.cfg.default_voice.trim().to_string(),
        }
    }

    /// Absent, zero or non-finite falls back to the default; anything else is
    /// clamped into `[MIN_SPEED, MAX_SPEED]`.
    fn resolve_speed(&self, speed: Option<f32>) -> f32 {
        match speed {
            Some(s) if s.is_finite() && s != 0.0 => s.clamp(MIN_SPEED, MAX_SPEED),
            _ => self.cfg.default_speed.clamp(MIN_SPEED, MAX_SPEED),
        }
    }
}
