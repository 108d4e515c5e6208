use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use super::provider::{ProviderAudio, ProviderOutcome, SpeechProvider, SpeechRequest};
use crate::{MurmurError, Result};

/// Configuration for OpenAiSpeechProvider loaded from environment variables
#[derive(Debug, Clone)]
pub struct OpenAiSpeechConfig {
    pub base_url: String, // e.g., https://api.openai.com/v1
    pub api_key: Option<String>,
    pub request_timeout_ms: u64,
}

impl Default for OpenAiSpeechConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("OPENAI_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            request_timeout_ms: std::env::var("TTS_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60_000),
        }
    }
}

/// `/audio/speech` client for OpenAI-compatible endpoints
#[derive(Clone)]
pub struct OpenAiSpeechProvider {
    http: Client,
    cfg: OpenAiSpeechConfig,
}

impl OpenAiSpeechProvider {
    pub fn new(cfg: OpenAiSpeechConfig) -> Result<Self> {
        if !(cfg.base_url.starts_with("http://") || cfg.base_url.starts_with("https://")) {
            return Err(MurmurError::Config(format!(
                "OPENAI_BASE_URL must be an http(s) URL, got {:?}",
                cfg.base_url
            )));
        }
        let mut builder = Client::builder();
        if cfg.request_timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(cfg.request_timeout_ms));
        }
        let http = builder
            .build()
            .map_err(|e| MurmurError::Http(format!("Failed to build HTTP client: {e}")))?;
        if cfg.api_key.is_none() {
            warn!(target: "openai_tts", "OPENAI_API_KEY is not set; requests will likely be rejected");
        }
        Ok(Self { http, cfg })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiSpeechConfig::default())
    }

    pub fn config(&self) -> &OpenAiSpeechConfig {
        &self.cfg
    }

    fn speech_url(&self) -> String {
        format!("{}/audio/speech", self.cfg.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SpeechProvider for OpenAiSpeechProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn speak(&self, request: &SpeechRequest) -> ProviderOutcome {
        let url = self.speech_url();
        debug!(
            target: "openai_tts",
            model = %request.model,
            voice = %request.voice,
            input_len = request.input.len(),
            speed = ?request.speed,
            "POST {}", url
        );

        let mut body = json!({
            "model": request.model,
            "voice": request.voice,
            "input": request.input,
            "response_format": request.format.as_str(),
        });
        if let Some(speed) = request.speed {
            // f32 -> f64 widening would otherwise leak digits like 1.0499999523
            body["speed"] = json!((f64::from(speed) * 1_000.0).round() / 1_000.0);
        }

        let mut req = self.http.post(&url).json(&body);
        if let Some(key) = &self.cfg.api_key {
            req = req.bearer_auth(key);
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(target: "openai_tts", error = %e, "Speech request failed");
                return ProviderOutcome::Failed(format!("request error: {e}"));
            }
        };

        let status = resp.status();
        if status.is_success() {
            let stream = resp
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| e.to_string()));
            return ProviderOutcome::Succeeded(ProviderAudio::Stream(Box::pin(stream)));
        }

        let text = resp.text().await.unwrap_or_default();
        if request.speed.is_some() && is_speed_rejection(status, &text) {
            debug!(target: "openai_tts", %status, "Provider rejected the speed parameter");
            return ProviderOutcome::UnsupportedParameter(text);
        }
        warn!(target: "openai_tts", %status, body = %text, "Speech endpoint error");
        ProviderOutcome::Failed(format!("status={} body={}", status, text))
    }
}

/// Whether an error response is about the `speed` parameter rather than the input.
fn is_speed_rejection(status: StatusCode, body: &str) -> bool {
    if status != StatusCode::BAD_REQUEST && status != StatusCode::UNPROCESSABLE_ENTITY {
        return false;
    }
    if let Ok(val) = serde_json::from_str::<serde_json::Value>(body) {
        let err = val.get("error").unwrap_or(&val);
        if err.get("param").and_then(|p| p.as_str()) == Some("speed") {
            return true;
        }
        if let Some(msg) = err.get("message").and_then(|m| m.as_str()) {
            return mentions_unsupported_speed(msg);
        }
    }
    mentions_unsupported_speed(body)
}

fn mentions_unsupported_speed(msg: &str) -> bool {
    let msg = msg.to_ascii_lowercase();
    msg.contains("speed")
        && ["unsupported", "not supported", "unrecognized", "unknown", "not allowed"]
            .iter()
            .any(|needle| msg.contains(needle))
}
