use std::fs;
use std::path::Path;

use murmur_core::{OpenAiSpeechConfig, SynthesisConfig};

/// High-level configuration for the Murmur server
#[derive(Clone, Debug)]
pub struct MurmurConfig {
    pub server: ServerConfig,
    pub synthesis: SynthesisConfig,
    pub openai: OpenAiSpeechConfig,
}

/// HTTP surface and cache settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Bind address, e.g. `0.0.0.0:8000`
    pub addr: String,
    /// Overrides the base URL inferred from the request when building audio links
    pub public_base_url: Option<String>,
    /// Artifact lifetime; zero or negative expires everything immediately
    pub ttl_secs: i64,
    /// Period of the background sweeper; 0 keeps eviction purely access-driven
    pub sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: std::env::var("MURMUR_ADDR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "0.0.0.0:8000".to_string()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .ok()
                .and_then(|s| normalize_base_url(&s)),
            ttl_secs: std::env::var("TTL_SECONDS")
                .or_else(|_| std::env::var("AUDIO_TTL_SECONDS"))
                .ok()
                .and_then(|v| v.trim().parse::<i64>().ok())
                .unwrap_or(3_600),
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECONDS")
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(0),
        }
    }
}

impl Default for MurmurConfig {
    fn default() -> Self {
        // Feature module defaults already consider env vars
        Self {
            server: ServerConfig::default(),
            synthesis: SynthesisConfig::default(),
            openai: OpenAiSpeechConfig::default(),
        }
    }
}

impl MurmurConfig {
    /// Load configuration from a TOML file (path via MURMUR_CONFIG or ./murmur.toml),
    /// overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let path = std::env::var("MURMUR_CONFIG").unwrap_or_else(|_| "murmur.toml".into());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(p: &Path) -> Self {
        let default = Self::default();
        if !p.exists() {
            tracing::info!(target: "config", path = %p.display(), "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(p) {
            Ok(s) => match toml::from_str::<MurmurToml>(&s) {
                Ok(t) => t.overlay(default),
                Err(e) => {
                    tracing::warn!(target: "config", error = %e, "Failed to parse TOML; using defaults");
                    default
                }
            },
            Err(e) => {
                tracing::warn!(target: "config", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }

    /// Reject settings the server cannot start with.
    pub fn validate(&self) -> crate::Result<()> {
        if self.server.addr.trim().is_empty() {
            return Err(crate::ServerError::Config("bind address is empty".into()));
        }
        if let Some(base) = &self.server.public_base_url {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(crate::ServerError::Config(format!(
                    "PUBLIC_BASE_URL must start with http:// or https://, got {base:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn ttl(&self) -> chrono::Duration {
        murmur_core::ttl_from_secs(self.server.ttl_secs)
    }
}

/// Trim whitespace and trailing slashes; blank means unset.
pub fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct MurmurToml {
    pub server: Option<ServerToml>,
    pub synthesis: Option<SynthesisToml>,
    pub openai: Option<OpenAiToml>,
}

impl MurmurToml {
    fn overlay(self, mut base: MurmurConfig) -> MurmurConfig {
        if let Some(s) = self.server {
            s.apply(&mut base.server);
        }
        if let Some(s) = self.synthesis {
            s.apply(&mut base.synthesis);
        }
        if let Some(o) = self.openai {
            o.apply(&mut base.openai);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct ServerToml {
    pub addr: Option<String>,
    pub public_base_url: Option<String>,
    pub ttl_seconds: Option<i64>,
    pub sweep_interval_seconds: Option<u64>,
}
impl ServerToml {
    fn apply(self, s: &mut ServerConfig) {
        if let Some(x) = self.addr {
            s.addr = x;
        }
        if let Some(x) = self.public_base_url {
            s.public_base_url = normalize_base_url(&x);
        }
        if let Some(x) = self.ttl_seconds {
            s.ttl_secs = x;
        }
        if let Some(x) = self.sweep_interval_seconds {
            s.sweep_interval_secs = x;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct SynthesisToml {
    pub model: Option<String>,
    pub default_voice: Option<String>,
    pub default_speed: Option<f32>,
    pub timeout_ms: Option<u64>,
}
impl SynthesisToml {
    fn apply(self, s: &mut SynthesisConfig) {
        if let Some(x) = self.model.filter(|m| !m.trim().is_empty()) {
            s.model = x;
        }
        if let Some(x) = self.default_voice.filter(|v| !v.trim().is_empty()) {
            s.default_voice = x;
        }
        if let Some(x) = self.default_speed.filter(|v| v.is_finite() && *v > 0.0) {
            s.default_speed = x;
        }
        if let Some(x) = self.timeout_ms {
            s.timeout_ms = x;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct OpenAiToml {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub request_timeout_ms: Option<u64>,
}
impl OpenAiToml {
    fn apply(self, o: &mut OpenAiSpeechConfig) {
        if let Some(x) = self.base_url {
            o.base_url = x;
        }
        if let Some(x) = self.api_key {
            o.api_key = Some(x);
        }
        if let Some(x) = self.request_timeout_ms {
            o.request_timeout_ms = x;
        }
    }
}
