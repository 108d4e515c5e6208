// Murmur Core Library
// Ephemeral speech artifact cache and synthesis orchestration

pub mod clock;
pub mod store;
pub mod synthesis;

// Export core types
pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{spawn_sweeper, ttl_from_secs, Artifact, ArtifactId, ArtifactStore};
pub use synthesis::{
    AudioFormat, OpenAiSpeechConfig, OpenAiSpeechProvider, ProviderAudio, ProviderOutcome,
    SpeechProvider, SpeechRequest, SynthesisConfig, SynthesisOrchestrator, SynthesisRequest,
};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MurmurError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("synthesis failed: {0}")]
    Synthesis(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, MurmurError>;
