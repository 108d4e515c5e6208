// Speech synthesis: provider seam, OpenAI client, orchestration

mod openai;
mod orchestrator;
mod provider;

pub use openai::{OpenAiSpeechConfig, OpenAiSpeechProvider};
pub use orchestrator::{
    compose_input, SynthesisConfig, SynthesisOrchestrator, SynthesisRequest, MAX_SPEED, MIN_SPEED,
};
pub use provider::{
    AudioChunkStream, AudioFormat, ProviderAudio, ProviderOutcome, SpeechProvider, SpeechRequest,
};
